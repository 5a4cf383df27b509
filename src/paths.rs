//! Path utilities for determining data storage locations.
//!
//! Lynk keeps its config and database in `~/.lynk/`. Setting `LYNK_HOME`
//! moves everything to another directory.

use std::path::{Path, PathBuf};

/// The base directory name for lynk data.
const DATA_DIR_NAME: &str = ".lynk";

/// Environment variable overriding the data directory.
pub const HOME_ENV_VAR: &str = "LYNK_HOME";

/// The database filename.
pub const DATABASE_FILENAME: &str = "lynk.sqlite3";

/// The config filename.
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Get the data directory.
///
/// Returns `$LYNK_HOME` if set, otherwise `~/.lynk/`, or `None` if the home
/// directory cannot be determined.
#[must_use]
pub fn data_dir() -> Option<PathBuf> {
    match std::env::var_os(HOME_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::home_dir().map(|home| home.join(DATA_DIR_NAME)),
    }
}

/// Config file path inside a data directory.
#[must_use]
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILENAME)
}

/// Default database path inside a data directory.
#[must_use]
pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DATABASE_FILENAME)
}
