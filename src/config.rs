//! Configuration management for lynk.
//!
//! Settings live in `config.yaml` inside the data directory (see
//! [`crate::paths`]). A missing file means defaults.

use crate::error::Result;
use crate::paths;
use crate::tasks::ordering::{Ordering, DEFAULT_MIN_GAP, STEP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const fn default_order_step() -> f64 {
    STEP
}

const fn default_min_key_gap() -> f64 {
    DEFAULT_MIN_GAP
}

/// User configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LynkConfig {
    /// Database file. None means `lynk.sqlite3` in the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Spacing between order keys on append and rebalance.
    #[serde(default = "default_order_step")]
    pub order_step: f64,

    /// Smallest gap allowed between a moved task and its neighbours.
    #[serde(default = "default_min_key_gap")]
    pub min_key_gap: f64,

    /// Tracing filter directive used when `LYNK_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for LynkConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            order_step: STEP,
            min_key_gap: DEFAULT_MIN_GAP,
            log_filter: None,
        }
    }
}

impl LynkConfig {
    /// Load config from a data directory, returning defaults if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let config_path = paths::config_path(data_dir);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(data_dir)?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(paths::config_path(data_dir), content)?;
        Ok(())
    }

    /// Load the config, writing the defaults first if none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or saved.
    pub fn ensure(data_dir: &Path) -> Result<Self> {
        if paths::config_path(data_dir).exists() {
            return Self::load_from(data_dir);
        }
        let config = Self::default();
        config.save_to(data_dir)?;
        Ok(config)
    }

    /// Key spacing for the ordering engine.
    ///
    /// Non-positive or non-finite values fall back to the defaults. The
    /// minimum gap must stay below half the step, or every move would
    /// rebalance; a gap that large is replaced too.
    #[must_use]
    pub fn ordering(&self) -> Ordering {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        let step = if valid(self.order_step) { self.order_step } else { STEP };
        let min_gap = if valid(self.min_key_gap) && self.min_key_gap < step / 2.0 {
            self.min_key_gap
        } else {
            DEFAULT_MIN_GAP.min(step / 4.0)
        };
        Ordering::new(step, min_gap)
    }

    /// The database file, resolved against `data_dir` when relative.
    #[must_use]
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        match &self.database_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => paths::default_db_path(data_dir),
        }
    }
}
