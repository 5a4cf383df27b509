//! CLI binary for lynk.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use std::process::ExitCode;

use clap::Parser;
use lynk::cli::{run, Cli};
use lynk::config::LynkConfig;
use lynk::{logging, paths};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = paths::data_dir()
        .and_then(|dir| LynkConfig::load_from(&dir).ok())
        .and_then(|config| config.log_filter);
    logging::init(log_filter.as_deref());

    let output = run(cli.command);

    for msg in output.stdout {
        println!("{msg}");
    }
    for msg in output.stderr {
        eprintln!("{msg}");
    }

    output.exit_code
}
