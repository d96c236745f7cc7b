//! FILENAME: app/src/main.rs
// PURPOSE: CLI entry point with unified logging.
// FORMAT: seq|level|category|message

use std::error::Error;
use std::process::ExitCode;

use app_lib::{log_error, logging, Cli};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match app_lib::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("CMD", "{}", e);
            let mut source = e.source();
            while let Some(cause) = source {
                log_error!("CMD", "caused by: {}", cause);
                source = cause.source();
            }
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
