//! FILENAME: app/src/lib.rs
// PURPOSE: Library entry point for the survey-pivot host.
// CONTEXT: The binary is a thin shell over `commands::run`; tests drive `pipeline` directly.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use commands::{run, Cli, Command};
pub use config::{AppConfig, BubbleConfig};
pub use error::AppError;
pub use logging::{get_log_path, init_log_file, next_seq, write_log};
pub use pipeline::{build_dashboard, import, load_records, query, Dashboard, ImportSummary, InputFormat};
