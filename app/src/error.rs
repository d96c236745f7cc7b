//! FILENAME: app/src/error.rs

use pivot_engine::PivotError;
use persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("pivot failed: {0}")]
    Pivot(#[from] PivotError),

    #[error("storage failed: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported input '{0}': expected a .json or .xlsx file")]
    UnsupportedInput(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
