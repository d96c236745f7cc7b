//! FILENAME: core/persistence/src/lib.rs
//! Survey Persistence Module
//!
//! Reads survey rows from XLSX workbooks and JSON exports, and keeps
//! normalized records in an embedded store that answers attribute queries.

mod error;
mod json_store;
mod memory;
mod store;
mod xlsx_reader;

pub use error::PersistenceError;
pub use json_store::{JsonFileStore, StoreFile, STORE_FORMAT_VERSION};
pub use memory::{MemoryStore, RecordId, INDEXED_FIELDS};
pub use store::{AttributeFilter, AttributeQuery, QueryOp, RecordStore};
pub use xlsx_reader::{load_survey_rows, ColumnMap};

use std::fs;
use std::path::Path;

use records::RawRecord;

/// Reads raw rows from a JSON file holding an array of row objects.
pub fn load_json_rows(path: &Path) -> Result<Vec<RawRecord>, PersistenceError> {
    let bytes = fs::read(path)?;
    let rows: Vec<RawRecord> = serde_json::from_slice(&bytes)?;
    log::info!(target: "RECORDS", "loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
