//! FILENAME: core/records/src/lib.rs
//! PURPOSE: Survey record model shared by the pivot engine, the record store and the host.
//! CONTEXT: Re-exports public types for use by other crates.

pub mod field;
pub mod raw;
pub mod record;

pub use field::RecordField;
pub use raw::{RawCell, RawRecord};
pub use record::{LabelSet, Record};
