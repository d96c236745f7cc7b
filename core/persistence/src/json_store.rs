//! FILENAME: core/persistence/src/json_store.rs
//! File-backed record store: a `MemoryStore` mirrored to a versioned JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use records::Record;
use serde::{Deserialize, Serialize};

use crate::memory::MemoryStore;
use crate::store::{AttributeFilter, AttributeQuery, RecordStore};
use crate::PersistenceError;

/// Current on-disk format version.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// On-disk layout of a store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    pub version: u32,
    pub records: Vec<Record>,
}

impl StoreFile {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            records,
        }
    }
}

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    existed: bool,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens the store at `path`, loading it if the file exists.
    /// The returned handle is ready for queries.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        let mut inner = MemoryStore::new();

        let existed = path.exists();
        if existed {
            let bytes = fs::read(&path)?;
            let file: StoreFile = serde_json::from_slice(&bytes)?;
            if file.version > STORE_FORMAT_VERSION {
                return Err(PersistenceError::InvalidFormat(format!(
                    "store version {} is newer than supported version {}",
                    file.version, STORE_FORMAT_VERSION
                )));
            }
            inner.put_batch(&file.records)?;
        }

        log::info!(
            target: "STORE",
            "open {}: existed={}, {} records",
            path.display(),
            existed,
            inner.len()
        );
        Ok(Self {
            path,
            existed,
            inner,
        })
    }

    /// Whether the file was present when the store was opened.
    pub fn existed(&self) -> bool {
        self.existed
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes every record and rewrites the file.
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        self.inner.clear();
        self.flush()
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = StoreFile::new(self.inner.iter().cloned().collect());
        fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn put_batch(&mut self, records: &[Record]) -> Result<usize, PersistenceError> {
        let written = self.inner.put_batch(records)?;
        self.flush()?;
        log::info!(target: "STORE", "wrote {} records to {}", written, self.path.display());
        Ok(written)
    }

    fn query(&self, filter: &AttributeFilter) -> Result<Vec<Record>, PersistenceError> {
        self.inner.query(filter)
    }

    fn query_attribute(&self, query: &AttributeQuery) -> Result<Vec<Record>, PersistenceError> {
        self.inner.query_attribute(query)
    }

    fn all(&self) -> Result<Vec<Record>, PersistenceError> {
        self.inner.all()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use records::RecordField;
    use tempfile::tempdir;

    #[test]
    fn test_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("papers.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(!store.existed());
        assert!(store.is_empty());

        let mut record = Record::new("Smith", "2010").with(RecordField::Encodings, ["Glyph"]);
        record.title = "Paper".into();
        store.put_batch(&[record.clone()]).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.existed());
        assert_eq!(reopened.all().unwrap(), vec![record]);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.json");
        fs::write(&path, r#"{ "version": 99, "records": [] }"#).unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidFormat(_)));
    }

    #[test]
    fn test_clear_empties_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("papers.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        store.put_batch(&[Record::new("A", "2010")]).unwrap();
        store.clear().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert!(reopened.existed());
        assert_eq!(reopened.len(), 0);
    }
}
