//! FILENAME: core/persistence/src/memory.rs
//! In-memory record store with multi-entry indexes.
//!
//! Every filterable field keeps a `label -> ids` index in which a record appears
//! once per label it holds. Ids grow monotonically, so sorting by id yields
//! insertion order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use records::{Record, RecordField};

use crate::store::{AttributeFilter, AttributeQuery, RecordStore};
use crate::PersistenceError;

pub type RecordId = u64;

/// Fields that carry a multi-entry index.
pub const INDEXED_FIELDS: [RecordField; 6] = [
    RecordField::SubDomain,
    RecordField::DataTypes,
    RecordField::Encodings,
    RecordField::Tasks,
    RecordField::Paradigms,
    RecordField::Evaluators,
];

type Index = BTreeMap<String, BTreeSet<RecordId>>;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    next_id: RecordId,
    records: BTreeMap<RecordId, Record>,
    titles: HashMap<String, RecordId>,
    indexes: HashMap<RecordField, Index>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts one record and returns its id.
    pub fn put(&mut self, record: Record) -> RecordId {
        let title = record.title.trim();
        let existing = (!title.is_empty())
            .then(|| self.titles.get(title).copied())
            .flatten();

        let id = match existing {
            Some(id) => {
                if let Some(old) = self.records.remove(&id) {
                    self.unindex(id, &old);
                }
                id
            }
            None => {
                let id = self.next_id;
                self.next_id += 1;
                if !title.is_empty() {
                    self.titles.insert(title.to_string(), id);
                }
                id
            }
        };

        self.index(id, &record);
        self.records.insert(id, record);
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Record> {
        self.titles.get(title.trim()).and_then(|id| self.records.get(id))
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.titles.clear();
        self.indexes.clear();
    }

    /// Iterates stored records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> + '_ {
        self.records.values()
    }

    fn index(&mut self, id: RecordId, record: &Record) {
        for field in INDEXED_FIELDS {
            let index = self.indexes.entry(field).or_default();
            for label in record.labels(field) {
                index.entry(label.clone()).or_default().insert(id);
            }
        }
    }

    fn unindex(&mut self, id: RecordId, record: &Record) {
        for field in INDEXED_FIELDS {
            let Some(index) = self.indexes.get_mut(&field) else {
                continue;
            };
            for label in record.labels(field) {
                if let Some(ids) = index.get_mut(label) {
                    ids.remove(&id);
                    if ids.is_empty() {
                        index.remove(label);
                    }
                }
            }
        }
    }

    /// Ids holding any of `values` in `field`.
    fn any_of(&self, field: RecordField, values: &[String]) -> BTreeSet<RecordId> {
        let mut ids = BTreeSet::new();
        if let Some(index) = self.indexes.get(&field) {
            for value in values {
                if let Some(hits) = index.get(value) {
                    ids.extend(hits.iter().copied());
                }
            }
        }
        ids
    }

    fn collect(&self, ids: impl IntoIterator<Item = RecordId>) -> Vec<Record> {
        ids.into_iter()
            .filter_map(|id| self.records.get(&id).cloned())
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn put_batch(&mut self, records: &[Record]) -> Result<usize, PersistenceError> {
        for record in records {
            self.put(record.clone());
        }
        log::debug!(target: "STORE", "put_batch: {} written, {} stored", records.len(), self.records.len());
        Ok(records.len())
    }

    fn query(&self, filter: &AttributeFilter) -> Result<Vec<Record>, PersistenceError> {
        let mut matched: Option<BTreeSet<RecordId>> = None;
        for (field, values) in filter.criteria() {
            let hits = self.any_of(field, values);
            matched = Some(match matched {
                None => hits,
                Some(prev) => prev.intersection(&hits).copied().collect(),
            });
        }

        let results = match matched {
            None => self.records.values().cloned().collect(),
            Some(ids) => self.collect(ids),
        };
        log::debug!(target: "STORE", "query: {} of {} records match", results.len(), self.records.len());
        Ok(results)
    }

    fn query_attribute(&self, query: &AttributeQuery) -> Result<Vec<Record>, PersistenceError> {
        Ok(self
            .records
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Record>, PersistenceError> {
        Ok(self.records.values().cloned().collect())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::QueryOp;

    fn paper(title: &str, author: &str, domain: &str, data_types: &[&str]) -> Record {
        let mut record = Record::new(author, "2012")
            .with(RecordField::SubDomain, [domain])
            .with(RecordField::DataTypes, data_types);
        record.title = title.to_string();
        record
    }

    fn create_test_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .put_batch(&[
                paper("P1", "A", "Natural Science", &["Table"]),
                paper("P2", "B", "Physical Science", &["Field", "Table"]),
                paper("P3", "C", "Natural Science", &["Network"]),
            ])
            .unwrap();
        store
    }

    fn authors(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.author.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_all_in_order() {
        let store = create_test_store();
        let all = store.query(&AttributeFilter::default()).unwrap();
        assert_eq!(authors(&all), ["A", "B", "C"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_filter_intersects_fields_and_unions_values() {
        let store = create_test_store();

        let filter = AttributeFilter::default().with(RecordField::DataTypes, ["Table", "Network"]);
        assert_eq!(authors(&store.query(&filter).unwrap()), ["A", "B", "C"]);

        let filter = filter.with(RecordField::SubDomain, ["Natural Science"]);
        assert_eq!(authors(&store.query(&filter).unwrap()), ["A", "C"]);

        let filter = AttributeFilter::default()
            .with(RecordField::SubDomain, ["Physical Science"])
            .with(RecordField::DataTypes, ["Network"]);
        assert!(store.query(&filter).unwrap().is_empty());
    }

    #[test]
    fn test_upsert_by_title_keeps_position() {
        let mut store = create_test_store();
        store.put_batch(&[paper("P1", "A2", "Physical Science", &["Geometry"])]).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(authors(&store.all().unwrap()), ["A2", "B", "C"]);

        // Stale index entries are gone.
        let filter = AttributeFilter::default().with(RecordField::DataTypes, ["Table"]);
        assert_eq!(authors(&store.query(&filter).unwrap()), ["B"]);
        assert_eq!(store.find_by_title("P1").unwrap().author, "A2");
    }

    #[test]
    fn test_blank_titles_always_insert() {
        let mut store = MemoryStore::new();
        store
            .put_batch(&[paper("", "A", "X", &[]), paper(" ", "B", "X", &[])])
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_query_attribute() {
        let store = create_test_store();
        let query = AttributeQuery::new(RecordField::Author, QueryOp::EqualsIgnoreCase, ["b"]);
        assert_eq!(authors(&store.query_attribute(&query).unwrap()), ["B"]);

        let query = AttributeQuery::new(RecordField::DataTypes, QueryOp::NoneOf, ["Table"]);
        assert_eq!(authors(&store.query_attribute(&query).unwrap()), ["C"]);
    }
}
