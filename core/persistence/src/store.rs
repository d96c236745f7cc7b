//! FILENAME: core/persistence/src/store.rs
//! The record store interface and its query types.

use records::{Record, RecordField};
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Batch-accepts normalized records and answers attribute queries.
///
/// A store value only exists once it is ready, so every call is issued against
/// an open store.
pub trait RecordStore {
    /// Upserts a batch keyed by title. A non-blank title replaces the stored
    /// record with the same title in place; a blank title always inserts.
    /// Returns the number of records written.
    fn put_batch(&mut self, records: &[Record]) -> Result<usize, PersistenceError>;

    /// Records matching every populated field of `filter`, in insertion order.
    fn query(&self, filter: &AttributeFilter) -> Result<Vec<Record>, PersistenceError>;

    /// Records matching a single-field comparison, in insertion order.
    fn query_attribute(&self, query: &AttributeQuery) -> Result<Vec<Record>, PersistenceError>;

    /// Every stored record, in insertion order.
    fn all(&self) -> Result<Vec<Record>, PersistenceError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// ATTRIBUTE FILTER
// ============================================================================

/// Multi-field filter. Values within a field are alternatives (any of);
/// populated fields must all match. An empty list does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttributeFilter {
    pub domain: Vec<String>,
    pub data_types: Vec<String>,
    pub paradigms: Vec<String>,
    pub encodings: Vec<String>,
    pub evaluators: Vec<String>,
}

impl AttributeFilter {
    /// Fields the filter can constrain.
    pub const FIELDS: [RecordField; 5] = [
        RecordField::SubDomain,
        RecordField::DataTypes,
        RecordField::Paradigms,
        RecordField::Encodings,
        RecordField::Evaluators,
    ];

    pub fn values(&self, field: RecordField) -> &[String] {
        match field {
            RecordField::SubDomain => &self.domain,
            RecordField::DataTypes => &self.data_types,
            RecordField::Paradigms => &self.paradigms,
            RecordField::Encodings => &self.encodings,
            RecordField::Evaluators => &self.evaluators,
            _ => &[],
        }
    }

    /// Builder-style setter. Fields outside [`AttributeFilter::FIELDS`] are ignored.
    pub fn with<I, S>(mut self, field: RecordField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slot = match field {
            RecordField::SubDomain => &mut self.domain,
            RecordField::DataTypes => &mut self.data_types,
            RecordField::Paradigms => &mut self.paradigms,
            RecordField::Encodings => &mut self.encodings,
            RecordField::Evaluators => &mut self.evaluators,
            _ => return self,
        };
        slot.extend(values.into_iter().map(Into::into));
        self
    }

    /// Populated fields with their accepted values.
    pub fn criteria(&self) -> impl Iterator<Item = (RecordField, &[String])> + '_ {
        Self::FIELDS
            .into_iter()
            .map(|field| (field, self.values(field)))
            .filter(|(_, values)| !values.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.criteria().next().is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.criteria()
            .all(|(field, values)| record.has_any(field, values))
    }
}

// ============================================================================
// ATTRIBUTE QUERY
// ============================================================================

/// Single-field comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryOp {
    /// Some label equals one of the values, ignoring case.
    EqualsIgnoreCase,
    /// Some label starts with one of the values, ignoring case.
    StartsWithIgnoreCase,
    /// Some label differs from every value.
    NotEqual,
    /// No label equals any of the values.
    NoneOf,
}

/// `field <op> values`. A record whose field holds no label never matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeQuery {
    pub field: RecordField,
    pub op: QueryOp,
    pub values: Vec<String>,
}

impl AttributeQuery {
    pub fn new<I, S>(field: RecordField, op: QueryOp, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeQuery {
            field,
            op,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let labels = record.labels(self.field);
        if labels.is_empty() {
            return false;
        }
        match self.op {
            QueryOp::EqualsIgnoreCase => labels.iter().any(|label| {
                let label = lower(label);
                self.values.iter().any(|v| label == lower(v))
            }),
            QueryOp::StartsWithIgnoreCase => labels.iter().any(|label| {
                let label = lower(label);
                self.values.iter().any(|v| label.starts_with(&lower(v)))
            }),
            QueryOp::NotEqual => labels.iter().any(|label| !self.values.contains(label)),
            QueryOp::NoneOf => !labels.iter().any(|label| self.values.contains(label)),
        }
    }
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}
