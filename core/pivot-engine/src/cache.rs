//! FILENAME: core/pivot-engine/src/cache.rs
//! Pivot Cache - Dense internal representation.
//!
//! The cache is designed for:
//! - Exhaustive templates: every (row, column) cell exists at zero before counting
//! - O(1) label lookup via value interning
//! - Attribution stored in lockstep with counters, so a cell's author list
//!   always has exactly as many entries as its count
//!
//! Architecture:
//! - Each dimension is a `Domain`: labels stored once, referenced by `ValueId`
//! - A `CrossTab` stores counters and attribution lists row-major over two domains

use rustc_hash::FxHashMap;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use records::{Record, RecordField};

// ============================================================================
// VALUE INTERNING
// ============================================================================

/// A reference to an interned label within a domain.
pub type ValueId = u32;

/// Ordered, de-duplicated set of labels for one chart axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Domain {
    /// Ordered list of labels (indexed by ValueId).
    labels: Vec<String>,

    /// Map from label to its ID.
    index: FxHashMap<String, ValueId>,
}

impl Domain {
    /// Builds a domain in first-seen order. Labels are trimmed; blanks and
    /// repeats are dropped.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut domain = Domain::default();
        for label in labels {
            domain.intern(label.as_ref());
        }
        domain
    }

    /// Builds a domain sorted lexicographically (case-sensitive).
    pub fn sorted<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels = Domain::new(labels).labels;
        labels.sort();
        Domain::new(labels)
    }

    /// Distinct sub-domains across the batch, in first-seen order.
    pub fn sub_domains_of(records: &[Record]) -> Self {
        Domain::new(
            records
                .iter()
                .flat_map(|record| record.labels(RecordField::SubDomain)),
        )
    }

    /// Interns a label and returns its ValueId, or None for a blank label.
    fn intern(&mut self, label: &str) -> Option<ValueId> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        if let Some(&id) = self.index.get(label) {
            return Some(id);
        }
        let id = self.labels.len() as ValueId;
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        Some(id)
    }

    pub fn id_of(&self, label: &str) -> Option<ValueId> {
        self.index.get(label).copied()
    }

    pub fn label(&self, id: ValueId) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates `(id, label)` pairs in domain order.
    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &str)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, label)| (i as ValueId, label.as_str()))
    }
}

impl Serialize for Domain {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.labels.serialize(serializer)
    }
}

// ============================================================================
// ATTRIBUTION
// ============================================================================

/// One contributing paper behind a counter cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    /// Author name, trimmed.
    pub label: String,
    pub year: String,
}

impl Attribution {
    pub fn of(record: &Record) -> Self {
        Attribution {
            label: record.author.trim().to_string(),
            year: record.year.clone(),
        }
    }
}

// ============================================================================
// CROSS TAB
// ============================================================================

/// Counters over `rows x cols` with a parallel attribution list per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    rows: Domain,
    cols: Domain,
    counts: Vec<u32>,
    authors: Vec<Vec<Attribution>>,
}

impl CrossTab {
    /// A template: every cell present at zero with no attribution.
    pub fn zeroed(rows: Domain, cols: Domain) -> Self {
        let cells = rows.len() * cols.len();
        CrossTab {
            rows,
            cols,
            counts: vec![0; cells],
            authors: vec![Vec::new(); cells],
        }
    }

    fn offset(&self, row: ValueId, col: ValueId) -> usize {
        row as usize * self.cols.len() + col as usize
    }

    /// Counts one contribution to a cell and returns the new count.
    pub(crate) fn increment(&mut self, row: ValueId, col: ValueId, attribution: Attribution) -> u32 {
        let at = self.offset(row, col);
        self.counts[at] += 1;
        self.authors[at].push(attribution);
        self.counts[at]
    }

    pub(crate) fn count_at(&self, row: ValueId, col: ValueId) -> u32 {
        self.counts[self.offset(row, col)]
    }

    pub(crate) fn authors_at(&self, row: ValueId, col: ValueId) -> &[Attribution] {
        &self.authors[self.offset(row, col)]
    }

    /// Count for a cell by label. None when either label is outside the template.
    pub fn count(&self, row: &str, col: &str) -> Option<u32> {
        let (row, col) = (self.rows.id_of(row)?, self.cols.id_of(col)?);
        Some(self.count_at(row, col))
    }

    pub fn authors(&self, row: &str, col: &str) -> Option<&[Attribution]> {
        let (row, col) = (self.rows.id_of(row)?, self.cols.id_of(col)?);
        Some(self.authors_at(row, col))
    }

    pub fn rows(&self) -> &Domain {
        &self.rows
    }

    pub fn cols(&self) -> &Domain {
        &self.cols
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| u64::from(c)).sum()
    }

    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

// ============================================================================
// OCCURRENCE COUNTS
// ============================================================================

/// Per-label counts in first-seen order. Grows lazily as labels are observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCounts(SmallVec<[(String, u32); 4]>);

impl OccurrenceCounts {
    pub fn bump(&mut self, label: &str) {
        match self.0.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, count)) => *count += 1,
            None => self.0.push((label.to_string(), 1)),
        }
    }

    pub fn get(&self, label: &str) -> u32 {
        self.0
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for OccurrenceCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}
