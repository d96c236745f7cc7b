//! FILENAME: core/records/src/record.rs
//! PURPOSE: The normalized survey record (one paper).
//! CONTEXT: Every label inside a `Record` is trimmed and non-blank, and a multi-valued
//! field never repeats a label. Downstream code relies on this and does no cleanup.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::field::RecordField;
use crate::raw::{RawCell, RawRecord};

/// Ordered set of labels, in first-seen order.
pub type LabelSet = SmallVec<[String; 4]>;

/// One surveyed paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    pub title: String,
    pub author: String,
    pub year: String,
    pub sub_domain: LabelSet,
    pub tasks: LabelSet,
    pub data_types: LabelSet,
    pub evaluation: LabelSet,
    pub paradigms: LabelSet,
    pub encodings: LabelSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluators: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expertise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Record {
    pub fn new(author: &str, year: &str) -> Self {
        Record {
            author: author.trim().to_string(),
            year: year.trim().to_string(),
            ..Record::default()
        }
    }

    /// Normalizes a raw row. Missing or unusable cells become empty values;
    /// this never fails.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let mut record = Record::default();
        for field in RecordField::ALL {
            if let Some(cell) = raw.get(field) {
                record.assign(field, cell);
            }
        }
        record
    }

    fn assign(&mut self, field: RecordField, cell: &RawCell) {
        if field.is_multi_valued() {
            for piece in cell.pieces() {
                self.push_label(field, &piece);
            }
        } else {
            self.set_scalar(field, cell.scalar());
        }
    }

    fn set_scalar(&mut self, field: RecordField, value: Option<String>) {
        match field {
            RecordField::Title => self.title = value.unwrap_or_default(),
            RecordField::Author => self.author = value.unwrap_or_default(),
            RecordField::Year => self.year = value.unwrap_or_default(),
            RecordField::Evaluators => self.evaluators = value,
            RecordField::Expertise => self.expertise = value,
            RecordField::Url => self.url = value,
            _ => {}
        }
    }

    /// Adds a label to a multi-valued field. Blank and repeated labels are dropped.
    /// For single-valued fields the label replaces the current value.
    pub fn push_label(&mut self, field: RecordField, label: &str) {
        let label = label.trim();
        if label.is_empty() {
            return;
        }
        let set = match field {
            RecordField::SubDomain => &mut self.sub_domain,
            RecordField::Tasks => &mut self.tasks,
            RecordField::DataTypes => &mut self.data_types,
            RecordField::Evaluation => &mut self.evaluation,
            RecordField::Paradigms => &mut self.paradigms,
            RecordField::Encodings => &mut self.encodings,
            _ => {
                self.set_scalar(field, Some(label.to_string()));
                return;
            }
        };
        if !set.iter().any(|existing| existing == label) {
            set.push(label.to_string());
        }
    }

    /// Builder-style variant of [`Record::push_label`] for a batch of labels.
    pub fn with<I, S>(mut self, field: RecordField, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for label in labels {
            self.push_label(field, label.as_ref());
        }
        self
    }

    /// The labels a field holds. Single-valued fields yield zero or one label.
    pub fn labels(&self, field: RecordField) -> &[String] {
        match field {
            RecordField::SubDomain => self.sub_domain.as_slice(),
            RecordField::Tasks => self.tasks.as_slice(),
            RecordField::DataTypes => self.data_types.as_slice(),
            RecordField::Evaluation => self.evaluation.as_slice(),
            RecordField::Paradigms => self.paradigms.as_slice(),
            RecordField::Encodings => self.encodings.as_slice(),
            RecordField::Title => non_blank(&self.title),
            RecordField::Author => non_blank(&self.author),
            RecordField::Year => non_blank(&self.year),
            RecordField::Evaluators => self.evaluators.as_slice(),
            RecordField::Expertise => self.expertise.as_slice(),
            RecordField::Url => self.url.as_slice(),
        }
    }

    /// True when the field holds at least one of `values` (exact match).
    pub fn has_any(&self, field: RecordField, values: &[String]) -> bool {
        self.labels(field).iter().any(|label| values.contains(label))
    }
}

fn non_blank(value: &String) -> &[String] {
    if value.is_empty() {
        &[]
    } else {
        std::slice::from_ref(value)
    }
}
