//! FILENAME: core/records/src/field.rs
//! PURPOSE: Names every field of a survey record.
//! CONTEXT: Bubble axes, store indexes and sheet column maps all address record
//! fields through this enum instead of stringly-typed property names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A field of a survey record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    Title,
    Author,
    Year,
    #[serde(alias = "domain")]
    SubDomain,
    Tasks,
    DataTypes,
    Evaluation,
    Paradigms,
    Encodings,
    Evaluators,
    Expertise,
    Url,
}

impl RecordField {
    pub const ALL: [RecordField; 12] = [
        RecordField::Title,
        RecordField::Author,
        RecordField::Year,
        RecordField::SubDomain,
        RecordField::Tasks,
        RecordField::DataTypes,
        RecordField::Evaluation,
        RecordField::Paradigms,
        RecordField::Encodings,
        RecordField::Evaluators,
        RecordField::Expertise,
        RecordField::Url,
    ];

    /// Property name used in JSON exports (camelCase).
    pub fn name(self) -> &'static str {
        match self {
            RecordField::Title => "title",
            RecordField::Author => "author",
            RecordField::Year => "year",
            RecordField::SubDomain => "subDomain",
            RecordField::Tasks => "tasks",
            RecordField::DataTypes => "dataTypes",
            RecordField::Evaluation => "evaluation",
            RecordField::Paradigms => "paradigms",
            RecordField::Encodings => "encodings",
            RecordField::Evaluators => "evaluators",
            RecordField::Expertise => "expertise",
            RecordField::Url => "url",
        }
    }

    /// Whether the field holds a set of labels rather than a single value.
    pub fn is_multi_valued(self) -> bool {
        matches!(
            self,
            RecordField::SubDomain
                | RecordField::Tasks
                | RecordField::DataTypes
                | RecordField::Evaluation
                | RecordField::Paradigms
                | RecordField::Encodings
        )
    }

    /// Looks a field up by its property name. Case-insensitive; accepts `domain`
    /// as the store's historical name for the sub-domain column.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.eq_ignore_ascii_case("domain") {
            return Some(RecordField::SubDomain);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
