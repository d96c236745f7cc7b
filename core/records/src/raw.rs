//! FILENAME: core/records/src/raw.rs
//! PURPOSE: Loosely typed survey rows as they arrive from sheets and JSON exports.
//! CONTEXT: Nothing here is validated. `Record::from_raw` is the only consumer and
//! performs all trimming, splitting and blank filtering.

use serde::{Deserialize, Serialize};

use crate::field::RecordField;

/// A single cell of a raw row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Text(String),
    Number(f64),
    Boolean(bool),
    List(Vec<RawCell>),
}

impl RawCell {
    pub fn text(s: impl Into<String>) -> Self {
        RawCell::Text(s.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RawCell::List(items.into_iter().map(|s| RawCell::Text(s.into())).collect())
    }

    /// Renders the cell as one trimmed, non-blank value.
    /// Lists yield their first usable entry.
    pub fn scalar(&self) -> Option<String> {
        match self {
            RawCell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            RawCell::Number(n) => format_number(*n),
            RawCell::Boolean(b) => Some(b.to_string()),
            RawCell::List(items) => items.iter().find_map(RawCell::scalar),
        }
    }

    /// Collects every label held by the cell, untrimmed and possibly blank.
    /// Text cells are comma-separated lists; list entries are taken whole.
    pub fn pieces(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_pieces(&mut out, true);
        out
    }

    fn collect_pieces(&self, out: &mut Vec<String>, split_text: bool) {
        match self {
            RawCell::Text(s) if split_text => out.extend(s.split(',').map(str::to_string)),
            RawCell::Text(s) => out.push(s.clone()),
            RawCell::Number(n) => out.extend(format_number(*n)),
            // Check-box columns carry no label.
            RawCell::Boolean(_) => {}
            RawCell::List(items) => {
                for item in items {
                    item.collect_pieces(out, false);
                }
            }
        }
    }
}

/// Integral numbers print without a fractional part (`2010.0` -> `"2010"`).
fn format_number(n: f64) -> Option<String> {
    if !n.is_finite() {
        return None;
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Some(format!("{}", n as i64))
    } else {
        Some(n.to_string())
    }
}

/// A raw survey row. Field aliases accept the column headers of the survey export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(alias = "Paper")]
    pub title: Option<RawCell>,
    #[serde(alias = "Author")]
    pub author: Option<RawCell>,
    #[serde(alias = "Year")]
    pub year: Option<RawCell>,
    #[serde(alias = "SubDomain", alias = "Sub-Domain", alias = "domain")]
    pub sub_domain: Option<RawCell>,
    #[serde(alias = "Tasks")]
    pub tasks: Option<RawCell>,
    #[serde(alias = "Data Types")]
    pub data_types: Option<RawCell>,
    #[serde(alias = "Evaluation Type")]
    pub evaluation: Option<RawCell>,
    #[serde(alias = "Paradigm")]
    pub paradigms: Option<RawCell>,
    #[serde(alias = "Encodings")]
    pub encodings: Option<RawCell>,
    #[serde(alias = "Evaluators")]
    pub evaluators: Option<RawCell>,
    #[serde(alias = "Single/Mixed Expertise")]
    pub expertise: Option<RawCell>,
    #[serde(alias = "URL")]
    pub url: Option<RawCell>,
}

impl RawRecord {
    pub fn get(&self, field: RecordField) -> Option<&RawCell> {
        match field {
            RecordField::Title => self.title.as_ref(),
            RecordField::Author => self.author.as_ref(),
            RecordField::Year => self.year.as_ref(),
            RecordField::SubDomain => self.sub_domain.as_ref(),
            RecordField::Tasks => self.tasks.as_ref(),
            RecordField::DataTypes => self.data_types.as_ref(),
            RecordField::Evaluation => self.evaluation.as_ref(),
            RecordField::Paradigms => self.paradigms.as_ref(),
            RecordField::Encodings => self.encodings.as_ref(),
            RecordField::Evaluators => self.evaluators.as_ref(),
            RecordField::Expertise => self.expertise.as_ref(),
            RecordField::Url => self.url.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, field: RecordField) -> &mut Option<RawCell> {
        match field {
            RecordField::Title => &mut self.title,
            RecordField::Author => &mut self.author,
            RecordField::Year => &mut self.year,
            RecordField::SubDomain => &mut self.sub_domain,
            RecordField::Tasks => &mut self.tasks,
            RecordField::DataTypes => &mut self.data_types,
            RecordField::Evaluation => &mut self.evaluation,
            RecordField::Paradigms => &mut self.paradigms,
            RecordField::Encodings => &mut self.encodings,
            RecordField::Evaluators => &mut self.evaluators,
            RecordField::Expertise => &mut self.expertise,
            RecordField::Url => &mut self.url,
        }
    }

    /// Builder-style setter, mostly for fixtures.
    pub fn with(mut self, field: RecordField, cell: RawCell) -> Self {
        *self.slot_mut(field) = Some(cell);
        self
    }
}
