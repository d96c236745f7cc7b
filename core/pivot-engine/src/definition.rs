//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a survey pivot:
//! which category families exist, which labels each family may hold, how
//! charts are colored and laid out, and which fields a bubble chart crosses.
//! These structures are designed to be:
//! - Serializable (loaded from the host's configuration file)
//! - Immutable snapshots of caller intent (never mutated by a pivot pass)

use std::fmt;

use records::{Record, RecordField};
use serde::{Deserialize, Serialize};

use crate::error::PivotError;

/// Fixed inner keys of the evaluator-by-year family.
pub const DOMAIN_EXPERTS: &str = "Domain Experts";
pub const VISUALIZATION_EXPERTS: &str = "Visualization Experts";
pub const EVALUATORS: [&str; 2] = [DOMAIN_EXPERTS, VISUALIZATION_EXPERTS];

// ============================================================================
// CATEGORY FAMILIES
// ============================================================================

/// One of the fixed classification axes of the survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryFamily {
    Tasks,
    DataTypes,
    Evaluation,
    Paradigms,
    EvaluatorsByYear,
}

impl CategoryFamily {
    pub const ALL: [CategoryFamily; 5] = [
        CategoryFamily::Tasks,
        CategoryFamily::DataTypes,
        CategoryFamily::Evaluation,
        CategoryFamily::Paradigms,
        CategoryFamily::EvaluatorsByYear,
    ];

    /// Families cross-tabulated against sub-domains.
    pub const DOMAIN_KEYED: [CategoryFamily; 4] = [
        CategoryFamily::Tasks,
        CategoryFamily::DataTypes,
        CategoryFamily::Evaluation,
        CategoryFamily::Paradigms,
    ];

    /// Stable position, used to look up the family color.
    pub fn index(self) -> usize {
        match self {
            CategoryFamily::Tasks => 0,
            CategoryFamily::DataTypes => 1,
            CategoryFamily::Evaluation => 2,
            CategoryFamily::Paradigms => 3,
            CategoryFamily::EvaluatorsByYear => 4,
        }
    }

    /// Property name attached to formatted chart values.
    pub fn property(self) -> &'static str {
        match self {
            CategoryFamily::Tasks => "tasks",
            CategoryFamily::DataTypes => "dataTypes",
            CategoryFamily::Evaluation => "evaluation",
            CategoryFamily::Paradigms => "paradigms",
            CategoryFamily::EvaluatorsByYear => "evaluators",
        }
    }

    /// The record field whose labels feed this family.
    pub fn field(self) -> RecordField {
        match self {
            CategoryFamily::Tasks => RecordField::Tasks,
            CategoryFamily::DataTypes => RecordField::DataTypes,
            CategoryFamily::Evaluation => RecordField::Evaluation,
            CategoryFamily::Paradigms => RecordField::Paradigms,
            CategoryFamily::EvaluatorsByYear => RecordField::Evaluators,
        }
    }

    pub fn is_domain_keyed(self) -> bool {
        self != CategoryFamily::EvaluatorsByYear
    }
}

impl fmt::Display for CategoryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

// ============================================================================
// CATEGORY CATALOG
// ============================================================================

/// Inclusive range of survey years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub first: u16,
    pub last: u16,
}

impl YearRange {
    pub fn labels(&self) -> Vec<String> {
        (self.first..=self.last).map(|year| year.to_string()).collect()
    }
}

impl Default for YearRange {
    fn default() -> Self {
        YearRange {
            first: 2005,
            last: 2016,
        }
    }
}

/// The exhaustive label lists for every family.
/// Declared order is the order categories appear in charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryCatalog {
    pub tasks: Vec<String>,
    pub data_types: Vec<String>,
    pub evaluation: Vec<String>,
    pub paradigms: Vec<String>,
    pub years: YearRange,
}

impl CategoryCatalog {
    /// Row labels of a family's template: category names for the domain-keyed
    /// families, years for the evaluator family.
    pub fn labels(&self, family: CategoryFamily) -> Vec<String> {
        match family {
            CategoryFamily::Tasks => self.tasks.clone(),
            CategoryFamily::DataTypes => self.data_types.clone(),
            CategoryFamily::Evaluation => self.evaluation.clone(),
            CategoryFamily::Paradigms => self.paradigms.clone(),
            CategoryFamily::EvaluatorsByYear => self.years.labels(),
        }
    }
}

fn owned(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        CategoryCatalog {
            tasks: owned(&[
                "Discover", "Present", "Annotate", "Record", "Derive", "Browse", "Explore",
                "Lookup", "Locate", "Identify", "Compare", "Summarize",
            ]),
            data_types: owned(&["Table", "Network", "Field", "Geometry"]),
            evaluation: owned(&[
                "Case Study",
                "Quantitative Analysis",
                "Qualitative Analysis",
                "Feedback",
                "User Study",
            ]),
            paradigms: owned(&[
                "Overlays",
                "Linked Views",
                "Spatial Nesting",
                "Non-Spatial Nesting",
            ]),
            years: YearRange::default(),
        }
    }
}

/// What to do when a record carries a label the template does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum UnknownLabelPolicy {
    /// Reject the whole batch before counting (default).
    #[default]
    Reject,
    /// Skip the label and keep counting the rest of the record.
    Ignore,
}

// ============================================================================
// CHART OPTIONS
// ============================================================================

/// Caller-supplied colors. Nothing in this crate invents a color.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorTable {
    /// Indexed by `CategoryFamily::index()`.
    pub families: Vec<String>,
    /// Indexed by position in `EVALUATORS`.
    pub evaluators: Vec<String>,
}

impl ColorTable {
    pub fn new(families: Vec<String>, evaluators: Vec<String>) -> Self {
        ColorTable {
            families,
            evaluators,
        }
    }

    pub fn family_color(&self, family: CategoryFamily) -> Result<&str, PivotError> {
        self.families
            .get(family.index())
            .map(String::as_str)
            .ok_or(PivotError::MissingColor {
                table: "family",
                index: family.index(),
            })
    }

    pub fn evaluator_color(&self, position: usize) -> Result<&str, PivotError> {
        self.evaluators
            .get(position)
            .map(String::as_str)
            .ok_or(PivotError::MissingColor {
                table: "evaluator",
                index: position,
            })
    }
}

/// Orientation of the category/sub-domain charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChartLayout {
    /// One group per category, values per sub-domain.
    #[default]
    CategoryMajor,
    /// One group per sub-domain, values per category (stacked bars).
    SubDomainMajor,
}

// ============================================================================
// BUBBLE AXES
// ============================================================================

/// Spatial encodings: the y axis of the encoding bubble chart.
pub const SPATIAL_ENCODINGS: [&str; 8] = [
    "Simple Map",
    "Choropleth / Heatmap",
    "Ball and Stick / Mesh",
    "Isosurface / Streamlines",
    "Volume / Images",
    "Contour",
    "Glyph",
    "Animation",
];

/// The two record fields a bubble chart crosses, with their label domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleAxes {
    pub x_field: RecordField,
    pub y_field: RecordField,
    pub x_domain: Vec<String>,
    pub y_domain: Vec<String>,
}

impl BubbleAxes {
    pub fn new(
        x_field: RecordField,
        y_field: RecordField,
        x_domain: Vec<String>,
        y_domain: Vec<String>,
    ) -> Self {
        BubbleAxes {
            x_field,
            y_field,
            x_domain,
            y_domain,
        }
    }

    /// Spatial (y) against non-spatial (x) encodings.
    pub fn encodings(non_spatial: Vec<String>) -> Self {
        BubbleAxes {
            x_field: RecordField::Encodings,
            y_field: RecordField::Encodings,
            x_domain: non_spatial,
            y_domain: owned(&SPATIAL_ENCODINGS),
        }
    }

    /// Every encoding observed in the batch that is not spatial, first-seen order.
    pub fn non_spatial_encodings(records: &[Record]) -> Vec<String> {
        observed_labels(records, RecordField::Encodings)
            .into_iter()
            .filter(|label| !SPATIAL_ENCODINGS.contains(&label.as_str()))
            .collect()
    }
}

/// Distinct labels a field takes across the batch, first-seen order.
pub fn observed_labels(records: &[Record], field: RecordField) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for record in records {
        for label in record.labels(field) {
            if !seen.contains(label) {
                seen.push(label.clone());
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_matches_survey_taxonomy() {
        let catalog = CategoryCatalog::default();
        assert_eq!(catalog.tasks.len(), 12);
        assert_eq!(catalog.labels(CategoryFamily::DataTypes), ["Table", "Network", "Field", "Geometry"]);
        let years = catalog.labels(CategoryFamily::EvaluatorsByYear);
        assert_eq!(years.first().map(String::as_str), Some("2005"));
        assert_eq!(years.last().map(String::as_str), Some("2016"));
        assert_eq!(years.len(), 12);
    }

    #[test]
    fn family_indices_are_stable() {
        for (i, family) in CategoryFamily::ALL.iter().enumerate() {
            assert_eq!(family.index(), i);
        }
        assert!(!CategoryFamily::EvaluatorsByYear.is_domain_keyed());
    }

    #[test]
    fn color_lookup_never_invents() {
        let colors = ColorTable::new(vec!["#fbb4ae".into()], vec![]);
        assert_eq!(colors.family_color(CategoryFamily::Tasks), Ok("#fbb4ae"));
        assert_eq!(
            colors.family_color(CategoryFamily::DataTypes),
            Err(PivotError::MissingColor { table: "family", index: 1 })
        );
        assert!(colors.evaluator_color(0).is_err());
    }

    #[test]
    fn partial_catalog_config_falls_back_to_defaults() {
        let catalog: CategoryCatalog =
            serde_json::from_str(r#"{ "dataTypes": ["Table"], "years": { "first": 2010, "last": 2011 } }"#)
                .unwrap();
        assert_eq!(catalog.data_types, ["Table"]);
        assert_eq!(catalog.tasks, CategoryCatalog::default().tasks);
        assert_eq!(catalog.labels(CategoryFamily::EvaluatorsByYear), ["2010", "2011"]);
    }

    #[test]
    fn non_spatial_encodings_exclude_spatial_set() {
        let records = vec![
            Record::new("A", "2010").with(RecordField::Encodings, ["Glyph", "Table", "Color"]),
            Record::new("B", "2011").with(RecordField::Encodings, ["Table", "Contour", "Size"]),
        ];
        assert_eq!(BubbleAxes::non_spatial_encodings(&records), ["Table", "Color", "Size"]);
    }
}
