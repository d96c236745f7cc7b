//! FILENAME: app/src/config.rs
//! Dashboard configuration, read from a JSON file.
//!
//! Every field has a default, so an empty object (or no file at all) yields the
//! survey's published taxonomy, the export's column headers and the three
//! encoding bubble charts of the dashboard.

use std::fs;
use std::path::Path;

use persistence::{AttributeFilter, ColumnMap};
use pivot_engine::{BubbleAxes, CategoryCatalog, ChartLayout, ColorTable, UnknownLabelPolicy};
use records::RecordField;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Family colors (Pastel1) followed by evaluator colors.
pub const DEFAULT_FAMILY_COLORS: [&str; 5] = ["#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6"];
pub const DEFAULT_EVALUATOR_COLORS: [&str; 2] = ["#fbb4ae", "#b3cde3"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub catalog: CategoryCatalog,
    pub colors: ColorTable,
    pub layout: ChartLayout,
    pub unknown_labels: UnknownLabelPolicy,
    pub columns: ColumnMap,
    /// Workbook sheet to read; the first sheet when absent.
    pub sheet: Option<String>,
    /// Sub-domains to chart, in order. Derived from the records when empty.
    pub sub_domains: Vec<String>,
    pub bubbles: Vec<BubbleConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            catalog: CategoryCatalog::default(),
            colors: ColorTable::new(
                DEFAULT_FAMILY_COLORS.map(String::from).to_vec(),
                DEFAULT_EVALUATOR_COLORS.map(String::from).to_vec(),
            ),
            layout: ChartLayout::default(),
            unknown_labels: UnknownLabelPolicy::default(),
            columns: ColumnMap::default(),
            sheet: None,
            sub_domains: Vec::new(),
            bubbles: vec![
                BubbleConfig::encodings("all", AttributeFilter::default()),
                BubbleConfig::encodings(
                    "natural-science",
                    AttributeFilter::default().with(RecordField::SubDomain, ["Natural Science"]),
                ),
                BubbleConfig::encodings(
                    "physical-science",
                    AttributeFilter::default().with(RecordField::SubDomain, ["Physical Science"]),
                ),
            ],
        }
    }
}

impl AppConfig {
    /// Loads a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let years = self.catalog.years;
        if years.first > years.last {
            return Err(AppError::Config(format!(
                "year range {}..={} is empty",
                years.first, years.last
            )));
        }
        let mut names: Vec<&str> = self.bubbles.iter().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(AppError::Config(format!("duplicate bubble chart '{}'", pair[0])));
        }
        Ok(())
    }
}

/// One bubble chart of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleConfig {
    pub name: String,
    /// Restricts the records that feed the chart.
    #[serde(default)]
    pub filter: AttributeFilter,
    /// Spatial against non-spatial encodings when absent.
    #[serde(default)]
    pub axes: Option<BubbleAxes>,
}

impl BubbleConfig {
    pub fn encodings(name: &str, filter: AttributeFilter) -> Self {
        BubbleConfig {
            name: name.to_string(),
            filter,
            axes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.bubbles.len(), 3);
        assert_eq!(config.bubbles[1].filter.domain, ["Natural Science"]);
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "layout": "subDomainMajor",
            "unknownLabels": "ignore",
            "bubbles": [{ "name": "tasks-by-type", "axes": {
                "xField": "dataTypes", "yField": "tasks",
                "xDomain": ["Table"], "yDomain": ["Discover"] } }]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.layout, ChartLayout::SubDomainMajor);
        assert_eq!(config.unknown_labels, UnknownLabelPolicy::Ignore);
        assert_eq!(config.bubbles.len(), 1);
        assert_eq!(config.bubbles[0].axes.as_ref().unwrap().x_field, RecordField::DataTypes);
        assert!(config.bubbles[0].filter.is_empty());
        assert_eq!(config.colors, AppConfig::default().colors);
    }

    #[test]
    fn test_duplicate_bubble_names_rejected() {
        let mut config = AppConfig::default();
        config.bubbles.push(BubbleConfig::encodings("all", AttributeFilter::default()));
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }
}
