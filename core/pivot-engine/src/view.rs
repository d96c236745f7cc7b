//! FILENAME: core/pivot-engine/src/view.rs
//! Pivot View - Chart-ready output for the frontend.
//!
//! Formatting turns a computed pivot into ordered `{key, values}` groups.
//! Every `ChartSet` carries the maximum over the values it holds, so the
//! renderer can scale axes without another pass.

use serde::Serialize;

use crate::cache::{Attribution, CrossTab, OccurrenceCounts};
use crate::definition::{CategoryFamily, ChartLayout, ColorTable};
use crate::engine::{BubblePivot, CategoryPivot};
use crate::error::PivotError;

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// One bar or bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartValue {
    pub label: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Attribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<&'static str>,
}

impl ChartValue {
    /// A value with no attribution, color or property.
    pub fn plain(label: impl Into<String>, value: u64) -> Self {
        ChartValue {
            label: label.into(),
            value,
            authors: Vec::new(),
            color: None,
            property: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartGroup {
    pub key: String,
    pub values: Vec<ChartValue>,
}

/// Groups of one chart plus the largest value among them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ChartSet {
    pub groups: Vec<ChartGroup>,
    pub max: u64,
}

impl ChartSet {
    pub fn from_groups(groups: Vec<ChartGroup>) -> Self {
        let max = groups
            .iter()
            .flat_map(|group| group.values.iter().map(|v| v.value))
            .max()
            .unwrap_or(0);
        ChartSet { groups, max }
    }

    pub fn group(&self, key: &str) -> Option<&ChartGroup> {
        self.groups.iter().find(|group| group.key == key)
    }
}

/// Every chart of the category dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCharts {
    pub tasks: ChartSet,
    pub data_types: ChartSet,
    pub evaluation: ChartSet,
    pub paradigms: ChartSet,
    pub evaluators: ChartSet,
    /// Task names in declared order, for the chart legend.
    pub groups: Vec<String>,
    pub totals: Vec<ChartValue>,
    pub sub_domains: Vec<String>,
}

impl CategoryCharts {
    pub fn family(&self, family: CategoryFamily) -> &ChartSet {
        match family {
            CategoryFamily::Tasks => &self.tasks,
            CategoryFamily::DataTypes => &self.data_types,
            CategoryFamily::Evaluation => &self.evaluation,
            CategoryFamily::Paradigms => &self.paradigms,
            CategoryFamily::EvaluatorsByYear => &self.evaluators,
        }
    }
}

/// One populated bubble with its drill-down data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleCell {
    pub y: String,
    pub x: String,
    pub value: u64,
    pub authors: Vec<Attribution>,
    pub sub_domains: OccurrenceCounts,
}

/// Bubble chart output: groups for rendering plus per-cell drill-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BubbleChart {
    pub chart: ChartSet,
    pub x_domain: Vec<String>,
    pub y_domain: Vec<String>,
    pub pairings: Vec<BubbleCell>,
    pub max: u64,
}

// ============================================================================
// CATEGORY FORMATTING
// ============================================================================

/// Formats one family.
///
/// Domain-keyed families follow `layout`. The evaluator family always yields
/// one group per evaluator with one value per year.
pub fn format_family(
    pivot: &CategoryPivot,
    family: CategoryFamily,
    colors: &ColorTable,
    layout: ChartLayout,
) -> Result<ChartSet, PivotError> {
    let table = pivot.table(family);
    let groups = if family.is_domain_keyed() {
        let color = colors.family_color(family)?;
        let style = |value: &mut ChartValue| {
            value.color = Some(color.to_string());
            value.property = Some(family.property());
        };
        match layout {
            ChartLayout::CategoryMajor => row_groups(table, style),
            ChartLayout::SubDomainMajor => column_groups(table, style),
        }
    } else {
        let mut groups = Vec::with_capacity(table.cols().len());
        for (col, evaluator) in table.cols().iter() {
            let color = colors.evaluator_color(col as usize)?;
            let values = table
                .rows()
                .iter()
                .map(|(row, year)| ChartValue {
                    color: Some(color.to_string()),
                    property: Some(family.property()),
                    ..cell_value(table, row, col, year)
                })
                .collect();
            groups.push(ChartGroup {
                key: evaluator.to_string(),
                values,
            });
        }
        groups
    };

    Ok(ChartSet::from_groups(groups))
}

/// One group per row, one value per column.
fn row_groups(table: &CrossTab, style: impl Fn(&mut ChartValue)) -> Vec<ChartGroup> {
    table
        .rows()
        .iter()
        .map(|(row, key)| ChartGroup {
            key: key.to_string(),
            values: table
                .cols()
                .iter()
                .map(|(col, label)| {
                    let mut value = cell_value(table, row, col, label);
                    style(&mut value);
                    value
                })
                .collect(),
        })
        .collect()
}

/// One group per column, one value per row.
fn column_groups(table: &CrossTab, style: impl Fn(&mut ChartValue)) -> Vec<ChartGroup> {
    table
        .cols()
        .iter()
        .map(|(col, key)| ChartGroup {
            key: key.to_string(),
            values: table
                .rows()
                .iter()
                .map(|(row, label)| {
                    let mut value = cell_value(table, row, col, label);
                    style(&mut value);
                    value
                })
                .collect(),
        })
        .collect()
}

fn cell_value(table: &CrossTab, row: u32, col: u32, label: &str) -> ChartValue {
    ChartValue {
        authors: table.authors_at(row, col).to_vec(),
        ..ChartValue::plain(label, u64::from(table.count_at(row, col)))
    }
}

/// Formats all five families plus the task legend and sub-domain totals.
pub fn format_category_charts(
    pivot: &CategoryPivot,
    colors: &ColorTable,
    layout: ChartLayout,
) -> Result<CategoryCharts, PivotError> {
    let charts = CategoryCharts {
        tasks: format_family(pivot, CategoryFamily::Tasks, colors, layout)?,
        data_types: format_family(pivot, CategoryFamily::DataTypes, colors, layout)?,
        evaluation: format_family(pivot, CategoryFamily::Evaluation, colors, layout)?,
        paradigms: format_family(pivot, CategoryFamily::Paradigms, colors, layout)?,
        evaluators: format_family(pivot, CategoryFamily::EvaluatorsByYear, colors, layout)?,
        groups: pivot.table(CategoryFamily::Tasks).rows().labels().to_vec(),
        totals: pivot
            .totals()
            .map(|(label, total)| ChartValue::plain(label, u64::from(total)))
            .collect(),
        sub_domains: pivot.sub_domains().labels().to_vec(),
    };
    log::debug!(
        target: "PIVOT",
        "format_category_charts: layout {:?}, task max {}",
        layout,
        charts.tasks.max
    );
    Ok(charts)
}

// ============================================================================
// BUBBLE FORMATTING
// ============================================================================

/// One group per y label (sorted case-sensitively), one `{label, value}` per x label.
pub fn format_bubble(pivot: &BubblePivot) -> ChartSet {
    let table = pivot.cells();
    let mut rows: Vec<(u32, &str)> = table.rows().iter().collect();
    rows.sort_by(|a, b| a.1.cmp(b.1));

    let groups = rows
        .into_iter()
        .map(|(row, key)| ChartGroup {
            key: key.to_string(),
            values: table
                .cols()
                .iter()
                .map(|(col, label)| ChartValue::plain(label, u64::from(table.count_at(row, col))))
                .collect(),
        })
        .collect();
    ChartSet::from_groups(groups)
}

/// Formats a bubble pivot together with drill-down data for every populated cell.
pub fn bubble_chart(pivot: &BubblePivot) -> BubbleChart {
    let chart = format_bubble(pivot);
    let table = pivot.cells();

    let mut pairings = Vec::new();
    for group in &chart.groups {
        let Some(row) = table.rows().id_of(&group.key) else {
            continue;
        };
        for (col, x) in table.cols().iter() {
            let count = table.count_at(row, col);
            if count == 0 {
                continue;
            }
            pairings.push(BubbleCell {
                y: group.key.clone(),
                x: x.to_string(),
                value: u64::from(count),
                authors: table.authors_at(row, col).to_vec(),
                sub_domains: pivot.sub_domain_counts_at(row, col).cloned().unwrap_or_default(),
            });
        }
    }

    BubbleChart {
        max: chart.max,
        x_domain: pivot.x_domain().labels().to_vec(),
        y_domain: pivot.y_domain().labels().to_vec(),
        pairings,
        chart,
    }
}
