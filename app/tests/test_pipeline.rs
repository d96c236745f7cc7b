//! FILENAME: tests/test_pipeline.rs
//! Integration tests for loading rows and building the dashboard.

mod common;

use app_lib::{build_dashboard, load_records, AppConfig, AppError, BubbleConfig, InputFormat};
use common::{SurveyFixture, TestHarness};
use persistence::AttributeFilter;
use pivot_engine::{ChartLayout, UnknownLabelPolicy, DOMAIN_EXPERTS};
use records::RecordField;

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_json_rows_normalizes() {
    let harness = TestHarness::new();
    let path = harness.write_rows("rows.json");

    let records = load_records(&path, &harness.config).unwrap();
    assert_eq!(records.len(), 4);
    assert_eq!(records[1].author, "Jones");
    assert_eq!(records[1].labels(RecordField::SubDomain), ["Natural Science"]);
    assert_eq!(records[2].labels(RecordField::SubDomain), ["Natural Science", "Physical Science"]);
    assert!(records[3].tasks.is_empty());
    assert_eq!(records[3].year, "");
}

#[test]
fn test_unsupported_input_is_rejected() {
    let harness = TestHarness::new();
    let err = load_records(&harness.path("rows.csv"), &harness.config).unwrap_err();
    assert!(matches!(err, AppError::UnsupportedInput(_)));
    assert_eq!(InputFormat::detect(&harness.path("ROWS.XLSX")).unwrap(), InputFormat::Xlsx);
}

// ============================================================================
// DASHBOARD
// ============================================================================

#[test]
fn test_dashboard_category_charts() {
    let dashboard = build_dashboard(&SurveyFixture::records(), &AppConfig::default()).unwrap();
    let categories = &dashboard.categories;

    assert_eq!(dashboard.records, 4);
    assert_eq!(categories.sub_domains, ["Physical Science", "Natural Science"]);
    assert_eq!(categories.groups.len(), 12);

    let discover = categories.tasks.group("Discover").unwrap();
    assert_eq!(discover.values.len(), 2);
    assert!(discover.values.iter().all(|v| v.value == 1));
    assert_eq!(discover.values[0].authors[0].label, "Smith");
    assert_eq!(categories.tasks.max, 1);

    let summed: u64 = categories.tasks.groups.iter().flat_map(|g| &g.values).map(|v| v.value).sum();
    assert_eq!(summed, 6);

    let experts = categories.evaluators.group(DOMAIN_EXPERTS).unwrap();
    assert_eq!(experts.values.iter().map(|v| v.value).sum::<u64>(), 1);

    let totals: Vec<(&str, u64)> = categories.totals.iter().map(|t| (t.label.as_str(), t.value)).collect();
    assert_eq!(totals, [("Physical Science", 2), ("Natural Science", 2)]);
}

#[test]
fn test_dashboard_bubbles_follow_filters() {
    let dashboard = build_dashboard(&SurveyFixture::records(), &AppConfig::default()).unwrap();
    let names: Vec<&str> = dashboard.bubbles.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["all", "natural-science", "physical-science"]);

    let all = &dashboard.bubbles[0];
    assert_eq!(all.records, 4);
    assert_eq!(all.chart.x_domain, ["3", "Color", "Size", "Table"]);
    assert_eq!(all.chart.pairings.len(), 4);
    assert_eq!(all.chart.max, 1);

    let natural = &dashboard.bubbles[1];
    assert_eq!(natural.records, 2);
    assert_eq!(natural.chart.pairings.len(), 3);
    let contour = natural.chart.pairings.iter().find(|c| c.y == "Contour").unwrap();
    assert_eq!(contour.x, "Table");
    assert_eq!(contour.sub_domains.get("Natural Science"), 1);
}

#[test]
fn test_sub_domain_major_layout() {
    let config = AppConfig {
        layout: ChartLayout::SubDomainMajor,
        ..AppConfig::default()
    };
    let dashboard = build_dashboard(&SurveyFixture::records(), &config).unwrap();
    let tasks = &dashboard.categories.tasks;
    assert_eq!(tasks.groups.len(), 2);
    assert_eq!(tasks.groups[0].key, "Physical Science");
    assert_eq!(tasks.groups[0].values.len(), 12);
}

#[test]
fn test_unknown_label_policy() {
    let mut records = SurveyFixture::records();
    records[0].push_label(RecordField::Tasks, "Teleport");

    let err = build_dashboard(&records, &AppConfig::default()).unwrap_err();
    assert!(matches!(err, AppError::Pivot(_)));

    let config = AppConfig {
        unknown_labels: UnknownLabelPolicy::Ignore,
        ..AppConfig::default()
    };
    let dashboard = build_dashboard(&records, &config).unwrap();
    assert_eq!(dashboard.categories.tasks.group("Discover").unwrap().values[0].value, 1);
}

#[test]
fn test_custom_bubble_axes() {
    let config: AppConfig = serde_json::from_str(
        r#"{ "bubbles": [{ "name": "tasks-by-type",
             "filter": { "domain": ["Natural Science"] },
             "axes": { "xField": "dataTypes", "yField": "tasks",
                       "xDomain": ["Table", "Geometry"], "yDomain": ["Discover", "Summarize"] } }] }"#,
    )
    .unwrap();
    let dashboard = build_dashboard(&SurveyFixture::records(), &config).unwrap();

    let bubble = &dashboard.bubbles[0];
    assert_eq!(bubble.filter, AttributeFilter::default().with(RecordField::SubDomain, ["Natural Science"]));
    assert_eq!(bubble.chart.y_domain, ["Discover", "Summarize"]);
    let discover = bubble.chart.chart.group("Discover").unwrap();
    assert_eq!(discover.values[0].label, "Geometry");
    assert_eq!(discover.values[0].value, 0);
    assert_eq!(discover.values[1].value, 1);
}

#[test]
fn test_missing_colors_fail() {
    let mut config = AppConfig::default();
    config.colors.evaluators.clear();
    config.bubbles = vec![BubbleConfig::encodings("only", AttributeFilter::default())];

    let err = build_dashboard(&SurveyFixture::records(), &config).unwrap_err();
    assert!(err.to_string().contains("evaluator"));
}

#[test]
fn test_dashboard_serializes() {
    let dashboard = build_dashboard(&SurveyFixture::records(), &AppConfig::default()).unwrap();
    let json = serde_json::to_value(&dashboard).unwrap();

    assert_eq!(json["records"], 4);
    assert_eq!(json["categories"]["dataTypes"]["groups"][0]["key"], "Table");
    assert_eq!(json["bubbles"][0]["name"], "all");
    assert!(json["bubbles"][0]["pairings"].is_array());
    assert!(json["generatedAt"].is_string());
}
