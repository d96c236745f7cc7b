//! FILENAME: app/src/pipeline.rs
//! Wires the loaders, the record store and the pivot engine together.

use std::path::Path;

use persistence::{
    load_json_rows, load_survey_rows, AttributeFilter, AttributeQuery, JsonFileStore, MemoryStore,
    RecordStore,
};
use pivot_engine::{
    aggregate, aggregate_pairs, bubble_chart, format_category_charts, BubbleAxes, BubbleChart,
    CategoryCharts, Domain,
};
use records::{RawRecord, Record};
use serde::Serialize;

use crate::config::{AppConfig, BubbleConfig};
use crate::error::AppError;
use crate::{log_enter_info, log_exit_info, log_info, log_warn};

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Xlsx,
}

impl InputFormat {
    pub fn detect(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(InputFormat::Json),
            Some("xlsx") => Ok(InputFormat::Xlsx),
            _ => Err(AppError::UnsupportedInput(path.display().to_string())),
        }
    }
}

/// Reads raw rows from a `.json` export or an `.xlsx` workbook.
pub fn load_raw_rows(path: &Path, config: &AppConfig) -> Result<Vec<RawRecord>, AppError> {
    let rows = match InputFormat::detect(path)? {
        InputFormat::Json => load_json_rows(path)?,
        InputFormat::Xlsx => load_survey_rows(path, config.sheet.as_deref(), &config.columns)?,
    };
    Ok(rows)
}

/// Reads and normalizes rows. Malformed cells become empty values.
pub fn load_records(path: &Path, config: &AppConfig) -> Result<Vec<Record>, AppError> {
    let rows = load_raw_rows(path, config)?;
    Ok(rows.iter().map(Record::from_raw).collect())
}

// ============================================================================
// DASHBOARD
// ============================================================================

/// A bubble chart together with the filter that selected its records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedBubble {
    pub name: String,
    pub filter: AttributeFilter,
    pub records: usize,
    #[serde(flatten)]
    pub chart: BubbleChart,
}

/// Everything the dashboard renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub generated_at: String,
    pub records: usize,
    pub categories: CategoryCharts,
    pub bubbles: Vec<NamedBubble>,
}

/// Runs every pivot of the dashboard over one batch.
pub fn build_dashboard(records: &[Record], config: &AppConfig) -> Result<Dashboard, AppError> {
    log_enter_info!("PIPELINE", "build_dashboard", "records={}", records.len());

    let sub_domains = if config.sub_domains.is_empty() {
        Domain::sub_domains_of(records)
    } else {
        Domain::new(&config.sub_domains)
    };
    let pivot = aggregate(records, &config.catalog, &sub_domains, config.unknown_labels)?;
    if pivot.skipped_labels() > 0 {
        log_warn!("PIPELINE", "{} unknown labels skipped", pivot.skipped_labels());
    }
    let categories = format_category_charts(&pivot, &config.colors, config.layout)?;

    let mut store = MemoryStore::new();
    store.put_batch(records)?;
    if store.len() < records.len() {
        log_warn!(
            "PIPELINE",
            "{} records share a title; bubble filters see the last of each",
            records.len() - store.len()
        );
    }

    let default_axes = BubbleAxes::encodings(BubbleAxes::non_spatial_encodings(records));
    let bubbles = config
        .bubbles
        .iter()
        .map(|bubble| build_bubble(&store, bubble, &default_axes))
        .collect::<Result<Vec<_>, _>>()?;

    log_exit_info!(
        "PIPELINE",
        "build_dashboard",
        "sub_domains={} bubbles={}",
        sub_domains.len(),
        bubbles.len()
    );
    Ok(Dashboard {
        generated_at: chrono::Local::now().to_rfc3339(),
        records: records.len(),
        categories,
        bubbles,
    })
}

fn build_bubble(
    store: &dyn RecordStore,
    bubble: &BubbleConfig,
    default_axes: &BubbleAxes,
) -> Result<NamedBubble, AppError> {
    let selected = store.query(&bubble.filter)?;
    let axes = bubble.axes.as_ref().unwrap_or(default_axes);
    let pivot = aggregate_pairs(&selected, axes);
    log_info!(
        "PIPELINE",
        "bubble '{}': {} records, max {}",
        bubble.name,
        selected.len(),
        pivot.max()
    );
    Ok(NamedBubble {
        name: bubble.name.clone(),
        filter: bubble.filter.clone(),
        records: selected.len(),
        chart: bubble_chart(&pivot),
    })
}

// ============================================================================
// STORE COMMANDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub existed: bool,
    pub written: usize,
    pub stored: usize,
}

/// Persists a batch. An existing store is only repopulated when `replace` is set.
pub fn import(records: &[Record], store_path: &Path, replace: bool) -> Result<ImportSummary, AppError> {
    log_enter_info!("PIPELINE", "import", "store={} replace={}", store_path.display(), replace);

    let mut store = JsonFileStore::open(store_path)?;
    let existed = store.existed();
    let written = if existed && !replace {
        log_info!("PIPELINE", "store exists, leaving {} records untouched", store.len());
        0
    } else {
        if existed {
            store.clear()?;
        }
        store.put_batch(records)?
    };

    let summary = ImportSummary {
        existed,
        written,
        stored: store.len(),
    };
    log_exit_info!("PIPELINE", "import", "written={} stored={}", summary.written, summary.stored);
    Ok(summary)
}

/// Filters the records of an existing store.
pub fn query(store_path: &Path, filter: &AttributeFilter) -> Result<Vec<Record>, AppError> {
    let store = open_existing(store_path)?;
    Ok(store.query(filter)?)
}

/// Runs a single-field comparison against an existing store.
pub fn query_attribute(store_path: &Path, query: &AttributeQuery) -> Result<Vec<Record>, AppError> {
    let store = open_existing(store_path)?;
    Ok(store.query_attribute(query)?)
}

fn open_existing(store_path: &Path) -> Result<JsonFileStore, AppError> {
    let store = JsonFileStore::open(store_path)?;
    if !store.existed() {
        log_warn!("PIPELINE", "store {} does not exist yet", store_path.display());
    }
    Ok(store)
}
