//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for survey-pivot integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use app_lib::AppConfig;
use records::{Record, RecordField};
use serde_json::json;
use tempfile::TempDir;

/// Temporary working directory with helpers for input and store files.
pub struct TestHarness {
    pub dir: TempDir,
    pub config: AppConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        TestHarness {
            dir: TempDir::new().unwrap(),
            config: AppConfig::default(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Writes the survey fixture as a JSON export with sheet-style headers.
    pub fn write_rows(&self, name: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, SurveyFixture::rows().to_string()).unwrap();
        path
    }
}

/// A small survey with multi-valued fields and a few malformed cells.
pub struct SurveyFixture;

impl SurveyFixture {
    pub fn rows() -> serde_json::Value {
        json!([
            {
                "Paper": "Flow Atlas", "Author": "Smith", "Year": 2010,
                "SubDomain": "Physical Science",
                "Tasks": "Discover, Browse", "Data Types": "Field",
                "Encodings": "Glyph, Color", "Paradigm": "Linked Views",
                "Evaluators": "Domain Experts", "Evaluation Type": "Case Study"
            },
            {
                "Paper": "Gene Maps", "Author": "Jones ", "Year": "2012",
                "SubDomain": ["Natural Science", ""],
                "Tasks": ["Compare", "Discover"], "Data Types": "Table, Network",
                "Encodings": "Contour, Table",
                "Evaluators": "Visualization Experts"
            },
            {
                "Paper": "Reef Survey", "Author": "Lee", "Year": 2014,
                "SubDomain": "Natural Science, Physical Science",
                "Tasks": "Summarize", "Data Types": "Geometry",
                "Encodings": "Simple Map, Color, Size",
                "Evaluators": null
            },
            {
                "Paper": "Untitled Draft", "Author": "Nobody", "Year": "",
                "Tasks": true, "Encodings": 3
            }
        ])
    }

    pub fn records() -> Vec<Record> {
        let rows: Vec<records::RawRecord> = serde_json::from_value(Self::rows()).unwrap();
        rows.iter().map(Record::from_raw).collect()
    }

    pub fn titled(title: &str, domain: &str, encodings: &[&str]) -> Record {
        let mut record = Record::new("Author", "2011")
            .with(RecordField::SubDomain, [domain])
            .with(RecordField::Encodings, encodings);
        record.title = title.to_string();
        record
    }
}
