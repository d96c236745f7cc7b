// FILENAME: core\persistence\src\xlsx_reader.rs

use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use records::{RawCell, RawRecord, RecordField};
use serde::{Deserialize, Serialize};

use crate::PersistenceError;

/// Maps record fields to the header names that may carry them.
/// Header matching is case-insensitive and ignores surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMap(BTreeMap<RecordField, Vec<String>>);

impl ColumnMap {
    pub fn empty() -> Self {
        ColumnMap(BTreeMap::new())
    }

    pub fn headers(&self, field: RecordField) -> &[String] {
        self.0.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set<I, S>(&mut self, field: RecordField, headers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.insert(field, headers.into_iter().map(Into::into).collect());
    }

    /// Column position of each mapped field present in `header_row`.
    pub fn resolve(&self, header_row: &[String]) -> Vec<(usize, RecordField)> {
        let mut columns = Vec::new();
        for (&field, names) in &self.0 {
            let position = header_row.iter().position(|header| {
                names
                    .iter()
                    .any(|name| header.trim().eq_ignore_ascii_case(name.trim()))
            });
            match position {
                Some(col) => columns.push((col, field)),
                None => log::debug!(target: "XLSX", "no column for field {}", field),
            }
        }
        columns.sort();
        columns
    }
}

impl Default for ColumnMap {
    /// Headers of the survey export.
    fn default() -> Self {
        let mut map = ColumnMap::empty();
        map.set(RecordField::Title, ["Paper", "Title"]);
        map.set(RecordField::Author, ["Author"]);
        map.set(RecordField::Year, ["Year"]);
        map.set(RecordField::SubDomain, ["SubDomain", "Sub-Domain", "Domain"]);
        map.set(RecordField::Tasks, ["Tasks"]);
        map.set(RecordField::DataTypes, ["Data Types"]);
        map.set(RecordField::Evaluation, ["Evaluation Type", "Evaluation"]);
        map.set(RecordField::Paradigms, ["Paradigm", "Paradigms"]);
        map.set(RecordField::Encodings, ["Encodings"]);
        map.set(RecordField::Evaluators, ["Evaluators"]);
        map.set(RecordField::Expertise, ["Single/Mixed Expertise"]);
        map.set(RecordField::Url, ["URL"]);
        map
    }
}

/// Reads survey rows from an `.xlsx` sheet whose first row is the header.
/// Uses the first sheet when `sheet` is None. Fully empty rows are skipped.
pub fn load_survey_rows(
    path: &Path,
    sheet: Option<&str>,
    columns: &ColumnMap,
) -> Result<Vec<RawRecord>, PersistenceError> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_names = workbook.sheet_names().to_vec();

    if sheet_names.is_empty() {
        return Err(PersistenceError::InvalidFormat(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|candidate| candidate.as_str() == name)
            .cloned()
            .ok_or_else(|| PersistenceError::SheetNotFound(name.to_string()))?,
        None => sheet_names[0].clone(),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(header_text).collect(),
        None => {
            return Err(PersistenceError::InvalidFormat(format!(
                "Sheet '{}' has no header row",
                sheet_name
            )))
        }
    };
    let mapping = columns.resolve(&header);

    let mut records = Vec::new();
    for row in rows {
        let mut raw = RawRecord::default();
        let mut populated = false;
        for &(col, field) in &mapping {
            if let Some(cell) = row.get(col).and_then(to_raw_cell) {
                *raw.slot_mut(field) = Some(cell);
                populated = true;
            }
        }
        if populated {
            records.push(raw);
        }
    }

    log::info!(
        target: "XLSX",
        "loaded {} rows from '{}' ({} of {} fields mapped)",
        records.len(),
        sheet_name,
        mapping.len(),
        RecordField::ALL.len()
    );
    Ok(records)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn to_raw_cell(cell: &Data) -> Option<RawCell> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(RawCell::Text(s.clone())),
        Data::Float(f) => Some(RawCell::Number(*f)),
        Data::Int(i) => Some(RawCell::Number(*i as f64)),
        Data::Bool(b) => Some(RawCell::Boolean(*b)),
        Data::Error(_) => None,
        Data::DateTime(dt) => Some(RawCell::Number(dt.as_f64())),
        Data::DateTimeIso(s) => Some(RawCell::Text(s.clone())),
        Data::DurationIso(s) => Some(RawCell::Text(s.clone())),
    }
}
