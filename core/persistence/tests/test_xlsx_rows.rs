//! FILENAME: tests/test_xlsx_rows.rs
//! Reading survey sheets written with rust_xlsxwriter.

use std::path::{Path, PathBuf};

use persistence::{load_survey_rows, ColumnMap, PersistenceError};
use records::{RawCell, Record, RecordField};
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

fn write_survey(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("survey.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Survey").unwrap();

    let headers = ["Paper", "Author", "Year", "SubDomain", "Tasks", "Encodings", "Evaluators", "Notes"];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    sheet.write_string(1, 0, "Flow Atlas").unwrap();
    sheet.write_string(1, 1, "Smith ").unwrap();
    sheet.write_number(1, 2, 2010.0).unwrap();
    sheet.write_string(1, 3, "Physical Science").unwrap();
    sheet.write_string(1, 4, "Discover, Browse").unwrap();
    sheet.write_string(1, 5, "Glyph,Color").unwrap();
    sheet.write_string(1, 6, "Domain Experts").unwrap();
    sheet.write_string(1, 7, "ignored").unwrap();

    // Row 2 left empty on purpose.

    sheet.write_string(3, 0, "Cell Maps").unwrap();
    sheet.write_string(3, 1, "Jones").unwrap();
    sheet.write_number(3, 2, 2014.0).unwrap();

    let other = workbook.add_worksheet();
    other.set_name("Notes").unwrap();
    other.write_string(0, 0, "Paper").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn load(path: &Path, sheet: Option<&str>) -> Result<Vec<Record>, PersistenceError> {
    let rows = load_survey_rows(path, sheet, &ColumnMap::default())?;
    Ok(rows.iter().map(Record::from_raw).collect())
}

#[test]
fn test_reads_first_sheet_and_maps_headers() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(&dir);

    let records = load(&path, None).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.title, "Flow Atlas");
    assert_eq!(first.author, "Smith");
    assert_eq!(first.year, "2010");
    assert_eq!(first.labels(RecordField::SubDomain), ["Physical Science"]);
    assert_eq!(first.labels(RecordField::Tasks), ["Discover", "Browse"]);
    assert_eq!(first.labels(RecordField::Encodings), ["Glyph", "Color"]);
    assert_eq!(first.evaluators.as_deref(), Some("Domain Experts"));

    assert_eq!(records[1].year, "2014");
    assert!(records[1].tasks.is_empty());
}

#[test]
fn test_numeric_year_arrives_as_number() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(&dir);

    let rows = load_survey_rows(&path, Some("Survey"), &ColumnMap::default()).unwrap();
    assert_eq!(rows[0].year, Some(RawCell::Number(2010.0)));
}

#[test]
fn test_missing_sheet_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(&dir);

    let err = load(&path, Some("Papers")).unwrap_err();
    assert!(matches!(err, PersistenceError::SheetNotFound(name) if name == "Papers"));
}

#[test]
fn test_header_only_sheet_yields_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(&dir);

    assert!(load(&path, Some("Notes")).unwrap().is_empty());
}

#[test]
fn test_custom_column_map() {
    let dir = TempDir::new().unwrap();
    let path = write_survey(&dir);

    let mut columns = ColumnMap::empty();
    columns.set(RecordField::Author, ["Notes"]);
    let rows = load_survey_rows(&path, None, &columns).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(Record::from_raw(&rows[0]).author, "ignored");
}
