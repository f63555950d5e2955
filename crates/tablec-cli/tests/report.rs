//! Diagnostic report files written by `tablec build`.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use insta::assert_snapshot;
use tempfile::TempDir;

use tablec_cli::report::{
    ReportFormat, ReportRow, default_report_path, hyperlink_formula, write_report,
};
use tablec_model::{Diagnostic, DiagnosticCode, SheetOrigin};

fn diagnostics() -> Vec<Diagnostic> {
    let origin = SheetOrigin::new("design", "Item.xlsx", "item");
    vec![
        Diagnostic::at(
            DiagnosticCode::InvalidTypeText,
            &origin,
            "grade",
            5,
            2,
            "epic is not a text of GRADE",
        ),
        Diagnostic::at(DiagnosticCode::NoKeyField, &origin, "", 1, 0, "no key column"),
    ]
}

#[test]
fn default_path_is_timestamped() {
    let now = NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|date| date.and_hms_opt(14, 30, 5))
        .unwrap();
    let path = default_report_path(now, ReportFormat::Xlsx);
    assert_eq!(path, Path::new("error").join("ExportError_20261019_143005.xlsx"));
    let csv = default_report_path(now, ReportFormat::Csv);
    assert_eq!(csv.extension().and_then(|ext| ext.to_str()), Some("csv"));
}

#[test]
fn format_follows_the_extension() {
    assert_eq!(ReportFormat::from_path(Path::new("out/r.JSON")), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_path(Path::new("out/r.csv")), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_path(Path::new("out/r.txt")), None);
}

#[test]
fn rows_split_the_cell_reference() {
    let diagnostics = diagnostics();
    let row = ReportRow::from_diagnostic(&diagnostics[0]);
    assert_eq!(row.column, "C");
    assert_eq!(row.row, 6);
    assert_eq!(row.cell, "C6");
    assert_eq!(row.code, "INVALID_TYPE_TEXT");
}

#[test]
fn hyperlinks_point_at_the_source_cell() {
    let diagnostics = diagnostics();
    let formula = hyperlink_formula(&diagnostics[0]).replace('\\', "/");
    assert_snapshot!(formula, @r#"HYPERLINK("[design/Item.xlsx]'item'!C6","C6")"#);
}

#[test]
fn csv_report_has_one_row_per_diagnostic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("report.csv");
    write_report(&diagnostics(), &path, ReportFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[0], "file");
    assert_eq!(&headers[5], "code");
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][5], "NO_KEY_FIELD");
    assert_eq!(&rows[1][7], "A2");
}

#[test]
fn json_report_lists_rows_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.json");
    write_report(&diagnostics(), &path, ReportFormat::Json).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed[0]["cell"], "C6");
    assert_eq!(parsed[0]["column_label"], "grade");
    assert_eq!(parsed[1]["message"], "no key column");
}

#[test]
fn xlsx_report_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("error").join("ExportError.xlsx");
    write_report(&diagnostics(), &path, ReportFormat::Xlsx).unwrap();
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}
