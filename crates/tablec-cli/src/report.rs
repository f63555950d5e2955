//! Diagnostic report files.
//!
//! One row per diagnostic, in run order. The spreadsheet form links every
//! row back to the offending cell of the source workbook.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rust_xlsxwriter::{Color, Format, Workbook};
use serde::Serialize;
use tracing::info;

use tablec_model::Diagnostic;

/// Directory the default report lands in, relative to the working directory.
pub const REPORT_DIR: &str = "error";

const HEADERS: [&str; 8] = [
    "File",
    "Sheet",
    "Column Label",
    "Column",
    "Row",
    "Code",
    "Message",
    "Link",
];
const COLUMN_WIDTHS: [f64; 8] = [24.0, 20.0, 18.0, 8.0, 8.0, 30.0, 60.0, 10.0];
const HEADER_FILL: u32 = 0xE2EFDA;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" => Some(ReportFormat::Xlsx),
            "csv" => Some(ReportFormat::Csv),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// `error/ExportError_<YYYYmmdd_HHMMSS>.<ext>`
pub fn default_report_path(now: NaiveDateTime, format: ReportFormat) -> PathBuf {
    PathBuf::from(REPORT_DIR).join(format!(
        "ExportError_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    ))
}

/// A diagnostic flattened for the report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow<'a> {
    pub file: &'a str,
    pub sheet: &'a str,
    pub column_label: &'a str,
    pub column: String,
    pub row: usize,
    pub code: &'static str,
    pub message: &'a str,
    pub cell: String,
}

impl<'a> ReportRow<'a> {
    pub fn from_diagnostic(diagnostic: &'a Diagnostic) -> Self {
        let cell = diagnostic.cell_reference();
        let letters = cell.trim_end_matches(|c: char| c.is_ascii_digit()).to_string();
        Self {
            file: &diagnostic.file,
            sheet: &diagnostic.sheet,
            column_label: &diagnostic.column_label,
            column: letters,
            row: diagnostic.row,
            code: diagnostic.code.as_str(),
            message: &diagnostic.message,
            cell,
        }
    }
}

/// Excel formula jumping to the diagnostic's cell in its source workbook.
pub fn hyperlink_formula(diagnostic: &Diagnostic) -> String {
    let workbook = Path::new(&diagnostic.directory).join(&diagnostic.file);
    let cell = diagnostic.cell_reference();
    let target = format!(
        "[{}]'{}'!{}",
        workbook.display(),
        diagnostic.sheet.replace('\'', "''"),
        cell
    );
    format!("HYPERLINK(\"{}\",\"{}\")", target.replace('"', "\"\""), cell)
}

/// Writes every diagnostic to `path`, creating its directory.
pub fn write_report(diagnostics: &[Diagnostic], path: &Path, format: ReportFormat) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create report directory {}", parent.display()))?;
    }
    let written = match format {
        ReportFormat::Xlsx => write_xlsx(diagnostics, path),
        ReportFormat::Csv => write_csv(diagnostics, path),
        ReportFormat::Json => write_json(diagnostics, path),
    };
    written.with_context(|| format!("write report {}", path.display()))?;
    info!(path = %path.display(), rows = diagnostics.len(), format = format.extension(), "wrote diagnostic report");
    Ok(())
}

fn write_xlsx(diagnostics: &[Diagnostic], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("ExportError")?;

    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(HEADER_FILL));
    for (col, (title, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = u16::try_from(col)?;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (idx, diagnostic) in diagnostics.iter().enumerate() {
        let row = u32::try_from(idx + 1)?;
        let fields = ReportRow::from_diagnostic(diagnostic);
        sheet.write_string(row, 0, fields.file)?;
        sheet.write_string(row, 1, fields.sheet)?;
        sheet.write_string(row, 2, fields.column_label)?;
        sheet.write_string(row, 3, &fields.column)?;
        sheet.write_number(row, 4, fields.row as f64)?;
        sheet.write_string(row, 5, fields.code)?;
        sheet.write_string(row, 6, fields.message)?;
        sheet.write_formula(row, 7, hyperlink_formula(diagnostic).as_str())?;
    }
    workbook.save(path)?;
    Ok(())
}

fn write_csv(diagnostics: &[Diagnostic], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for diagnostic in diagnostics {
        writer.serialize(ReportRow::from_diagnostic(diagnostic))?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(diagnostics: &[Diagnostic], path: &Path) -> Result<()> {
    let rows: Vec<ReportRow<'_>> = diagnostics.iter().map(ReportRow::from_diagnostic).collect();
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &rows)?;
    Ok(())
}
