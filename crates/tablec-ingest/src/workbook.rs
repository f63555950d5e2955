//! Workbook discovery and decoding.

use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::{debug, info};

use tablec_model::{CellValue, RawSheet, Result, SheetGrid, TablecError, Workbook};

/// Extensions recognized as workbooks, compared case-insensitively.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Lists workbook files directly under `dir`, sorted by file name.
///
/// Office lock files (`~$Book.xlsx`) are skipped.
pub fn list_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(TablecError::Message(format!(
            "input directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_lock_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("~$"));
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_workbook && !is_lock_file {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Reads every sheet of a workbook into rectangular grids.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let workbook_error = |message: String| TablecError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_vec();

    let mut sheets = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| workbook_error(format!("sheet {sheet_name}: {e}")))?;
        let grid = range_to_grid(&range);
        debug!(
            workbook = %path.display(),
            sheet = %sheet_name,
            rows = grid.row_count(),
            columns = grid.col_count(),
            "read sheet"
        );
        sheets.push(RawSheet {
            name: sheet_name.clone(),
            grid,
        });
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Workbook {
        name,
        path: path.to_path_buf(),
        sheets,
    })
}

/// Discovers and reads every workbook under `dir`.
pub fn load_workbooks(dir: &Path) -> Result<Vec<Workbook>> {
    let paths = list_workbooks(dir)?;
    let workbooks = paths
        .iter()
        .map(|path| read_workbook(path))
        .collect::<Result<Vec<_>>>()?;
    info!(
        directory = %dir.display(),
        workbooks = workbooks.len(),
        "loaded workbooks"
    );
    Ok(workbooks)
}

/// Anchors the used range at A1 so grid positions match the sheet.
fn range_to_grid(range: &Range<Data>) -> SheetGrid {
    let Some((start_row, start_col)) = range.start() else {
        return SheetGrid::default();
    };
    let mut rows = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(cell_value));
        rows.push(cells);
    }
    SheetGrid::new(rows)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) => CellValue::Text(text.clone()),
        Data::Float(value) => CellValue::Number(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::Error(error) => CellValue::Text(format!("{error:?}")),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => CellValue::Text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_workbooks_sorted_without_lock_files() {
        let dir = TempDir::new().expect("temp dir");
        for name in ["b_item.xlsx", "a_type.XLSX", "~$b_item.xlsx", "notes.txt", "c.ods"] {
            std::fs::write(dir.path().join(name), b"").expect("write file");
        }
        std::fs::create_dir(dir.path().join("nested.xlsx")).expect("create dir");

        let files = list_workbooks(dir.path()).expect("list workbooks");
        let names: Vec<String> = files
            .iter()
            .map(|path| path.file_name().expect("name").to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_type.XLSX", "b_item.xlsx", "c.ods"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("absent");
        assert!(list_workbooks(&missing).is_err());
    }

    #[test]
    fn calamine_values_map_to_cells() {
        assert_eq!(cell_value(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(cell_value(&Data::Bool(true)), CellValue::Bool(true));
        assert_eq!(
            cell_value(&Data::String("x".to_string())),
            CellValue::Text("x".to_string())
        );
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }
}
