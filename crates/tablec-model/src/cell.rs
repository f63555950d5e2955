//! Raw sheet contents as handed over by the workbook reader.

use std::path::PathBuf;

/// A decoded spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// True for empty cells and zero-length text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.is_empty(),
            CellValue::Number(_) | CellValue::Bool(_) => false,
        }
    }

    /// Plain textual rendering, as a spreadsheet user would read the cell.
    pub fn render(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => render_number(*value),
            CellValue::Bool(value) => value.to_string(),
        }
    }
}

/// Renders a number without a fractional suffix when it is integral.
pub fn render_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        let text = format!("{value:.0}");
        if text == "-0" { "0".to_string() } else { text }
    } else {
        value.to_string()
    }
}

/// Rectangular grid of cells, indexed from zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl SheetGrid {
    /// Builds a grid, padding short rows with empty cells.
    pub fn new(mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Self { rows, width }
    }

    /// Builds a grid from text; empty strings become empty cells.
    pub fn from_text(rows: &[Vec<&str>]) -> Self {
        Self::new(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|text| {
                            if text.is_empty() {
                                CellValue::Empty
                            } else {
                                CellValue::Text((*text).to_string())
                            }
                        })
                        .collect()
                })
                .collect(),
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; out-of-range positions read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Rendered text of a non-blank cell.
    pub fn text(&self, row: usize, col: usize) -> Option<String> {
        let cell = self.cell(row, col);
        if cell.is_blank() {
            None
        } else {
            Some(cell.render())
        }
    }

    /// Overwrites a single cell, growing the grid when needed.
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if row >= self.rows.len() {
            self.rows.resize_with(row + 1, Vec::new);
        }
        if col >= self.width {
            self.width = col + 1;
        }
        for cells in &mut self.rows {
            cells.resize(self.width, CellValue::Empty);
        }
        self.rows[row][col] = value;
    }
}

/// One worksheet of a workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub name: String,
    pub grid: SheetGrid,
}

/// A loaded workbook file.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// File name including extension, used as the workbook identity.
    pub name: String,
    pub path: PathBuf,
    pub sheets: Vec<RawSheet>,
}
