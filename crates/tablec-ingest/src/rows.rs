//! Row ingestion: reads data rows against a compiled schema.

use std::collections::HashSet;

use tablec_model::text::split_protected;
use tablec_model::{
    ArraySizeIndex, CellValue, Column, DataType, Diagnostic, DiagnosticCode, ReferenceIndex,
    Schema, SheetGrid, SheetTable,
};

use crate::header::FIRST_DATA_ROW;
use crate::numeric::{check_value, normalize_number, type_error_message};

/// Everything one sheet contributes after its rows are read.
#[derive(Debug, Default)]
pub struct RowIngest {
    pub table: SheetTable,
    pub diagnostics: Vec<Diagnostic>,
    pub array_sizes: ArraySizeIndex,
    pub origins: ReferenceIndex,
}

/// Reads every data row of `grid`.
///
/// Rows with an empty key are skipped. A repeated key is reported once per
/// repetition and the later row is dropped. Value-only tables keep their
/// first data row and stop.
pub fn ingest_rows(schema: &Schema, grid: &SheetGrid) -> RowIngest {
    let mut out = RowIngest::default();
    let value_only = schema.is_value_only();
    let key_col = schema.key_column().map_or(0, |column| column.grid_column);
    let mut seen_keys = HashSet::new();

    for row in FIRST_DATA_ROW..grid.row_count() {
        let key = grid.cell(row, key_col).render();
        if !value_only {
            if key.is_empty() {
                continue;
            }
            if !seen_keys.insert(key.clone()) {
                let label = schema.key_column().map_or("", |column| column.title.as_str());
                out.diagnostics.push(Diagnostic::at(
                    DiagnosticCode::DuplicateKey,
                    &schema.origin,
                    label,
                    row,
                    key_col,
                    format!("duplicate key ({key})"),
                ));
                continue;
            }
        }

        let mut cells = Vec::with_capacity(schema.columns.len());
        for (slot, column) in schema.columns.iter().enumerate() {
            let mut cell = CellIngest {
                schema,
                column,
                slot,
                row,
                out: &mut out,
            };
            cells.push(cell.ingest(grid.cell(row, column.grid_column)));
        }

        for (slot, column) in schema.columns.iter().enumerate() {
            if let Some(origin) = &column.origin {
                let linked = column.change.map_or("", |source| cells[source].as_str());
                out.origins.record(origin, &cells[slot], linked);
            }
        }
        out.table.push(row, cells);

        if value_only {
            break;
        }
    }
    out
}

struct CellIngest<'a> {
    schema: &'a Schema,
    column: &'a Column,
    slot: usize,
    row: usize,
    out: &'a mut RowIngest,
}

impl CellIngest<'_> {
    fn ingest(&mut self, cell: &CellValue) -> String {
        let column = self.column;
        let data_type = column.data_type.unwrap_or(DataType::String);
        let mut value = match cell {
            CellValue::Number(number) if data_type.is_numeric() && !column.is_array => {
                normalize_number(*number)
            }
            other => other.render(),
        };

        if value.eq_ignore_ascii_case("null") {
            if column.null_allowed {
                value.clear();
            } else {
                self.report(
                    DiagnosticCode::NullNotAllowed,
                    "null is not allowed in this column".to_string(),
                );
            }
        }
        if value.contains(['\r', '\n']) {
            self.report(
                DiagnosticCode::NewlineInText,
                "text contains a line break".to_string(),
            );
        }

        let elements = if value.is_empty() {
            Vec::new()
        } else if column.is_array {
            split_protected(&value, ',')
        } else {
            vec![value.clone()]
        };

        if !value.is_empty() && (column.prefix.is_some() || column.suffix.is_some()) {
            value = decorate(&elements, column);
        }

        let checked = if column.is_array {
            elements
                .iter()
                .map(|element| check_value(data_type, element))
                .find(Result::is_err)
                .unwrap_or(Ok(()))
        } else {
            check_value(data_type, &value)
        };

        if column.is_array {
            if let Some(declared) = &column.array_size
                && !elements.is_empty()
                && elements.len().to_string() != *declared
            {
                self.report(
                    DiagnosticCode::ArraySizeMismatch,
                    format!("expected {declared} elements ({value})"),
                );
            }
            if column.records_length() {
                self.out
                    .array_sizes
                    .record(&self.schema.name, self.slot, self.row, elements.len());
            }
        }
        if column.tracks_count {
            let count = value.parse::<usize>().unwrap_or(0);
            self.out
                .array_sizes
                .record(&self.schema.name, self.slot, self.row, count);
        }

        if let Err(code) = checked {
            self.report(code, type_error_message(code, &value));
        }

        if data_type == DataType::Bool
            && (value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false"))
        {
            value.make_ascii_lowercase();
        }
        value
    }

    fn report(&mut self, code: DiagnosticCode, message: String) {
        self.out.diagnostics.push(Diagnostic::at(
            code,
            &self.schema.origin,
            self.column.title.as_str(),
            self.row,
            self.column.grid_column,
            message,
        ));
    }
}

/// Wraps every non-empty element in the column's prefix and suffix.
fn decorate(elements: &[String], column: &Column) -> String {
    let prefix = column.prefix.as_deref().unwrap_or("");
    let suffix = column.suffix.as_deref().unwrap_or("");
    elements
        .iter()
        .map(|element| {
            if element.is_empty() {
                String::new()
            } else {
                format!("{prefix}{element}{suffix}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
