//! Per-sheet ingestion unit handed to the worker pool.

use std::collections::HashSet;

use tablec_model::{
    ArraySizeIndex, Diagnostic, RawSheet, ReferenceIndex, Schema, SheetOrigin, SheetTable,
    Workbook,
};

use crate::header::compile_schema;
use crate::rows::ingest_rows;

/// Result of ingesting one table sheet.
#[derive(Debug)]
pub struct IngestedSheet {
    pub schema: Schema,
    pub table: SheetTable,
    /// Structural diagnostics, or cell diagnostics when the header was clean.
    pub diagnostics: Vec<Diagnostic>,
    pub array_sizes: ArraySizeIndex,
    pub origins: ReferenceIndex,
}

impl IngestedSheet {
    pub fn name(&self) -> &str {
        &self.schema.name
    }
}

/// Compiles the header and, if it is clean, reads the rows.
///
/// Returns `None` for sheets that carry no table tag.
pub fn ingest_sheet(
    sheet: &RawSheet,
    origin: SheetOrigin,
    merge_groups: &HashSet<String>,
) -> Option<IngestedSheet> {
    let schema = compile_schema(sheet, origin, merge_groups)?;
    if schema.has_structural_errors() {
        return Some(IngestedSheet {
            diagnostics: schema.diagnostics.clone(),
            schema,
            table: SheetTable::default(),
            array_sizes: ArraySizeIndex::new(),
            origins: ReferenceIndex::new(),
        });
    }
    let rows = ingest_rows(&schema, &sheet.grid);
    Some(IngestedSheet {
        schema,
        table: rows.table,
        diagnostics: rows.diagnostics,
        array_sizes: rows.array_sizes,
        origins: rows.origins,
    })
}

/// Where diagnostics for a sheet of `workbook` point.
pub fn sheet_origin(workbook: &Workbook, sheet: &str) -> SheetOrigin {
    let directory = workbook
        .path
        .parent()
        .map(|dir| dir.display().to_string())
        .unwrap_or_default();
    SheetOrigin::new(directory, workbook.name.as_str(), sheet)
}

/// Ingests every table sheet of a workbook in sheet order.
pub fn ingest_workbook(workbook: &Workbook, merge_groups: &HashSet<String>) -> Vec<IngestedSheet> {
    workbook
        .sheets
        .iter()
        .filter_map(|sheet| {
            ingest_sheet(sheet, sheet_origin(workbook, &sheet.name), merge_groups)
        })
        .collect()
}
