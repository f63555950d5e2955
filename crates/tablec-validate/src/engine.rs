use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use tablec_model::text::split_protected;
use tablec_model::{
    ArraySizeIndex, Column, Diagnostic, EnumRegistry, LocalizationRegistry, MergeTable,
    ReferenceIndex, Schema, SheetOrigin, SheetTable, TableRow, ValueOverlay,
};

use crate::checks::{self, CellOutcome};

/// Global registries every table is validated against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub enums: &'a EnumRegistry,
    pub localization: &'a LocalizationRegistry,
    pub references: &'a ReferenceIndex,
    pub array_sizes: &'a ArraySizeIndex,
}

/// One unit of validation work.
#[derive(Debug, Clone, Copy)]
pub enum ValidationTarget<'a> {
    /// A plain data table; diagnostics point at its own grid.
    Sheet {
        schema: &'a Schema,
        table: &'a SheetTable,
    },
    /// A consolidated merge table; diagnostics point at the source cell.
    Merge(&'a MergeTable),
}

impl<'a> ValidationTarget<'a> {
    pub fn schema(&self) -> &'a Schema {
        match *self {
            ValidationTarget::Sheet { schema, .. } => schema,
            ValidationTarget::Merge(merge) => &merge.schema,
        }
    }

    pub fn table(&self) -> &'a SheetTable {
        match *self {
            ValidationTarget::Sheet { table, .. } => table,
            ValidationTarget::Merge(merge) => &merge.table,
        }
    }

    /// Sheet origin and zero-based grid position of a cell.
    fn locate(&self, position: usize, row: &TableRow, slot: usize) -> (&'a SheetOrigin, usize, usize) {
        let fallback_col = self.schema().column(slot).grid_column;
        match *self {
            ValidationTarget::Sheet { schema, .. } => (&schema.origin, row.row, fallback_col),
            ValidationTarget::Merge(merge) => match merge.provenance_at(position, slot) {
                Some((origin, cell)) => (origin, cell.row, cell.column.unwrap_or(fallback_col)),
                None => (&merge.schema.origin, row.row, fallback_col),
            },
        }
    }
}

/// Diagnostics and output substitutions for one table.
#[derive(Debug, Clone, Default)]
pub struct TableValidation {
    pub table: String,
    pub diagnostics: Vec<Diagnostic>,
    pub overlay: ValueOverlay,
    /// Column slots whose output value comes from the overlay.
    pub changed: BTreeSet<usize>,
}

/// Validates every exported and checked cell of one table.
///
/// Per row the cell checks run in column order; change propagation runs
/// afterwards so a change column copies its source's resolved value.
pub fn validate_table(target: ValidationTarget<'_>, ctx: ValidationContext<'_>) -> TableValidation {
    let schema = target.schema();
    let table = target.table();
    let mut result = TableValidation {
        table: schema.name.clone(),
        changed: changed_columns(schema, ctx),
        ..TableValidation::default()
    };
    let mut seen_unique: HashSet<(usize, String)> = HashSet::new();

    for (position, row) in table.iter().enumerate() {
        for (slot, column) in schema.columns.iter().enumerate() {
            let value = row.value(slot);
            let cell = CellContext {
                table: &schema.name,
                schema,
                slot,
                column,
                row,
                value,
                elements: elements_of(column, value),
            };
            let mut outcome = CellOutcome::default();
            checks::run_all(&cell, ctx, &result.changed, &mut seen_unique, &mut outcome);

            if let Some(resolved) = outcome.resolved {
                result.overlay.set(&schema.name, row.row, slot, resolved);
            }
            if !outcome.findings.is_empty() {
                let (origin, grid_row, grid_col) = target.locate(position, row, slot);
                for (code, message) in outcome.findings {
                    result.diagnostics.push(Diagnostic::at(
                        code,
                        origin,
                        column.title.as_str(),
                        grid_row,
                        grid_col,
                        message,
                    ));
                }
            }
        }
        checks::change::propagate(schema, row, &mut result.overlay);
    }

    debug!(
        table = %schema.name,
        rows = table.len(),
        diagnostics = result.diagnostics.len(),
        overrides = result.overlay.len(),
        "validated table"
    );
    result
}

/// One cell under validation.
pub(crate) struct CellContext<'a> {
    pub table: &'a str,
    pub schema: &'a Schema,
    pub slot: usize,
    pub column: &'a Column,
    pub row: &'a TableRow,
    pub value: &'a str,
    /// Array elements, or the scalar value; empty for an empty cell.
    pub elements: Vec<String>,
}

fn elements_of(column: &Column, value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else if column.is_array {
        split_protected(value, ',')
    } else {
        vec![value.to_string()]
    }
}

/// Columns emitted from the overlay: enum columns with a usable group,
/// change columns, and reference columns whose origin substitutes values.
fn changed_columns(schema: &Schema, ctx: ValidationContext<'_>) -> BTreeSet<usize> {
    let mut changed = BTreeSet::new();
    for (slot, column) in schema.columns.iter().enumerate() {
        let enum_resolved = column.enum_group_ref.is_some()
            || column
                .enum_group
                .as_deref()
                .is_some_and(|group| ctx.enums.contains_group(group));
        let substituted = column.check.as_ref().is_some_and(|target| {
            ctx.references
                .origin(&target.origin_name())
                .is_some_and(|values| values.has_substitution())
        });
        if enum_resolved || column.change.is_some() || substituted {
            changed.insert(slot);
        }
    }
    changed
}
