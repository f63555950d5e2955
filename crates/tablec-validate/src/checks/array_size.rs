use tablec_model::{ArraySizeIndex, DiagnosticCode};

use super::CellOutcome;
use crate::engine::CellContext;

/// Compares the recorded size of this cell with the one of its
/// `arraysizeref`/`arraysizecnt` column in the same row.
pub(crate) fn check(cell: &CellContext<'_>, sizes: &ArraySizeIndex, outcome: &mut CellOutcome) {
    let Some(source) = cell.column.array_size_ref else {
        return;
    };
    let own = sizes.get(cell.table, cell.slot, cell.row.row);
    let referenced = sizes.get(cell.table, source, cell.row.row);
    match (own, referenced) {
        (None, _) => outcome.report(
            DiagnosticCode::ArraySizeMissing,
            "no array size was recorded for this cell",
        ),
        (Some(_), None) => outcome.report(
            DiagnosticCode::ArraySizeRefMissing,
            format!(
                "no array size was recorded for {}",
                cell.schema.column(source).title
            ),
        ),
        (Some(own), Some(referenced)) if own != referenced => outcome.report(
            DiagnosticCode::ArraySizeRefMismatch,
            format!("array sizes differ ({own} != {referenced})"),
        ),
        _ => {}
    }
}
