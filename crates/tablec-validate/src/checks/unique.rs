use std::collections::HashSet;

use tablec_model::DiagnosticCode;

use super::CellOutcome;
use crate::engine::CellContext;

/// A unique column must not repeat a value within the table.
pub(crate) fn check(
    cell: &CellContext<'_>,
    seen: &mut HashSet<(usize, String)>,
    outcome: &mut CellOutcome,
) {
    if !cell.column.is_unique || cell.value == "null" {
        return;
    }
    if !seen.insert((cell.slot, cell.value.to_string())) {
        outcome.report(
            DiagnosticCode::DuplicateUniqueValue,
            format!("duplicate value ({})", cell.value),
        );
    }
}
