use tablec_model::{DataType, DiagnosticCode, LocalizationRegistry};

use super::CellOutcome;
use crate::engine::CellContext;

/// Every localtext element must name a known localization key.
pub(crate) fn check(
    cell: &CellContext<'_>,
    localization: &LocalizationRegistry,
    outcome: &mut CellOutcome,
) {
    if cell.column.data_type != Some(DataType::LocalText) {
        return;
    }
    for key in &cell.elements {
        if !localization.contains_key(key) {
            outcome.report(
                DiagnosticCode::UnknownLocalTextKey,
                format!("unknown localization key ({key})"),
            );
        }
    }
}
