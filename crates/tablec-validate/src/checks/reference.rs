//! `check<table/field>` validity and value substitution.

use std::collections::BTreeSet;

use tablec_model::{DataType, DiagnosticCode, ReferenceIndex};

use super::CellOutcome;
use crate::engine::CellContext;

pub(crate) fn check(
    cell: &CellContext<'_>,
    references: &ReferenceIndex,
    changed: &BTreeSet<usize>,
    outcome: &mut CellOutcome,
) {
    let column = cell.column;
    let Some(target) = &column.check else {
        return;
    };
    let origin_name = target.origin_name();
    let Some(origin) = references.origin(&origin_name) else {
        outcome.report(
            DiagnosticCode::ReferenceOriginMissing,
            format!("referenced field does not exist ({origin_name})"),
        );
        return;
    };
    let substitutes = changed.contains(&cell.slot);

    if cell.elements.is_empty() {
        if substitutes {
            let blank = column.is_array || column.data_type == Some(DataType::LocalText);
            outcome.resolve(if blank { "" } else { "0" });
        }
        return;
    }

    // Zero means "no reference" for int and float columns.
    let zero_exempt = matches!(column.data_type, Some(DataType::Int | DataType::Float));
    let mut resolved = Vec::with_capacity(cell.elements.len());
    for element in &cell.elements {
        if zero_exempt && element == "0" {
            resolved.push(element.clone());
            continue;
        }
        match origin.resolve(element) {
            Some(value) => resolved.push(value.to_string()),
            None => outcome.report(
                DiagnosticCode::ReferenceValueNotFound,
                format!("referenced value not found ({element})"),
            ),
        }
    }
    if substitutes {
        outcome.resolve(resolved.join(","));
    }
}
