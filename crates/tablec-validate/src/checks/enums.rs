//! Enumeration resolution.
//!
//! A static `type<GROUP>` or per-row `typeref<column>` group turns each
//! element's text into its numeric value. The group `NONE` stands for "no
//! enumeration" and only accepts the literal text `NONE`.

use tablec_model::{DiagnosticCode, EnumRegistry};

use super::CellOutcome;
use crate::engine::CellContext;

const NONE_GROUP: &str = "NONE";

pub(crate) fn check(cell: &CellContext<'_>, enums: &EnumRegistry, outcome: &mut CellOutcome) {
    let column = cell.column;
    let group = match (column.enum_group_ref, column.enum_group.as_deref()) {
        (Some(source), _) => cell.row.value(source).to_uppercase(),
        (None, Some(group)) => {
            if !enums.contains_group(group) {
                outcome.report(
                    DiagnosticCode::UndefinedTypeGroup,
                    format!("type group is not defined ({group})"),
                );
                return;
            }
            group.to_string()
        }
        (None, None) => return,
    };

    if group == NONE_GROUP {
        if column.is_array && cell.value.is_empty() {
            outcome.resolve("");
        } else if cell.value == NONE_GROUP {
            outcome.resolve("0");
        } else {
            outcome.report(
                DiagnosticCode::TypeNoneRequired,
                format!("value must be NONE when the type group is NONE ({})", cell.value),
            );
        }
        return;
    }

    if !enums.contains_group(&group) {
        outcome.report(
            DiagnosticCode::UndefinedTypeGroup,
            format!("type group is not defined ({group}/{})", cell.value),
        );
        return;
    }

    if cell.elements.is_empty() {
        if !column.is_array {
            outcome.report(DiagnosticCode::EmptyTypeValue, "type value is empty");
        }
        return;
    }

    let mut resolved = Vec::with_capacity(cell.elements.len());
    for element in &cell.elements {
        let text = element.to_uppercase();
        match enums.resolve(&group, &text) {
            Some(value) => resolved.push(value.to_string()),
            None => outcome.report(
                DiagnosticCode::InvalidTypeText,
                format!("unknown type text ({text})"),
            ),
        }
    }
    outcome.resolve(resolved.join(","));
}
