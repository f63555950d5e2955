//! Cell-level checks of the validation pass.
//!
//! Each module inspects one concern of a single cell and records findings
//! on the shared [`CellOutcome`].

mod array_size;
pub(crate) mod change;
mod enums;
mod localtext;
mod reference;
mod unique;

use std::collections::{BTreeSet, HashSet};

use tablec_model::DiagnosticCode;

use crate::engine::{CellContext, ValidationContext};

/// Findings and the output substitution for one cell.
#[derive(Debug, Default)]
pub(crate) struct CellOutcome {
    pub findings: Vec<(DiagnosticCode, String)>,
    /// Last value written wins.
    pub resolved: Option<String>,
}

impl CellOutcome {
    pub fn report(&mut self, code: DiagnosticCode, message: impl Into<String>) {
        self.findings.push((code, message.into()));
    }

    pub fn resolve(&mut self, value: impl Into<String>) {
        self.resolved = Some(value.into());
    }
}

/// Run every check on one cell, in a fixed order.
pub(crate) fn run_all(
    cell: &CellContext<'_>,
    ctx: ValidationContext<'_>,
    changed: &BTreeSet<usize>,
    seen_unique: &mut HashSet<(usize, String)>,
    outcome: &mut CellOutcome,
) {
    // 1. Unique values per column
    unique::check(cell, seen_unique, outcome);

    // 2. Enumeration text to value
    enums::check(cell, ctx.enums, outcome);

    // 3. Localization keys exist
    localtext::check(cell, ctx.localization, outcome);

    // 4. Array sizes agree with the referenced column
    array_size::check(cell, ctx.array_sizes, outcome);

    // 5. Referenced values exist in their origin
    reference::check(cell, ctx.references, changed, outcome);
}
