//! Sequential fold of worker results into the run's global tables.
//!
//! Results are absorbed strictly in submission order. Every registry and
//! index keeps the first value it sees.

use std::collections::HashSet;

use tracing::debug;

use tablec_ingest::{IngestedSheet, register_enums, register_localization};
use tablec_model::{
    ArraySizeIndex, Diagnostic, DiagnosticCode, EnumRegistry, LocalizationRegistry, MergeTable,
    ReferenceIndex, Schema, SheetKind, SheetTable,
};

/// A non-merge table kept for validation and emission.
#[derive(Debug)]
pub struct LoadedTable {
    pub schema: Schema,
    pub table: SheetTable,
    /// Loaded only so other tables can reference it.
    pub reference_only: bool,
}

/// A merge-contributing sheet awaiting consolidation.
#[derive(Debug)]
pub struct PendingMergeSheet {
    pub sheet: IngestedSheet,
    pub reference_only: bool,
}

#[derive(Debug, Default)]
pub struct CompileState {
    pub tables: Vec<LoadedTable>,
    pub merge_sheets: Vec<PendingMergeSheet>,
    pub merges: Vec<MergeTable>,
    pub enums: EnumRegistry,
    pub localization: LocalizationRegistry,
    pub references: ReferenceIndex,
    pub array_sizes: ArraySizeIndex,
    pub diagnostics: Vec<Diagnostic>,
    table_names: HashSet<String>,
    loaded_workbooks: HashSet<String>,
}

impl CompileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_loaded(&mut self, workbook: &str) {
        self.loaded_workbooks.insert(workbook.to_string());
    }

    pub fn is_loaded(&self, workbook: &str) -> bool {
        self.loaded_workbooks.contains(workbook)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table_names.contains(name)
    }

    pub fn has_kind(&self, kind: SheetKind) -> bool {
        self.tables.iter().any(|table| table.schema.kind == kind)
    }

    pub fn has_merge_group(&self, group: &str) -> bool {
        self.merge_sheets.iter().any(|pending| {
            pending
                .sheet
                .schema
                .merge
                .as_ref()
                .is_some_and(|header| header.name == group)
        })
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Folds one ingested sheet into the run.
    ///
    /// A second table with an already-loaded name is reported and dropped.
    pub fn absorb(&mut self, sheet: IngestedSheet, reference_only: bool) {
        let name = sheet.name().to_string();
        if !self.table_names.insert(name.clone()) {
            self.diagnostics.push(Diagnostic::at(
                DiagnosticCode::DuplicateTableName,
                &sheet.schema.origin,
                "",
                0,
                0,
                format!("table {name} is already defined by another sheet"),
            ));
            return;
        }

        let IngestedSheet {
            schema,
            table,
            diagnostics,
            array_sizes,
            origins,
        } = sheet;
        self.diagnostics.extend(diagnostics);
        let clean_header = !schema.has_structural_errors();

        match schema.kind {
            SheetKind::Type if clean_header => {
                let found = register_enums(&schema, &table, &mut self.enums);
                self.diagnostics.extend(found);
            }
            SheetKind::LocalText if clean_header => {
                let found = register_localization(&schema, &table, &mut self.localization);
                self.diagnostics.extend(found);
            }
            SheetKind::Merge => {
                debug!(sheet = %name, rows = table.len(), "queued merge sheet");
                self.merge_sheets.push(PendingMergeSheet {
                    sheet: IngestedSheet {
                        schema,
                        table,
                        diagnostics: Vec::new(),
                        array_sizes,
                        origins,
                    },
                    reference_only,
                });
                return;
            }
            _ => {}
        }

        self.references.merge_from(origins);
        self.array_sizes.merge_from(array_sizes);
        debug!(sheet = %name, kind = schema.kind.tag(), rows = table.len(), reference_only, "loaded table");
        self.tables.push(LoadedTable {
            schema,
            table,
            reference_only,
        });
    }

    /// Merge groups in order of their first contributing sheet.
    pub fn merge_group_order(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.merge_sheets
            .iter()
            .filter_map(|pending| pending.sheet.schema.merge.as_ref())
            .filter(|header| seen.insert(header.name.clone()))
            .map(|header| header.name.clone())
            .collect()
    }

    /// Contributing sheets of one group, in discovery order.
    pub fn sheets_of_group(&self, group: &str) -> Vec<&PendingMergeSheet> {
        self.merge_sheets
            .iter()
            .filter(|pending| {
                pending
                    .sheet
                    .schema
                    .merge
                    .as_ref()
                    .is_some_and(|header| header.name == group)
            })
            .collect()
    }
}
