//! Run context shared by every stage of one compile run.
//!
//! The [`RunContext`] bundles the options, the discovered workbooks with
//! their catalog, and the expanded selection. It is built once and only
//! ever borrowed afterwards.

use tablec_model::{Catalog, CompilerOptions, Workbook};

/// Which workbooks a run compiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(Vec<String>),
}

#[derive(Debug)]
pub struct RunContext {
    pub options: CompilerOptions,
    pub workbooks: Vec<Workbook>,
    pub catalog: Catalog,
    /// Selected workbook names after expansion, in discovery order.
    pub selected: Vec<String>,
    /// Selected names that matched no workbook.
    pub unknown: Vec<String>,
    /// Validate everything but write nothing.
    pub dry_run: bool,
}

impl RunContext {
    pub fn new(options: CompilerOptions, workbooks: Vec<Workbook>, selection: &Selection) -> Self {
        let catalog = Catalog::from_workbooks(&workbooks);
        let (selected, unknown) = match selection {
            Selection::All => (
                catalog
                    .entries()
                    .iter()
                    .filter(|entry| entry.kind.is_some())
                    .map(|entry| entry.name.clone())
                    .collect(),
                Vec::new(),
            ),
            Selection::Named(names) => {
                let resolved: Vec<String> = names
                    .iter()
                    .filter_map(|name| resolve_name(&catalog, name))
                    .collect();
                let unknown = names
                    .iter()
                    .filter(|name| resolve_name(&catalog, name).is_none())
                    .cloned()
                    .collect();
                (catalog.expand_selection(&resolved), unknown)
            }
        };
        Self {
            options,
            workbooks,
            catalog,
            selected,
            unknown,
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn workbook_index(&self, name: &str) -> Option<usize> {
        self.workbooks.iter().position(|workbook| workbook.name == name)
    }
}

/// A workbook file name, the same name without extension, or the name of
/// a table sheet.
fn resolve_name(catalog: &Catalog, name: &str) -> Option<String> {
    if catalog.entry(name).is_some() {
        return Some(name.to_string());
    }
    let by_stem = catalog.entries().iter().find(|entry| {
        entry
            .name
            .rsplit_once('.')
            .is_some_and(|(stem, _)| stem.eq_ignore_ascii_case(name))
    });
    if let Some(entry) = by_stem {
        return Some(entry.name.clone());
    }
    catalog.workbook_of_sheet(name).map(str::to_string)
}
