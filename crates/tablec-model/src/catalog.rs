//! Discovered workbooks and the lookups used to expand a selection.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::cell::Workbook;
use crate::kind::SheetKind;

/// What the compiler knows about one workbook before ingesting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Workbook file name.
    pub name: String,
    /// Dominant table kind, `None` when the workbook holds no table sheet.
    pub kind: Option<SheetKind>,
    /// Table sheet names in workbook order.
    pub tables: Vec<String>,
    pub merge_group: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    by_name: HashMap<String, usize>,
    sheet_owner: HashMap<String, usize>,
    merge_groups: BTreeMap<String, Vec<usize>>,
}

impl Catalog {
    pub fn from_workbooks(workbooks: &[Workbook]) -> Self {
        let mut catalog = Self::default();
        for workbook in workbooks {
            let mut entry = CatalogEntry {
                name: workbook.name.clone(),
                kind: None,
                tables: Vec::new(),
                merge_group: None,
            };
            for sheet in &workbook.sheets {
                let Some(kind) = SheetKind::detect(&sheet.grid) else {
                    continue;
                };
                // A data sheet never reclassifies a workbook already known
                // to hold type, text or merge sheets.
                if kind != SheetKind::Data || entry.kind.is_none() {
                    entry.kind = Some(kind);
                }
                if kind == SheetKind::Merge
                    && let Some(group) = sheet
                        .grid
                        .text(2, 0)
                        .and_then(|text| merge_group_name(&text))
                {
                    entry.merge_group = Some(group);
                }
                entry.tables.push(sheet.name.clone());
            }
            catalog.push(entry);
        }
        catalog
    }

    fn push(&mut self, entry: CatalogEntry) {
        let idx = self.entries.len();
        for table in &entry.tables {
            self.sheet_owner.entry(table.clone()).or_insert(idx);
        }
        if let Some(group) = &entry.merge_group {
            self.merge_groups.entry(group.clone()).or_default().push(idx);
        }
        self.by_name.insert(entry.name.clone(), idx);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.by_name.get(name).map(|&idx| &self.entries[idx])
    }

    /// Workbook holding the named table sheet.
    pub fn workbook_of_sheet(&self, sheet: &str) -> Option<&str> {
        self.sheet_owner
            .get(sheet)
            .map(|&idx| self.entries[idx].name.as_str())
    }

    pub fn merge_group_names(&self) -> HashSet<String> {
        self.merge_groups.keys().cloned().collect()
    }

    pub fn workbooks_in_group(&self, group: &str) -> Vec<&str> {
        self.merge_groups
            .get(group)
            .map(|members| {
                members
                    .iter()
                    .map(|&idx| self.entries[idx].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn workbooks_of_kind(&self, kind: SheetKind) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == Some(kind))
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Completes a selection: any type workbook brings every type workbook,
    /// likewise for localization, and a merge workbook brings its whole
    /// group. Unknown names are dropped; catalog order is preserved.
    pub fn expand_selection(&self, selected: &[String]) -> Vec<String> {
        let mut chosen: HashSet<&str> = HashSet::new();
        for name in selected {
            let Some(entry) = self.entry(name) else {
                continue;
            };
            chosen.insert(entry.name.as_str());
            match entry.kind {
                Some(SheetKind::Type) => chosen.extend(self.workbooks_of_kind(SheetKind::Type)),
                Some(SheetKind::LocalText) => {
                    chosen.extend(self.workbooks_of_kind(SheetKind::LocalText));
                }
                Some(SheetKind::Merge) => {
                    if let Some(group) = &entry.merge_group {
                        chosen.extend(self.workbooks_in_group(group));
                    }
                }
                Some(SheetKind::Data) | None => {}
            }
        }
        self.entries
            .iter()
            .filter(|entry| chosen.contains(entry.name.as_str()))
            .map(|entry| entry.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First element of a merge tuple cell.
pub fn merge_group_name(text: &str) -> Option<String> {
    let name = text.split(',').next()?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
