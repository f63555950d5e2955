//! Tests for workbook catalog discovery and selection expansion.

use std::path::PathBuf;

use tablec_model::{Catalog, RawSheet, SheetGrid, SheetKind, Workbook};

fn sheet(name: &str, tag: &str, option: &str) -> RawSheet {
    RawSheet {
        name: name.to_string(),
        grid: SheetGrid::from_text(&[
            vec!["", ""],
            vec![tag, "id"],
            vec![option, "key,int"],
            vec!["", "data"],
        ]),
    }
}

fn workbook(name: &str, sheets: Vec<RawSheet>) -> Workbook {
    Workbook {
        name: name.to_string(),
        path: PathBuf::from("design").join(name),
        sheets,
    }
}

fn sample_catalog() -> Catalog {
    Catalog::from_workbooks(&[
        workbook("Item.xlsx", vec![sheet("item", "#data", "")]),
        workbook("TypeA.xlsx", vec![sheet("type_a", "#type", "")]),
        workbook("TypeB.xlsx", vec![sheet("type_b", "#type", "nocode")]),
        workbook("Text.xlsx", vec![sheet("ui_text", "#localtext", "")]),
        workbook("Stage1.xlsx", vec![sheet("stage_1", "#merge", "stage,stage_id,2")]),
        workbook("Stage2.xlsx", vec![sheet("stage_2", "#merge", "stage,stage_id,2")]),
        workbook(
            "Notes.xlsx",
            vec![RawSheet {
                name: "notes".to_string(),
                grid: SheetGrid::from_text(&[vec!["just text"]]),
            }],
        ),
    ])
}

#[test]
fn classifies_workbooks_by_table_sheets() {
    let catalog = sample_catalog();
    assert_eq!(catalog.len(), 7);
    assert_eq!(
        catalog.entry("TypeB.xlsx").and_then(|entry| entry.kind),
        Some(SheetKind::Type)
    );
    assert_eq!(catalog.entry("Notes.xlsx").and_then(|entry| entry.kind), None);
    assert_eq!(catalog.workbook_of_sheet("stage_2"), Some("Stage2.xlsx"));
    assert_eq!(
        catalog.workbooks_in_group("stage"),
        vec!["Stage1.xlsx", "Stage2.xlsx"]
    );
    assert!(catalog.merge_group_names().contains("stage"));
}

#[test]
fn data_sheet_does_not_reclassify_type_workbook() {
    let catalog = Catalog::from_workbooks(&[workbook(
        "Mixed.xlsx",
        vec![sheet("grade", "#type", ""), sheet("grade_data", "#data", "")],
    )]);
    let entry = catalog.entry("Mixed.xlsx").expect("entry");
    assert_eq!(entry.kind, Some(SheetKind::Type));
    assert_eq!(entry.tables, vec!["grade", "grade_data"]);
}

#[test]
fn selection_expands_to_related_workbooks() {
    let catalog = sample_catalog();
    let expanded = catalog.expand_selection(&[
        "TypeA.xlsx".to_string(),
        "Stage2.xlsx".to_string(),
        "Missing.xlsx".to_string(),
    ]);
    assert_eq!(
        expanded,
        vec!["TypeA.xlsx", "TypeB.xlsx", "Stage1.xlsx", "Stage2.xlsx"]
    );
}
