//! Row ingestion tests: normalization, key handling and per-cell checks.

use std::collections::HashSet;

use tablec_ingest::{RowIngest, compile_schema, ingest_rows};
use tablec_model::{CellValue, DiagnosticCode, RawSheet, Schema, SheetGrid, SheetOrigin};

fn ingest(grid: SheetGrid) -> (Schema, RowIngest) {
    let sheet = RawSheet {
        name: "item".to_string(),
        grid,
    };
    let schema = compile_schema(
        &sheet,
        SheetOrigin::new("design", "Item.xlsx", "item"),
        &HashSet::new(),
    )
    .expect("table sheet");
    assert!(
        schema.diagnostics.is_empty(),
        "unexpected header problems: {:?}",
        schema.diagnostics
    );
    let rows = ingest_rows(&schema, &sheet.grid);
    (schema, rows)
}

fn cells(rows: &RowIngest) -> Vec<Vec<&str>> {
    rows.table
        .iter()
        .map(|row| row.cells.iter().map(String::as_str).collect())
        .collect()
}

fn located(rows: &RowIngest) -> Vec<(DiagnosticCode, String)> {
    rows.diagnostics
        .iter()
        .map(|d| (d.code, d.cell_reference()))
        .collect()
}

#[test]
fn numeric_cells_are_rounded_and_text_is_checked() {
    let mut grid = SheetGrid::from_text(&[
        vec!["", "", "", ""],
        vec!["#data", "id", "rate", "count"],
        vec!["", "key,int", "float", "int"],
        vec!["", "data", "data", "data"],
        vec!["", "1", "", "12.0"],
        vec!["", "2", "", ""],
    ]);
    grid.set(4, 2, CellValue::Number(1.234_567_891));
    grid.set(5, 2, CellValue::Number(0.1 + 0.2));
    grid.set(5, 3, CellValue::Number(4.0));

    let (_, rows) = ingest(grid);
    assert_eq!(
        cells(&rows),
        vec![vec!["1", "1.23456789", "12.0"], vec!["2", "0.3", "4"]]
    );
    assert_eq!(
        located(&rows),
        vec![(DiagnosticCode::IntValueError, "D5".to_string())]
    );
}

#[test]
fn empty_keys_are_skipped_and_duplicates_reported() {
    let grid = SheetGrid::from_text(&[
        vec!["", "", ""],
        vec!["#data", "id", "name"],
        vec!["", "key,int", "string"],
        vec!["", "data", "data"],
        vec!["", "1", "a"],
        vec!["", "", "b"],
        vec!["", "1", "c"],
        vec!["", "2", "d"],
    ]);
    let (_, rows) = ingest(grid);
    assert_eq!(cells(&rows), vec![vec!["1", "a"], vec!["2", "d"]]);
    assert_eq!(
        located(&rows),
        vec![(DiagnosticCode::DuplicateKey, "B7".to_string())]
    );
    assert_eq!(rows.table.rows[1].row, 7);
}

#[test]
fn value_only_tables_keep_the_first_row() {
    let grid = SheetGrid::from_text(&[
        vec!["", ""],
        vec!["#data", "max_level"],
        vec!["valueonly", "int"],
        vec!["", "data"],
        vec!["", "10"],
        vec!["", "20"],
    ]);
    let (_, rows) = ingest(grid);
    assert_eq!(cells(&rows), vec![vec!["10"]]);
    assert!(rows.diagnostics.is_empty());
}

#[test]
fn null_literals_and_line_breaks() {
    let grid = SheetGrid::from_text(&[
        vec!["", "", "", ""],
        vec!["#data", "id", "memo", "note"],
        vec!["", "key,int", "string,null", "string"],
        vec!["", "data", "data", "check"],
        vec!["", "1", "NULL", "null"],
        vec!["", "2", "a\nb", "x"],
    ]);
    let (_, rows) = ingest(grid);
    assert_eq!(
        cells(&rows),
        vec![vec!["1", "", "null"], vec!["2", "a\nb", "x"]]
    );
    assert_eq!(
        located(&rows),
        vec![
            (DiagnosticCode::NullNotAllowed, "D5".to_string()),
            (DiagnosticCode::NewlineInText, "C6".to_string()),
        ]
    );
}

#[test]
fn array_columns_decorate_count_and_check_elements() {
    let grid = SheetGrid::from_text(&[
        vec!["", "", "", "", "", ""],
        vec!["#data", "id", "icons[]", "nums[]", "cnt", "vals[]"],
        vec![
            "",
            "key,int",
            "string,prefix<ic_>,arraysize<2>",
            "int,arraysizeref<icons>",
            "int",
            "int,arraysizecnt<cnt>",
        ],
        vec!["", "data", "data", "data", "data", "data"],
        vec!["", "1", "a,,b", "1,x", "3", "1,2,3"],
    ]);
    let (_, rows) = ingest(grid);
    assert_eq!(
        cells(&rows),
        vec![vec!["1", "ic_a,,ic_b", "1,x", "3", "1,2,3"]]
    );
    assert_eq!(
        located(&rows),
        vec![
            (DiagnosticCode::ArraySizeMismatch, "C5".to_string()),
            (DiagnosticCode::IntValueError, "D5".to_string()),
        ]
    );
    assert_eq!(rows.array_sizes.get("item", 1, 4), Some(3));
    assert_eq!(rows.array_sizes.get("item", 2, 4), Some(2));
    assert_eq!(rows.array_sizes.get("item", 3, 4), Some(3));
    assert_eq!(rows.array_sizes.get("item", 4, 4), Some(3));
    assert_eq!(rows.array_sizes.len(), 4);
}

#[test]
fn booleans_are_lowercased() {
    let mut grid = SheetGrid::from_text(&[
        vec!["", "", ""],
        vec!["#data", "id", "flag"],
        vec!["", "key,int", "bool"],
        vec!["", "data", "data"],
        vec!["", "1", "TRUE"],
        vec!["", "2", "yes"],
        vec!["", "3", ""],
    ]);
    grid.set(6, 2, CellValue::Bool(false));
    let (_, rows) = ingest(grid);
    assert_eq!(
        cells(&rows),
        vec![vec!["1", "true"], vec!["2", "yes"], vec!["3", "false"]]
    );
    assert_eq!(
        located(&rows),
        vec![(DiagnosticCode::BoolValueError, "C6".to_string())]
    );
}

#[test]
fn origin_columns_feed_the_reference_index() {
    let grid = SheetGrid::from_text(&[
        vec!["", "", "", ""],
        vec!["#data", "id", "name", "label"],
        vec!["", "key,int", "string,origin,change<label>", "string"],
        vec!["", "data", "data", "check"],
        vec!["", "5", "sword", "SWORD_01"],
        vec!["", "6", "shield", ""],
    ]);
    let (schema, rows) = ingest(grid);
    assert_eq!(schema.column(1).origin.as_deref(), Some("item/name"));

    let ids = rows.origins.origin("item/id").expect("key origin");
    assert_eq!(ids.resolve("5"), Some("5"));
    let names = rows.origins.origin("item/name").expect("name origin");
    assert_eq!(names.resolve("sword"), Some("SWORD_01"));
    assert_eq!(names.resolve("shield"), Some("shield"));
    assert!(names.has_substitution());
}
