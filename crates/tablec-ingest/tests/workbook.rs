//! Reads real workbook files written with rust_xlsxwriter.

use std::collections::HashSet;
use std::path::Path;

use rust_xlsxwriter::{Workbook as XlsxWorkbook, XlsxError};
use tablec_ingest::{ingest_workbook, load_workbooks, read_workbook};
use tablec_model::{CellValue, SheetKind};
use tempfile::TempDir;

fn write_item_workbook(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = XlsxWorkbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("item")?;
    sheet.write_string(0, 0, "item/")?;
    for (col, title) in ["id", "name", "power"].iter().enumerate() {
        let col = col as u16 + 1;
        sheet.write_string(1, col, *title)?;
        sheet.write_string(3, col, "data")?;
    }
    sheet.write_string(1, 0, "#data")?;
    sheet.write_string(2, 1, "key,int")?;
    sheet.write_string(2, 2, "string")?;
    sheet.write_string(2, 3, "float")?;
    sheet.write_number(4, 1, 1.0)?;
    sheet.write_string(4, 2, "sword")?;
    sheet.write_number(4, 3, 2.500_000_001)?;
    sheet.write_number(5, 1, 2.0)?;
    sheet.write_string(5, 2, "shield")?;
    sheet.write_number(5, 3, 3.0)?;

    let notes = workbook.add_worksheet();
    notes.set_name("notes")?;
    notes.write_string(2, 2, "offset")?;

    workbook.save(path)?;
    Ok(())
}

#[test]
fn reads_sheets_anchored_at_a1() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("Item.xlsx");
    write_item_workbook(&path).expect("write workbook");

    let workbook = read_workbook(&path).expect("read workbook");
    assert_eq!(workbook.name, "Item.xlsx");
    let names: Vec<&str> = workbook.sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["item", "notes"]);

    let item = &workbook.sheets[0].grid;
    assert_eq!(SheetKind::detect(item), Some(SheetKind::Data));
    assert_eq!(item.cell(4, 1), &CellValue::Number(1.0));

    let notes = &workbook.sheets[1].grid;
    assert_eq!(notes.text(2, 2).as_deref(), Some("offset"));
    assert_eq!(SheetKind::detect(notes), None);
}

#[test]
fn ingests_every_table_sheet_of_a_workbook() {
    let dir = TempDir::new().expect("temp dir");
    write_item_workbook(&dir.path().join("Item.xlsx")).expect("write workbook");

    let workbooks = load_workbooks(dir.path()).expect("load workbooks");
    assert_eq!(workbooks.len(), 1);

    let sheets = ingest_workbook(&workbooks[0], &HashSet::new());
    assert_eq!(sheets.len(), 1);
    let item = &sheets[0];
    assert_eq!(item.name(), "item");
    assert_eq!(item.schema.subfolder, "item/");
    assert_eq!(item.schema.origin.file, "Item.xlsx");
    assert!(item.diagnostics.is_empty(), "{:?}", item.diagnostics);

    let rows: Vec<Vec<&str>> = item
        .table
        .iter()
        .map(|row| row.cells.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(rows, vec![vec!["1", "sword", "2.5"], vec!["2", "shield", "3"]]);
}
