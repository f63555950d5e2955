//! Merge engine: unifies every sheet of a merge group into one table.
//!
//! Structure unification walks the contributing sheets in discovery order
//! and allocates a merged column per new title; a title seen before must
//! agree on export mode, data type and enum group. Data unification then
//! numbers the merged rows from 1 and fills columns a sheet lacks with the
//! type's default value.

use std::collections::BTreeSet;

use tracing::debug;

use tablec_ingest::IngestedSheet;
use tablec_ingest::header::TITLE_ROW;
use tablec_ingest::origin_name;
use tablec_model::{
    ArraySizeIndex, CellProvenance, Column, Diagnostic, DiagnosticCode, MergeTable,
    ReferenceIndex, Schema, SheetKind, SheetTable,
};

/// A merge table with the side tables it contributes.
#[derive(Debug)]
pub struct MergeOutcome {
    pub merge: MergeTable,
    pub diagnostics: Vec<Diagnostic>,
    pub array_sizes: ArraySizeIndex,
    pub origins: ReferenceIndex,
}

/// Consolidates the sheets of one merge group.
///
/// `sheets` must be non-empty, in discovery order, and all carry a merge
/// header naming `group`. Returns `None` when `sheets` is empty.
pub fn merge_group(
    group: &str,
    sheets: &[&IngestedSheet],
    reference_only: bool,
) -> Option<MergeOutcome> {
    let first = sheets.first()?;
    let header = first.schema.merge.clone()?;

    let mut schema = Schema::new(first.schema.origin.clone(), SheetKind::Merge);
    schema.name = group.to_string();
    schema.merge = Some(header.clone());
    let mut diagnostics = Vec::new();

    // Per sheet, the merged slot of each of its columns.
    let mappings: Vec<Vec<usize>> = sheets
        .iter()
        .map(|sheet| unify_structure(&mut schema, group, sheet, &mut diagnostics))
        .collect();

    let mut merge = MergeTable {
        name: group.to_string(),
        group_field: header.group_field.clone(),
        shard_size: header.shard_size,
        sources: sheets.iter().map(|sheet| sheet.schema.origin.clone()).collect(),
        table: SheetTable::default(),
        provenance: Vec::new(),
        group_ids: BTreeSet::new(),
        shards: None,
        reference_only,
        schema,
    };
    let mut array_sizes = ArraySizeIndex::new();
    unify_data(&mut merge, sheets, &mappings, &mut array_sizes);
    let origins = index_origins(&merge);

    debug!(
        merge = group,
        sheets = sheets.len(),
        columns = merge.schema.columns.len(),
        rows = merge.table.len(),
        diagnostics = diagnostics.len(),
        "merged group"
    );
    Some(MergeOutcome {
        merge,
        diagnostics,
        array_sizes,
        origins,
    })
}

fn unify_structure(
    merged: &mut Schema,
    group: &str,
    sheet: &IngestedSheet,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<usize> {
    let source = &sheet.schema;
    let mut mapping = Vec::with_capacity(source.columns.len());
    // (source slot, merged slot, allocated by this sheet)
    let mut remaps = Vec::with_capacity(source.columns.len());

    for (slot, column) in source.columns.iter().enumerate() {
        match merged.slot_of(&column.title) {
            Some(existing) => {
                let known = merged.column(existing);
                for (code, message) in mismatches(known, column) {
                    diagnostics.push(Diagnostic::at(
                        code,
                        &source.origin,
                        column.title.as_str(),
                        TITLE_ROW,
                        column.grid_column,
                        message,
                    ));
                }
                mapping.push(existing);
                remaps.push((slot, existing, false));
            }
            None => {
                let mut copy = column.clone();
                if copy.origin.is_some() {
                    copy.origin = Some(origin_name(group, &copy.title));
                }
                merged.columns.push(copy);
                let new_slot = merged.columns.len() - 1;
                if column.is_key && merged.key.is_none() {
                    merged.key = Some(new_slot);
                }
                mapping.push(new_slot);
                remaps.push((slot, new_slot, true));
            }
        }
    }

    // Slot-valued directives point into the source sheet until remapped.
    // A column from an earlier sheet only takes the targets it lacks.
    for (slot, merged_slot, allocated) in remaps {
        let column = source.column(slot);
        let remap = |from: Option<usize>| from.map(|from| mapping[from]);
        let target = &mut merged.columns[merged_slot];
        if allocated {
            target.change = remap(column.change);
            target.array_size_ref = remap(column.array_size_ref);
            target.enum_group_ref = remap(column.enum_group_ref);
        } else {
            target.change = target.change.or(remap(column.change));
            target.array_size_ref = target.array_size_ref.or(remap(column.array_size_ref));
            target.enum_group_ref = target.enum_group_ref.or(remap(column.enum_group_ref));
            target.tracks_length |= column.tracks_length;
            target.tracks_count |= column.tracks_count;
        }
    }
    mapping
}

fn mismatches(known: &Column, incoming: &Column) -> Vec<(DiagnosticCode, String)> {
    let mut found = Vec::new();
    if known.export != incoming.export {
        found.push((
            DiagnosticCode::MergeExportMismatch,
            format!(
                "export mode differs from an earlier sheet ({:?} != {:?})",
                incoming.export, known.export
            ),
        ));
    }
    if known.data_type != incoming.data_type {
        let name = |column: &Column| column.data_type.map_or("none", |data_type| data_type.as_str());
        found.push((
            DiagnosticCode::MergeDataTypeMismatch,
            format!(
                "data type differs from an earlier sheet ({} != {})",
                name(incoming),
                name(known)
            ),
        ));
    }
    if known.enum_group != incoming.enum_group {
        found.push((
            DiagnosticCode::MergeEnumMismatch,
            format!(
                "enum group differs from an earlier sheet ({} != {})",
                incoming.enum_group.as_deref().unwrap_or("none"),
                known.enum_group.as_deref().unwrap_or("none")
            ),
        ));
    }
    found
}

fn unify_data(
    merge: &mut MergeTable,
    sheets: &[&IngestedSheet],
    mappings: &[Vec<usize>],
    array_sizes: &mut ArraySizeIndex,
) {
    let width = merge.schema.columns.len();
    let group_slot = merge.schema.find_slot(&merge.group_field);
    let mut merged_row = 0;

    for (source_idx, (sheet, mapping)) in sheets.iter().zip(mappings).enumerate() {
        // Merged slot to source slot.
        let mut reverse = vec![None; width];
        for (source_slot, &merged_slot) in mapping.iter().enumerate() {
            reverse[merged_slot].get_or_insert(source_slot);
        }

        for row in sheet.table.iter() {
            merged_row += 1;
            let mut cells = Vec::with_capacity(width);
            let mut provenance = Vec::with_capacity(width);
            for (merged_slot, source_slot) in reverse.iter().enumerate() {
                let (value, column) = match *source_slot {
                    Some(source_slot) => {
                        if let Some(size) =
                            sheet.array_sizes.get(sheet.name(), source_slot, row.row)
                        {
                            array_sizes.record(&merge.name, merged_slot, merged_row, size);
                        }
                        let grid_column = sheet.schema.column(source_slot).grid_column;
                        (row.value(source_slot).to_string(), Some(grid_column))
                    }
                    None => {
                        let default = merge
                            .schema
                            .column(merged_slot)
                            .data_type
                            .map_or("", |data_type| data_type.merge_default());
                        (default.to_string(), None)
                    }
                };
                provenance.push(CellProvenance {
                    source: source_idx,
                    row: row.row,
                    column,
                    value: value.clone(),
                });
                cells.push(value);
            }
            if let Some(slot) = group_slot {
                merge.group_ids.insert(cells[slot].clone());
            }
            merge.table.push(merged_row, cells);
            merge.provenance.push(provenance);
        }
    }
}

/// Origin columns of the merged table, indexed under `merge/title`.
fn index_origins(merge: &MergeTable) -> ReferenceIndex {
    let mut origins = ReferenceIndex::new();
    for row in merge.table.iter() {
        for (slot, column) in merge.schema.columns.iter().enumerate() {
            if let Some(origin) = &column.origin {
                let linked = column.change.map_or("", |source| row.value(source));
                origins.record(origin, row.value(slot), linked);
            }
        }
    }
    origins
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::partition;
    use std::collections::{BTreeMap, HashSet};
    use tablec_ingest::ingest_sheet;
    use tablec_model::{DataType, ExportMode, RawSheet, SheetGrid, SheetOrigin, ShardPlan};

    fn ingest(sheet: &str, rows: &[Vec<&str>]) -> IngestedSheet {
        let raw = RawSheet {
            name: sheet.to_string(),
            grid: SheetGrid::from_text(rows),
        };
        let groups = HashSet::from(["stage".to_string()]);
        ingest_sheet(&raw, SheetOrigin::new("design", format!("{sheet}.xlsx"), sheet), &groups)
            .expect("table sheet")
    }

    #[test]
    fn defaults_fill_missing_columns() {
        let a = ingest(
            "stage_a",
            &[
                vec![""],
                vec!["#merge", "id", "chapter", "name"],
                vec!["stage,chapter,0", "key,int", "int", "string"],
                vec!["", "data", "data", "data"],
                vec!["", "1", "1", "first"],
            ],
        );
        let b = ingest(
            "stage_b",
            &[
                vec![""],
                vec!["#merge", "id", "chapter", "boss"],
                vec!["stage,chapter,0", "key,int", "int", "bool"],
                vec!["", "data", "data", "data"],
                vec!["", "2", "2", "TRUE"],
            ],
        );
        let outcome = merge_group("stage", &[&a, &b], false).expect("merged");
        assert!(outcome.diagnostics.is_empty());
        let merge = outcome.merge;
        let titles: Vec<&str> = merge.schema.columns.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["id", "chapter", "name", "boss"]);
        assert_eq!(merge.table.rows[0].row, 1);
        assert_eq!(merge.table.rows[0].cells, vec!["1", "1", "first", "false"]);
        assert_eq!(merge.table.rows[1].cells, vec!["2", "2", "", "true"]);
        assert_eq!(merge.schema.columns[0].origin.as_deref(), Some("stage/id"));
        assert_eq!(merge.group_ids, BTreeSet::from(["1".to_string(), "2".to_string()]));

        let (origin, cell) = merge.provenance_at(1, 3).expect("provenance");
        assert_eq!(origin.sheet, "stage_b");
        assert_eq!((cell.row, cell.column), (4, Some(3)));
        let (_, synthesized) = merge.provenance_at(1, 2).expect("provenance");
        assert_eq!(synthesized.column, None);

        assert_eq!(
            outcome.origins.origin("stage/id").and_then(|values| values.resolve("2")),
            Some("2")
        );
    }

    #[test]
    fn conflicting_types_are_reported_on_the_later_sheet() {
        let a = ingest(
            "stage_a",
            &[
                vec![""],
                vec!["#merge", "id", "reward"],
                vec!["stage,id,0", "key,int", "int"],
                vec!["", "data", "data"],
            ],
        );
        let b = ingest(
            "stage_b",
            &[
                vec![""],
                vec!["#merge", "id", "reward"],
                vec!["stage,id,0", "key,int", "string"],
                vec!["", "data", "check"],
            ],
        );
        let outcome = merge_group("stage", &[&a, &b], false).expect("merged");
        let codes: Vec<DiagnosticCode> = outcome.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::MergeExportMismatch, DiagnosticCode::MergeDataTypeMismatch]
        );
        assert_eq!(outcome.diagnostics[0].sheet, "stage_b");
        assert_eq!(outcome.diagnostics[0].cell_reference(), "C2");
    }

    #[test]
    fn change_targets_follow_the_merged_layout() {
        let a = ingest(
            "stage_a",
            &[
                vec![""],
                vec!["#merge", "id", "hp"],
                vec!["stage,id,0", "key,int", "int"],
                vec!["", "data", "data"],
            ],
        );
        let b = ingest(
            "stage_b",
            &[
                vec![""],
                vec!["#merge", "id", "label", "hp"],
                vec!["stage,id,0", "key,int", "string,change<hp>", "int"],
                vec!["", "data", "data", "data"],
            ],
        );
        let outcome = merge_group("stage", &[&a, &b], false).expect("merged");
        let label = outcome.merge.schema.slot_of("label").expect("label");
        assert_eq!(outcome.merge.schema.column(label).change, Some(1));
    }

    #[test]
    fn later_sheets_supply_missing_change_targets() {
        let a = ingest(
            "stage_a",
            &[
                vec![""],
                vec!["#merge", "id", "label", "hp"],
                vec!["stage,id,0", "key,int", "string", "int"],
                vec!["", "data", "data", "data"],
            ],
        );
        let b = ingest(
            "stage_b",
            &[
                vec![""],
                vec!["#merge", "id", "hp", "label"],
                vec!["stage,id,0", "key,int", "int", "string,change<hp>"],
                vec!["", "data", "data", "data"],
            ],
        );
        let outcome = merge_group("stage", &[&a, &b], false).expect("merged");
        assert!(outcome.diagnostics.is_empty());
        let schema = &outcome.merge.schema;
        let label = schema.slot_of("label").expect("label");
        assert_eq!(schema.column(label).change, schema.slot_of("hp"));
    }

    /// Title to (type, export, enum group) for every merged column.
    fn layout(merge: &MergeTable) -> BTreeMap<String, (Option<DataType>, ExportMode, Option<String>)> {
        merge
            .schema
            .columns
            .iter()
            .map(|column| {
                (
                    column.title.clone(),
                    (column.data_type, column.export, column.enum_group.clone()),
                )
            })
            .collect()
    }

    /// Rows as sorted `title=value` lists, sorted.
    fn row_multiset(merge: &MergeTable) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = merge
            .table
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = merge
                    .schema
                    .columns
                    .iter()
                    .enumerate()
                    .map(|(slot, column)| format!("{}={}", column.title, row.value(slot)))
                    .collect();
                cells.sort();
                cells
            })
            .collect();
        rows.sort();
        rows
    }

    #[test]
    fn discovery_order_does_not_change_the_merged_table() {
        let a = ingest(
            "stage_a",
            &[
                vec![""],
                vec!["#merge", "id", "chapter", "x"],
                vec!["stage,chapter,2", "key,int", "int", "int"],
                vec!["", "data", "data", "data"],
                vec!["", "1", "1", "10"],
                vec!["", "2", "3", "20"],
            ],
        );
        let b = ingest(
            "stage_b",
            &[
                vec![""],
                vec!["#merge", "id", "chapter", "y"],
                vec!["stage,chapter,2", "key,int", "int", "type<grade>"],
                vec!["", "data", "data", "check"],
                vec!["", "3", "2", "COMMON"],
                vec!["", "4", "5", "RARE"],
            ],
        );
        let forward = merge_group("stage", &[&a, &b], false).expect("merged");
        let backward = merge_group("stage", &[&b, &a], false).expect("merged");
        assert!(forward.diagnostics.is_empty());
        assert!(backward.diagnostics.is_empty());

        let (forward, backward) = (forward.merge, backward.merge);
        assert_eq!(layout(&forward), layout(&backward));
        assert_eq!(row_multiset(&forward), row_multiset(&backward));
        assert_eq!(forward.group_ids, backward.group_ids);

        let forward_plan = partition(&forward).expect("shards");
        let backward_plan = partition(&backward).expect("shards");
        assert_eq!(forward_plan.index_entries(), backward_plan.index_entries());
        let sizes = |plan: &ShardPlan| plan.shards.iter().map(|shard| shard.rows.len()).collect::<Vec<_>>();
        assert_eq!(sizes(&forward_plan), sizes(&backward_plan));
    }
}
