//! Splits a merge table into shard files by its group field.

use std::collections::BTreeMap;

use tablec_ingest::header::PARAM_ROW;
use tablec_model::{Diagnostic, DiagnosticCode, MergeTable, Shard, ShardPlan};

/// Packs up to `shard_size` distinct group-field values per shard, in
/// ascending value order.
///
/// Every row whose group field is not an integer is reported, as is a
/// group field missing from the merged columns.
pub fn partition(merge: &MergeTable) -> Result<ShardPlan, Vec<Diagnostic>> {
    let Some(slot) = merge.schema.find_slot(&merge.group_field) else {
        return Err(vec![Diagnostic::at(
            DiagnosticCode::MissingShardKey,
            &merge.schema.origin,
            merge.group_field.as_str(),
            PARAM_ROW,
            0,
            format!("merge group {} has no column {}", merge.name, merge.group_field),
        )]);
    };

    let mut by_key: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    let mut diagnostics = Vec::new();
    for (position, row) in merge.table.iter().enumerate() {
        let value = row.value(slot);
        match value.parse::<i64>() {
            Ok(key) => by_key.entry(key).or_default().push(position),
            Err(_) => {
                let Some((origin, cell)) = merge.provenance_at(position, slot) else {
                    continue;
                };
                diagnostics.push(Diagnostic::at(
                    DiagnosticCode::ShardKeyValueError,
                    origin,
                    merge.group_field.as_str(),
                    cell.row,
                    cell.column.unwrap_or(0),
                    format!("shard key must be an integer ({value})"),
                ));
            }
        }
    }
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    let size = merge.shard_size.max(1);
    let mut shards: Vec<Shard> = Vec::new();
    for (idx, (key, rows)) in by_key.into_iter().enumerate() {
        let number = idx / size + 1;
        match shards.last_mut() {
            Some(shard) if shard.number == number => {
                shard.keys.push(key);
                shard.rows.extend(rows);
            }
            _ => shards.push(Shard {
                number,
                keys: vec![key],
                rows,
            }),
        }
    }
    Ok(ShardPlan { shards })
}
