//! Shard files and the shard index of a split merge table.

use tablec_model::ValueOverlay;

use crate::records::{ValueStyle, plain_line, render_rows};
use crate::types::{EmitTable, Rendered, ShardLayout};

/// `<merge>_<NNNNN>.json`
pub fn shard_file_name(merge: &str, number: usize) -> String {
    format!("{merge}_{number:05}.json")
}

/// `<merge>_index.json`
pub fn index_file_name(merge: &str) -> String {
    format!("{merge}_index.json")
}

/// Renders one file per shard, in shard-number order.
pub fn render_shards(
    table: &EmitTable<'_>,
    layout: &ShardLayout<'_>,
    overlay: &ValueOverlay,
) -> Vec<(String, Rendered)> {
    layout
        .plan
        .shards
        .iter()
        .map(|shard| {
            let rows = shard
                .rows
                .iter()
                .filter_map(|&position| table.table.rows.get(position));
            (
                shard_file_name(layout.merge, shard.number),
                render_rows(table, overlay, rows),
            )
        })
        .collect()
}

/// Lists each shard key with the file holding its rows.
pub fn render_shard_index(layout: &ShardLayout<'_>) -> Rendered {
    let mut out = String::from("[");
    let entries = layout.plan.index_entries();
    for (idx, (key, number)) in entries.iter().enumerate() {
        out.push_str(if idx == 0 { "\n\t{\n" } else { ",\n\t{\n" });
        out.push_str(&plain_line(
            layout.group_field,
            &key.to_string(),
            ValueStyle::Bare,
        ));
        out.push_str(",\n");
        out.push_str(&plain_line(
            "filename",
            &shard_file_name(layout.merge, *number),
            ValueStyle::Quoted,
        ));
        out.push_str("\n\t}");
    }
    out.push_str("\n]");
    Rendered::new(out, entries.len())
}
