use tablec_model::{Schema, TableRow, ValueOverlay};

/// Copies each `change<source>` column's value, resolved if the source was
/// resolved, into the overlay for the row.
pub(crate) fn propagate(schema: &Schema, row: &TableRow, overlay: &mut ValueOverlay) {
    for (slot, column) in schema.columns.iter().enumerate() {
        let Some(source) = column.change else {
            continue;
        };
        let value = overlay
            .get(&schema.name, row.row, source)
            .unwrap_or_else(|| row.value(source))
            .to_string();
        overlay.set(&schema.name, row.row, slot, value);
    }
}
