//! Ingested cell values of one table.

/// One ingested row. `cells` is aligned with the schema's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Zero-based grid row for sheet tables; 1-based merged row number
    /// for merge tables.
    pub row: usize,
    pub cells: Vec<String>,
}

/// Normalized string values of a table, in row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub rows: Vec<TableRow>,
}

impl SheetTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: usize, cells: Vec<String>) {
        self.rows.push(TableRow { row, cells });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableRow> {
        self.rows.iter()
    }

    /// Values of one column across all rows.
    pub fn column_values(&self, slot: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.cells.get(slot).map_or("", String::as_str))
    }
}

impl TableRow {
    pub fn value(&self, slot: usize) -> &str {
        self.cells.get(slot).map_or("", String::as_str)
    }
}
