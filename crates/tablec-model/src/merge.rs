//! Consolidated tables built from every sheet of a merge group.

use std::collections::BTreeSet;

use crate::diagnostic::SheetOrigin;
use crate::schema::Schema;
use crate::table::SheetTable;

/// Where a merged cell came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProvenance {
    /// Index into [`MergeTable::sources`].
    pub source: usize,
    /// Zero-based grid row in the source sheet.
    pub row: usize,
    /// Zero-based grid column, absent for synthesized defaults.
    pub column: Option<usize>,
    pub value: String,
}

/// Rows sharing one shard file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shard {
    /// 1-based shard number.
    pub number: usize,
    /// Distinct shard-key values packed into this shard, ascending.
    pub keys: Vec<i64>,
    /// Positions into the merged table's rows.
    pub rows: Vec<usize>,
}

/// Partition of a merged table into shard files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShardPlan {
    pub shards: Vec<Shard>,
}

impl ShardPlan {
    /// `(shard key, shard number)` pairs in assignment order.
    pub fn index_entries(&self) -> Vec<(i64, usize)> {
        self.shards
            .iter()
            .flat_map(|shard| shard.keys.iter().map(move |&key| (key, shard.number)))
            .collect()
    }

    pub fn shard_of_key(&self, key: i64) -> Option<usize> {
        self.shards
            .iter()
            .find(|shard| shard.keys.contains(&key))
            .map(|shard| shard.number)
    }
}

/// A merge group unified into one logical table.
#[derive(Debug, Clone)]
pub struct MergeTable {
    pub name: String,
    pub group_field: String,
    pub shard_size: usize,
    /// Contributing sheets in discovery order.
    pub sources: Vec<SheetOrigin>,
    pub schema: Schema,
    pub table: SheetTable,
    /// Per merged row, per column slot.
    pub provenance: Vec<Vec<CellProvenance>>,
    /// Distinct values of the group field.
    pub group_ids: BTreeSet<String>,
    pub shards: Option<ShardPlan>,
    /// Loaded only to resolve references; never validated or emitted.
    pub reference_only: bool,
}

impl MergeTable {
    /// Source sheet and provenance of a merged cell.
    pub fn provenance_at(&self, row: usize, slot: usize) -> Option<(&SheetOrigin, &CellProvenance)> {
        let cell = self.provenance.get(row)?.get(slot)?;
        let origin = self.sources.get(cell.source)?;
        Some((origin, cell))
    }
}
