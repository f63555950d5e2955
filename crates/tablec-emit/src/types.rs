//! Inputs and results of an emission pass.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tablec_model::{
    EnumRegistry, LocalizationRegistry, MergeTable, Schema, SheetKind, SheetTable, ShardPlan,
    ValueOverlay,
};

/// A validated table ready to be written.
#[derive(Debug, Clone, Copy)]
pub struct EmitTable<'a> {
    pub schema: &'a Schema,
    pub table: &'a SheetTable,
    /// Column slots whose values come from the overlay.
    pub changed: &'a BTreeSet<usize>,
    /// Set for merge tables split into shard files.
    pub shards: Option<ShardLayout<'a>>,
}

/// How a merge table is split across shard files.
#[derive(Debug, Clone, Copy)]
pub struct ShardLayout<'a> {
    pub merge: &'a str,
    pub group_field: &'a str,
    pub plan: &'a ShardPlan,
}

impl<'a> EmitTable<'a> {
    pub fn new(schema: &'a Schema, table: &'a SheetTable, changed: &'a BTreeSet<usize>) -> Self {
        Self {
            schema,
            table,
            changed,
            shards: None,
        }
    }

    /// A merge table; sharded when it carries a shard plan.
    pub fn merged(merge: &'a MergeTable, changed: &'a BTreeSet<usize>) -> Self {
        let shards = merge.shards.as_ref().map(|plan| ShardLayout {
            merge: merge.name.as_str(),
            group_field: merge.group_field.as_str(),
            plan,
        });
        Self {
            schema: &merge.schema,
            table: &merge.table,
            changed,
            shards,
        }
    }

    pub fn name(&self) -> &'a str {
        &self.schema.name
    }

    /// Data and merge tables get a companion schema file unless `nocode`.
    pub fn wants_schema_code(&self) -> bool {
        !self.schema.options.nocode && matches!(self.schema.kind, SheetKind::Data | SheetKind::Merge)
    }
}

/// Everything one emission pass writes.
#[derive(Debug, Clone)]
pub struct EmitInput<'a> {
    pub tables: Vec<EmitTable<'a>>,
    pub overlay: &'a ValueOverlay,
    pub enums: &'a EnumRegistry,
    pub localization: &'a LocalizationRegistry,
}

/// Category of a written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Records,
    Shard,
    ShardIndex,
    SchemaCode,
    EnumCode,
    Localization,
}

impl OutputKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputKind::Records => "records",
            OutputKind::Shard => "shard",
            OutputKind::ShardIndex => "shard index",
            OutputKind::SchemaCode => "schema code",
            OutputKind::EnumCode => "enum code",
            OutputKind::Localization => "localization",
        }
    }
}

/// One file written by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    pub path: PathBuf,
    pub kind: OutputKind,
    /// Table the file belongs to; absent for shared files.
    pub table: Option<String>,
    /// Records (or enum groups, or localization keys) in the file.
    pub entries: usize,
}

/// Rendered file contents with the number of entries they hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub entries: usize,
}

impl Rendered {
    pub fn new(text: String, entries: usize) -> Self {
        Self { text, entries }
    }
}
