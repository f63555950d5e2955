//! Column schema compiled from a sheet's header block.

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, SheetOrigin};
use crate::kind::SheetKind;

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    String,
    Bool,
    Stream,
    LocalText,
    /// Enumeration text, resolved to its numeric value at validation.
    Type,
}

impl DataType {
    /// Parses a standalone type keyword. `type` is only reachable through
    /// the `type<GROUP>` directive and is not accepted here.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "int" => Some(DataType::Int),
            "long" => Some(DataType::Long),
            "float" => Some(DataType::Float),
            "double" => Some(DataType::Double),
            "string" => Some(DataType::String),
            "bool" => Some(DataType::Bool),
            "stream" => Some(DataType::Stream),
            "localtext" => Some(DataType::LocalText),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String => "string",
            DataType::Bool => "bool",
            DataType::Stream => "stream",
            DataType::LocalText => "localtext",
            DataType::Type => "type",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            DataType::Int | DataType::Long | DataType::Float | DataType::Double
        )
    }

    /// Emitted between double quotes.
    pub fn is_quoted(self) -> bool {
        matches!(self, DataType::String | DataType::LocalText)
    }

    /// Value synthesized for a merged column a contributing sheet lacks.
    pub fn merge_default(self) -> &'static str {
        match self {
            DataType::Int | DataType::Long | DataType::Float | DataType::Double => "0",
            DataType::String | DataType::LocalText | DataType::Stream => "",
            DataType::Bool => "false",
            DataType::Type => "NONE",
        }
    }
}

/// Whether a column is written out or only validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportMode {
    Data,
    Check,
}

impl ExportMode {
    pub fn from_cell(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "data" => Some(ExportMode::Data),
            "check" => Some(ExportMode::Check),
            _ => None,
        }
    }
}

/// Target of a `check<table/field>` directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTarget {
    pub table: String,
    pub field: String,
}

impl ReferenceTarget {
    /// Name of the origin this target resolves against.
    pub fn origin_name(&self) -> String {
        format!("{}/{}", self.table, self.field)
    }
}

/// One compiled column. Cross-column links are schema slot indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Zero-based column of the source grid.
    pub grid_column: usize,
    pub title: String,
    /// Directive tokens as written, trimmed.
    pub directives: Vec<String>,
    pub data_type: Option<DataType>,
    pub export: ExportMode,
    pub is_array: bool,
    pub is_key: bool,
    pub is_unique: bool,
    pub null_allowed: bool,
    /// Lowercase `table/title` when the column feeds the reference index.
    pub origin: Option<String>,
    /// Static enumeration group, upper-cased.
    pub enum_group: Option<String>,
    /// Column whose per-row value names the enumeration group.
    pub enum_group_ref: Option<usize>,
    pub check: Option<ReferenceTarget>,
    /// Column whose value replaces this one on output.
    pub change: Option<usize>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    /// Declared element count from `arraysize<n>`.
    pub array_size: Option<String>,
    /// Column whose element count must match this one.
    pub array_size_ref: Option<usize>,
    /// Referenced by another column's `arraysizeref`.
    pub tracks_length: bool,
    /// Referenced by another column's `arraysizecnt`; its value is a count.
    pub tracks_count: bool,
    pub replace_comma: Option<String>,
}

impl Column {
    pub fn new(grid_column: usize, title: impl Into<String>, export: ExportMode) -> Self {
        Self {
            grid_column,
            title: title.into(),
            directives: Vec::new(),
            data_type: None,
            export,
            is_array: false,
            is_key: false,
            is_unique: false,
            null_allowed: false,
            origin: None,
            enum_group: None,
            enum_group_ref: None,
            check: None,
            change: None,
            prefix: None,
            suffix: None,
            array_size: None,
            array_size_ref: None,
            tracks_length: false,
            tracks_count: false,
            replace_comma: None,
        }
    }

    pub fn is_enum(&self) -> bool {
        self.enum_group.is_some() || self.enum_group_ref.is_some()
    }

    pub fn is_exported(&self) -> bool {
        self.export == ExportMode::Data
    }

    /// Array columns taking part in an element-count comparison record
    /// their observed length.
    pub fn records_length(&self) -> bool {
        self.is_array && (self.tracks_length || self.array_size_ref.is_some())
    }
}

/// Per-table options from the option cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Skip companion code generation.
    pub nocode: bool,
    /// The table is a single unkeyed record.
    pub value_only: bool,
}

/// The `name,groupField,shardSize` tuple of a merge sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeHeader {
    pub name: String,
    pub group_field: String,
    pub shard_size: usize,
}

impl MergeHeader {
    /// Parses `name,groupField,shardSize`.
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        let [name, group_field, shard_size] = parts.as_slice() else {
            return None;
        };
        if name.is_empty() || group_field.is_empty() {
            return None;
        }
        Some(Self {
            name: (*name).to_string(),
            group_field: (*group_field).to_string(),
            shard_size: shard_size.parse().ok()?,
        })
    }
}

/// What a table pulls in from elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableNeeds {
    pub enums: bool,
    pub localtext: bool,
    /// Sheets named by `check<>` targets, in first-use order.
    pub tables: Vec<String>,
    /// Merge groups named by `check<>` targets.
    pub merges: Vec<String>,
}

/// Compiled header of one sheet or of a merged table.
#[derive(Debug, Clone)]
pub struct Schema {
    pub origin: SheetOrigin,
    /// Logical table name: the sheet name, or the merge name once merged.
    pub name: String,
    pub kind: SheetKind,
    pub subfolder: String,
    pub options: TableOptions,
    pub merge: Option<MergeHeader>,
    pub columns: Vec<Column>,
    /// Slot of the key column.
    pub key: Option<usize>,
    pub needs: TableNeeds,
    /// Structural problems found while compiling the header.
    pub diagnostics: Vec<Diagnostic>,
}

impl Schema {
    pub fn new(origin: SheetOrigin, kind: SheetKind) -> Self {
        Self {
            name: origin.sheet.clone(),
            origin,
            kind,
            subfolder: String::new(),
            options: TableOptions::default(),
            merge: None,
            columns: Vec::new(),
            key: None,
            needs: TableNeeds::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn column(&self, slot: usize) -> &Column {
        &self.columns[slot]
    }

    /// Slot of the column with exactly this title.
    pub fn slot_of(&self, title: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.title == title)
    }

    /// Slot lookup ignoring ASCII case, used for directive arguments.
    pub fn find_slot(&self, title: &str) -> Option<usize> {
        self.slot_of(title).or_else(|| {
            self.columns
                .iter()
                .position(|column| column.title.eq_ignore_ascii_case(title))
        })
    }

    /// Slots of the columns written to output, in schema order.
    pub fn exported_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.is_exported())
            .map(|(slot, _)| slot)
    }

    pub fn key_column(&self) -> Option<&Column> {
        self.key.map(|slot| &self.columns[slot])
    }

    pub fn is_value_only(&self) -> bool {
        self.options.value_only
    }

    pub fn has_structural_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
