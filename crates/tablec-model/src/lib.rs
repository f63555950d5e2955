//! Data model shared by every stage of the table compiler.

pub mod catalog;
pub mod cell;
pub mod diagnostic;
pub mod error;
pub mod kind;
pub mod merge;
pub mod options;
pub mod overlay;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod table;
pub mod text;

pub use catalog::{Catalog, CatalogEntry};
pub use cell::{CellValue, RawSheet, SheetGrid, Workbook};
pub use diagnostic::{Diagnostic, DiagnosticCode, SheetOrigin};
pub use error::{Result, TablecError};
pub use kind::SheetKind;
pub use merge::{CellProvenance, MergeTable, Shard, ShardPlan};
pub use options::CompilerOptions;
pub use overlay::ValueOverlay;
pub use reference::{ArraySizeIndex, OriginValues, ReferenceIndex};
pub use registry::{EnumEntry, EnumGroup, EnumRegistry, LocalizationRegistry};
pub use schema::{
    Column, DataType, ExportMode, MergeHeader, ReferenceTarget, Schema, TableNeeds, TableOptions,
};
pub use table::{SheetTable, TableRow};
