//! Output generation for validated tables.
//!
//! - **Records**: one record list per data, type and merge table
//! - **Shards**: split merge tables plus a key-to-file index
//! - **Schema code**: container and record classes per table
//! - **Enum code**: every exported enumeration group in one file
//! - **Localization**: one string list per language

mod enum_code;
mod localization;
mod records;
mod schema_code;
mod shards;
mod types;
mod writer;

pub use enum_code::{ENUM_FILE_NAME, render_enum_code};
pub use localization::{localization_file_name, render_localization};
pub use records::{render_records, render_rows};
pub use schema_code::{render_schema_code, schema_file_name};
pub use shards::{index_file_name, render_shard_index, render_shards, shard_file_name};
pub use types::{EmitInput, EmitTable, EmittedFile, OutputKind, Rendered, ShardLayout};
pub use writer::{clear_output, emit_all, ensure_parent_dir, records_path, schema_code_path};
