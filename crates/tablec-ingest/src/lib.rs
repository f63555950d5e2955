//! Reading workbooks and turning table sheets into schemas and rows.
//!
//! The pipeline per sheet is: [`compile_schema`] parses the four header
//! rows, then [`ingest_rows`] reads the data rows against that schema.
//! [`ingest_sheet`] chains the two and is the unit of parallel work.
//! Type and localization sheets are folded into the global registries
//! afterwards with [`register_enums`] and [`register_localization`].

pub mod directive;
pub mod header;
pub mod numeric;
mod registries;
mod rows;
mod sheet;
mod workbook;

pub use header::{FIRST_DATA_ROW, compile_schema, origin_name};
pub use registries::{register_enums, register_localization};
pub use rows::{RowIngest, ingest_rows};
pub use sheet::{IngestedSheet, ingest_sheet, ingest_workbook, sheet_origin};
pub use workbook::{WORKBOOK_EXTENSIONS, list_workbooks, load_workbooks, read_workbook};
