//! Writes the output tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span};

use tablec_model::text::pascal_case;
use tablec_model::{CompilerOptions, Result, Schema, TablecError};

use crate::enum_code::{ENUM_FILE_NAME, render_enum_code};
use crate::localization::{localization_file_name, render_localization};
use crate::records::render_records;
use crate::schema_code::{render_schema_code, schema_file_name};
use crate::shards::{index_file_name, render_shard_index, render_shards};
use crate::types::{EmitInput, EmitTable, EmittedFile, OutputKind, Rendered};

fn output_error(path: &Path) -> impl FnOnce(io::Error) -> TablecError + '_ {
    move |source| TablecError::Output {
        path: path.to_path_buf(),
        source,
    }
}

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(output_error(parent))?;
    }
    Ok(())
}

/// Removes the output tree if it exists.
pub fn clear_output(root: &Path) -> Result<()> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(output_error(root)(err)),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).map_err(output_error(path))
}

/// Directory under `base` for a table's subfolder.
fn table_dir(base: &Path, schema: &Schema) -> PathBuf {
    let subfolder = schema.subfolder.replace('\\', "/");
    let subfolder = subfolder.trim_matches('/');
    if subfolder.is_empty() {
        base.to_path_buf()
    } else {
        base.join(subfolder)
    }
}

/// Path of a table's record file.
pub fn records_path(options: &CompilerOptions, schema: &Schema) -> PathBuf {
    table_dir(&options.data_path(), schema).join(format!("{}Table.json", pascal_case(&schema.name)))
}

/// Path of a table's schema code file.
pub fn schema_code_path(options: &CompilerOptions, schema: &Schema) -> PathBuf {
    table_dir(&options.code_path(), schema).join(schema_file_name(schema))
}

/// Collects written files.
struct OutputWriter {
    files: Vec<EmittedFile>,
}

impl OutputWriter {
    fn write(
        &mut self,
        path: PathBuf,
        kind: OutputKind,
        table: Option<&str>,
        rendered: &Rendered,
    ) -> Result<()> {
        write_file(&path, &rendered.text)?;
        debug!(path = %path.display(), kind = kind.as_str(), entries = rendered.entries, "wrote file");
        self.files.push(EmittedFile {
            path,
            kind,
            table: table.map(str::to_string),
            entries: rendered.entries,
        });
        Ok(())
    }

    fn write_table(
        &mut self,
        table: &EmitTable<'_>,
        input: &EmitInput<'_>,
        options: &CompilerOptions,
    ) -> Result<()> {
        let name = table.name();
        match &table.shards {
            Some(layout) => {
                for (file_name, rendered) in render_shards(table, layout, input.overlay) {
                    let path = options.output_root.join(file_name);
                    self.write(path, OutputKind::Shard, Some(name), &rendered)?;
                }
                let path = options.output_root.join(index_file_name(layout.merge));
                self.write(path, OutputKind::ShardIndex, Some(name), &render_shard_index(layout))?;
            }
            None => {
                let rendered = render_records(table, input.overlay);
                let path = records_path(options, table.schema);
                self.write(path, OutputKind::Records, Some(name), &rendered)?;
            }
        }
        if table.wants_schema_code() {
            let code = render_schema_code(table.schema, options);
            let fields = table.schema.exported_slots().count();
            let path = schema_code_path(options, table.schema);
            self.write(path, OutputKind::SchemaCode, Some(name), &Rendered::new(code, fields))?;
        }
        Ok(())
    }
}

/// Clears the output root and writes every output file.
///
/// Only called after a run finished without diagnostics.
pub fn emit_all(input: &EmitInput<'_>, options: &CompilerOptions) -> Result<Vec<EmittedFile>> {
    let span = info_span!("emit", root = %options.output_root.display());
    let _guard = span.enter();

    clear_output(&options.output_root)?;
    fs::create_dir_all(&options.output_root).map_err(output_error(&options.output_root))?;

    let mut writer = OutputWriter { files: Vec::new() };
    for table in &input.tables {
        writer.write_table(table, input, options)?;
    }

    if let Some((code, groups)) = render_enum_code(input.enums, &options.namespace) {
        let path = options.code_path().join(ENUM_FILE_NAME);
        writer.write(path, OutputKind::EnumCode, None, &Rendered::new(code, groups))?;
    }

    if !input.localization.is_empty() {
        for language in input.localization.languages() {
            let rendered = render_localization(input.localization, language);
            let path = options.output_root.join(localization_file_name(language));
            writer.write(path, OutputKind::Localization, None, &rendered)?;
        }
    }

    info!(
        tables = input.tables.len(),
        files = writer.files.len(),
        "emission complete"
    );
    Ok(writer.files)
}
