//! Schema compiler: turns the four header rows of a sheet into a [`Schema`].
//!
//! Problems are attached to the schema as structural diagnostics; nothing
//! here fails outright.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use tablec_model::{
    Column, DataType, Diagnostic, DiagnosticCode, ExportMode, MergeHeader, RawSheet,
    ReferenceTarget, Schema, SheetKind, SheetOrigin,
};

use crate::directive::{self, Directive};

/// Grid row holding the output subfolder.
pub const SUBFOLDER_ROW: usize = 0;
/// Grid row holding the sheet tag and column titles.
pub const TITLE_ROW: usize = 1;
/// Grid row holding options or the merge tuple, and directive lists.
pub const PARAM_ROW: usize = 2;
/// Grid row holding the `data`/`check` export flags.
pub const EXPORT_ROW: usize = 3;
/// First data row.
pub const FIRST_DATA_ROW: usize = 4;

/// Compiles the header of a table sheet. Returns `None` for sheets that
/// are not tables.
///
/// `merge_groups` holds every known merge-group name so that `check<>`
/// targets can be told apart from plain sheets.
pub fn compile_schema(
    sheet: &RawSheet,
    origin: SheetOrigin,
    merge_groups: &HashSet<String>,
) -> Option<Schema> {
    let kind = SheetKind::detect(&sheet.grid)?;
    let mut schema = Schema::new(origin, kind);
    read_table_options(sheet, &mut schema);
    read_columns(sheet, &mut schema);
    let enum_refs = apply_directives(&mut schema, merge_groups);
    check_header(&mut schema);
    resolve_enum_refs(&mut schema, &enum_refs);
    debug!(
        sheet = %schema.name,
        kind = kind.tag(),
        columns = schema.columns.len(),
        structural = schema.diagnostics.len(),
        "compiled header"
    );
    Some(schema)
}

fn read_table_options(sheet: &RawSheet, schema: &mut Schema) {
    let grid = &sheet.grid;
    match schema.kind {
        SheetKind::Data | SheetKind::Type => {
            if let Some(options) = grid.text(PARAM_ROW, 0) {
                for option in options.split(',') {
                    match option.trim().to_ascii_lowercase().as_str() {
                        "nocode" => schema.options.nocode = true,
                        "valueonly" => schema.options.value_only = true,
                        _ => {}
                    }
                }
            }
            if let Some(subfolder) = grid.text(SUBFOLDER_ROW, 0) {
                schema.subfolder = subfolder;
            }
        }
        SheetKind::Merge => {
            let tuple = grid.text(PARAM_ROW, 0).unwrap_or_default();
            match MergeHeader::parse(&tuple) {
                Some(header) => schema.merge = Some(header),
                None => {
                    let diagnostic = Diagnostic::at(
                        DiagnosticCode::InvalidMergeHeader,
                        &schema.origin,
                        "",
                        PARAM_ROW,
                        0,
                        format!("merge header must be name,groupField,shardSize ({tuple})"),
                    );
                    schema.diagnostics.push(diagnostic);
                }
            }
        }
        SheetKind::LocalText => {}
    }
}

/// Keeps columns with a title, a directive list and an export flag.
fn read_columns(sheet: &RawSheet, schema: &mut Schema) {
    let grid = &sheet.grid;
    for col in 1..grid.col_count() {
        let (Some(title), Some(params), Some(export)) = (
            grid.text(TITLE_ROW, col),
            grid.text(PARAM_ROW, col),
            grid.text(EXPORT_ROW, col),
        ) else {
            continue;
        };
        let Some(export) = ExportMode::from_cell(&export) else {
            debug!(sheet = %schema.name, column = col, flag = %export, "skipping column with unknown export flag");
            continue;
        };
        let (title, is_array) = match title.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (title, false),
        };
        let mut column = Column::new(col, title, export);
        column.is_array = is_array;
        column.directives = directive::tokenize(&params);
        schema.columns.push(column);
    }
}

/// Applies every directive; returns unresolved `typeref` arguments by slot.
fn apply_directives(schema: &mut Schema, merge_groups: &HashSet<String>) -> HashMap<usize, String> {
    let mut enum_refs = HashMap::new();
    for slot in 0..schema.columns.len() {
        let tokens = schema.columns[slot].directives.clone();
        for token in &tokens {
            match directive::parse(token) {
                Directive::Key => {
                    if let Some(first) = schema.key.filter(|&first| first != slot) {
                        let first_title = schema.columns[first].title.clone();
                        push_column_error(
                            schema,
                            slot,
                            DiagnosticCode::MultipleKeyFields,
                            format!("key is already declared on {first_title}"),
                        );
                        continue;
                    }
                    schema.key = Some(slot);
                    let origin = origin_name(&schema.name, &schema.columns[slot].title);
                    let column = &mut schema.columns[slot];
                    column.is_key = true;
                    column.is_unique = true;
                    column.origin.get_or_insert(origin);
                }
                Directive::DataType(data_type) => {
                    if data_type == DataType::LocalText {
                        schema.needs.localtext = true;
                    }
                    schema.columns[slot].data_type.get_or_insert(data_type);
                }
                Directive::Origin => {
                    let origin = origin_name(&schema.name, &schema.columns[slot].title);
                    schema.columns[slot].origin.get_or_insert(origin);
                }
                Directive::Unique => schema.columns[slot].is_unique = true,
                Directive::Null => schema.columns[slot].null_allowed = true,
                Directive::EnumGroup(group) => {
                    schema.needs.enums = true;
                    let column = &mut schema.columns[slot];
                    column.enum_group = Some(group);
                    column.data_type = Some(DataType::Type);
                }
                Directive::EnumRef(target) => {
                    schema.needs.enums = true;
                    schema.columns[slot].data_type = Some(DataType::String);
                    enum_refs.insert(slot, target);
                }
                Directive::Check(target) => apply_check(schema, slot, &target, merge_groups),
                Directive::Change(target) => match schema.find_slot(&target) {
                    Some(source) => schema.columns[slot].change = Some(source),
                    None => push_column_error(
                        schema,
                        slot,
                        DiagnosticCode::InvalidChangeField,
                        format!("change<{target}> names a missing column"),
                    ),
                },
                Directive::Prefix(prefix) => schema.columns[slot].prefix = Some(prefix),
                Directive::Suffix(suffix) => schema.columns[slot].suffix = Some(suffix),
                Directive::ArraySize(size) => schema.columns[slot].array_size = Some(size),
                Directive::ArraySizeRef(target) => match schema.find_slot(&target) {
                    Some(source) => {
                        schema.columns[slot].array_size_ref = Some(source);
                        schema.columns[source].tracks_length = true;
                    }
                    None => push_column_error(
                        schema,
                        slot,
                        DiagnosticCode::InvalidArrayrefName,
                        format!("arraysizeref<{target}> names a missing column"),
                    ),
                },
                Directive::ArraySizeCount(target) => match schema.find_slot(&target) {
                    Some(source) => {
                        schema.columns[slot].array_size_ref = Some(source);
                        schema.columns[source].tracks_count = true;
                    }
                    None => push_column_error(
                        schema,
                        slot,
                        DiagnosticCode::InvalidArraycntrefName,
                        format!("arraysizecnt<{target}> names a missing column"),
                    ),
                },
                Directive::ReplaceComma(token) => schema.columns[slot].replace_comma = Some(token),
                Directive::Unknown(token) => {
                    debug!(sheet = %schema.name, column = %schema.columns[slot].title, %token, "ignoring unknown directive");
                }
            }
        }
    }
    enum_refs
}

fn apply_check(schema: &mut Schema, slot: usize, target: &str, merge_groups: &HashSet<String>) {
    let parts: Vec<&str> = target.split('/').collect();
    let [table, field] = parts.as_slice() else {
        push_column_error(
            schema,
            slot,
            DiagnosticCode::InvalidRefName,
            format!("check<{target}> must name table/field"),
        );
        return;
    };
    if table.is_empty() || field.is_empty() {
        push_column_error(
            schema,
            slot,
            DiagnosticCode::InvalidRefName,
            format!("check<{target}> must name table/field"),
        );
        return;
    }
    let needs = &mut schema.needs;
    if merge_groups.contains(*table) {
        if !needs.merges.iter().any(|name| name == table) {
            needs.merges.push((*table).to_string());
        }
    } else if !needs.tables.iter().any(|name| name == table) {
        needs.tables.push((*table).to_string());
    }
    schema.columns[slot].check = Some(ReferenceTarget {
        table: (*table).to_string(),
        field: (*field).to_string(),
    });
}

fn check_header(schema: &mut Schema) {
    let origin = schema.origin.clone();
    let mut found = Vec::new();
    let mut flag = |code, label: &str, row, col, message: String| {
        found.push(Diagnostic::at(code, &origin, label, row, col, message));
    };

    if schema.exported_slots().next().is_none() {
        flag(DiagnosticCode::NoChecked, "", TITLE_ROW, 1, "no column is exported".into());
    }
    if schema.key.is_none() && !schema.is_value_only() {
        flag(DiagnosticCode::NoKeyField, "", PARAM_ROW, 1, "no key column is declared".into());
    }
    if !schema.subfolder.is_empty() && !schema.subfolder.ends_with('/') {
        let message = format!("subfolder must end with '/' ({})", schema.subfolder);
        flag(DiagnosticCode::NotSubFolder, "", SUBFOLDER_ROW, 0, message);
    }

    let mut seen_titles: HashSet<&str> = HashSet::new();
    for column in &schema.columns {
        let label = column.title.as_str();
        let col = column.grid_column;
        if label.contains(' ') {
            flag(DiagnosticCode::SpaceInTitle, label, TITLE_ROW, col, "column title contains a space".into());
        }
        if !seen_titles.insert(label) {
            flag(DiagnosticCode::DuplicateTitle, label, TITLE_ROW, col, "column title is used twice".into());
        }
        if column.data_type.is_none() {
            flag(DiagnosticCode::NoDataType, label, PARAM_ROW, col, "no data type is declared".into());
        }
        if !column.null_allowed {
            continue;
        }
        let null_conflicts = [
            (column.enum_group.is_some(), DiagnosticCode::EnumNullToSpace, "enum"),
            (column.is_key, DiagnosticCode::EmptyKey, "key"),
            (column.origin.is_some(), DiagnosticCode::EmptyReferenceValue, "origin"),
            (column.is_unique, DiagnosticCode::EmptyUniqueValue, "unique"),
        ];
        for (applies, code, role) in null_conflicts {
            if applies {
                flag(code, label, PARAM_ROW, col, format!("{role} columns cannot take null"));
            }
        }
    }
    schema.diagnostics.extend(found);
}

fn resolve_enum_refs(schema: &mut Schema, enum_refs: &HashMap<usize, String>) {
    let mut slots: Vec<&usize> = enum_refs.keys().collect();
    slots.sort();
    for &slot in slots {
        let target = &enum_refs[&slot];
        match schema.find_slot(target) {
            Some(source) => schema.columns[slot].enum_group_ref = Some(source),
            None => push_column_error(
                schema,
                slot,
                DiagnosticCode::InvalidEnumRefField,
                format!("typeref<{target}> names a missing column"),
            ),
        }
    }
}

fn push_column_error(schema: &mut Schema, slot: usize, code: DiagnosticCode, message: String) {
    let column = &schema.columns[slot];
    let diagnostic = Diagnostic::at(
        code,
        &schema.origin,
        column.title.clone(),
        PARAM_ROW,
        column.grid_column,
        message,
    );
    schema.diagnostics.push(diagnostic);
}

/// Lowercase `table/title` under which an origin column is indexed.
pub fn origin_name(table: &str, title: &str) -> String {
    format!("{table}/{title}").to_lowercase()
}
