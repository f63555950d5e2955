//! Folds ingested type and localization sheets into the global registries.
//!
//! These run sequentially after the parallel ingestion phase, in sheet
//! submission order, so registration conflicts resolve deterministically.

use tablec_model::{
    Diagnostic, DiagnosticCode, EnumRegistry, LocalizationRegistry, Schema, SheetTable,
};

use crate::header::TITLE_ROW;

/// Titles a type sheet must carry.
pub const TYPE_GROUP: &str = "type_group";
pub const TYPE_TEXT: &str = "type_text";
pub const TYPE_VALUE: &str = "type_value";
pub const TYPE_DESC: &str = "type_desc";

/// Registers every row of a type sheet. Failed rows are skipped whole.
pub fn register_enums(
    schema: &Schema,
    table: &SheetTable,
    registry: &mut EnumRegistry,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let slots = (
        schema.slot_of(TYPE_GROUP),
        schema.slot_of(TYPE_TEXT),
        schema.slot_of(TYPE_VALUE),
        schema.slot_of(TYPE_DESC),
    );
    let (Some(group), Some(text), Some(value), Some(desc)) = slots else {
        diagnostics.push(Diagnostic::at(
            DiagnosticCode::InvalidTypeTable,
            &schema.origin,
            "",
            TITLE_ROW,
            1,
            format!("type sheets need {TYPE_GROUP}, {TYPE_TEXT}, {TYPE_VALUE} and {TYPE_DESC} columns"),
        ));
        return diagnostics;
    };
    let text_col = schema.column(text).grid_column;

    for row in table.iter() {
        let (group_name, text_name, value_text) =
            (row.value(group), row.value(text), row.value(value));
        let registered = registry.register(
            &schema.name,
            group_name,
            text_name,
            value_text,
            row.value(desc),
            schema.options.nocode,
        );
        let Err(code) = registered else {
            continue;
        };
        let (label, message) = match code {
            DiagnosticCode::NullTypeGroup => ("Type Group", "type group is empty".to_string()),
            DiagnosticCode::NullTypeText => ("Type Text", "type text is empty".to_string()),
            DiagnosticCode::NullTypeValue => ("Type Value", "type value is empty".to_string()),
            DiagnosticCode::DuplicateTypeGroupAnotherSheet => (
                "Type Group",
                format!("type group is defined by another sheet ({group_name})"),
            ),
            DiagnosticCode::DuplicateTypeTextInTypeGroup => (
                "Type Text",
                format!("duplicate type text ({group_name}:{text_name})"),
            ),
            _ => (
                "Type Value",
                format!("duplicate type value ({group_name}:{value_text})"),
            ),
        };
        diagnostics.push(Diagnostic::at(
            code,
            &schema.origin,
            label,
            row.row,
            text_col,
            message,
        ));
    }
    diagnostics
}

/// Registers every row of a localization sheet.
///
/// Each exported non-key column is a language named by its title. A key
/// already known from any sheet is reported and its texts are ignored.
pub fn register_localization(
    schema: &Schema,
    table: &SheetTable,
    registry: &mut LocalizationRegistry,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let Some(key_slot) = schema.key else {
        return diagnostics;
    };
    let key_col = schema.column(key_slot).grid_column;
    let languages: Vec<usize> = schema
        .exported_slots()
        .filter(|&slot| slot != key_slot)
        .collect();

    for row in table.iter() {
        let key = row.value(key_slot);
        let texts: Vec<(String, String)> = languages
            .iter()
            .map(|&slot| {
                (
                    schema.column(slot).title.clone(),
                    row.value(slot).to_string(),
                )
            })
            .collect();
        if !registry.insert(key, &schema.name, &texts) {
            diagnostics.push(Diagnostic::at(
                DiagnosticCode::DuplicateLocalTextKey,
                &schema.origin,
                "Local Text Key",
                row.row,
                key_col,
                format!("localization key is already defined ({key})"),
            ));
        }
    }
    diagnostics
}
