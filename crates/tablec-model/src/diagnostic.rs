//! Diagnostics reported back to the author of the workbooks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::column_letters;

/// Where a sheet came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SheetOrigin {
    /// Directory holding the workbook.
    pub directory: String,
    /// Workbook file name.
    pub file: String,
    pub sheet: String,
}

impl SheetOrigin {
    pub fn new(
        directory: impl Into<String>,
        file: impl Into<String>,
        sheet: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            file: file.into(),
            sheet: sheet.into(),
        }
    }
}

/// Closed set of problems the compiler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Structural
    NoChecked,
    NoKeyField,
    MultipleKeyFields,
    NotSubFolder,
    SpaceInTitle,
    DuplicateTitle,
    NoDataType,
    EnumNullToSpace,
    EmptyKey,
    EmptyReferenceValue,
    EmptyUniqueValue,
    InvalidEnumRefField,
    InvalidRefName,
    InvalidChangeField,
    InvalidArrayrefName,
    InvalidArraycntrefName,
    InvalidMergeHeader,
    DuplicateTableName,
    UnknownTableReference,
    InvalidTypeTable,
    MissingShardKey,
    // Cell level
    DuplicateKey,
    NullNotAllowed,
    NewlineInText,
    IntValueError,
    IntValueNull,
    FloatValueError,
    FloatValueNull,
    BoolValueError,
    BoolValueNull,
    TypeValueSpaceError,
    TypeValueNull,
    StringValueQuoteError,
    ArraySizeMismatch,
    NullTypeGroup,
    NullTypeText,
    NullTypeValue,
    DuplicateTypeGroupAnotherSheet,
    DuplicateTypeTextInTypeGroup,
    DuplicateTypeValueInTypeGroup,
    DuplicateLocalTextKey,
    MergeExportMismatch,
    MergeDataTypeMismatch,
    MergeEnumMismatch,
    ShardKeyValueError,
    DuplicateUniqueValue,
    UndefinedTypeGroup,
    TypeNoneRequired,
    InvalidTypeText,
    EmptyTypeValue,
    UnknownLocalTextKey,
    ArraySizeMissing,
    ArraySizeRefMissing,
    ArraySizeRefMismatch,
    ReferenceValueNotFound,
    ReferenceOriginMissing,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::NoChecked => "NO_CHECKED",
            DiagnosticCode::NoKeyField => "NO_KEY_FIELD",
            DiagnosticCode::MultipleKeyFields => "MULTIPLE_KEY_FIELDS",
            DiagnosticCode::NotSubFolder => "NOT_SUB_FOLDER",
            DiagnosticCode::SpaceInTitle => "SPACE_IN_TITLE",
            DiagnosticCode::DuplicateTitle => "DUPLICATE_TITLE",
            DiagnosticCode::NoDataType => "NO_DATA_TYPE",
            DiagnosticCode::EnumNullToSpace => "ENUM_NULL_TO_SPACE",
            DiagnosticCode::EmptyKey => "EMPTY_KEY",
            DiagnosticCode::EmptyReferenceValue => "EMPTY_REFERENCE_VALUE",
            DiagnosticCode::EmptyUniqueValue => "EMPTY_UNIQUE_VALUE",
            DiagnosticCode::InvalidEnumRefField => "INVALID_ENUM_REF_FIELD",
            DiagnosticCode::InvalidRefName => "INVALID_REF_NAME",
            DiagnosticCode::InvalidChangeField => "INVALID_CHANGE_FIELD",
            DiagnosticCode::InvalidArrayrefName => "INVALID_ARRAYREF_NAME",
            DiagnosticCode::InvalidArraycntrefName => "INVALID_ARRAYCNTREF_NAME",
            DiagnosticCode::InvalidMergeHeader => "INVALID_MERGE_HEADER",
            DiagnosticCode::DuplicateTableName => "DUPLICATE_TABLE_NAME",
            DiagnosticCode::UnknownTableReference => "UNKNOWN_TABLE_REFERENCE",
            DiagnosticCode::InvalidTypeTable => "INVALID_TYPE_TABLE",
            DiagnosticCode::MissingShardKey => "MISSING_SHARD_KEY",
            DiagnosticCode::DuplicateKey => "DUPLICATE_KEY",
            DiagnosticCode::NullNotAllowed => "NULL_NOT_ALLOWED",
            DiagnosticCode::NewlineInText => "NEWLINE_IN_TEXT",
            DiagnosticCode::IntValueError => "INT_VALUE_ERROR",
            DiagnosticCode::IntValueNull => "INT_VALUE_NULL",
            DiagnosticCode::FloatValueError => "FLOAT_VALUE_ERROR",
            DiagnosticCode::FloatValueNull => "FLOAT_VALUE_NULL",
            DiagnosticCode::BoolValueError => "BOOL_VALUE_ERROR",
            DiagnosticCode::BoolValueNull => "BOOL_VALUE_NULL",
            DiagnosticCode::TypeValueSpaceError => "TYPE_VALUE_SPACE_ERROR",
            DiagnosticCode::TypeValueNull => "TYPE_VALUE_NULL",
            DiagnosticCode::StringValueQuoteError => "STRING_VALUE_QUOTE_ERROR",
            DiagnosticCode::ArraySizeMismatch => "ARRAY_SIZE_MISMATCH",
            DiagnosticCode::NullTypeGroup => "NULL_TYPE_GROUP",
            DiagnosticCode::NullTypeText => "NULL_TYPE_TEXT",
            DiagnosticCode::NullTypeValue => "NULL_TYPE_VALUE",
            DiagnosticCode::DuplicateTypeGroupAnotherSheet => "DUPLICATE_TYPE_GROUP_ANOTHER_SHEET",
            DiagnosticCode::DuplicateTypeTextInTypeGroup => "DUPLICATE_TYPE_TEXT_IN_TYPE_GROUP",
            DiagnosticCode::DuplicateTypeValueInTypeGroup => "DUPLICATE_TYPE_VALUE_IN_TYPE_GROUP",
            DiagnosticCode::DuplicateLocalTextKey => "DUPLICATE_LOCAL_TEXT_KEY",
            DiagnosticCode::MergeExportMismatch => "MERGE_EXPORT_MISMATCH",
            DiagnosticCode::MergeDataTypeMismatch => "MERGE_DATA_TYPE_MISMATCH",
            DiagnosticCode::MergeEnumMismatch => "MERGE_ENUM_MISMATCH",
            DiagnosticCode::ShardKeyValueError => "SHARD_KEY_VALUE_ERROR",
            DiagnosticCode::DuplicateUniqueValue => "DUPLICATE_UNIQUE_VALUE",
            DiagnosticCode::UndefinedTypeGroup => "UNDEFINED_TYPE_GROUP",
            DiagnosticCode::TypeNoneRequired => "TYPE_NONE_REQUIRED",
            DiagnosticCode::InvalidTypeText => "INVALID_TYPE_TEXT",
            DiagnosticCode::EmptyTypeValue => "EMPTY_TYPE_VALUE",
            DiagnosticCode::UnknownLocalTextKey => "UNKNOWN_LOCAL_TEXT_KEY",
            DiagnosticCode::ArraySizeMissing => "ARRAY_SIZE_MISSING",
            DiagnosticCode::ArraySizeRefMissing => "ARRAY_SIZE_REF_MISSING",
            DiagnosticCode::ArraySizeRefMismatch => "ARRAY_SIZE_REF_MISMATCH",
            DiagnosticCode::ReferenceValueNotFound => "REFERENCE_VALUE_NOT_FOUND",
            DiagnosticCode::ReferenceOriginMissing => "REFERENCE_ORIGIN_MISSING",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem pinned to one spreadsheet cell.
///
/// `row` and `column` are 1-based spreadsheet coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub directory: String,
    pub file: String,
    pub sheet: String,
    pub column_label: String,
    pub row: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic from a zero-based grid position.
    pub fn at(
        code: DiagnosticCode,
        origin: &SheetOrigin,
        column_label: impl Into<String>,
        row: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            directory: origin.directory.clone(),
            file: origin.file.clone(),
            sheet: origin.sheet.clone(),
            column_label: column_label.into(),
            row: row + 1,
            column: column + 1,
            message: message.into(),
        }
    }

    /// A1-style reference of the offending cell.
    pub fn cell_reference(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}!{} [{}] {} ({})",
            self.sheet,
            self.cell_reference(),
            self.code,
            self.message,
            self.file
        )
    }
}

/// Counts diagnostics with the given code.
pub fn count_code(diagnostics: &[Diagnostic], code: DiagnosticCode) -> usize {
    diagnostics.iter().filter(|d| d.code == code).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_reported_one_based() {
        let origin = SheetOrigin::new("design", "Item.xlsx", "item");
        let diagnostic = Diagnostic::at(
            DiagnosticCode::DuplicateKey,
            &origin,
            "id",
            4,
            1,
            "duplicate key (1001)",
        );
        assert_eq!(diagnostic.row, 5);
        assert_eq!(diagnostic.column, 2);
        assert_eq!(diagnostic.cell_reference(), "B5");
        assert_eq!(
            diagnostic.to_string(),
            "item!B5 [DUPLICATE_KEY] duplicate key (1001) (Item.xlsx)"
        );
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&DiagnosticCode::DuplicateTypeValueInTypeGroup)
            .expect("serialize code");
        assert_eq!(json, "\"DUPLICATE_TYPE_VALUE_IN_TYPE_GROUP\"");
        assert_eq!(
            DiagnosticCode::InvalidArraycntrefName.as_str(),
            "INVALID_ARRAYCNTREF_NAME"
        );
    }
}
