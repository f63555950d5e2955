use serde::{Deserialize, Serialize};

use crate::cell::SheetGrid;

/// Role of a sheet, read from the tag cell in column A of the second row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// Enumeration definitions (`#type`).
    Type,
    /// Localized strings (`#localtext`).
    LocalText,
    /// A sheet contributing to a merge group (`#merge`).
    Merge,
    /// A plain data table (`#data`).
    Data,
}

impl SheetKind {
    /// Parses a sheet tag; matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "#type" => Some(SheetKind::Type),
            "#localtext" => Some(SheetKind::LocalText),
            "#merge" => Some(SheetKind::Merge),
            "#data" => Some(SheetKind::Data),
            _ => None,
        }
    }

    /// Kind of a table sheet. Sheets with fewer than three rows or an
    /// unrecognized tag are not tables.
    pub fn detect(grid: &SheetGrid) -> Option<Self> {
        if grid.row_count() <= 2 {
            return None;
        }
        grid.text(1, 0).as_deref().and_then(Self::from_tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            SheetKind::Type => "#type",
            SheetKind::LocalText => "#localtext",
            SheetKind::Merge => "#merge",
            SheetKind::Data => "#data",
        }
    }
}
