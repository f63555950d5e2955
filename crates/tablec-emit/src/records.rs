//! Record list rendering.
//!
//! The layout is fixed: downstream loaders compare files byte for byte, so
//! every tab and newline below is part of the format.

use tablec_model::text::split_protected;
use tablec_model::{Column, DataType, TableRow, ValueOverlay};

use crate::types::{EmitTable, Rendered};

/// Renders every keyed row of a table as a bracketed record list, or the
/// single bare record of a value-only table.
pub fn render_records(table: &EmitTable<'_>, overlay: &ValueOverlay) -> Rendered {
    if table.schema.is_value_only() {
        return render_value_only(table, overlay);
    }
    let key = table.schema.key;
    let rows = table
        .table
        .iter()
        .filter(|row| key.is_none_or(|slot| !row.value(slot).is_empty()));
    render_rows(table, overlay, rows)
}

/// Renders the given rows as a bracketed record list.
pub fn render_rows<'r>(
    table: &EmitTable<'_>,
    overlay: &ValueOverlay,
    rows: impl IntoIterator<Item = &'r TableRow>,
) -> Rendered {
    let (body, count) = record_list(table, overlay, rows);
    Rendered::new(format!("[{body}\n]"), count)
}

fn render_value_only(table: &EmitTable<'_>, overlay: &ValueOverlay) -> Rendered {
    let (body, count) = record_list(table, overlay, table.table.iter());
    let dedented = body
        .lines()
        .map(|line| line.strip_prefix('\t').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n");
    let text = dedented
        .strip_prefix('\n')
        .map_or_else(|| dedented.clone(), str::to_string);
    Rendered::new(text, count)
}

/// Record objects without the enclosing brackets.
fn record_list<'r>(
    table: &EmitTable<'_>,
    overlay: &ValueOverlay,
    rows: impl IntoIterator<Item = &'r TableRow>,
) -> (String, usize) {
    let mut out = String::new();
    let mut count = 0;
    for row in rows {
        let fields = record_fields(table, overlay, row);
        if fields.is_empty() {
            continue;
        }
        out.push_str(if count == 0 { "\n\t{\n" } else { ",\n\t{\n" });
        out.push_str(&fields.join(",\n"));
        out.push_str("\n\t}");
        count += 1;
    }
    (out, count)
}

fn record_fields(table: &EmitTable<'_>, overlay: &ValueOverlay, row: &TableRow) -> Vec<String> {
    let schema = table.schema;
    let mut fields = Vec::new();
    for slot in schema.exported_slots() {
        let column = schema.column(slot);
        let value = overlay
            .get(&schema.name, row.row, slot)
            .unwrap_or_else(|| row.value(slot));
        if value.eq_ignore_ascii_case("null") {
            continue;
        }
        let style = if table.changed.contains(&slot) {
            ValueStyle::Resolved
        } else {
            ValueStyle::Typed(column.data_type)
        };
        fields.push(field_line(column, value, style));
    }
    fields
}

/// How a value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueStyle {
    /// Follows the column's data type.
    Typed(Option<DataType>),
    /// Substituted during validation: bare when numeric, quoted otherwise.
    Resolved,
    /// Always bare.
    Bare,
    /// Always quoted.
    Quoted,
}

impl ValueStyle {
    fn render(self, value: &str) -> String {
        let quoted = match self {
            ValueStyle::Typed(data_type) => data_type.is_some_and(DataType::is_quoted),
            ValueStyle::Resolved => !is_number_literal(value),
            ValueStyle::Bare => false,
            ValueStyle::Quoted => true,
        };
        if quoted {
            format!("\"{value}\"")
        } else {
            value.to_string()
        }
    }
}

/// One `\t\t"title": value` line.
pub(crate) fn field_line(column: &Column, value: &str, style: ValueStyle) -> String {
    let title = &column.title;
    if !column.is_array {
        let value = restore_commas(column, value);
        return format!("\t\t\"{title}\": {}", style.render(&value));
    }
    if value.is_empty() || value == "\"\"" {
        return format!("\t\t\"{title}\": []");
    }
    let elements = split_protected(value, ',')
        .iter()
        .map(|element| style.render(&restore_commas(column, element)))
        .collect::<Vec<_>>();
    format!("\t\t\"{title}\": [\n\t\t\t{}\n\t\t]", elements.join(",\n\t\t\t"))
}

/// Scalar field line outside any column, as used by shard indexes.
pub(crate) fn plain_line(title: &str, value: &str, style: ValueStyle) -> String {
    format!("\t\t\"{title}\": {}", style.render(value))
}

fn restore_commas(column: &Column, value: &str) -> String {
    match column.replace_comma.as_deref() {
        Some(token) if !token.is_empty() => value.replace(token, ","),
        _ => value.to_string(),
    }
}

fn is_number_literal(value: &str) -> bool {
    value.starts_with(|ch: char| ch.is_ascii_digit() || ch == '-')
        && value.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablec_model::ExportMode;

    fn column(title: &str, data_type: DataType, is_array: bool) -> Column {
        let mut column = Column::new(1, title, ExportMode::Data);
        column.data_type = Some(data_type);
        column.is_array = is_array;
        column
    }

    #[test]
    fn scalar_quoting_follows_type() {
        let name = column("name", DataType::String, false);
        let hp = column("hp", DataType::Int, false);
        assert_eq!(
            field_line(&name, "Sword", ValueStyle::Typed(name.data_type)),
            "\t\t\"name\": \"Sword\""
        );
        assert_eq!(
            field_line(&hp, "12", ValueStyle::Typed(hp.data_type)),
            "\t\t\"hp\": 12"
        );
    }

    #[test]
    fn resolved_values_are_bare_only_when_numeric() {
        let kind = column("kind", DataType::Type, false);
        assert_eq!(
            field_line(&kind, "3", ValueStyle::Resolved),
            "\t\t\"kind\": 3"
        );
        assert_eq!(
            field_line(&kind, "-1.5", ValueStyle::Resolved),
            "\t\t\"kind\": -1.5"
        );
        assert_eq!(
            field_line(&kind, "potion", ValueStyle::Resolved),
            "\t\t\"kind\": \"potion\""
        );
        assert_eq!(
            field_line(&kind, "", ValueStyle::Resolved),
            "\t\t\"kind\": \"\""
        );
    }

    #[test]
    fn arrays_put_each_element_on_its_own_line() {
        let tags = column("tags", DataType::String, true);
        assert_eq!(
            field_line(&tags, "a,b", ValueStyle::Typed(tags.data_type)),
            "\t\t\"tags\": [\n\t\t\t\"a\",\n\t\t\t\"b\"\n\t\t]"
        );
        assert_eq!(
            field_line(&tags, "", ValueStyle::Typed(tags.data_type)),
            "\t\t\"tags\": []"
        );
    }

    #[test]
    fn replacement_token_becomes_a_comma() {
        let mut text = column("text", DataType::String, true);
        text.replace_comma = Some("#c".to_string());
        assert_eq!(
            field_line(&text, "a#cb,c", ValueStyle::Typed(text.data_type)),
            "\t\t\"text\": [\n\t\t\t\"a,b\",\n\t\t\t\"c\"\n\t\t]"
        );
    }

    #[test]
    fn number_literals() {
        assert!(is_number_literal("0"));
        assert!(is_number_literal("-12.25"));
        assert!(!is_number_literal(""));
        assert!(!is_number_literal("NaN"));
        assert!(!is_number_literal("inf"));
        assert!(!is_number_literal("12a"));
    }
}
