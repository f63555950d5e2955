//! Companion schema code: a container class and a record class per table.

use std::fmt::Write as _;

use tablec_model::text::pascal_case;
use tablec_model::{Column, CompilerOptions, Schema};

/// Source type of a column; enum columns use their group name.
fn field_type(column: &Column) -> &str {
    match (&column.enum_group, column.data_type) {
        (Some(group), _) => group.as_str(),
        (None, Some(data_type)) => data_type.as_str(),
        (None, None) => "string",
    }
}

/// `XTable.cs` for a table named `x`.
pub fn schema_file_name(schema: &Schema) -> String {
    format!("{}Table.cs", pascal_case(&schema.name))
}

pub fn render_schema_code(schema: &Schema, options: &CompilerOptions) -> String {
    let class = format!("{}Table", pascal_case(&schema.name));
    let record = format!("{class}Record");
    let namespace = options.namespace.trim();
    let ind = if namespace.is_empty() { "" } else { "\t" };

    let mut out = String::new();
    for import in &options.code_imports {
        let _ = writeln!(out, "using {import};");
    }
    out.push('\n');
    if !namespace.is_empty() {
        let _ = write!(out, "namespace {namespace}\n{{\n");
    }

    let _ = writeln!(out, "{ind}[PreferBinarySerialization]");
    match schema.key_column() {
        Some(key) if !schema.is_value_only() => {
            let _ = writeln!(
                out,
                "{ind}public partial class {class} : KeyValueTable<{}, {record}>",
                field_type(key)
            );
            let _ = writeln!(out, "{ind}{{");
            let _ = writeln!(
                out,
                "{ind}\tpublic {class}() : base(nameof({record}.{}))",
                key.title
            );
            let _ = writeln!(out, "{ind}\t{{}}");
        }
        _ => {
            let _ = writeln!(
                out,
                "{ind}public partial class {class} : ValueOnlyTable<{record}>"
            );
            let _ = writeln!(out, "{ind}{{");
        }
    }
    let _ = writeln!(out, "{ind}}}");
    out.push('\n');

    let _ = writeln!(out, "{ind}[Serializable]");
    let _ = writeln!(out, "{ind}public partial class {record}");
    let _ = writeln!(out, "{ind}{{");
    for slot in schema.exported_slots() {
        let column = schema.column(slot);
        let brackets = if column.is_array { "[]" } else { "" };
        let _ = writeln!(
            out,
            "{ind}\tpublic {}{brackets} {};",
            field_type(column),
            column.title
        );
    }
    let _ = writeln!(out, "{ind}}}");
    if !namespace.is_empty() {
        out.push_str("}\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tablec_model::{DataType, ExportMode, SheetKind, SheetOrigin};

    fn item_schema() -> Schema {
        let mut schema = Schema::new(SheetOrigin::new("dir", "items.xlsx", "shop_item"), SheetKind::Data);
        let mut id = Column::new(1, "id", ExportMode::Data);
        id.data_type = Some(DataType::Int);
        id.is_key = true;
        let mut grade = Column::new(2, "grade", ExportMode::Data);
        grade.data_type = Some(DataType::Type);
        grade.enum_group = Some("GRADE".to_string());
        let mut tags = Column::new(3, "tags", ExportMode::Data);
        tags.data_type = Some(DataType::String);
        tags.is_array = true;
        let mut note = Column::new(4, "note", ExportMode::Check);
        note.data_type = Some(DataType::String);
        schema.columns = vec![id, grade, tags, note];
        schema.key = Some(0);
        schema
    }

    #[test]
    fn file_name_is_pascal_cased() {
        assert_eq!(schema_file_name(&item_schema()), "ShopItemTable.cs");
    }

    #[test]
    fn keyed_table_without_namespace() {
        let code = render_schema_code(&item_schema(), &CompilerOptions::default());
        let expected = "using System;\n\n\
            [PreferBinarySerialization]\n\
            public partial class ShopItemTable : KeyValueTable<int, ShopItemTableRecord>\n\
            {\n\
            \tpublic ShopItemTable() : base(nameof(ShopItemTableRecord.id))\n\
            \t{}\n\
            }\n\n\
            [Serializable]\n\
            public partial class ShopItemTableRecord\n\
            {\n\
            \tpublic int id;\n\
            \tpublic GRADE grade;\n\
            \tpublic string[] tags;\n\
            }\n";
        assert_eq!(code, expected);
    }

    #[test]
    fn namespace_indents_everything() {
        let mut schema = item_schema();
        schema.options.value_only = true;
        let options = CompilerOptions::default().with_namespace("Game.Data");
        let code = render_schema_code(&schema, &options);
        assert!(code.contains("namespace Game.Data\n{\n\t[PreferBinarySerialization]\n"));
        assert!(code.contains("\tpublic partial class ShopItemTable : ValueOnlyTable<ShopItemTableRecord>\n\t{\n\t}\n"));
        assert!(code.contains("\t\tpublic int id;\n"));
        assert!(code.ends_with("\t}\n}\n"));
        assert!(!code.contains("nameof"));
    }
}
