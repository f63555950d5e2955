//! `TableEnum.cs`: one enum block per exported enumeration group.

use tablec_model::{EnumEntry, EnumRegistry};

pub const ENUM_FILE_NAME: &str = "TableEnum.cs";

/// Column where trailing comments start, counted in characters.
const COMMENT_COLUMN: usize = 52;
const TAB_WIDTH: usize = 4;

/// Tabs between an entry and its comment.
fn comment_padding(entry_len: usize) -> String {
    if COMMENT_COLUMN > entry_len {
        let tabs = (COMMENT_COLUMN / TAB_WIDTH).saturating_sub(entry_len / TAB_WIDTH + 1);
        "\t".repeat(tabs)
    } else {
        "\t".to_string()
    }
}

fn entry_line(ind: &str, entry: &EnumEntry) -> String {
    let body = format!("{} = {},", entry.text, entry.value);
    if entry.comment.is_empty() {
        format!("\n{ind}\t{body}")
    } else {
        format!(
            "\n{ind}\t{body}{}// {}",
            comment_padding(body.len()),
            entry.comment
        )
    }
}

/// Renders every group not marked `nocode`, or `None` when there is none.
pub fn render_enum_code(enums: &EnumRegistry, namespace: &str) -> Option<(String, usize)> {
    let namespace = namespace.trim();
    let ind = if namespace.is_empty() { "" } else { "\t" };
    let mut out = String::new();
    if !namespace.is_empty() {
        out.push_str(&format!("namespace {namespace}\n{{"));
    }

    let mut emitted = 0;
    for group in enums.groups().iter().filter(|group| !group.nocode) {
        out.push('\n');
        if emitted > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{ind}public enum {}\n{ind}{{", group.name));
        for entry in &group.entries {
            out.push_str(&entry_line(ind, entry));
        }
        out.push_str(&format!("\n{ind}}}"));
        emitted += 1;
    }
    if emitted == 0 {
        return None;
    }
    if !namespace.is_empty() {
        out.push_str("\n}");
    }
    Some((out, emitted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EnumRegistry {
        let mut enums = EnumRegistry::new();
        enums
            .register("colors", "color", "red", "1", "warm", false)
            .unwrap();
        enums
            .register("colors", "color", "blue", "2", "", false)
            .unwrap();
        enums
            .register("hidden", "secret", "a", "1", "", true)
            .unwrap();
        enums
    }

    #[test]
    fn padding_aligns_to_the_comment_column() {
        assert_eq!(comment_padding(0), "\t".repeat(12));
        assert_eq!(comment_padding(8), "\t".repeat(10));
        assert_eq!(comment_padding(50), "");
        assert_eq!(comment_padding(52), "\t");
        assert_eq!(comment_padding(80), "\t");
    }

    #[test]
    fn nocode_groups_are_skipped() {
        let (code, groups) = render_enum_code(&registry(), "").unwrap();
        assert_eq!(groups, 1);
        assert_eq!(
            code,
            format!(
                "\npublic enum COLOR\n{{\n\tRED = 1,{}// warm\n\tBLUE = 2,\n}}",
                "\t".repeat(10)
            )
        );
    }

    #[test]
    fn namespace_wraps_and_indents() {
        let (code, _) = render_enum_code(&registry(), "Game").unwrap();
        assert!(code.starts_with("namespace Game\n{\n\tpublic enum COLOR\n\t{"));
        assert!(code.ends_with("\n\t}\n}"));
    }

    #[test]
    fn nothing_to_emit() {
        let mut enums = EnumRegistry::new();
        enums.register("hidden", "secret", "a", "1", "", true).unwrap();
        assert!(render_enum_code(&enums, "").is_none());
        assert!(render_enum_code(&EnumRegistry::new(), "Game").is_none());
    }
}
