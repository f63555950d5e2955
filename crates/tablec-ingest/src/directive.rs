//! Column directive grammar.
//!
//! A parameter cell is a comma-separated token list. Commas inside `<...>`
//! belong to the bracketed argument. Keywords are case-insensitive.

use tablec_model::DataType;
use tablec_model::text::split_protected;

/// One parsed directive token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Key,
    DataType(DataType),
    Origin,
    Unique,
    Null,
    /// `type<GROUP>`, group upper-cased.
    EnumGroup(String),
    /// `typeref<column>`.
    EnumRef(String),
    /// `check<table/field>`, lower-cased.
    Check(String),
    Change(String),
    Prefix(String),
    Suffix(String),
    ArraySize(String),
    ArraySizeRef(String),
    ArraySizeCount(String),
    ReplaceComma(String),
    Unknown(String),
}

/// Splits a parameter cell into trimmed, non-empty tokens.
pub fn tokenize(cell: &str) -> Vec<String> {
    split_protected(cell, ',')
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn parse(token: &str) -> Directive {
    let lowered = token.to_ascii_lowercase();
    match lowered.as_str() {
        "key" => return Directive::Key,
        "origin" => return Directive::Origin,
        "unique" => return Directive::Unique,
        "null" => return Directive::Null,
        _ => {}
    }
    if let Some(data_type) = DataType::from_keyword(&lowered) {
        return Directive::DataType(data_type);
    }
    let Some((name, argument)) = split_bracketed(token) else {
        return Directive::Unknown(token.to_string());
    };
    match name.to_ascii_lowercase().as_str() {
        "type" => Directive::EnumGroup(argument.to_uppercase()),
        "typeref" => Directive::EnumRef(argument.to_string()),
        "check" => Directive::Check(argument.to_lowercase()),
        "change" => Directive::Change(argument.to_string()),
        "prefix" => Directive::Prefix(argument.to_string()),
        "suffix" => Directive::Suffix(argument.to_string()),
        "arraysize" => Directive::ArraySize(argument.to_string()),
        "arraysizeref" => Directive::ArraySizeRef(argument.to_string()),
        "arraysizecnt" => Directive::ArraySizeCount(argument.to_string()),
        "replacecomma" => Directive::ReplaceComma(argument.to_string()),
        _ => Directive::Unknown(token.to_string()),
    }
}

/// `name<argument>` with a single opening bracket and a non-empty argument.
fn split_bracketed(token: &str) -> Option<(&str, &str)> {
    let (name, rest) = token.split_once('<')?;
    if name.is_empty() || rest.contains('<') {
        return None;
    }
    let argument = rest.strip_suffix('>')?;
    if argument.is_empty() {
        return None;
    }
    Some((name, argument))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_trimmed_and_brackets_protected() {
        assert_eq!(
            tokenize(" key , int,replacecomma<,> ,, prefix<a,b>"),
            vec!["key", "int", "replacecomma<,>", "prefix<a,b>"]
        );
    }

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(parse("KEY"), Directive::Key);
        assert_eq!(parse("Float"), Directive::DataType(DataType::Float));
        assert_eq!(parse("LocalText"), Directive::DataType(DataType::LocalText));
        assert_eq!(parse("Null"), Directive::Null);
    }

    #[test]
    fn bracket_arguments() {
        assert_eq!(parse("type<grade>"), Directive::EnumGroup("GRADE".to_string()));
        assert_eq!(parse("TypeRef<kind>"), Directive::EnumRef("kind".to_string()));
        assert_eq!(
            parse("check<Item/ID>"),
            Directive::Check("item/id".to_string())
        );
        assert_eq!(parse("prefix<Icon_>"), Directive::Prefix("Icon_".to_string()));
        assert_eq!(parse("arraysize<4>"), Directive::ArraySize("4".to_string()));
        assert_eq!(
            parse("arraysizecnt<count>"),
            Directive::ArraySizeCount("count".to_string())
        );
    }

    #[test]
    fn malformed_brackets_are_unknown() {
        assert_eq!(parse("prefix<>"), Directive::Unknown("prefix<>".to_string()));
        assert_eq!(parse("<x>"), Directive::Unknown("<x>".to_string()));
        assert_eq!(parse("suffix<x"), Directive::Unknown("suffix<x".to_string()));
        assert_eq!(parse("color<red>"), Directive::Unknown("color<red>".to_string()));
    }
}
