//! Per-language string lists.

use tablec_model::LocalizationRegistry;

use crate::types::Rendered;

/// `string_<language>.json`
pub fn localization_file_name(language: &str) -> String {
    format!("string_{language}.json")
}

/// All keys in ascending order with their text in `language`.
///
/// A key the language has no text for is written with an empty text.
pub fn render_localization(localization: &LocalizationRegistry, language: &str) -> Rendered {
    let mut out = String::from("[");
    let mut count = 0;
    for (key, category) in localization.keys() {
        let text = localization.text(language, key).unwrap_or_default();
        out.push_str(if count == 0 { "\n\t{\n" } else { ",\n\t{\n" });
        out.push_str(&format!(
            "\t\t\"key\": \"{key}\",\n\t\t\"text\": \"{text}\",\n\t\t\"text_category\": \"{category}\""
        ));
        out.push_str("\n\t}");
        count += 1;
    }
    out.push(']');
    Rendered::new(out, count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(lang, text)| (lang.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn entries_are_sorted_by_key() {
        let mut registry = LocalizationRegistry::new();
        registry.insert("ui_ok", "ui", &texts(&[("en", "OK"), ("ko", "확인")]));
        registry.insert("item_name", "item", &texts(&[("en", "Sword")]));

        let en = render_localization(&registry, "en");
        assert_eq!(en.entries, 2);
        insta::assert_snapshot!(
            en.text.replace('\n', "|").replace('\t', ""),
            @r#"[|{|"key": "item_name",|"text": "Sword",|"text_category": "item"|},|{|"key": "ui_ok",|"text": "OK",|"text_category": "ui"|}]"#
        );

        let ko = render_localization(&registry, "ko");
        assert!(ko.text.contains("\"text\": \"\",\n\t\t\"text_category\": \"item\""));
        assert!(ko.text.contains("\"text\": \"확인\""));
    }

    #[test]
    fn file_name() {
        assert_eq!(localization_file_name("en"), "string_en.json");
    }
}
