//! Enumeration and localization registries built from type and text sheets.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::diagnostic::DiagnosticCode;

/// One `TEXT = VALUE` entry of an enumeration group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub text: String,
    pub value: String,
    pub comment: String,
}

/// An enumeration group, bound to the sheet that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumGroup {
    pub name: String,
    pub sheet: String,
    pub nocode: bool,
    pub entries: Vec<EnumEntry>,
    by_text: HashMap<String, usize>,
    values: HashSet<String>,
}

impl EnumGroup {
    fn new(name: String, sheet: String, nocode: bool) -> Self {
        Self {
            name,
            sheet,
            nocode,
            entries: Vec::new(),
            by_text: HashMap::new(),
            values: HashSet::new(),
        }
    }

    /// Value registered for an upper-cased text.
    pub fn value_of(&self, text: &str) -> Option<&str> {
        self.by_text
            .get(text)
            .map(|&idx| self.entries[idx].value.as_str())
    }
}

/// Group name to `{text -> value}` tables, in registration order.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    groups: Vec<EnumGroup>,
    index: HashMap<String, usize>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one type-table row.
    ///
    /// Group, text and value are upper-cased. On failure nothing is
    /// inserted and the reason is returned.
    pub fn register(
        &mut self,
        sheet: &str,
        group: &str,
        text: &str,
        value: &str,
        comment: &str,
        nocode: bool,
    ) -> Result<(), DiagnosticCode> {
        let group = group.to_uppercase();
        let text = text.to_uppercase();
        let value = value.to_uppercase();
        if group.is_empty() {
            return Err(DiagnosticCode::NullTypeGroup);
        }
        if text.is_empty() {
            return Err(DiagnosticCode::NullTypeText);
        }
        if value.is_empty() {
            return Err(DiagnosticCode::NullTypeValue);
        }
        let existing_idx = self.index.get(&group).copied();
        if let Some(idx) = existing_idx {
            let existing = &self.groups[idx];
            if existing.sheet != sheet {
                return Err(DiagnosticCode::DuplicateTypeGroupAnotherSheet);
            }
            if existing.by_text.contains_key(&text) {
                return Err(DiagnosticCode::DuplicateTypeTextInTypeGroup);
            }
            if existing.values.contains(&value) {
                return Err(DiagnosticCode::DuplicateTypeValueInTypeGroup);
            }
        }
        let idx = match existing_idx {
            Some(idx) => idx,
            None => {
                self.groups
                    .push(EnumGroup::new(group.clone(), sheet.to_string(), nocode));
                self.index.insert(group, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let entry_group = &mut self.groups[idx];
        entry_group.nocode = nocode;
        entry_group
            .by_text
            .insert(text.clone(), entry_group.entries.len());
        entry_group.values.insert(value.clone());
        entry_group.entries.push(EnumEntry {
            text,
            value,
            comment: comment.to_string(),
        });
        Ok(())
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.index.contains_key(group)
    }

    pub fn group(&self, group: &str) -> Option<&EnumGroup> {
        self.index.get(group).map(|&idx| &self.groups[idx])
    }

    /// Resolves an upper-cased text within a group.
    pub fn resolve(&self, group: &str, text: &str) -> Option<&str> {
        self.group(group).and_then(|g| g.value_of(text))
    }

    /// Groups in registration order.
    pub fn groups(&self) -> &[EnumGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Language to `{key -> text}` tables sharing one global key set.
#[derive(Debug, Clone, Default)]
pub struct LocalizationRegistry {
    /// Key to the sheet that defined it.
    categories: BTreeMap<String, String>,
    languages: Vec<String>,
    texts: HashMap<String, HashMap<String, String>>,
}

impl LocalizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.categories.contains_key(key)
    }

    /// Adds every language text of one key.
    ///
    /// Returns `false` without inserting anything when the key was already
    /// defined by any sheet.
    pub fn insert(&mut self, key: &str, category: &str, texts: &[(String, String)]) -> bool {
        if self.categories.contains_key(key) {
            return false;
        }
        self.categories
            .insert(key.to_string(), category.to_string());
        for (language, text) in texts {
            if !self.texts.contains_key(language) {
                self.languages.push(language.clone());
            }
            self.texts
                .entry(language.clone())
                .or_default()
                .insert(key.to_string(), text.clone());
        }
        true
    }

    /// Languages in first-seen order.
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Keys sorted ascending, each with its category.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.categories
            .iter()
            .map(|(key, category)| (key.as_str(), category.as_str()))
    }

    pub fn text(&self, language: &str, key: &str) -> Option<&str> {
        self.texts
            .get(language)
            .and_then(|texts| texts.get(key))
            .map(String::as_str)
    }

    pub fn key_count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_value_in_group_is_rejected() {
        let mut registry = EnumRegistry::new();
        assert!(registry.register("type", "color", "red", "1", "", false).is_ok());
        assert_eq!(
            registry.register("type", "COLOR", "BLUE", "1", "", false),
            Err(DiagnosticCode::DuplicateTypeValueInTypeGroup)
        );
        let group = registry.group("COLOR").expect("group registered");
        assert_eq!(group.entries.len(), 1);
        assert_eq!(registry.resolve("COLOR", "RED"), Some("1"));
        assert_eq!(registry.resolve("COLOR", "BLUE"), None);
    }

    #[test]
    fn group_is_owned_by_first_sheet() {
        let mut registry = EnumRegistry::new();
        registry
            .register("type_a", "GRADE", "LOW", "1", "", false)
            .expect("first row");
        assert_eq!(
            registry.register("type_b", "GRADE", "HIGH", "2", "", false),
            Err(DiagnosticCode::DuplicateTypeGroupAnotherSheet)
        );
        assert_eq!(
            registry.register("type_a", "GRADE", "low", "3", "", false),
            Err(DiagnosticCode::DuplicateTypeTextInTypeGroup)
        );
    }

    #[test]
    fn empty_fields_are_reported_in_order() {
        let mut registry = EnumRegistry::new();
        assert_eq!(
            registry.register("t", "", "", "", "", false),
            Err(DiagnosticCode::NullTypeGroup)
        );
        assert_eq!(
            registry.register("t", "G", "", "", "", false),
            Err(DiagnosticCode::NullTypeText)
        );
        assert_eq!(
            registry.register("t", "G", "T", "", "", false),
            Err(DiagnosticCode::NullTypeValue)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn localization_keys_are_global() {
        let mut registry = LocalizationRegistry::new();
        let texts = vec![
            ("kr".to_string(), "안녕".to_string()),
            ("en".to_string(), "hello".to_string()),
        ];
        assert!(registry.insert("greet", "ui_text", &texts));
        assert!(!registry.insert("greet", "other_text", &texts[1..]));
        assert_eq!(registry.languages(), ["kr", "en"]);
        assert_eq!(registry.text("en", "greet"), Some("hello"));
        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            vec![("greet", "ui_text")]
        );
    }
}
