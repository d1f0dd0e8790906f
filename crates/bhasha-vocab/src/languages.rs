//! Supported-language registry.

use crate::error::CatalogError;
use std::collections::BTreeSet;

/// Key of the English name entry. Not part of the registry: English is
/// mandatory and checked on its own.
pub const ENGLISH_KEY: &str = "english";

/// Ordered, duplicate-free set of the language keys every record is
/// expected to carry under `names`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    keys: Vec<String>,
}

impl LanguageRegistry {
    pub fn new<I, S>(keys: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for key in keys {
            let key = key.into();
            let trimmed = key.trim();
            if trimmed.is_empty() {
                return Err(CatalogError::Invalid(
                    "language keys must be non-empty".to_string(),
                ));
            }
            if trimmed == ENGLISH_KEY {
                return Err(CatalogError::Invalid(format!(
                    "`{ENGLISH_KEY}` is checked separately and must not be listed as a language"
                )));
            }
            if !seen.insert(trimmed.to_string()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate language key `{trimmed}`"
                )));
            }
            ordered.push(trimmed.to_string());
        }
        Ok(Self { keys: ordered })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|known| known == key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let registry = LanguageRegistry::new(["tamil", "hindi", "bengali"])
            .expect("registry should build");
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec!["tamil", "hindi", "bengali"]
        );
        assert!(registry.contains("hindi"));
        assert!(!registry.contains("english"));
    }

    #[test]
    fn rejects_duplicates_and_english() {
        assert!(matches!(
            LanguageRegistry::new(["tamil", "tamil"]),
            Err(CatalogError::Invalid(message)) if message.contains("duplicate")
        ));
        assert!(LanguageRegistry::new(["english"]).is_err());
        assert!(LanguageRegistry::new(Vec::<String>::new()).is_ok_and(|r| r.is_empty()));
        assert!(LanguageRegistry::new(["  "]).is_err());
    }
}
