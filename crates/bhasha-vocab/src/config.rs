//! Catalog configuration loaded once at process start.
//!
//! The TOML document is deserialized into `CatalogConfig` and then frozen
//! into a `Catalog`, which is what the checker and normalizer consume.

use crate::error::CatalogError;
use crate::languages::LanguageRegistry;
use crate::registry::{Category, VocabularyRegistry};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_SCHEMA: u32 = 1;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_NOTES_PLACEHOLDER: &str = "Description to be added.";
pub const DEFAULT_NAME_PLACEHOLDER: &str = "-";

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");
const BUILTIN_CATALOG_PATH: &str = "<builtin catalog.toml>";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    pub schema: u32,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_notes_placeholder")]
    pub notes_placeholder: String,
    #[serde(default = "default_name_placeholder")]
    pub name_placeholder: String,
    pub languages: Vec<String>,
    pub categories: Vec<CategoryRow>,
    #[serde(default)]
    pub tag_mappings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CategoryRow {
    pub id: String,
    pub collection: String,
    pub primary: Vec<String>,
    #[serde(default)]
    pub secondary: Vec<String>,
}

fn default_data_dir() -> String {
    DEFAULT_DATA_DIR.to_string()
}

fn default_notes_placeholder() -> String {
    DEFAULT_NOTES_PLACEHOLDER.to_string()
}

fn default_name_placeholder() -> String {
    DEFAULT_NAME_PLACEHOLDER.to_string()
}

impl CatalogConfig {
    /// The catalog compiled into the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG, BUILTIN_CATALOG_PATH)
    }

    pub fn parse(text: &str, origin: &str) -> Result<Self, CatalogError> {
        toml::from_str(text).map_err(|source| CatalogError::ParseToml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded catalog configuration");
        Self::parse(&text, &path.display().to_string())
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// Validate and freeze the configuration.
    pub fn into_catalog(self) -> Result<Catalog, CatalogError> {
        if self.schema != CATALOG_SCHEMA {
            return Err(CatalogError::Invalid(format!(
                "unsupported catalog schema {} (expected {CATALOG_SCHEMA})",
                self.schema
            )));
        }
        if self.data_dir.trim().is_empty() {
            return Err(CatalogError::Invalid("data_dir must be non-empty".to_string()));
        }
        if self.notes_placeholder.trim().is_empty() {
            return Err(CatalogError::Invalid(
                "notes_placeholder must be non-empty".to_string(),
            ));
        }
        if self.name_placeholder.trim().is_empty() {
            return Err(CatalogError::Invalid(
                "name_placeholder must be non-empty".to_string(),
            ));
        }

        let languages = LanguageRegistry::new(self.languages)?;
        let categories = self
            .categories
            .into_iter()
            .map(|row| Category {
                id: row.id.trim().to_string(),
                collection: row.collection.trim().to_string(),
                primary: trimmed_set(row.primary),
                secondary: trimmed_set(row.secondary),
            })
            .collect::<Vec<_>>();
        if categories.is_empty() {
            return Err(CatalogError::Invalid(
                "at least one category is required".to_string(),
            ));
        }
        let mappings = self
            .tag_mappings
            .into_iter()
            .map(|(legacy, canonical)| (legacy.trim().to_string(), canonical.trim().to_string()))
            .collect();
        let vocabulary = VocabularyRegistry::new(categories, mappings)?;

        Ok(Catalog {
            vocabulary,
            languages,
            data_dir: PathBuf::from(self.data_dir),
            notes_placeholder: self.notes_placeholder,
            name_placeholder: self.name_placeholder,
        })
    }
}

fn trimmed_set(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter().map(|tag| tag.trim().to_string()).collect()
}

/// Frozen configuration shared by the checker, normalizer and reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub vocabulary: VocabularyRegistry,
    pub languages: LanguageRegistry,
    /// Collection directory, relative to the repository root unless absolute.
    pub data_dir: PathBuf,
    pub notes_placeholder: String,
    pub name_placeholder: String,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        CatalogConfig::builtin()?.into_catalog()
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, CatalogError> {
        CatalogConfig::load_or_builtin(path)?.into_catalog()
    }

    /// Path of a category's collection file under `root`.
    pub fn collection_path(&self, root: &Path, category: &Category) -> PathBuf {
        root.join(&self.data_dir).join(&category.collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
schema = 1
languages = ["tamil", "hindi"]

[[categories]]
id = "spices"
collection = "spices.json"
primary = ["spice"]
"#;

    #[test]
    fn minimal_document_uses_defaults() {
        let catalog = CatalogConfig::parse(MINIMAL, "minimal.toml")
            .and_then(CatalogConfig::into_catalog)
            .expect("minimal catalog should load");
        assert_eq!(catalog.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(catalog.notes_placeholder, DEFAULT_NOTES_PLACEHOLDER);
        assert_eq!(catalog.name_placeholder, DEFAULT_NAME_PLACEHOLDER);
        assert_eq!(catalog.languages.len(), 2);
        assert!(catalog.vocabulary.mappings().is_empty());
    }

    #[test]
    fn rejects_unknown_schema() {
        let text = MINIMAL.replace("schema = 1", "schema = 2");
        let result = CatalogConfig::parse(&text, "schema.toml").and_then(|c| c.into_catalog());
        assert!(matches!(
            result,
            Err(CatalogError::Invalid(message)) if message.contains("schema")
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let text = format!("{MINIMAL}\nextra = true\n");
        assert!(matches!(
            CatalogConfig::parse(&text, "extra.toml"),
            Err(CatalogError::ParseToml { .. })
        ));
    }

    #[test]
    fn collection_path_joins_root_and_data_dir() {
        let catalog = CatalogConfig::parse(MINIMAL, "minimal.toml")
            .and_then(CatalogConfig::into_catalog)
            .expect("minimal catalog should load");
        let spices = catalog
            .vocabulary
            .category("spices")
            .expect("spices exists");
        assert_eq!(
            catalog.collection_path(Path::new("/site"), spices),
            PathBuf::from("/site/data/spices.json")
        );
    }
}
