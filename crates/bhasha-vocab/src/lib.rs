//! # bhasha-vocab
//!
//! Catalog configuration for the FoodBhasha dataset:
//! - `VocabularyRegistry`: legal tag set per category plus the global
//!   legacy-tag mapping table
//! - `LanguageRegistry`: the ordered supported-language keys
//! - `Catalog`: both of the above plus placeholders and the data directory,
//!   loaded from TOML (or the built-in document) once at startup
//!
//! Nothing here reads record collections. Consumers take the registries by
//! reference so tests can substitute their own configuration.

pub mod config;
pub mod error;
pub mod languages;
pub mod registry;

pub use config::{
    CATALOG_SCHEMA, Catalog, CatalogConfig, CategoryRow, DEFAULT_DATA_DIR,
    DEFAULT_NAME_PLACEHOLDER, DEFAULT_NOTES_PLACEHOLDER,
};
pub use error::CatalogError;
pub use languages::{ENGLISH_KEY, LanguageRegistry};
pub use registry::{Category, VocabularyRegistry};
