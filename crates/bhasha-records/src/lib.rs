//! # bhasha-records
//!
//! Record-collection layer for the FoodBhasha dataset.
//!
//! This crate provides:
//! - record shape classification (`shape`)
//! - collection file read/atomic write (`collection`)
//! - the integrity checker with error/warning findings (`validate`)
//! - tag normalization and `category` -> `tags` migration (`normalize`)
//! - maintenance helpers: language placeholders and coverage reports
//!
//! Vocabulary and language configuration are injected from `bhasha-vocab`;
//! nothing here reads a global table.
//!
//! ## Data flow
//!
//! ```text
//! <data_dir>/<category>.json  (JSON array of records)
//!     ↕  read_collection / write_collection
//! Vec<serde_json::Value>
//!     ├─ RecordValidator::validate  → CategoryReport (read-only)
//!     └─ TagNormalizer::normalize   → NormalizeOutcome (rewritten records)
//! ```

pub mod collection;
pub mod coverage;
pub mod normalize;
pub mod placeholders;
pub mod shape;
pub mod validate;

pub use collection::{CollectionError, read_collection, render_collection, write_collection};
pub use coverage::{
    CoverageReport, LanguageCoverage, MissingName, UNKNOWN_NAME_MARKER, coverage,
    language_is_filled, missing_names,
};
pub use normalize::{NormalizeError, NormalizeOutcome, TagAnomaly, TagNormalizer};
pub use placeholders::fill_language_placeholders;
pub use shape::{
    Field, LanguageEntry, NamesShape, NotesShape, Placeholders, RecordShape, ShapeError,
};
pub use validate::{
    CATEGORY_CHECK_KIND, CategoryReport, CategorySummary, FsPhotoProbe, Finding,
    INTEGRITY_CHECK_KIND, IntegrityRun, IntegritySummary, PhotoProbe, RecordValidator, Severity,
    ValidateOptions, check_catalog, check_category_file, class,
};
