//! Deterministic integrity checking of record collections.
//!
//! Every record runs the full battery (identity, photo, deprecated field,
//! tags, scientific name, notes, names) in that order. Errors reject the
//! category; warnings are advisory. The checker never mutates its input.

use crate::collection::{CollectionError, read_collection};
use crate::shape::{
    Field, LanguageEntry, NotesShape, Placeholders, RecordShape, ShapeError, unknown_label,
};
use bhasha_vocab::{Catalog, Category, LanguageRegistry, VocabularyRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub const CATEGORY_CHECK_KIND: &str = "bhasha.collection.check.v1";
pub const INTEGRITY_CHECK_KIND: &str = "bhasha.integrity.check.v1";

pub const RESULT_ACCEPTED: &str = "accepted";
pub const RESULT_REJECTED: &str = "rejected";

pub mod class {
    pub const COLLECTION_NOT_FOUND: &str = "collection.not_found";
    pub const COLLECTION_UNREADABLE: &str = "collection.unreadable";
    pub const COLLECTION_UNKNOWN_CATEGORY: &str = "collection.unknown_category";

    pub const RECORD_NOT_OBJECT: &str = "record.not_object";
    pub const ID_MISSING: &str = "record.id.missing";
    pub const ID_NOT_STRING: &str = "record.id.not_string";
    pub const ID_DUPLICATE: &str = "record.id.duplicate";
    pub const PHOTO_MISSING: &str = "record.photo.missing";
    pub const PHOTO_NOT_STRING: &str = "record.photo.not_string";
    pub const PHOTO_NOT_FOUND: &str = "record.photo.not_found";
    pub const CATEGORY_DEPRECATED: &str = "record.category.deprecated";
    pub const TAGS_MISSING: &str = "record.tags.missing";
    pub const TAGS_NOT_LIST: &str = "record.tags.not_list";
    pub const TAGS_EMPTY: &str = "record.tags.empty";
    pub const TAGS_UNKNOWN: &str = "record.tags.unknown";
    pub const SCIENTIFIC_NAME_MISSING: &str = "record.scientific_name.missing";
    pub const SCIENTIFIC_NAME_NOT_STRING: &str = "record.scientific_name.not_string";
    pub const NOTES_MISSING: &str = "record.notes.missing";
    pub const NOTES_EMPTY: &str = "record.notes.empty";
    pub const NOTES_PLACEHOLDER: &str = "record.notes.placeholder";
    pub const NOTES_NOT_STRING: &str = "record.notes.not_string";
    pub const NAMES_MISSING: &str = "record.names.missing";
    pub const NAMES_NOT_OBJECT: &str = "record.names.not_object";
    pub const NAMES_ENGLISH_MISSING: &str = "record.names.english_missing";
    pub const NAMES_LANGUAGE_MISSING: &str = "record.names.language_missing";
    pub const NAMES_LANGUAGE_NOT_LIST: &str = "record.names.language_not_list";
    pub const NAMES_LANGUAGE_ODD: &str = "record.names.language_odd";
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One reported error or warning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Position in the collection; `None` for collection-scoped findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub record: String,
    pub severity: Severity,
    pub class: String,
    pub message: String,
}

impl Finding {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub record_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryReport {
    pub check_kind: String,
    pub category: String,
    pub collection: String,
    pub result: String,
    pub failure_classes: Vec<String>,
    pub warning_classes: Vec<String>,
    pub findings: Vec<Finding>,
    pub summary: CategorySummary,
}

impl CategoryReport {
    fn from_findings(
        category: &str,
        collection: &str,
        record_count: usize,
        findings: Vec<Finding>,
    ) -> Self {
        let error_count = findings.iter().filter(|f| f.is_error()).count();
        let warning_count = findings.len() - error_count;
        let failure_classes = collect_classes(&findings, Severity::Error);
        let warning_classes = collect_classes(&findings, Severity::Warning);
        let result = if error_count == 0 {
            RESULT_ACCEPTED
        } else {
            RESULT_REJECTED
        };
        Self {
            check_kind: CATEGORY_CHECK_KIND.to_string(),
            category: category.to_string(),
            collection: collection.to_string(),
            result: result.to_string(),
            failure_classes,
            warning_classes,
            findings,
            summary: CategorySummary {
                record_count,
                error_count,
                warning_count,
            },
        }
    }

    /// A category that could not be checked at all.
    pub fn collection_failure(
        category: &str,
        collection: &str,
        class: &str,
        message: String,
    ) -> Self {
        let finding = Finding {
            index: None,
            record: collection.to_string(),
            severity: Severity::Error,
            class: class.to_string(),
            message,
        };
        Self::from_findings(category, collection, 0, vec![finding])
    }

    pub fn accepted(&self) -> bool {
        self.result == RESULT_ACCEPTED
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    /// `(errorCount, warningCount)`.
    pub fn counts(&self) -> (usize, usize) {
        (self.summary.error_count, self.summary.warning_count)
    }

    pub fn findings_of_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings.iter().filter(move |f| f.class == class)
    }
}

fn collect_classes(findings: &[Finding], severity: Severity) -> Vec<String> {
    findings
        .iter()
        .filter(|finding| finding.severity == severity)
        .map(|finding| finding.class.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegritySummary {
    pub category_count: usize,
    pub rejected_categories: Vec<String>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Aggregate over every requested category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityRun {
    pub check_kind: String,
    pub result: String,
    pub categories: Vec<CategoryReport>,
    pub summary: IntegritySummary,
}

impl IntegrityRun {
    pub fn from_reports(categories: Vec<CategoryReport>) -> Self {
        let rejected_categories: Vec<String> = categories
            .iter()
            .filter(|report| !report.accepted())
            .map(|report| report.category.clone())
            .collect();
        let summary = IntegritySummary {
            category_count: categories.len(),
            error_count: categories.iter().map(|r| r.summary.error_count).sum(),
            warning_count: categories.iter().map(|r| r.summary.warning_count).sum(),
            rejected_categories,
        };
        let result = if summary.rejected_categories.is_empty() {
            RESULT_ACCEPTED
        } else {
            RESULT_REJECTED
        };
        Self {
            check_kind: INTEGRITY_CHECK_KIND.to_string(),
            result: result.to_string(),
            categories,
            summary,
        }
    }

    pub fn accepted(&self) -> bool {
        self.result == RESULT_ACCEPTED
    }
}

/// Filesystem collaborator for photo references.
pub trait PhotoProbe {
    fn exists(&self, reference: &str) -> bool;
}

/// Resolves photo references against the site root. A leading `/` means
/// site-root relative, not filesystem absolute.
#[derive(Debug, Clone)]
pub struct FsPhotoProbe {
    root: PathBuf,
}

impl FsPhotoProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.root.join(reference.trim().trim_start_matches('/'))
    }
}

impl PhotoProbe for FsPhotoProbe {
    fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).is_file()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Omit the photo checks entirely.
    pub skip_images: bool,
}

pub struct RecordValidator<'a> {
    vocabulary: &'a VocabularyRegistry,
    languages: &'a LanguageRegistry,
    probe: &'a dyn PhotoProbe,
    placeholders: Placeholders<'a>,
}

impl<'a> RecordValidator<'a> {
    pub fn new(
        vocabulary: &'a VocabularyRegistry,
        languages: &'a LanguageRegistry,
        probe: &'a dyn PhotoProbe,
        placeholders: Placeholders<'a>,
    ) -> Self {
        Self {
            vocabulary,
            languages,
            probe,
            placeholders,
        }
    }

    pub fn from_catalog(catalog: &'a Catalog, probe: &'a dyn PhotoProbe) -> Self {
        Self::new(
            &catalog.vocabulary,
            &catalog.languages,
            probe,
            Placeholders {
                notes: &catalog.notes_placeholder,
                name: &catalog.name_placeholder,
            },
        )
    }

    /// Check one category's records. Duplicate-id tracking is scoped to
    /// this call.
    pub fn validate(
        &self,
        category_id: &str,
        records: &[Value],
        options: ValidateOptions,
    ) -> CategoryReport {
        let Some(category) = self.vocabulary.category(category_id) else {
            return CategoryReport::collection_failure(
                category_id,
                "",
                class::COLLECTION_UNKNOWN_CATEGORY,
                format!("category `{category_id}` is not configured"),
            );
        };

        let mut sink = FindingSink::default();
        let mut seen_ids = BTreeSet::new();
        for (index, value) in records.iter().enumerate() {
            match RecordShape::from_value(value, self.placeholders) {
                Ok(record) => {
                    self.check_record(category, index, &record, &mut seen_ids, options, &mut sink)
                }
                Err(ShapeError::NotObject { found }) => sink.error(
                    index,
                    &unknown_label(index),
                    class::RECORD_NOT_OBJECT,
                    format!("Record must be an object, found {found}"),
                ),
            }
        }
        tracing::debug!(
            category = category_id,
            records = records.len(),
            findings = sink.findings.len(),
            "validated collection"
        );
        CategoryReport::from_findings(
            &category.id,
            &category.collection,
            records.len(),
            sink.findings,
        )
    }

    fn check_record(
        &self,
        category: &Category,
        index: usize,
        record: &RecordShape,
        seen_ids: &mut BTreeSet<String>,
        options: ValidateOptions,
        sink: &mut FindingSink,
    ) {
        let label = record.label(index);

        match &record.id {
            Field::Missing => sink.error(index, &label, class::ID_MISSING, "Missing 'id'"),
            Field::Malformed { expected } => sink.error(
                index,
                &label,
                class::ID_NOT_STRING,
                format!("'id' must be a {expected}"),
            ),
            Field::Present(id) => {
                if !seen_ids.insert(id.clone()) {
                    sink.error(index, &label, class::ID_DUPLICATE, "Duplicate ID");
                }
            }
        }

        if !options.skip_images {
            match &record.photo {
                Field::Missing => {
                    sink.error(index, &label, class::PHOTO_MISSING, "Missing 'photo' field")
                }
                Field::Malformed { expected } => sink.error(
                    index,
                    &label,
                    class::PHOTO_NOT_STRING,
                    format!("'photo' must be a {expected}"),
                ),
                Field::Present(photo) => {
                    if !self.probe.exists(photo) {
                        sink.error(
                            index,
                            &label,
                            class::PHOTO_NOT_FOUND,
                            format!("Image file not found: {photo}"),
                        );
                    }
                }
            }
        }

        if record.legacy_category {
            sink.error(
                index,
                &label,
                class::CATEGORY_DEPRECATED,
                "Found deprecated 'category' field. Rename to 'tags'.",
            );
        }

        match &record.tags {
            Field::Missing => sink.error(index, &label, class::TAGS_MISSING, "Missing 'tags' field"),
            Field::Malformed { .. } => {
                sink.error(index, &label, class::TAGS_NOT_LIST, "'tags' must be a list")
            }
            Field::Present(tags) if tags.is_empty() => {
                sink.error(index, &label, class::TAGS_EMPTY, "'tags' list is empty")
            }
            Field::Present(tags) => {
                for tag in tags.iter().filter(|tag| !category.is_legal(tag)) {
                    sink.warning(
                        index,
                        &label,
                        class::TAGS_UNKNOWN,
                        format!("Unknown tag: '{tag}'"),
                    );
                }
            }
        }

        match &record.scientific_name {
            Field::Missing => sink.error(
                index,
                &label,
                class::SCIENTIFIC_NAME_MISSING,
                "Missing 'scientificName'",
            ),
            Field::Malformed { expected } => sink.error(
                index,
                &label,
                class::SCIENTIFIC_NAME_NOT_STRING,
                format!("'scientificName' must be a {expected}"),
            ),
            Field::Present(_) => {}
        }

        match record.notes {
            NotesShape::Absent => {
                sink.warning(index, &label, class::NOTES_MISSING, "Missing 'notes' field")
            }
            NotesShape::Blank => {
                sink.warning(index, &label, class::NOTES_EMPTY, "Empty 'notes' field")
            }
            NotesShape::Placeholder => sink.warning(
                index,
                &label,
                class::NOTES_PLACEHOLDER,
                format!(
                    "Placeholder note detected: '{}'",
                    self.placeholders.notes.trim()
                ),
            ),
            NotesShape::NotText => sink.warning(
                index,
                &label,
                class::NOTES_NOT_STRING,
                "'notes' must be a string",
            ),
            NotesShape::Written => {}
        }

        let names = match &record.names {
            Field::Missing => {
                sink.error(index, &label, class::NAMES_MISSING, "Missing 'names' object");
                return;
            }
            Field::Malformed { expected } => {
                sink.error(
                    index,
                    &label,
                    class::NAMES_NOT_OBJECT,
                    format!("'names' must be an {expected}"),
                );
                return;
            }
            Field::Present(names) => names,
        };

        if !names.english {
            sink.error(
                index,
                &label,
                class::NAMES_ENGLISH_MISSING,
                "Missing English name",
            );
        }

        for language in self.languages.iter() {
            match names.languages.get(language) {
                None => sink.warning(
                    index,
                    &label,
                    class::NAMES_LANGUAGE_MISSING,
                    format!("Missing key for language: {language}"),
                ),
                Some(LanguageEntry::NotList) => sink.error(
                    index,
                    &label,
                    class::NAMES_LANGUAGE_NOT_LIST,
                    format!("{language} names must be a list"),
                ),
                Some(LanguageEntry::List { len, placeholder }) => {
                    if len % 2 != 0 && !placeholder {
                        sink.warning(
                            index,
                            &label,
                            class::NAMES_LANGUAGE_ODD,
                            format!(
                                "{language} has odd number of items ({len}). Expected pairs [Native, Romanized]."
                            ),
                        );
                    }
                }
            }
        }
    }
}

#[derive(Default)]
struct FindingSink {
    findings: Vec<Finding>,
}

impl FindingSink {
    fn push(
        &mut self,
        severity: Severity,
        index: usize,
        record: &str,
        class: &str,
        message: impl Into<String>,
    ) {
        self.findings.push(Finding {
            index: Some(index),
            record: record.to_string(),
            severity,
            class: class.to_string(),
            message: message.into(),
        });
    }

    fn error(&mut self, index: usize, record: &str, class: &str, message: impl Into<String>) {
        self.push(Severity::Error, index, record, class, message);
    }

    fn warning(&mut self, index: usize, record: &str, class: &str, message: impl Into<String>) {
        self.push(Severity::Warning, index, record, class, message);
    }
}

/// Read and check one category's collection file. A missing or unreadable
/// file rejects the category instead of skipping it.
pub fn check_category_file(
    validator: &RecordValidator<'_>,
    category: &Category,
    path: &Path,
    options: ValidateOptions,
) -> CategoryReport {
    tracing::debug!(category = %category.id, path = %path.display(), "checking collection");
    match read_collection(path) {
        Ok(records) => validator.validate(&category.id, &records, options),
        Err(CollectionError::NotFound(_)) => {
            tracing::warn!(path = %path.display(), "collection file not found");
            CategoryReport::collection_failure(
                &category.id,
                &category.collection,
                class::COLLECTION_NOT_FOUND,
                format!("File not found: {}", path.display()),
            )
        }
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "collection unreadable");
            CategoryReport::collection_failure(
                &category.id,
                &category.collection,
                class::COLLECTION_UNREADABLE,
                error.to_string(),
            )
        }
    }
}

/// Check every category in `categories` under `root`, in order.
pub fn check_catalog(
    catalog: &Catalog,
    validator: &RecordValidator<'_>,
    root: &Path,
    categories: &[&Category],
    options: ValidateOptions,
) -> IntegrityRun {
    let reports = categories
        .iter()
        .map(|category| {
            let path = catalog.collection_path(root, category);
            check_category_file(validator, category, &path, options)
        })
        .collect();
    IntegrityRun::from_reports(reports)
}
