//! Tag normalization and the `category` -> `tags` migration.
//!
//! Each record's working tags (the legacy `category` value when present,
//! otherwise `tags`) are canonicalized against the target category, then
//! deduplicated and sorted. Records whose tags all drop out are reported as
//! anomalies and left with an empty list; no default tag is invented.

use crate::collection::{CollectionError, read_collection, write_collection};
use crate::shape::{ID_KEY, LEGACY_CATEGORY_KEY, TAGS_KEY, unknown_label};
use bhasha_vocab::VocabularyRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// A record whose non-empty tag source normalized to nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TagAnomaly {
    pub index: usize,
    pub record: String,
    pub original_tags: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOutcome {
    pub category: String,
    pub records: Vec<Value>,
    /// Records whose final tag list differs from their prior `tags`.
    pub modified_count: usize,
    /// Records that carried the deprecated `category` field.
    pub migrated_count: usize,
    pub anomalies: Vec<TagAnomaly>,
}

impl NormalizeOutcome {
    /// Whether the rewritten collection differs from the input.
    pub fn changed(&self) -> bool {
        self.modified_count > 0 || self.migrated_count > 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("category `{0}` is not configured")]
    UnknownCategory(String),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

pub struct TagNormalizer<'a> {
    vocabulary: &'a VocabularyRegistry,
}

impl<'a> TagNormalizer<'a> {
    pub fn new(vocabulary: &'a VocabularyRegistry) -> Self {
        Self { vocabulary }
    }

    pub fn normalize(
        &self,
        category_id: &str,
        mut records: Vec<Value>,
    ) -> Result<NormalizeOutcome, NormalizeError> {
        let category = self
            .vocabulary
            .category(category_id)
            .ok_or_else(|| NormalizeError::UnknownCategory(category_id.to_string()))?;

        let mut modified_count = 0;
        let mut migrated_count = 0;
        let mut anomalies = Vec::new();

        for (index, value) in records.iter_mut().enumerate() {
            // Non-object records are left for the checker to report.
            let Value::Object(record) = value else {
                continue;
            };

            let before = record
                .get(TAGS_KEY)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let (source, migrated) = match record.shift_remove(LEGACY_CATEGORY_KEY) {
                Some(legacy) => (legacy, true),
                None => (before.clone(), false),
            };
            let entries = tag_entries(source);

            let surviving: BTreeSet<String> = entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|tag| self.vocabulary.canonicalize(category, tag))
                .collect();
            let after = Value::Array(surviving.into_iter().map(Value::String).collect());

            // An empty legacy value must not silently erase existing tags.
            let prior_entries = tag_entries(before.clone());
            if after.as_array().is_some_and(Vec::is_empty)
                && (!entries.is_empty() || !prior_entries.is_empty())
            {
                let label = record_label(record, index);
                tracing::warn!(
                    category = category_id,
                    record = %label,
                    "no legal tag survives normalization"
                );
                anomalies.push(TagAnomaly {
                    index,
                    record: label,
                    original_tags: if entries.is_empty() {
                        prior_entries
                    } else {
                        entries.clone()
                    },
                });
            }

            if migrated {
                migrated_count += 1;
            }
            if after != before {
                modified_count += 1;
            }
            if migrated || after != before {
                record.insert(TAGS_KEY.to_string(), after);
            }
        }

        tracing::debug!(
            category = category_id,
            modified = modified_count,
            migrated = migrated_count,
            anomalies = anomalies.len(),
            "normalized tags"
        );
        Ok(NormalizeOutcome {
            category: category.id.clone(),
            records,
            modified_count,
            migrated_count,
            anomalies,
        })
    }

    /// Read, normalize and rewrite one collection file. Nothing is written
    /// for a dry run or when no record changed.
    pub fn normalize_file(
        &self,
        category_id: &str,
        path: &Path,
        dry_run: bool,
    ) -> Result<NormalizeOutcome, NormalizeError> {
        let records = read_collection(path)?;
        let outcome = self.normalize(category_id, records)?;
        if outcome.changed() && !dry_run {
            write_collection(path, &outcome.records)?;
        }
        Ok(outcome)
    }
}

/// Legacy sources are not always lists: a bare string is one tag, null is
/// none, anything else is one unmappable entry.
fn tag_entries(source: Value) -> Vec<Value> {
    match source {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::String(text) if text.trim().is_empty() => Vec::new(),
        other => vec![other],
    }
}

fn record_label(record: &Map<String, Value>, index: usize) -> String {
    match record.get(ID_KEY).and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => unknown_label(index),
    }
}
