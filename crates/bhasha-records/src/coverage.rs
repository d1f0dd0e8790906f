//! Language coverage: how many records carry a real name per language.

use crate::shape::{ID_KEY, NAMES_KEY, unknown_label};
use bhasha_vocab::{ENGLISH_KEY, LanguageRegistry};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Entry marker used by editors for "name not known".
pub const UNKNOWN_NAME_MARKER: &str = "?";

/// A language entry counts as filled when it is a list holding at least one
/// non-blank string other than a placeholder marker.
pub fn language_is_filled(entry: Option<&Value>, name_placeholder: &str) -> bool {
    let Some(Value::Array(items)) = entry else {
        return false;
    };
    items.iter().filter_map(Value::as_str).any(|name| {
        let name = name.trim();
        !name.is_empty() && name != name_placeholder && name != UNKNOWN_NAME_MARKER
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageCoverage {
    pub language: String,
    pub filled: usize,
    pub missing: usize,
}

impl LanguageCoverage {
    pub fn percent(&self) -> f64 {
        percent(self.filled, self.filled + self.missing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub category: String,
    pub record_count: usize,
    /// Records missing at least one supported language.
    pub incomplete_records: usize,
    pub languages: Vec<LanguageCoverage>,
    pub coverage_percent: f64,
}

impl CoverageReport {
    /// Fold several category reports into per-language totals, keeping the
    /// language order of the first report.
    pub fn merge_languages(reports: &[CoverageReport]) -> Vec<LanguageCoverage> {
        let mut totals: Vec<LanguageCoverage> = Vec::new();
        for report in reports {
            for row in &report.languages {
                match totals.iter_mut().find(|total| total.language == row.language) {
                    Some(total) => {
                        total.filled += row.filled;
                        total.missing += row.missing;
                    }
                    None => totals.push(row.clone()),
                }
            }
        }
        totals
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 100.0;
    }
    part as f64 * 100.0 / whole as f64
}

fn names_of(record: &Value) -> Option<&serde_json::Map<String, Value>> {
    record.get(NAMES_KEY).and_then(Value::as_object)
}

pub fn coverage(
    category: &str,
    records: &[Value],
    languages: &LanguageRegistry,
    name_placeholder: &str,
) -> CoverageReport {
    let mut rows: Vec<LanguageCoverage> = languages
        .iter()
        .map(|language| LanguageCoverage {
            language: language.to_string(),
            filled: 0,
            missing: 0,
        })
        .collect();
    let mut incomplete_records = 0;

    for record in records {
        let names = names_of(record);
        let mut incomplete = false;
        for row in rows.iter_mut() {
            let entry = names.and_then(|names| names.get(&row.language));
            if language_is_filled(entry, name_placeholder) {
                row.filled += 1;
            } else {
                row.missing += 1;
                incomplete = true;
            }
        }
        if incomplete {
            incomplete_records += 1;
        }
    }

    let filled: usize = rows.iter().map(|row| row.filled).sum();
    let coverage_percent = percent(filled, records.len() * languages.len());
    CoverageReport {
        category: category.to_string(),
        record_count: records.len(),
        incomplete_records,
        languages: rows,
        coverage_percent,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MissingName {
    pub index: usize,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english: Option<String>,
}

/// Records in `records` without a real name in `language`.
pub fn missing_names(records: &[Value], language: &str, name_placeholder: &str) -> Vec<MissingName> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            let entry = names_of(record).and_then(|names| names.get(language));
            !language_is_filled(entry, name_placeholder)
        })
        .map(|(index, record)| MissingName {
            index,
            id: record
                .get(ID_KEY)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| unknown_label(index)),
            english: names_of(record)
                .and_then(|names| names.get(ENGLISH_KEY))
                .and_then(english_display),
        })
        .collect()
}

fn english_display(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(Value::as_str).map(ToOwned::to_owned),
        _ => None,
    }
}
