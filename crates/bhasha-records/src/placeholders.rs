//! Fill unfilled language entries with the name placeholder.
//!
//! After a fill every supported language key exists, so the checker's
//! "missing key" warnings turn into explicit `["-"]` entries that editors
//! can search for.

use crate::shape::NAMES_KEY;
use bhasha_vocab::LanguageRegistry;
use serde_json::{Map, Value};

/// Returns the number of records that changed. Records whose `names` is
/// present but not an object are left for the checker to report.
pub fn fill_language_placeholders(
    records: &mut [Value],
    languages: &LanguageRegistry,
    placeholder: &str,
) -> usize {
    let mut modified = 0;
    for value in records.iter_mut() {
        let Value::Object(record) = value else {
            continue;
        };
        let mut changed = false;
        let names = record
            .entry(NAMES_KEY)
            .or_insert_with(|| {
                changed = true;
                Value::Object(Map::new())
            });
        if names.is_null() {
            *names = Value::Object(Map::new());
            changed = true;
        }
        let Value::Object(names) = names else {
            continue;
        };
        for language in languages.iter() {
            let unfilled = match names.get(language) {
                None | Some(Value::Null) => true,
                Some(Value::Array(items)) => items.is_empty(),
                Some(Value::String(text)) => text.trim().is_empty(),
                Some(_) => false,
            };
            if unfilled {
                names.insert(
                    language.to_string(),
                    Value::Array(vec![Value::String(placeholder.to_string())]),
                );
                changed = true;
            }
        }
        if changed {
            modified += 1;
        }
    }
    tracing::debug!(modified, "filled language placeholders");
    modified
}
