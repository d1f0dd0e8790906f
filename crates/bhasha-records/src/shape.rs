//! Record shape: a single pass over one raw JSON record that classifies
//! every field the checker cares about.
//!
//! Shape classification never fails on a field. A field that is absent or of
//! the wrong type is recorded as `Field::Missing` / `Field::Malformed` so the
//! checker can still run every other check on the same record. Only a record
//! that is not a JSON object at all is a `ShapeError`.

use bhasha_vocab::ENGLISH_KEY;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const ID_KEY: &str = "id";
pub const PHOTO_KEY: &str = "photo";
pub const TAGS_KEY: &str = "tags";
pub const LEGACY_CATEGORY_KEY: &str = "category";
pub const SCIENTIFIC_NAME_KEY: &str = "scientificName";
pub const NOTES_KEY: &str = "notes";
pub const NAMES_KEY: &str = "names";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    Missing,
    Malformed { expected: &'static str },
    Present(T),
}

impl<T> Field<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("record must be a JSON object, found {found}")]
    NotObject { found: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesShape {
    Absent,
    /// Null, whitespace, or an empty/false non-string value.
    Blank,
    Placeholder,
    /// A non-empty value that is not free text (list, object, number, `true`).
    NotText,
    Written,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageEntry {
    NotList,
    List { len: usize, placeholder: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamesShape {
    pub english: bool,
    /// Every non-English key present on the record.
    pub languages: BTreeMap<String, LanguageEntry>,
}

/// Sentinel values that mean "intentionally left unfilled".
#[derive(Debug, Clone, Copy)]
pub struct Placeholders<'a> {
    pub notes: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    pub id: Field<String>,
    pub photo: Field<String>,
    pub legacy_category: bool,
    pub tags: Field<Vec<String>>,
    pub scientific_name: Field<String>,
    pub notes: NotesShape,
    pub names: Field<NamesShape>,
}

impl RecordShape {
    pub fn from_value(value: &Value, placeholders: Placeholders<'_>) -> Result<Self, ShapeError> {
        let Value::Object(record) = value else {
            return Err(ShapeError::NotObject {
                found: json_kind(value),
            });
        };
        Ok(Self {
            id: non_blank_string(record.get(ID_KEY)),
            photo: non_blank_string(record.get(PHOTO_KEY)),
            legacy_category: record.contains_key(LEGACY_CATEGORY_KEY),
            tags: tags_field(record.get(TAGS_KEY)),
            scientific_name: non_blank_string(record.get(SCIENTIFIC_NAME_KEY)),
            notes: notes_shape(record.get(NOTES_KEY), placeholders.notes),
            names: names_field(record.get(NAMES_KEY), placeholders.name),
        })
    }

    /// Label used in findings: the id when usable, else the position.
    pub fn label(&self, index: usize) -> String {
        match &self.id {
            Field::Present(id) => id.clone(),
            _ => unknown_label(index),
        }
    }
}

pub fn unknown_label(index: usize) -> String {
    format!("unknown_index_{index}")
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_blank_string(value: Option<&Value>) -> Field<String> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::String(text)) if text.trim().is_empty() => Field::Missing,
        Some(Value::String(text)) => Field::Present(text.clone()),
        Some(_) => Field::Malformed { expected: "string" },
    }
}

fn tags_field(value: Option<&Value>) -> Field<Vec<String>> {
    match value {
        None => Field::Missing,
        Some(Value::Array(items)) => Field::Present(items.iter().map(tag_text).collect()),
        Some(_) => Field::Malformed { expected: "list" },
    }
}

/// Non-string tags are kept as their JSON text so they surface as unknown.
fn tag_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn notes_shape(value: Option<&Value>, placeholder: &str) -> NotesShape {
    let text = match value {
        None => return NotesShape::Absent,
        Some(Value::String(text)) => text.trim(),
        Some(Value::Null | Value::Bool(false)) => return NotesShape::Blank,
        Some(Value::Array(items)) if items.is_empty() => return NotesShape::Blank,
        Some(Value::Object(fields)) if fields.is_empty() => return NotesShape::Blank,
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => return NotesShape::Blank,
        Some(_) => return NotesShape::NotText,
    };
    if text.is_empty() {
        NotesShape::Blank
    } else if text == placeholder.trim() {
        NotesShape::Placeholder
    } else {
        NotesShape::Written
    }
}

fn names_field(value: Option<&Value>, name_placeholder: &str) -> Field<NamesShape> {
    match value {
        None | Some(Value::Null) => Field::Missing,
        Some(Value::Object(names)) if names.is_empty() => Field::Missing,
        Some(Value::Object(names)) => Field::Present(names_shape(names, name_placeholder)),
        Some(_) => Field::Malformed { expected: "object" },
    }
}

fn names_shape(names: &Map<String, Value>, name_placeholder: &str) -> NamesShape {
    let english = names.get(ENGLISH_KEY).is_some_and(english_is_present);
    let languages = names
        .iter()
        .filter(|(key, _)| key.as_str() != ENGLISH_KEY)
        .map(|(key, entry)| (key.clone(), language_entry(entry, name_placeholder)))
        .collect();
    NamesShape { english, languages }
}

fn english_is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn language_entry(value: &Value, name_placeholder: &str) -> LanguageEntry {
    match value {
        Value::Array(items) => LanguageEntry::List {
            len: items.len(),
            placeholder: items.len() == 1 && items[0].as_str() == Some(name_placeholder),
        },
        _ => LanguageEntry::NotList,
    }
}
