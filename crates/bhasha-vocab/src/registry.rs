//! Vocabulary registry: legal tag sets per category and the global
//! legacy-tag mapping table.
//!
//! Mapping is category-agnostic, legality is not. `canonicalize` applies the
//! mapping and then checks the result against the target category, so a
//! mapped tag that the category cannot hold is dropped rather than coerced.

use crate::error::CatalogError;
use std::collections::{BTreeMap, BTreeSet};

/// One dataset partition with its own collection file and tag vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: String,
    pub collection: String,
    pub primary: BTreeSet<String>,
    /// Reserved tier, empty in the shipped catalog.
    pub secondary: BTreeSet<String>,
}

impl Category {
    pub fn is_legal(&self, tag: &str) -> bool {
        self.primary.contains(tag) || self.secondary.contains(tag)
    }

    /// Union of both tiers.
    pub fn legal_tags(&self) -> BTreeSet<&str> {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Immutable tag vocabulary for every configured category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRegistry {
    categories: Vec<Category>,
    mappings: BTreeMap<String, String>,
}

impl VocabularyRegistry {
    /// Build a registry, rejecting overlapping vocabularies and duplicate
    /// category ids or collection files.
    pub fn new(
        categories: Vec<Category>,
        mappings: BTreeMap<String, String>,
    ) -> Result<Self, CatalogError> {
        let mut ids = BTreeSet::new();
        let mut collections = BTreeSet::new();
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();

        for category in &categories {
            if category.id.trim().is_empty() {
                return Err(CatalogError::Invalid(
                    "category ids must be non-empty".to_string(),
                ));
            }
            if category.collection.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "category `{}` has an empty collection file name",
                    category.id
                )));
            }
            if !ids.insert(category.id.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate category id `{}`",
                    category.id
                )));
            }
            if !collections.insert(category.collection.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "collection `{}` is claimed by more than one category",
                    category.collection
                )));
            }
            if category.primary.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "category `{}` has no primary tags",
                    category.id
                )));
            }
            for tag in category.legal_tags() {
                if tag.trim().is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "category `{}` declares a blank tag",
                        category.id
                    )));
                }
                if let Some(owner) = owners.insert(tag, &category.id)
                    && owner != category.id
                {
                    return Err(CatalogError::Invalid(format!(
                        "tag `{tag}` is legal in both `{owner}` and `{}`",
                        category.id
                    )));
                }
            }
        }

        for (legacy, canonical) in &mappings {
            if legacy.trim().is_empty() || canonical.trim().is_empty() {
                return Err(CatalogError::Invalid(
                    "tag mappings must have non-empty keys and values".to_string(),
                ));
            }
            if !owners.contains_key(canonical.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "mapping `{legacy}` -> `{canonical}` targets a tag no category accepts"
                )));
            }
        }

        Ok(Self {
            categories,
            mappings,
        })
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn category_for_collection(&self, collection: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|category| category.collection == collection)
    }

    pub fn category_ids(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|category| category.id.as_str())
    }

    pub fn legal_tags(&self, category_id: &str) -> Option<BTreeSet<&str>> {
        self.category(category_id).map(Category::legal_tags)
    }

    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    /// Apply the global mapping table; unmapped tags pass through unchanged.
    pub fn map_tag<'a>(&'a self, tag: &'a str) -> &'a str {
        self.mappings.get(tag).map(String::as_str).unwrap_or(tag)
    }

    /// Canonical form of `tag` within `category`, or `None` when the category
    /// has no legal tag for it. Tags already legal are never remapped.
    pub fn canonicalize(&self, category: &Category, tag: &str) -> Option<String> {
        let tag = tag.trim();
        if category.is_legal(tag) {
            return Some(tag.to_string());
        }
        let mapped = self.map_tag(tag);
        category.is_legal(mapped).then(|| mapped.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, primary: &[&str]) -> Category {
        Category {
            id: id.to_string(),
            collection: format!("{id}.json"),
            primary: primary.iter().map(|tag| tag.to_string()).collect(),
            secondary: BTreeSet::new(),
        }
    }

    fn registry() -> VocabularyRegistry {
        let mappings = [("grain", "cereal"), ("dal", "pulse"), ("herb", "leafy")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        VocabularyRegistry::new(
            vec![
                category("grains-pulses", &["cereal", "pulse", "millet"]),
                category("vegetables-fruits", &["fruit", "leafy", "root", "vegetable"]),
            ],
            mappings,
        )
        .expect("registry should build")
    }

    #[test]
    fn canonicalize_maps_into_target_category() {
        let registry = registry();
        let grains = registry.category("grains-pulses").expect("grains exists");
        assert_eq!(registry.canonicalize(grains, "grain").as_deref(), Some("cereal"));
        assert_eq!(registry.canonicalize(grains, "pulse").as_deref(), Some("pulse"));
        assert_eq!(registry.canonicalize(grains, "spice"), None);
    }

    #[test]
    fn mapped_tag_outside_category_is_dropped() {
        let registry = registry();
        let grains = registry.category("grains-pulses").expect("grains exists");
        // herb -> leafy is only legal for vegetables-fruits.
        assert_eq!(registry.canonicalize(grains, "herb"), None);
        let vegetables = registry
            .category("vegetables-fruits")
            .expect("vegetables exists");
        assert_eq!(
            registry.canonicalize(vegetables, "herb").as_deref(),
            Some("leafy")
        );
    }

    #[test]
    fn rejects_overlapping_vocabularies() {
        let result = VocabularyRegistry::new(
            vec![category("a", &["sea"]), category("b", &["sea"])],
            BTreeMap::new(),
        );
        assert!(matches!(
            result,
            Err(CatalogError::Invalid(message)) if message.contains("legal in both")
        ));
    }

    #[test]
    fn rejects_mapping_to_unknown_tag() {
        let mappings = BTreeMap::from([("grain".to_string(), "wheat".to_string())]);
        let result = VocabularyRegistry::new(vec![category("a", &["cereal"])], mappings);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty_primary_tier() {
        let result = VocabularyRegistry::new(vec![category("a", &[])], BTreeMap::new());
        assert!(result.is_err());
    }

    #[test]
    fn lookup_by_collection() {
        let registry = registry();
        assert_eq!(
            registry
                .category_for_collection("grains-pulses.json")
                .map(|category| category.id.as_str()),
            Some("grains-pulses")
        );
        assert!(registry.category_for_collection("spices.json").is_none());
    }
}
