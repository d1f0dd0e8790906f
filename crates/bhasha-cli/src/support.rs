use crate::cli::TargetArgs;
use bhasha_vocab::{Catalog, Category};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "BHASHA_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

pub const EXIT_FAILED: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Diagnostics go to stderr so stdout stays a clean report (or JSON payload).
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Catalog, root and selected categories resolved from the shared flags.
pub struct Target {
    pub root: PathBuf,
    pub catalog: Catalog,
    pub category_ids: Vec<String>,
    pub json: bool,
}

impl Target {
    pub fn categories(&self) -> Vec<&Category> {
        self.category_ids
            .iter()
            .filter_map(|id| self.catalog.vocabulary.category(id))
            .collect()
    }

    pub fn collection_path(&self, category: &Category) -> PathBuf {
        self.catalog.collection_path(&self.root, category)
    }

    /// Path as shown in reports: relative to the root when possible.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

pub fn resolve_target_or_exit(args: TargetArgs) -> Target {
    let catalog = load_catalog_or_exit(args.config.as_deref());
    let category_ids = select_categories(&catalog, &args.categories).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    });
    Target {
        root: PathBuf::from(args.root),
        catalog,
        category_ids,
        json: args.json,
    }
}

fn load_catalog_or_exit(config: Option<&str>) -> Catalog {
    Catalog::load_or_builtin(config.map(Path::new)).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(EXIT_USAGE);
    })
}

/// Requested categories by id or collection file name, deduplicated, in
/// request order. No request means every configured category.
fn select_categories(catalog: &Catalog, requested: &[String]) -> Result<Vec<String>, String> {
    if requested.is_empty() {
        return Ok(catalog
            .vocabulary
            .category_ids()
            .map(str::to_string)
            .collect());
    }
    let mut selected: Vec<String> = Vec::new();
    for name in requested {
        let category = catalog
            .vocabulary
            .category(name)
            .or_else(|| catalog.vocabulary.category_for_collection(name))
            .ok_or_else(|| {
                let known: Vec<&str> = catalog.vocabulary.category_ids().collect();
                format!(
                    "unknown category `{name}` (known: {})",
                    known.join(", ")
                )
            })?;
        if !selected.contains(&category.id) {
            selected.push(category.id.clone());
        }
    }
    Ok(selected)
}

pub fn print_json_or_exit(payload: &impl Serialize, what: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        eprintln!("error: failed to render {what} payload: {error}");
        std::process::exit(EXIT_USAGE);
    });
    println!("{rendered}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::builtin().expect("built-in catalog should load")
    }

    #[test]
    fn no_request_selects_all_categories() {
        let selected = select_categories(&catalog(), &[]).expect("selection");
        assert_eq!(
            selected,
            vec!["fish-seafood", "vegetables-fruits", "grains-pulses", "spices"]
        );
    }

    #[test]
    fn accepts_ids_and_file_names_once_each() {
        let requested = vec![
            "spices.json".to_string(),
            "grains-pulses".to_string(),
            "spices".to_string(),
        ];
        let selected = select_categories(&catalog(), &requested).expect("selection");
        assert_eq!(selected, vec!["spices", "grains-pulses"]);
    }

    #[test]
    fn unknown_category_lists_known_ones() {
        let error = select_categories(&catalog(), &["dairy".to_string()])
            .expect_err("dairy is not configured");
        assert!(error.contains("unknown category `dairy`"));
        assert!(error.contains("fish-seafood"));
    }
}
