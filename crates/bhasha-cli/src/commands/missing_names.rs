use crate::cli::TargetArgs;
use crate::support::{EXIT_FAILED, EXIT_USAGE, print_json_or_exit, resolve_target_or_exit};
use bhasha_records::{MissingName, missing_names, read_collection};
use serde_json::json;

const CHECK_KIND: &str = "bhasha.missing_names.v1";

pub fn run(args: TargetArgs, language: String) {
    let target = resolve_target_or_exit(args);
    let language = language.trim().to_lowercase();
    if !target.catalog.languages.contains(&language) {
        let known: Vec<&str> = target.catalog.languages.iter().collect();
        eprintln!(
            "error: unsupported language `{language}` (supported: {})",
            known.join(", ")
        );
        std::process::exit(EXIT_USAGE);
    }
    let placeholder = target.catalog.name_placeholder.as_str();

    if !target.json {
        println!("Searching for missing '{language}' entries...");
    }
    let mut rows = Vec::new();
    let mut total = 0;
    let mut failed = false;
    for category in target.categories() {
        let path = target.collection_path(category);
        let collection = target.display_path(&path);
        match read_collection(&path) {
            Ok(records) => {
                let missing = missing_names(&records, &language, placeholder);
                total += missing.len();
                if !target.json {
                    for entry in &missing {
                        println!("{}", render_missing(&collection, entry));
                    }
                }
                rows.push(json!({
                    "category": category.id,
                    "collection": collection,
                    "missing": missing,
                }));
            }
            Err(error) => {
                failed = true;
                if !target.json {
                    println!("ERROR {error}");
                }
                rows.push(json!({
                    "category": category.id,
                    "collection": collection,
                    "error": error.to_string(),
                }));
            }
        }
    }

    if target.json {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "language": language,
            "result": if failed { "rejected" } else { "accepted" },
            "total": total,
            "categories": rows,
        });
        print_json_or_exit(&payload, "missing-names");
    } else {
        println!("\nTotal items missing {language}: {total}");
    }

    if failed {
        std::process::exit(EXIT_FAILED);
    }
}

fn render_missing(collection: &str, entry: &MissingName) -> String {
    let english = entry.english.as_deref().unwrap_or("?");
    format!("[{collection}] Missing: {english} ({})", entry.id)
}
