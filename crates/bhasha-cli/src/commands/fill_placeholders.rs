use crate::cli::TargetArgs;
use crate::support::{EXIT_FAILED, print_json_or_exit, resolve_target_or_exit};
use bhasha_records::{CollectionError, fill_language_placeholders, read_collection, write_collection};
use serde_json::json;
use std::path::Path;

const CHECK_KIND: &str = "bhasha.fill_placeholders.v1";

pub fn run(args: TargetArgs, dry_run: bool) {
    let target = resolve_target_or_exit(args);
    let placeholder = target.catalog.name_placeholder.as_str();

    let mut rows = Vec::new();
    let mut failed = false;
    for category in target.categories() {
        let path = target.collection_path(category);
        let collection = target.display_path(&path);
        match fill_file(&path, &target.catalog.languages, placeholder, dry_run) {
            Ok(modified) => {
                if !target.json {
                    let verb = if dry_run { "Would update" } else { "Updated" };
                    println!("{verb} {modified} items in {collection}");
                }
                rows.push(json!({
                    "category": category.id,
                    "collection": collection,
                    "modifiedCount": modified,
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
            "dryRun": dry_run,
            "placeholder": placeholder,
            "result": if failed { "rejected" } else { "accepted" },
            "categories": rows,
        });
        print_json_or_exit(&payload, "fill-placeholders");
    }

    if failed {
        std::process::exit(EXIT_FAILED);
    }
}

fn fill_file(
    path: &Path,
    languages: &bhasha_vocab::LanguageRegistry,
    placeholder: &str,
    dry_run: bool,
) -> Result<usize, CollectionError> {
    let mut records = read_collection(path)?;
    let modified = fill_language_placeholders(&mut records, languages, placeholder);
    if modified > 0 && !dry_run {
        write_collection(path, &records)?;
    }
    Ok(modified)
}
