use crate::cli::TargetArgs;
use crate::support::{EXIT_FAILED, print_json_or_exit, resolve_target_or_exit};
use bhasha_records::{TagAnomaly, TagNormalizer};
use serde::Serialize;
use serde_json::json;

const CHECK_KIND: &str = "bhasha.clean_tags.v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CleanRow {
    category: String,
    collection: String,
    allowed: Vec<String>,
    modified_count: usize,
    migrated_count: usize,
    anomalies: Vec<TagAnomaly>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CleanRow {
    fn failed(&self) -> bool {
        self.error.is_some() || !self.anomalies.is_empty()
    }
}

pub fn run(args: TargetArgs, dry_run: bool) {
    let target = resolve_target_or_exit(args);
    let normalizer = TagNormalizer::new(&target.catalog.vocabulary);

    let mut rows = Vec::new();
    for category in target.categories() {
        let path = target.collection_path(category);
        let mut row = CleanRow {
            category: category.id.clone(),
            collection: target.display_path(&path),
            allowed: category.legal_tags().into_iter().map(str::to_string).collect(),
            modified_count: 0,
            migrated_count: 0,
            anomalies: Vec::new(),
            error: None,
        };
        match normalizer.normalize_file(&category.id, &path, dry_run) {
            Ok(outcome) => {
                row.modified_count = outcome.modified_count;
                row.migrated_count = outcome.migrated_count;
                row.anomalies = outcome.anomalies;
            }
            Err(error) => {
                tracing::warn!(category = %category.id, %error, "clean-tags skipped collection");
                row.error = Some(error.to_string());
            }
        }
        rows.push(row);
    }

    let failed = rows.iter().any(CleanRow::failed);
    if target.json {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "dryRun": dry_run,
            "result": if failed { "rejected" } else { "accepted" },
            "categories": rows,
        });
        print_json_or_exit(&payload, "clean-tags");
    } else {
        for row in &rows {
            print_row(row, dry_run);
        }
    }

    if failed {
        std::process::exit(EXIT_FAILED);
    }
}

fn print_row(row: &CleanRow, dry_run: bool) {
    println!(
        "Cleaning {} (allowed: {})...",
        row.collection,
        row.allowed.join(", ")
    );
    if let Some(error) = &row.error {
        println!("  ERROR {error}");
        return;
    }
    let verb = if dry_run { "Would update" } else { "Updated" };
    println!(
        "  {verb} {} items ({} migrated from 'category').",
        row.modified_count, row.migrated_count
    );
    for anomaly in &row.anomalies {
        let original: Vec<String> = anomaly
            .original_tags
            .iter()
            .map(|tag| tag.to_string())
            .collect();
        println!(
            "  ANOMALY [{}] no legal tag for [{}]; tags left empty, needs a category decision",
            anomaly.record,
            original.join(", ")
        );
    }
}
