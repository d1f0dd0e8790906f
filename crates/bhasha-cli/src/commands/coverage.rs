use crate::cli::TargetArgs;
use crate::support::{EXIT_FAILED, print_json_or_exit, resolve_target_or_exit};
use bhasha_records::{CoverageReport, LanguageCoverage, coverage, read_collection};
use serde_json::json;
use std::fmt::Write as _;

const CHECK_KIND: &str = "bhasha.coverage.v1";

pub fn run(args: TargetArgs) {
    let target = resolve_target_or_exit(args);
    let placeholder = target.catalog.name_placeholder.as_str();

    let mut reports = Vec::new();
    let mut errors = Vec::new();
    for category in target.categories() {
        let path = target.collection_path(category);
        match read_collection(&path) {
            Ok(records) => reports.push(coverage(
                &category.id,
                &records,
                &target.catalog.languages,
                placeholder,
            )),
            Err(error) => {
                tracing::warn!(category = %category.id, %error, "coverage skipped collection");
                errors.push(json!({
                    "category": category.id,
                    "collection": target.display_path(&path),
                    "error": error.to_string(),
                }));
            }
        }
    }

    let totals = CoverageReport::merge_languages(&reports);
    let failed = !errors.is_empty();
    if target.json {
        let payload = json!({
            "schema": 1,
            "checkKind": CHECK_KIND,
            "result": if failed { "rejected" } else { "accepted" },
            "categories": reports,
            "languages": totals,
            "errors": errors,
        });
        print_json_or_exit(&payload, "coverage");
    } else {
        print!("{}", render_coverage(&reports, &totals));
        for error in &errors {
            println!("ERROR {}", error["error"].as_str().unwrap_or_default());
        }
    }

    if failed {
        std::process::exit(EXIT_FAILED);
    }
}

/// Per-category summary lines followed by a markdown table of languages,
/// least covered first.
pub fn render_coverage(reports: &[CoverageReport], totals: &[LanguageCoverage]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(out, "## {}", report.category);
        let _ = writeln!(out, "- Items: {}", report.record_count);
        let _ = writeln!(
            out,
            "- Items with unfilled languages: {}",
            report.incomplete_records
        );
        let _ = writeln!(out, "- Coverage: {:.1}%", report.coverage_percent);
        out.push('\n');
    }

    let mut rows: Vec<&LanguageCoverage> = totals.iter().collect();
    rows.sort_by(|a, b| a.percent().total_cmp(&b.percent()));
    let _ = writeln!(out, "| Language | Filled | Missing | Coverage |");
    let _ = writeln!(out, "|---|---:|---:|---:|");
    for row in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.1}% |",
            row.language,
            row.filled,
            row.missing,
            row.percent()
        );
    }
    out
}
