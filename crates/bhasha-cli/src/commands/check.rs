use crate::cli::TargetArgs;
use crate::support::{EXIT_FAILED, print_json_or_exit, resolve_target_or_exit};
use bhasha_records::{
    CategoryReport, FsPhotoProbe, IntegrityRun, RecordValidator, Severity, ValidateOptions,
    check_catalog,
};
use serde_json::json;
use std::fmt::Write as _;

pub fn run(args: TargetArgs, skip_images: bool) {
    let target = resolve_target_or_exit(args);
    let probe = FsPhotoProbe::new(&target.root);
    let validator = RecordValidator::from_catalog(&target.catalog, &probe);
    let categories = target.categories();
    let run = check_catalog(
        &target.catalog,
        &validator,
        &target.root,
        &categories,
        ValidateOptions { skip_images },
    );

    if target.json {
        let payload = json!({
            "schema": 1,
            "checkKind": run.check_kind,
            "root": target.root.display().to_string(),
            "skipImages": skip_images,
            "result": run.result,
            "categories": run.categories,
            "summary": run.summary,
        });
        print_json_or_exit(&payload, "check");
    } else {
        print!("{}", render_run(&run));
    }

    if !run.accepted() {
        std::process::exit(EXIT_FAILED);
    }
}

pub fn render_category(report: &CategoryReport) -> String {
    let mut out = String::new();
    let collection_failed = report.findings.iter().any(|f| f.index.is_none());
    if collection_failed {
        let _ = writeln!(out, "Checking {}...", report.collection);
    } else {
        let _ = writeln!(
            out,
            "Checking {} ({} entries)...",
            report.collection, report.summary.record_count
        );
    }
    for finding in &report.findings {
        let tag = match finding.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        let _ = writeln!(out, "  {tag} [{}] {}", finding.record, finding.message);
    }
    let _ = writeln!(
        out,
        "Summary for {}: {} Errors, {} Warnings",
        report.collection, report.summary.error_count, report.summary.warning_count
    );
    out
}

pub fn render_run(run: &IntegrityRun) -> String {
    let mut out = String::new();
    for report in &run.categories {
        out.push_str(&render_category(report));
    }
    if run.accepted() {
        out.push_str("\nAll checks passed!\n");
    } else {
        out.push_str("\nIntegrity checks failed.\n");
    }
    out
}
