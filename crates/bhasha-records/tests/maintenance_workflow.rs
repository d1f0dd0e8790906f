//! Integration tests: clean-tags followed by check over fixture collections.
//!
//! Fixtures in tests/fixtures/:
//! - grains-pulses.json: records needing mapping, migration, and one that
//!   cannot be represented in the grains vocabulary
//! - catalog-no-languages.toml: a substituted catalog without per-language checks

use bhasha_records::{
    CategoryReport, FsPhotoProbe, PhotoProbe, RecordValidator, TagNormalizer, ValidateOptions,
    check_catalog, class, read_collection,
};
use bhasha_vocab::{Catalog, CatalogConfig};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "bhasha-records-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

struct NoPhotos;

impl PhotoProbe for NoPhotos {
    fn exists(&self, _reference: &str) -> bool {
        false
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_records() -> Vec<Value> {
    read_collection(fixtures_dir().join("grains-pulses.json")).expect("fixture should load")
}

fn languageless_catalog() -> Catalog {
    CatalogConfig::load(fixtures_dir().join("catalog-no-languages.toml"))
        .and_then(CatalogConfig::into_catalog)
        .expect("fixture catalog should load")
}

fn builtin_catalog() -> Catalog {
    Catalog::builtin().expect("built-in catalog should load")
}

fn record<'a>(records: &'a [Value], id: &str) -> &'a Value {
    records
        .iter()
        .find(|record| record["id"] == id)
        .unwrap_or_else(|| panic!("fixture record {id} missing"))
}

fn findings_for<'a>(report: &'a CategoryReport, id: &str) -> Vec<&'a str> {
    report
        .findings
        .iter()
        .filter(|finding| finding.record == id)
        .map(|finding| finding.class.as_str())
        .collect()
}

#[test]
fn wheat_is_mapped_then_passes_with_a_single_notes_warning() {
    let catalog = languageless_catalog();
    let normalizer = TagNormalizer::new(&catalog.vocabulary);
    let outcome = normalizer
        .normalize("grains-pulses", vec![record(&fixture_records(), "wheat").clone()])
        .expect("normalize should succeed");
    assert_eq!(outcome.modified_count, 1);
    assert_eq!(outcome.records[0]["tags"], json!(["cereal"]));

    let validator = RecordValidator::from_catalog(&catalog, &NoPhotos);
    let skipped = validator.validate(
        "grains-pulses",
        &outcome.records,
        ValidateOptions { skip_images: true },
    );
    assert_eq!(skipped.counts(), (0, 1));
    assert_eq!(findings_for(&skipped, "wheat"), vec![class::NOTES_PLACEHOLDER]);

    let with_images =
        validator.validate("grains-pulses", &outcome.records, ValidateOptions::default());
    assert_eq!(with_images.counts(), (1, 1));
    assert_eq!(
        with_images.failure_classes,
        vec![class::PHOTO_MISSING.to_string()]
    );
}

#[test]
fn wheat_against_builtin_languages_warns_per_missing_language() {
    let catalog = builtin_catalog();
    let mut records = vec![record(&fixture_records(), "wheat").clone()];
    records[0]["tags"] = json!(["cereal"]);
    let validator = RecordValidator::from_catalog(&catalog, &NoPhotos);
    let report = validator.validate("grains-pulses", &records, ValidateOptions { skip_images: true });
    assert!(report.accepted());
    assert_eq!(report.findings_of_class(class::NAMES_LANGUAGE_MISSING).count(), 22);
    assert_eq!(report.summary.warning_count, 23);
}

#[test]
fn legacy_category_is_reported_then_migrated() {
    let catalog = languageless_catalog();
    let records = vec![record(&fixture_records(), "toor").clone()];
    let validator = RecordValidator::from_catalog(&catalog, &NoPhotos);
    let before = validator.validate("grains-pulses", &records, ValidateOptions { skip_images: true });
    assert_eq!(
        findings_for(&before, "toor"),
        vec![class::CATEGORY_DEPRECATED, class::TAGS_MISSING]
    );

    let outcome = TagNormalizer::new(&catalog.vocabulary)
        .normalize("grains-pulses", records)
        .expect("normalize should succeed");
    let migrated = outcome.records[0].as_object().expect("object");
    assert!(!migrated.contains_key("category"));
    assert_eq!(migrated["tags"], json!(["pulse"]));
    assert_eq!(outcome.migrated_count, 1);

    let after = validator.validate("grains-pulses", &outcome.records, ValidateOptions { skip_images: true });
    assert!(after.accepted());
}

#[test]
fn normalize_then_validate_leaves_no_unknown_tags() {
    let catalog = builtin_catalog();
    let outcome = TagNormalizer::new(&catalog.vocabulary)
        .normalize("grains-pulses", fixture_records())
        .expect("normalize should succeed");
    let validator = RecordValidator::from_catalog(&catalog, &NoPhotos);
    let report = validator.validate("grains-pulses", &outcome.records, ValidateOptions { skip_images: true });
    assert_eq!(report.findings_of_class(class::TAGS_UNKNOWN).count(), 0);

    // cumin has no legal grains tag: it surfaces as an anomaly and, after
    // the rewrite, as an empty-tags error rather than a guessed tag.
    assert_eq!(outcome.anomalies.len(), 1);
    assert_eq!(outcome.anomalies[0].record, "cumin");
    assert_eq!(findings_for(&report, "cumin")[0], class::TAGS_EMPTY);
}

#[test]
fn normalize_file_is_idempotent_on_disk() {
    let temp = TempDirGuard::new("idempotent");
    let path = temp.path().join("grains-pulses.json");
    fs::copy(fixtures_dir().join("grains-pulses.json"), &path).expect("fixture should copy");

    let catalog = builtin_catalog();
    let normalizer = TagNormalizer::new(&catalog.vocabulary);
    let first = normalizer
        .normalize_file("grains-pulses", &path, false)
        .expect("first pass should succeed");
    assert_eq!(first.modified_count, 3);
    let after_first = fs::read_to_string(&path).expect("collection should exist");

    let second = normalizer
        .normalize_file("grains-pulses", &path, false)
        .expect("second pass should succeed");
    assert_eq!(second.modified_count, 0);
    assert!(second.anomalies.is_empty());
    assert_eq!(fs::read_to_string(&path).expect("collection should exist"), after_first);
}

#[test]
fn clean_collection_keeps_its_hand_formatting() {
    let temp = TempDirGuard::new("no-op");
    let path = temp.path().join("grains-pulses.json");
    let compact = br#"[{"id":"bajra","tags":["millet"]},{"id":"toor","tags":["pulse"]}]"#;
    fs::write(&path, compact).expect("collection should be written");

    let catalog = builtin_catalog();
    let outcome = TagNormalizer::new(&catalog.vocabulary)
        .normalize_file("grains-pulses", &path, false)
        .expect("normalize should succeed");
    assert!(!outcome.changed());
    assert_eq!(fs::read(&path).expect("collection should read"), compact.to_vec());
}

#[test]
fn dry_run_does_not_touch_the_file() {
    let temp = TempDirGuard::new("dry-run");
    let path = temp.path().join("grains-pulses.json");
    fs::copy(fixtures_dir().join("grains-pulses.json"), &path).expect("fixture should copy");
    let original = fs::read(&path).expect("fixture should read");

    let catalog = builtin_catalog();
    let outcome = TagNormalizer::new(&catalog.vocabulary)
        .normalize_file("grains-pulses", &path, true)
        .expect("dry run should succeed");
    assert!(outcome.changed());
    assert_eq!(fs::read(&path).expect("fixture should read"), original);
}

#[test]
fn missing_collection_rejects_only_its_category() {
    let temp = TempDirGuard::new("missing");
    let data_dir = temp.path().join("data");
    fs::create_dir_all(&data_dir).expect("data dir should be created");
    fs::write(
        data_dir.join("grains-pulses.json"),
        serde_json::to_string(&vec![json!({
            "id": "bajra",
            "photo": "img/bajra.webp",
            "tags": ["millet"],
            "scientificName": "Pennisetum glaucum",
            "notes": "Drought-hardy millet.",
            "names": {"english": ["Pearl millet"]}
        })])
        .expect("fixture should serialize"),
    )
    .expect("collection should be written");
    fs::create_dir_all(temp.path().join("img")).expect("img dir should be created");
    fs::write(temp.path().join("img/bajra.webp"), b"webp").expect("photo should be written");

    let catalog = languageless_catalog();
    let probe = FsPhotoProbe::new(temp.path());
    let validator = RecordValidator::from_catalog(&catalog, &probe);
    let categories: Vec<_> = catalog.vocabulary.categories().iter().collect();
    let run = check_catalog(&catalog, &validator, temp.path(), &categories, ValidateOptions::default());

    assert!(!run.accepted());
    assert!(run.categories[0].accepted());
    assert_eq!(
        run.categories[1].failure_classes,
        vec![class::COLLECTION_NOT_FOUND.to_string()]
    );
    assert_eq!(run.summary.rejected_categories, vec!["spices".to_string()]);
}

#[test]
fn unparsable_collection_is_a_single_category_error() {
    let temp = TempDirGuard::new("unparsable");
    let data_dir = temp.path().join("data");
    fs::create_dir_all(&data_dir).expect("data dir should be created");
    fs::write(data_dir.join("grains-pulses.json"), b"[{\"id\": ").expect("write");
    fs::write(data_dir.join("spices.json"), b"[]").expect("write");

    let catalog = languageless_catalog();
    let validator = RecordValidator::from_catalog(&catalog, &NoPhotos);
    let categories: Vec<_> = catalog.vocabulary.categories().iter().collect();
    let run = check_catalog(&catalog, &validator, temp.path(), &categories, ValidateOptions::default());

    assert_eq!(run.categories[0].counts(), (1, 0));
    assert_eq!(
        run.categories[0].failure_classes,
        vec![class::COLLECTION_UNREADABLE.to_string()]
    );
    assert!(run.categories[1].accepted());
    assert!(!run.accepted());
}
