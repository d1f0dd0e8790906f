//! Collection files: one JSON array of record objects per category.
//!
//! Records are kept as raw `serde_json::Value`s so a rewrite preserves key
//! order and any fields this crate does not know about.

use serde_json::Value;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Read a whole collection file.
pub fn read_collection(path: impl AsRef<Path>) -> Result<Vec<Value>, CollectionError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CollectionError::NotFound(path.display().to_string()),
        _ => CollectionError::Io(format!("{}: {e}", path.display())),
    })?;
    validate_substrate_bytes(path, &bytes)?;
    parse_collection(path, &bytes)
}

fn parse_collection(path: &Path, bytes: &[u8]) -> Result<Vec<Value>, CollectionError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| CollectionError::Parse(format!("{}: {e}", path.display())))?;
    match value {
        Value::Array(records) => Ok(records),
        other => Err(CollectionError::NotArray(format!(
            "{}: top-level value is {}",
            path.display(),
            crate::shape::json_kind(&other)
        ))),
    }
}

/// Render records the way collection files are stored: two-space indent,
/// non-ASCII verbatim, trailing newline.
pub fn render_collection(records: &[Value]) -> Result<String, CollectionError> {
    let mut rendered =
        serde_json::to_string_pretty(records).map_err(|e| CollectionError::Serialize(e.to_string()))?;
    rendered.push('\n');
    Ok(rendered)
}

/// Replace a collection file atomically.
pub fn write_collection(path: impl AsRef<Path>, records: &[Value]) -> Result<(), CollectionError> {
    let path = path.as_ref();
    let rendered = render_collection(records)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| CollectionError::Io(format!("{}: {e}", parent.display())))?;
    }

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), CollectionError> {
        let file = File::create(&tmp_path)
            .map_err(|e| CollectionError::Io(format!("{}: {e}", tmp_path.display())))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(rendered.as_bytes())
            .map_err(|e| CollectionError::Io(format!("{}: {e}", tmp_path.display())))?;
        let file = writer
            .into_inner()
            .map_err(|e| CollectionError::Io(format!("{}: {e}", tmp_path.display())))?;
        file.sync_all()
            .map_err(|e| CollectionError::Io(format!("{}: {e}", tmp_path.display())))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CollectionError::Io(format!("{} -> {}: {e}", tmp_path.display(), path.display()))
    })?;
    sync_parent_dir(path)?;
    tracing::debug!(path = %path.display(), records = records.len(), "wrote collection");
    Ok(())
}

/// Persist the rename itself. Directories cannot be opened as files outside unix.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), CollectionError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| CollectionError::Io(format!("{}: {e}", parent.display())))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), CollectionError> {
    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

fn validate_substrate_bytes(path: &Path, bytes: &[u8]) -> Result<(), CollectionError> {
    if bytes.contains(&0) {
        return Err(CollectionError::Corrupt(format!(
            "{}: contains NUL byte(s)",
            path.display()
        )));
    }
    if std::str::from_utf8(bytes).is_err() {
        return Err(CollectionError::Corrupt(format!(
            "{}: contains non-UTF-8 byte sequence(s)",
            path.display()
        )));
    }
    Ok(())
}

/// Errors from collection file operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("file not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON decode error: {0}")]
    Parse(String),

    #[error("collection must be a JSON array: {0}")]
    NotArray(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("corrupted collection: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "bhasha-collection-{prefix}-{}-{unique}.json",
            std::process::id()
        ))
    }

    #[test]
    fn read_collection_reports_missing_file() {
        let path = temp_path("missing");
        assert!(matches!(
            read_collection(&path),
            Err(CollectionError::NotFound(_))
        ));
    }

    #[test]
    fn read_collection_reports_other_read_failures_as_io() {
        let path = temp_path("directory");
        fs::create_dir_all(&path).expect("directory should be created");
        assert!(matches!(read_collection(&path), Err(CollectionError::Io(_))));
        let _ = fs::remove_dir_all(path);
    }

    #[test]
    fn write_collection_creates_missing_parent_directories() {
        let dir = temp_path("nested");
        let path = dir.join("data").join("spices.json");
        let records = vec![json!({"id": "cumin", "tags": ["spice"]})];
        write_collection(&path, &records).expect("write should succeed");
        assert_eq!(read_collection(&path).expect("reread"), records);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn read_collection_rejects_nul_payload() {
        let path = temp_path("nul");
        fs::write(&path, b"[{\"id\":\"wheat\"}]\0").expect("fixture should write");

        match read_collection(&path) {
            Err(CollectionError::Corrupt(message)) => assert!(message.contains("contains NUL")),
            other => panic!("expected corrupt collection error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_collection_rejects_invalid_json_and_non_arrays() {
        let path = temp_path("invalid");
        fs::write(&path, b"[{\"id\": ").expect("fixture should write");
        assert!(matches!(read_collection(&path), Err(CollectionError::Parse(_))));

        fs::write(&path, b"{\"id\": \"wheat\"}").expect("fixture should write");
        match read_collection(&path) {
            Err(CollectionError::NotArray(message)) => assert!(message.contains("object")),
            other => panic!("expected not-array error, got {other:?}"),
        }

        let _ = fs::remove_file(path);
    }

    #[test]
    fn write_collection_preserves_key_order_and_unicode() {
        let path = temp_path("order");
        let records = vec![json!({
            "id": "wheat",
            "photo": "img/wheat.webp",
            "names": {"english": ["Wheat"], "hindi": ["गेहूँ", "Gehun"]},
            "tags": ["cereal"]
        })];
        write_collection(&path, &records).expect("write should succeed");

        let text = fs::read_to_string(&path).expect("collection should exist");
        assert!(text.contains("गेहूँ"));
        assert!(text.ends_with("]\n"));
        let id_at = text.find("\"id\"").expect("id key");
        let photo_at = text.find("\"photo\"").expect("photo key");
        let tags_at = text.find("\"tags\"").expect("tags key");
        assert!(id_at < photo_at && photo_at < tags_at);

        assert_eq!(read_collection(&path).expect("reread"), records);
        let _ = fs::remove_file(path);
    }
}
