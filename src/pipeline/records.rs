//! Record loading: read a JSON file into a generic `serde_json::Value` tree.
//!
//! The loader does not decide whether the file exists; the orchestrator
//! checks that first and skips the stage silently when it does not. Once a
//! load is attempted, every failure comes back as a [`StageError`] so the
//! export can carry on without the conversations.

use crate::error::StageError;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Read and parse a JSON file.
///
/// No partial parse: malformed content yields [`StageError::MalformedJson`]
/// with serde_json's line/column description.
pub fn load_records(path: &Path) -> Result<Value, StageError> {
    let raw = std::fs::read_to_string(path).map_err(|e| StageError::Unreadable {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    let value: Value = serde_json::from_str(&raw).map_err(|e| StageError::MalformedJson {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    debug!("Loaded {} ({} bytes)", path.display(), raw.len());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn loads_valid_json() {
        let f = write_temp(r#"{"conversations": []}"#);
        let v = load_records(f.path()).unwrap();
        assert!(v.get("conversations").is_some());
    }

    #[test]
    fn malformed_json_is_reported() {
        let f = write_temp(r#"[{"id": "a", "messages": ["#);
        let err = load_records(f.path()).unwrap_err();
        match err {
            StageError::MalformedJson { path, detail } => {
                assert_eq!(path, f.path());
                assert!(detail.contains("line"), "got: {detail}");
            }
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_malformed() {
        let f = write_temp("");
        assert!(matches!(
            load_records(f.path()),
            Err(StageError::MalformedJson { .. })
        ));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_records(dir.path()),
            Err(StageError::Unreadable { .. })
        ));
    }
}
