//! Layout inspection renderer: writes the laid-out [`Document`] as JSON.
//!
//! Useful on machines without a pdfium library and for checking pagination
//! in tests and bug reports.

use super::{commit_output, prepare_output, Document, DocumentRenderer};
use crate::error::ExportError;
use std::path::Path;
use tracing::debug;

/// Writes pretty-printed layout JSON instead of a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutJsonRenderer;

impl DocumentRenderer for LayoutJsonRenderer {
    fn render(&self, document: &Document, output: &Path) -> Result<(), ExportError> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| ExportError::Internal(format!("Layout serialisation failed: {e}")))?;

        let tmp = prepare_output(output)?;
        std::fs::write(&tmp, &bytes).map_err(|e| ExportError::OutputWriteFailed {
            path: output.to_path_buf(),
            detail: e.to_string(),
        })?;
        commit_output(&tmp, output)?;

        debug!("Wrote {} bytes of layout JSON", bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageLayout;
    use crate::document::DocumentSession;

    #[test]
    fn writes_pages_and_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("layout.json");

        let mut session = DocumentSession::begin(PageLayout::default());
        session.write_title("Title");
        session.write_paragraph("body");
        session.flush(&out, &LayoutJsonRenderer).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json["page_width"], 210.0);
        assert_eq!(json["pages"].as_array().unwrap().len(), 1);
        assert_eq!(json["pages"][0]["items"][0]["type"], "text");
        assert_eq!(json["pages"][0]["items"][0]["font"]["style"], "bold");
        assert_eq!(json["blocks"][1]["type"], "paragraph");
        assert!(!dir.path().join("layout.json.tmp").exists());
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("layout.json");
        std::fs::write(&out, "stale").unwrap();

        let session = DocumentSession::begin(PageLayout::default());
        session.flush(&out, &LayoutJsonRenderer).unwrap();
        assert!(std::fs::read_to_string(&out).unwrap().starts_with('{'));
    }
}
