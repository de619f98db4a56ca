//! Export result types.

use crate::error::StageError;
use serde::Serialize;
use std::path::PathBuf;

/// Summary of one export run.
///
/// Returned by [`crate::export()`] even when stages were skipped or
/// abandoned; check [`ExportReport::warnings`] for what was left out.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Where the document was written.
    pub output: PathBuf,
    /// Conversations written (each has a header).
    pub conversations: usize,
    /// Messages written across all conversations.
    pub messages: usize,
    /// Whether the "Chat HTML Export" section was written.
    pub html_included: bool,
    /// Images placed in the "Embedded Images" section.
    pub images_embedded: usize,
    /// Images skipped because they could not be read.
    pub images_failed: usize,
    /// Pages in the written document.
    pub pages: usize,
    /// Non-fatal problems, in the order they occurred.
    pub warnings: Vec<StageError>,
    /// Wall-clock time for the whole run.
    pub duration_ms: u64,
}

impl ExportReport {
    /// True when every input that existed was used in full.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_warnings_with_kind() {
        let report = ExportReport {
            output: "out.pdf".into(),
            warnings: vec![StageError::ImageFailed {
                name: "x.png".into(),
                detail: "bad".into(),
            }],
            images_failed: 1,
            ..Default::default()
        };
        assert!(!report.is_clean());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["output"], "out.pdf");
        assert_eq!(json["warnings"][0]["kind"], "image_failed");
        assert_eq!(json["images_failed"], 1);
    }
}
