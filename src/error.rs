//! Error types for the chat2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExportError`]: **Fatal**: the export cannot produce a document at
//!   all (invalid configuration, PDF engine unavailable, output not
//!   writable). Returned as `Err(ExportError)` from [`crate::export()`].
//!
//! * [`StageError`]: **Non-fatal**: one input source or one image could not
//!   be used. The affected stage is abandoned (or the image skipped) and the
//!   error is stored in [`crate::output::ExportReport::warnings`] so callers
//!   can inspect what was left out of the document.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the chat2pdf library.
///
/// Input-level failures use [`StageError`] and are stored in
/// [`crate::output::ExportReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExportError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDF output needs the pdfium shared library. You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or pass --pdfium-lib).\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium system-wide.\n\
  • Use --layout-json to inspect the layout without pdfium.\n"
    )]
    PdfiumBindingFailed(String),

    /// pdfium rejected an operation while building the document.
    #[error("PDF rendering failed on page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {detail}")]
    OutputWriteFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for one input source or one image.
///
/// Recorded in the export report; the export continues with the next stage.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageError {
    /// The input file exists but could not be read.
    #[error("Could not read '{path}': {detail}")]
    Unreadable { path: PathBuf, detail: String },

    /// The conversations file is not valid JSON.
    #[error("Invalid JSON format in '{path}': {detail}")]
    MalformedJson { path: PathBuf, detail: String },

    /// The JSON parsed, but is neither a conversation list nor an object
    /// holding one under `"conversations"`.
    #[error("Unexpected JSON structure in '{path}'. Expected a list of conversations or an object with a \"conversations\" list.")]
    UnexpectedStructure { path: PathBuf },

    /// The image folder could not be listed.
    #[error("Could not list image folder '{path}': {detail}")]
    ImageFolderUnreadable { path: PathBuf, detail: String },

    /// A single image could not be opened or decoded.
    #[error("Error embedding image {name}: {detail}")]
    ImageFailed { name: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failed_display() {
        let e = ExportError::RenderFailed {
            page: 3,
            detail: "PdfiumLibraryInternalError".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("page 3"), "got: {msg}");
    }

    #[test]
    fn binding_failed_mentions_env_var() {
        let e = ExportError::PdfiumBindingFailed("not found".into());
        assert!(e.to_string().contains("PDFIUM_LIB_PATH"));
    }

    #[test]
    fn image_failed_display_names_file() {
        let e = StageError::ImageFailed {
            name: "broken.png".into(),
            detail: "invalid PNG signature".into(),
        };
        assert_eq!(
            e.to_string(),
            "Error embedding image broken.png: invalid PNG signature"
        );
    }

    #[test]
    fn stage_error_serialises_with_kind_tag() {
        let e = StageError::UnexpectedStructure {
            path: PathBuf::from("chats/conversations.json"),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["kind"], "unexpected_structure");
        assert_eq!(json["path"], "chats/conversations.json");
    }
}
