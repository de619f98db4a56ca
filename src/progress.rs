//! Progress-callback trait for export events.
//!
//! Inject an [`Arc<dyn ExportProgressCallback>`] via
//! [`crate::config::ExportConfigBuilder::progress_callback`] to receive
//! events as the export moves through its stages.
//!
//! # Example
//!
//! ```rust
//! use chat2pdf::{ExportConfig, ExportProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     images: AtomicUsize,
//! }
//!
//! impl ExportProgressCallback for CountingCallback {
//!     fn on_image_embedded(&self, name: &str, index: usize, total: usize) {
//!         self.images.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Image {}/{}: {}", index, total, name);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { images: AtomicUsize::new(0) });
//!
//! let config = ExportConfig::builder()
//!     .progress_callback(counter as Arc<dyn ExportProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// The export stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Conversations,
    Html,
    Images,
    Flush,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Conversations => "conversations",
            Stage::Html => "HTML export",
            Stage::Images => "images",
            Stage::Flush => "writing PDF",
        })
    }
}

/// Called by the export as it runs.
///
/// Implementations must be `Send + Sync` so a config can be shared across
/// threads. All methods have default no-op implementations so callers only
/// override what they care about.
pub trait ExportProgressCallback: Send + Sync {
    /// Called when a stage whose input exists begins. Stages with missing
    /// inputs are never started.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called after each conversation is written.
    ///
    /// # Arguments
    /// * `index`: 1-indexed conversation number
    /// * `total`: conversations in the file
    /// * `messages`: messages written for this conversation
    fn on_conversation_rendered(&self, index: usize, total: usize, messages: usize) {
        let _ = (index, total, messages);
    }

    /// Called after each image is placed.
    ///
    /// # Arguments
    /// * `name`: file name of the image
    /// * `index`: 1-indexed position among candidate files
    /// * `total`: candidate files in the folder
    fn on_image_embedded(&self, name: &str, index: usize, total: usize) {
        let _ = (name, index, total);
    }

    /// Called when an image is skipped.
    fn on_image_error(&self, name: &str, error: &str) {
        let _ = (name, error);
    }

    /// Called when a started stage finishes, whether or not it succeeded.
    fn on_stage_complete(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called once after the document is written.
    ///
    /// # Arguments
    /// * `pages`: pages in the written document
    /// * `warnings`: non-fatal problems recorded during the run
    fn on_export_complete(&self, pages: usize, warnings: usize) {
        let _ = (pages, warnings);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ExportProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExportConfig`].
pub type ProgressCallback = Arc<dyn ExportProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Conversations);
        cb.on_conversation_rendered(1, 2, 5);
        cb.on_image_embedded("a.png", 1, 1);
        cb.on_image_error("b.png", "bad");
        cb.on_stage_complete(Stage::Images);
        cb.on_export_complete(3, 0);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage_start(Stage::Flush);
        cb.on_export_complete(1, 0);
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Html.to_string(), "HTML export");
        assert_eq!(Stage::Flush.to_string(), "writing PDF");
    }
}
