//! The paginated document model and the session that builds it.
//!
//! ## Data Flow
//!
//! ```text
//! export ──▶ DocumentSession ──▶ Document ──▶ DocumentRenderer
//!            (append-only ops)   (pages +     (pdfium PDF, or
//!                                 blocks)      layout JSON)
//! ```
//!
//! A [`Document`] carries two views of the same content:
//!
//! * [`Document::blocks`]: the logical sequence of writes (title, headers,
//!   paragraphs, images) in call order;
//! * [`Document::pages`]: the laid-out result: positioned text lines and
//!   image boxes per page, in millimetres from the top-left corner.
//!
//! Renderers only read the pages; tests and reports read the blocks.

pub mod layout_json;
pub mod metrics;
pub mod session;

pub use layout_json::LayoutJsonRenderer;
pub use session::DocumentSession;

use crate::error::ExportError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Writes a laid-out [`Document`] to a file.
///
/// Implemented by [`crate::pipeline::render::PdfRenderer`] for real output
/// and by [`LayoutJsonRenderer`] for inspecting layouts without pdfium.
pub trait DocumentRenderer {
    /// Serialise `document` to `output`, replacing any existing file.
    fn render(&self, document: &Document, output: &Path) -> Result<(), ExportError>;
}

/// Font weight. Both map to the standard Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Regular,
    Bold,
}

/// A font selection: Helvetica at a weight and a size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub style: FontStyle,
    pub size_pt: f32,
}

impl Font {
    pub const fn regular(size_pt: f32) -> Self {
        Self {
            style: FontStyle::Regular,
            size_pt,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self {
            style: FontStyle::Bold,
            size_pt,
        }
    }
}

/// One logical write, recorded in call order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Block {
    Title(String),
    SectionHeader(String),
    ConversationHeader(String),
    /// The full rendered header line, e.g. `User (Unknown Time):`.
    SpeakerHeader(String),
    Paragraph(String),
    Image {
        path: PathBuf,
        width: f32,
        height: f32,
    },
}

/// A positioned element on a page. Coordinates are millimetres measured
/// from the top-left corner of the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageItem {
    Text {
        x: f32,
        /// Distance from the top edge to the text baseline.
        baseline: f32,
        text: String,
        font: Font,
    },
    Image {
        x: f32,
        top: f32,
        width: f32,
        height: f32,
        path: PathBuf,
    },
}

/// One page of laid-out items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<PageItem>,
}

/// The accumulated output of a [`DocumentSession`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// Page width in millimetres.
    pub page_width: f32,
    /// Page height in millimetres.
    pub page_height: f32,
    pub pages: Vec<Page>,
    pub blocks: Vec<Block>,
}

impl Document {
    /// Number of pages, including empty ones.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text lines across all pages, in layout order.
    pub fn text_lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| &p.items).filter_map(|item| match item {
            PageItem::Text { text, .. } => Some(text.as_str()),
            PageItem::Image { .. } => None,
        })
    }
}

/// Create the parent directory of `path` and return the sibling temp path
/// used for atomic writes (`<name>.tmp`).
pub(crate) fn prepare_output(path: &Path) -> Result<PathBuf, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::OutputWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    Ok(PathBuf::from(tmp))
}

/// Move a finished temp file into place.
pub(crate) fn commit_output(tmp: &Path, path: &Path) -> Result<(), ExportError> {
    std::fs::rename(tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(tmp);
        ExportError::OutputWriteFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lines_skip_images() {
        let doc = Document {
            page_width: 210.0,
            page_height: 297.0,
            pages: vec![
                Page {
                    items: vec![
                        PageItem::Text {
                            x: 10.0,
                            baseline: 20.0,
                            text: "one".into(),
                            font: Font::regular(11.0),
                        },
                        PageItem::Image {
                            x: 10.0,
                            top: 30.0,
                            width: 180.0,
                            height: 60.0,
                            path: "a.png".into(),
                        },
                    ],
                },
                Page {
                    items: vec![PageItem::Text {
                        x: 10.0,
                        baseline: 20.0,
                        text: "two".into(),
                        font: Font::bold(14.0),
                    }],
                },
            ],
            blocks: vec![],
        };
        assert_eq!(doc.text_lines().collect::<Vec<_>>(), vec!["one", "two"]);
        assert_eq!(doc.page_count(), 2);
    }

    #[test]
    fn prepare_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/deeper/export.pdf");
        let tmp = prepare_output(&out).unwrap();
        assert!(out.parent().unwrap().is_dir());
        assert_eq!(tmp, dir.path().join("nested/deeper/export.pdf.tmp"));
    }

    #[test]
    fn block_serialises_tagged() {
        let json = serde_json::to_value(Block::Paragraph("hi".into())).unwrap();
        assert_eq!(json["type"], "paragraph");
        assert_eq!(json["value"], "hi");
    }
}
