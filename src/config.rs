//! Configuration types for chat exports.
//!
//! All export behaviour is controlled through [`ExportConfig`], built via its
//! [`ExportConfigBuilder`]. Input paths, output path, document text and page
//! geometry live in one struct so a run can be logged and reproduced from it.

use crate::error::ExportError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default data directory holding the export inputs.
pub const DEFAULT_DATA_DIR: &str = "chats";
/// Conversations file name inside the data directory.
pub const CONVERSATIONS_FILE: &str = "conversations.json";
/// HTML export file name inside the data directory.
pub const HTML_FILE: &str = "chat.html";
/// Default output document.
pub const DEFAULT_OUTPUT: &str = "ChatGPT_Export.pdf";
/// Default document title.
pub const DEFAULT_TITLE: &str = "ChatGPT Conversations Export";
/// Default label for every non-user author.
pub const DEFAULT_ASSISTANT_LABEL: &str = "ChatGPT";

/// Page geometry in millimetres.
///
/// The defaults are A4 portrait with a 10 mm margin, a 15 mm automatic
/// break margin at the bottom, and images drawn 180 mm wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_width: f32,
    pub page_height: f32,
    /// Left, right and top margin.
    pub margin: f32,
    /// Distance from the bottom edge at which content breaks to a new page.
    pub bottom_margin: f32,
    /// Horizontal padding inside a text line.
    pub cell_margin: f32,
    /// Target render width for embedded images.
    pub image_width: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::a4()
    }
}

impl PageLayout {
    /// A4 portrait, 210 × 297 mm.
    pub fn a4() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 10.0,
            bottom_margin: 15.0,
            cell_margin: 1.0,
            image_width: 180.0,
        }
    }

    /// US Letter portrait, 215.9 × 279.4 mm.
    pub fn letter() -> Self {
        Self {
            page_width: 215.9,
            page_height: 279.4,
            ..Self::a4()
        }
    }

    /// Width between the left and right margins.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Cursor position past which a block no longer fits on the page.
    pub fn break_trigger(&self) -> f32 {
        self.page_height - self.bottom_margin
    }

    /// Height available to one block on a fresh page.
    pub fn usable_height(&self) -> f32 {
        self.break_trigger() - self.margin
    }
}

/// Configuration for one export run.
///
/// Built via [`ExportConfig::builder()`], [`ExportConfig::from_data_dir()`],
/// or [`ExportConfig::default()`].
///
/// # Example
/// ```rust
/// use chat2pdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .data_dir("exports/march")
///     .output_path("march.pdf")
///     .include_timestamps(false)
///     .build()
///     .unwrap();
/// assert!(config.conversations_path.ends_with("conversations.json"));
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Conversations JSON file. Skipped when it does not exist.
    pub conversations_path: PathBuf,

    /// HTML export file. Skipped when it does not exist.
    pub html_path: PathBuf,

    /// Folder scanned for `.jpg`, `.png` and `.jpeg` files. Skipped when it
    /// does not exist.
    pub images_dir: PathBuf,

    /// Destination PDF. Parent directories are created as needed.
    pub output_path: PathBuf,

    /// Centred title on page 1. Default: `"ChatGPT Conversations Export"`.
    pub title: String,

    /// Speaker label for every author other than `"user"`. Default: `"ChatGPT"`.
    pub assistant_label: String,

    /// Render `"{author} ({timestamp}):"` speaker headers. When false the
    /// header is just `"{author}:"`. Default: true.
    pub include_timestamps: bool,

    /// Page geometry. Default: A4.
    pub layout: PageLayout,

    /// Explicit pdfium shared library (file or directory). When `None`,
    /// `PDFIUM_LIB_PATH`, the working directory and the system library are
    /// tried in that order.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Optional progress callback for stage and item events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let data_dir = Path::new(DEFAULT_DATA_DIR);
        Self {
            conversations_path: data_dir.join(CONVERSATIONS_FILE),
            html_path: data_dir.join(HTML_FILE),
            images_dir: data_dir.to_path_buf(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            title: DEFAULT_TITLE.to_string(),
            assistant_label: DEFAULT_ASSISTANT_LABEL.to_string(),
            include_timestamps: true,
            layout: PageLayout::default(),
            pdfium_lib_path: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("conversations_path", &self.conversations_path)
            .field("html_path", &self.html_path)
            .field("images_dir", &self.images_dir)
            .field("output_path", &self.output_path)
            .field("title", &self.title)
            .field("assistant_label", &self.assistant_label)
            .field("include_timestamps", &self.include_timestamps)
            .field("layout", &self.layout)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults with every input rooted at `dir`: `dir/conversations.json`,
    /// `dir/chat.html`, and `dir` itself as the image folder.
    pub fn from_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            conversations_path: dir.join(CONVERSATIONS_FILE),
            html_path: dir.join(HTML_FILE),
            images_dir: dir.to_path_buf(),
            ..Self::default()
        }
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    /// Re-root all three inputs at `dir`. Call before the per-input setters
    /// when combining them.
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.config.conversations_path = dir.join(CONVERSATIONS_FILE);
        self.config.html_path = dir.join(HTML_FILE);
        self.config.images_dir = dir.to_path_buf();
        self
    }

    pub fn conversations_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.conversations_path = path.into();
        self
    }

    pub fn html_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.html_path = path.into();
        self
    }

    pub fn images_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.images_dir = path.into();
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Blank labels fall back to the default.
    pub fn assistant_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        let trimmed = label.trim();
        self.config.assistant_label = if trimmed.is_empty() {
            DEFAULT_ASSISTANT_LABEL.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    pub fn include_timestamps(mut self, v: bool) -> Self {
        self.config.include_timestamps = v;
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Image render width in millimetres, clamped to at least 10 mm. Widths
    /// beyond the content area are rejected by [`Self::build`].
    pub fn image_width(mut self, mm: f32) -> Self {
        self.config.layout.image_width = mm.max(10.0);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.output_path.as_os_str().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Output path must not be empty".into(),
            ));
        }
        if c.output_path.is_dir() {
            return Err(ExportError::InvalidConfig(format!(
                "Output path '{}' is a directory",
                c.output_path.display()
            )));
        }

        let l = &c.layout;
        let finite = [
            l.page_width,
            l.page_height,
            l.margin,
            l.bottom_margin,
            l.cell_margin,
            l.image_width,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0);
        if !finite {
            return Err(ExportError::InvalidConfig(
                "Page layout values must be finite and non-negative".into(),
            ));
        }
        if l.content_width() <= 2.0 * l.cell_margin {
            return Err(ExportError::InvalidConfig(format!(
                "Margins leave no room for text on a {}mm wide page",
                l.page_width
            )));
        }
        // A header line (10 mm) must fit on a fresh page or pagination never ends.
        if l.usable_height() < 10.0 {
            return Err(ExportError::InvalidConfig(format!(
                "Margins leave less than 10mm of usable height on a {}mm tall page",
                l.page_height
            )));
        }
        if l.image_width <= 0.0 || l.image_width > l.content_width() {
            return Err(ExportError::InvalidConfig(format!(
                "Image width must be within the content width (0–{}mm), got {}mm",
                l.content_width(),
                l.image_width
            )));
        }
        Ok(self.config)
    }
}
