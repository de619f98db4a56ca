//! # chat2pdf
//!
//! Export chat conversation archives to a single paginated PDF.
//!
//! A data directory typically holds a `conversations.json` file, an HTML
//! export (`chat.html`) and a set of images. Every input is optional; the
//! document always has a title page and gets one section per input found.
//!
//! ## Pipeline Overview
//!
//! ```text
//! chats/
//!  │
//!  ├─ 1. Title          centred, bold
//!  ├─ 2. Conversations  JSON → Shape → header + speaker lines + paragraphs
//!  ├─ 3. HTML           regex flattening → one wrapped paragraph
//!  ├─ 4. Images         sorted file list → aspect-preserving boxes
//!  └─ 5. Flush          pdfium (or layout JSON) → atomic write
//! ```
//!
//! Unusable inputs never abort the run: the stage is abandoned, a
//! [`StageError`] lands in [`ExportReport::warnings`], and the remaining
//! stages still write.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat2pdf::{export, ExportConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExportConfig::from_data_dir("chats");
//!     let report = export(&config)?;
//!     eprintln!("{} pages, {} warnings", report.pages, report.warnings.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `chat2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! chat2pdf = { version = "0.1", default-features = false }
//! ```
//!
//! ## PDF engine
//!
//! PDF output binds to a pdfium shared library at run time. Set
//! `PDFIUM_LIB_PATH` or [`ExportConfig::pdfium_lib_path`] when it is not on
//! the system library path. [`LayoutJsonRenderer`] needs no library.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, ExportConfigBuilder, PageLayout};
pub use document::{Document, DocumentRenderer, DocumentSession, LayoutJsonRenderer};
pub use error::{ExportError, StageError};
pub use export::{export, export_with};
pub use output::ExportReport;
pub use pipeline::render::PdfRenderer;
pub use progress::{ExportProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
