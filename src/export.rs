//! Export entry points: sequence the stages and write the document.
//!
//! The stage order is fixed and every stage is optional by input existence:
//!
//! ```text
//! title ─▶ conversations ─▶ HTML section ─▶ images section ─▶ flush
//! ```
//!
//! A missing input skips its stage with a debug log. A failing input
//! abandons only its own stage; the problem is logged, recorded in
//! [`ExportReport::warnings`], and the export moves on. Only configuration,
//! pdfium binding and output failures are fatal.

use crate::config::ExportConfig;
use crate::document::{DocumentRenderer, DocumentSession};
use crate::error::{ExportError, StageError};
use crate::output::ExportReport;
use crate::pipeline::conversations::{Conversation, Shape};
use crate::pipeline::html;
use crate::pipeline::images::{embed_images, list_images};
use crate::pipeline::records::load_records;
use crate::pipeline::render::PdfRenderer;
use crate::pipeline::timestamp::format_timestamp;
use crate::progress::{ExportProgressCallback, NoopProgressCallback, Stage};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Header of the section holding the flattened HTML export.
pub const HTML_SECTION_TITLE: &str = "Chat HTML Export";
/// Header of the section holding embedded images.
pub const IMAGES_SECTION_TITLE: &str = "Embedded Images";

/// Export the configured inputs to a PDF.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ExportReport)` once the PDF is written, even if some inputs were
/// skipped or unusable (check `report.warnings`).
///
/// # Errors
/// Returns `Err(ExportError)` only for fatal errors:
/// - pdfium library not found
/// - PDF construction failed
/// - output path not writable
pub fn export(config: &ExportConfig) -> Result<ExportReport, ExportError> {
    let renderer = PdfRenderer::new(config.pdfium_lib_path.clone());
    export_with(config, &renderer)
}

/// Export through a caller-supplied renderer.
///
/// Same stages as [`export`]; only the final serialisation differs. Use
/// [`crate::document::LayoutJsonRenderer`] to inspect a layout without
/// pdfium.
pub fn export_with(
    config: &ExportConfig,
    renderer: &dyn DocumentRenderer,
) -> Result<ExportReport, ExportError> {
    let start = Instant::now();
    let noop = NoopProgressCallback;
    let progress: &dyn ExportProgressCallback = match &config.progress_callback {
        Some(cb) => cb.as_ref(),
        None => &noop,
    };
    info!("Starting export → {}", config.output_path.display());

    let mut report = ExportReport {
        output: config.output_path.clone(),
        ..Default::default()
    };

    let mut session = DocumentSession::begin(config.layout);
    session.write_title(&config.title);

    // ── Step 1: Conversations ────────────────────────────────────────────
    write_conversations(config, &mut session, progress, &mut report);

    // ── Step 2: HTML export ──────────────────────────────────────────────
    write_html(config, &mut session, progress, &mut report);

    // ── Step 3: Images ───────────────────────────────────────────────────
    write_images(config, &mut session, progress, &mut report);

    // ── Step 4: Flush ────────────────────────────────────────────────────
    progress.on_stage_start(Stage::Flush);
    let document = session.flush(&config.output_path, renderer)?;
    progress.on_stage_complete(Stage::Flush);

    report.pages = document.page_count();
    report.duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "PDF successfully created: {} ({} pages, {} warnings, {}ms)",
        config.output_path.display(),
        report.pages,
        report.warnings.len(),
        report.duration_ms
    );
    progress.on_export_complete(report.pages, report.warnings.len());

    Ok(report)
}

// ── Stages ───────────────────────────────────────────────────────────────

fn write_conversations(
    config: &ExportConfig,
    session: &mut DocumentSession,
    progress: &dyn ExportProgressCallback,
    report: &mut ExportReport,
) {
    let path = &config.conversations_path;
    if !path.exists() {
        debug!("No conversations file at {}; skipping", path.display());
        return;
    }
    progress.on_stage_start(Stage::Conversations);

    match load_conversations(path) {
        Ok(conversations) => {
            let total = conversations.len();
            info!("Writing {} conversations", total);
            for (idx, conversation) in conversations.iter().enumerate() {
                session.write_conversation_header(&conversation.label());
                for message in &conversation.messages {
                    let timestamp = config
                        .include_timestamps
                        .then(|| format_timestamp(message.timestamp));
                    session.write_speaker_header(
                        message.author.label(&config.assistant_label),
                        timestamp.as_deref(),
                    );
                    session.write_paragraph(&message.text);
                }
                report.conversations += 1;
                report.messages += conversation.messages.len();
                progress.on_conversation_rendered(idx + 1, total, conversation.messages.len());
            }
        }
        Err(e) => {
            warn!("{}", e);
            report.warnings.push(e);
        }
    }

    progress.on_stage_complete(Stage::Conversations);
}

fn load_conversations(path: &Path) -> Result<Vec<Conversation>, StageError> {
    let root = load_records(path)?;
    Shape::classify(root)
        .into_conversations()
        .ok_or_else(|| StageError::UnexpectedStructure {
            path: path.to_path_buf(),
        })
}

fn write_html(
    config: &ExportConfig,
    session: &mut DocumentSession,
    progress: &dyn ExportProgressCallback,
    report: &mut ExportReport,
) {
    let path = &config.html_path;
    if !path.exists() {
        debug!("No HTML export at {}; skipping", path.display());
        return;
    }
    progress.on_stage_start(Stage::Html);

    match std::fs::read(path) {
        Ok(raw) => {
            let text = html::extract_text(&String::from_utf8_lossy(&raw));
            debug!("HTML flattened: {} bytes → {} chars", raw.len(), text.len());
            session.write_section_header(HTML_SECTION_TITLE);
            session.write_paragraph(&text);
            report.html_included = true;
        }
        Err(e) => {
            let err = StageError::Unreadable {
                path: path.to_path_buf(),
                detail: e.to_string(),
            };
            warn!("{}", err);
            report.warnings.push(err);
        }
    }

    progress.on_stage_complete(Stage::Html);
}

fn write_images(
    config: &ExportConfig,
    session: &mut DocumentSession,
    progress: &dyn ExportProgressCallback,
    report: &mut ExportReport,
) {
    let dir = &config.images_dir;
    if !dir.exists() {
        debug!("No image folder at {}; skipping", dir.display());
        return;
    }
    progress.on_stage_start(Stage::Images);

    match list_images(dir) {
        Ok(paths) if paths.is_empty() => {
            debug!("No images in {}; section omitted", dir.display());
        }
        Ok(paths) => {
            info!("Embedding {} images from {}", paths.len(), dir.display());
            session.write_section_header(IMAGES_SECTION_TITLE);
            let outcome = embed_images(&paths, session, progress);
            report.images_embedded = outcome.embedded;
            report.images_failed = outcome.failures.len();
            report.warnings.extend(outcome.failures);
        }
        Err(e) => {
            warn!("{}", e);
            report.warnings.push(e);
        }
    }

    progress.on_stage_complete(Stage::Images);
}
