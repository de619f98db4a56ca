//! PDF serialisation: write a laid-out [`Document`] through pdfium.
//!
//! Every page item becomes one pdfium page object. Text uses the standard
//! Helvetica faces, so no font files are embedded. Layout coordinates are
//! millimetres from the top-left corner; pdfium wants points from the
//! bottom-left, so y values are flipped against the page height here.

use crate::document::{
    commit_output, prepare_output, Document, DocumentRenderer, FontStyle, PageItem,
};
use crate::error::ExportError;
use crate::pipeline::images::decode_image;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the pdfium library file or its directory.
pub const PDFIUM_LIB_ENV: &str = "PDFIUM_LIB_PATH";

/// Renders documents to PDF with pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    lib_path: Option<PathBuf>,
}

impl PdfRenderer {
    /// `lib_path` overrides library discovery; see [`bind_pdfium`].
    pub fn new(lib_path: Option<PathBuf>) -> Self {
        Self { lib_path }
    }
}

/// Bind to a pdfium shared library.
///
/// Tried in order: `explicit`, then `$PDFIUM_LIB_PATH`, then the working
/// directory, then the system library path. Each candidate may be the
/// library file itself or the directory holding it.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, ExportError> {
    let env = std::env::var_os(PDFIUM_LIB_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let candidates = explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(env)
        .chain(std::iter::once(PathBuf::from("./")));

    let mut attempts = Vec::new();
    for candidate in candidates {
        let lib = if candidate.is_dir() {
            Pdfium::pdfium_platform_library_name_at_path(&candidate)
        } else {
            candidate
        };
        match Pdfium::bind_to_library(&lib) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", lib.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => attempts.push(format!("{}: {:?}", lib.display(), e)),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            attempts.push(format!("system library: {:?}", e));
            Err(ExportError::PdfiumBindingFailed(attempts.join("; ")))
        }
    }
}

fn render_failed(page: usize) -> impl Fn(PdfiumError) -> ExportError {
    move |e| ExportError::RenderFailed {
        page,
        detail: format!("{:?}", e),
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &Document, output: &Path) -> Result<(), ExportError> {
        let pdfium = bind_pdfium(self.lib_path.as_deref())?;
        let mut pdf = pdfium.create_new_pdf().map_err(render_failed(0))?;

        let regular = pdf.fonts_mut().helvetica();
        let bold = pdf.fonts_mut().helvetica_bold();
        let page_h = document.page_height;

        for (idx, laid_out) in document.pages.iter().enumerate() {
            let page_no = idx + 1;
            let size = PdfPagePaperSize::Custom(
                PdfPoints::from_mm(document.page_width),
                PdfPoints::from_mm(page_h),
            );
            let mut page = pdf
                .pages_mut()
                .create_page_at_end(size)
                .map_err(render_failed(page_no))?;

            for item in &laid_out.items {
                match item {
                    PageItem::Text {
                        x,
                        baseline,
                        text,
                        font,
                    } => {
                        let token = match font.style {
                            FontStyle::Regular => regular,
                            FontStyle::Bold => bold,
                        };
                        page.objects_mut()
                            .create_text_object(
                                PdfPoints::from_mm(*x),
                                PdfPoints::from_mm(page_h - baseline),
                                text,
                                token,
                                PdfPoints::new(font.size_pt),
                            )
                            .map_err(render_failed(page_no))?;
                    }
                    PageItem::Image {
                        x,
                        top,
                        width,
                        height,
                        path,
                    } => {
                        // Decoded once during layout; this only fails if the file changed since.
                        let decoded = match decode_image(path) {
                            Ok(img) => img,
                            Err(e) => {
                                warn!("Error embedding image {}: {}", path.display(), e);
                                continue;
                            }
                        };
                        page.objects_mut()
                            .create_image_object(
                                PdfPoints::from_mm(*x),
                                PdfPoints::from_mm(page_h - top - height),
                                &decoded,
                                Some(PdfPoints::from_mm(*width)),
                                Some(PdfPoints::from_mm(*height)),
                            )
                            .map_err(render_failed(page_no))?;
                    }
                }
            }
            debug!("Rendered page {} ({} items)", page_no, laid_out.items.len());
        }

        let tmp = prepare_output(output)?;
        pdf.save_to_file(&tmp)
            .map_err(|e| ExportError::OutputWriteFailed {
                path: output.to_path_buf(),
                detail: format!("{:?}", e),
            })?;
        commit_output(&tmp, output)?;

        info!(
            "PDF written: {} ({} pages)",
            output.display(),
            document.page_count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_explicit_library_is_reported() {
        // Only meaningful when no system pdfium is installed; otherwise the
        // fallback succeeds and there is nothing to assert.
        if let Err(e) = bind_pdfium(Some(Path::new("/nonexistent/libpdfium.so"))) {
            let msg = e.to_string();
            assert!(msg.contains("/nonexistent/libpdfium.so"), "got: {msg}");
            assert!(msg.contains("PDFIUM_LIB_PATH"));
        }
    }
}
