//! Image embedding: enumerate image files and place each one at a fixed
//! render width with its aspect ratio preserved.
//!
//! Each candidate is decoded in full here, with the format detected from the
//! file content rather than its extension, so a file that would not render
//! is reported as a failure before it gets a box. Failures are per file: the
//! file is logged, recorded and skipped, and the batch continues.

use crate::document::DocumentSession;
use crate::error::StageError;
use crate::progress::ExportProgressCallback;
use image::{DynamicImage, ImageReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name suffixes treated as images. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".jpg", ".png", ".jpeg"];

/// Result of one embedding batch.
#[derive(Debug, Default)]
pub struct ImageOutcome {
    pub embedded: usize,
    pub failures: Vec<StageError>,
}

/// True when `name` ends with one of [`IMAGE_EXTENSIONS`].
pub fn is_image_name(name: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// List candidate image files in `dir`, sorted by file name.
///
/// Subdirectories and names that are not valid UTF-8 are ignored.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, StageError> {
    let unreadable = |e: std::io::Error| StageError::ImageFolderUnreadable {
        path: dir.to_path_buf(),
        detail: e.to_string(),
    };

    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = entry.file_name();
        match name.to_str() {
            Some(n) if is_image_name(n) => found.push(entry.path()),
            _ => {}
        }
    }

    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!("Found {} image candidates in {}", found.len(), dir.display());
    Ok(found)
}

/// Height of an image drawn `target_width` wide, preserving aspect ratio.
///
/// `None` for a zero-width image.
pub fn scaled_height(target_width: f32, px_width: u32, px_height: u32) -> Option<f32> {
    if px_width == 0 {
        return None;
    }
    Some(target_width * px_height as f32 / px_width as f32)
}

/// Shrink a `width × height` box proportionally so its height is at most
/// `max_height`. Boxes that already fit are returned unchanged.
pub fn fit_box(width: f32, height: f32, max_height: f32) -> (f32, f32) {
    if height <= max_height || height <= 0.0 {
        return (width, height);
    }
    let scale = max_height / height;
    (width * scale, max_height)
}

/// Embed every file in `paths` into `session` at the layout's image width,
/// left-aligned at the margin.
pub fn embed_images(
    paths: &[PathBuf],
    session: &mut DocumentSession,
    progress: &dyn ExportProgressCallback,
) -> ImageOutcome {
    let layout = *session.layout();
    let total = paths.len();
    let mut outcome = ImageOutcome::default();

    for (idx, path) in paths.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match measure(path, layout.image_width) {
            Ok((w, h)) => {
                let (w, h) = fit_box(w, h, layout.usable_height());
                debug!("Embedding {} at {:.1}×{:.1}mm", name, w, h);
                session.embed_image(path, layout.margin, w, h);
                outcome.embedded += 1;
                progress.on_image_embedded(&name, idx + 1, total);
            }
            Err(detail) => {
                let err = StageError::ImageFailed {
                    name: name.clone(),
                    detail,
                };
                warn!("{}", err);
                progress.on_image_error(&name, &err.to_string());
                outcome.failures.push(err);
            }
        }
    }

    outcome
}

/// Decode an image file, sniffing the format from its leading bytes.
pub fn decode_image(path: &Path) -> Result<DynamicImage, String> {
    ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| e.to_string())?
        .decode()
        .map_err(|e| e.to_string())
}

fn measure(path: &Path, target_width: f32) -> Result<(f32, f32), String> {
    let decoded = decode_image(path)?;
    let (px_w, px_h) = (decoded.width(), decoded.height());
    let height = scaled_height(target_width, px_w, px_h)
        .ok_or_else(|| format!("image has zero width ({px_w}×{px_h} px)"))?;
    Ok((target_width, height))
}
