//! Exporter - writes the rendered canvas out as a PNG.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageFormat;

use crate::compositor::RenderedCanvas;

/// File name every export is saved under.
pub const EXPORT_FILENAME: &str = "linkedin-profile-photo.png";

/// Encode the canvas as PNG bytes.
pub fn encode_png(canvas: &RenderedCanvas) -> Result<Vec<u8>, ExportError> {
    let mut out = Cursor::new(Vec::new());
    canvas.pixels().write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// Encode the canvas and save it as `dir/linkedin-profile-photo.png`.
///
/// Creates `dir` if needed and overwrites any previous export.
pub fn save_png(canvas: &RenderedCanvas, dir: &Path) -> Result<PathBuf, ExportError> {
    let bytes = encode_png(canvas)?;

    std::fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let path = dir.join(EXPORT_FILENAME);
    std::fs::write(&path, &bytes).map_err(|e| ExportError::Io {
        path: path.clone(),
        source: e,
    })?;

    log::info!("Saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Errors that can occur when exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
