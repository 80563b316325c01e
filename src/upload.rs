//! Uploader - validates a selected file and decodes it into a [`SourceImage`].
//!
//! Drag-and-drop and the file picker produce the same [`SelectedFile`] and go
//! through [`load_source`], so both entry points accept and reject exactly
//! the same inputs.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

/// Largest accepted upload (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// MIME types accepted by the uploader.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// How the user handed us the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOrigin {
    DragAndDrop,
    FilePicker,
}

/// A file the user selected, before validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    /// Declared MIME type. When absent it is derived from the file name.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub origin: UploadOrigin,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes,
            origin: UploadOrigin::FilePicker,
        }
    }

    pub fn with_origin(mut self, origin: UploadOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// The declared MIME type, falling back to one guessed from the extension.
    pub fn effective_mime_type(&self) -> Option<String> {
        if let Some(mime) = &self.mime_type {
            return Some(mime.trim().to_lowercase());
        }
        ImageFormat::from_path(&self.name)
            .ok()
            .map(|format| format.to_mime_type().to_string())
    }
}

/// Read a file from disk into a [`SelectedFile`].
///
/// The MIME type is left unset so that it is derived from the extension.
pub fn read_file(path: &Path, origin: UploadOrigin) -> Result<SelectedFile, UploadError> {
    let bytes = std::fs::read(path).map_err(|e| UploadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(SelectedFile {
        name,
        mime_type: None,
        bytes,
        origin,
    })
}

/// The user's original photo, decoded.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    format: ImageFormat,
    bytes: Vec<u8>,
    bitmap: RgbaImage,
}

impl SourceImage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// The bytes exactly as uploaded.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }
}

/// Validate a selected file and decode it.
///
/// Checks the MIME type first, then the size, then that the bytes really are
/// a JPEG or PNG image.
pub fn load_source(file: SelectedFile) -> Result<SourceImage, UploadError> {
    let mime = file.effective_mime_type();
    if !mime
        .as_deref()
        .is_some_and(|m| ACCEPTED_MIME_TYPES.contains(&m))
    {
        log::warn!(
            "Rejected upload '{}' ({:?}): unsupported type {:?}",
            file.name,
            file.origin,
            mime
        );
        return Err(UploadError::InvalidFormat);
    }

    if file.bytes.len() > MAX_UPLOAD_BYTES {
        log::warn!(
            "Rejected upload '{}' ({:?}): {} bytes exceeds limit",
            file.name,
            file.origin,
            file.bytes.len()
        );
        return Err(UploadError::TooLarge {
            size: file.bytes.len(),
        });
    }

    let format = match image::guess_format(&file.bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
        _ => {
            log::warn!("Rejected upload '{}': content is not JPEG or PNG", file.name);
            return Err(UploadError::InvalidFormat);
        }
    };

    let bitmap = image::load_from_memory_with_format(&file.bytes, format)
        .map_err(|e| {
            log::warn!("Rejected upload '{}': decode failed: {}", file.name, e);
            UploadError::InvalidFormat
        })?
        .to_rgba8();

    log::info!(
        "Loaded '{}' via {:?}: {}x{} {:?}, {} bytes",
        file.name,
        file.origin,
        bitmap.width(),
        bitmap.height(),
        format,
        file.bytes.len()
    );

    Ok(SourceImage {
        name: file.name,
        format,
        bytes: file.bytes,
        bitmap,
    })
}

/// Errors raised while accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Please upload a JPG or PNG image.")]
    InvalidFormat,

    #[error("Image must be less than 5MB.")]
    TooLarge {
        /// Size of the rejected file in bytes
        size: usize,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
