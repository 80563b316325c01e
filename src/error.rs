//! Errors surfaced to the user by the editing session.

use crate::background::ColorParseError;
use crate::compositor::RenderError;
use crate::export::ExportError;
use crate::segmentation::SegmentationError;
use crate::upload::UploadError;

/// Broad category of an [`EditorError`], used to decide how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormat,
    TooLarge,
    /// The selected file could not be read from disk.
    UnreadableFile,
    ConfigError,
    AuthError,
    QuotaExceeded,
    ServiceError,
    RenderError,
    InvalidColor,
    ExportError,
    InvalidState,
}

/// Anything that can go wrong during an editing session.
///
/// The display text is the message shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Segmentation(#[from] SegmentationError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    InvalidColor(#[from] ColorParseError),

    #[error("Background removal is already in progress")]
    Busy,

    #[error("Upload a photo before removing the background")]
    NothingToProcess,

    #[error("The background has already been removed from this photo")]
    AlreadyProcessed,

    #[error("Remove the background before exporting")]
    NothingToExport,
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::Upload(UploadError::InvalidFormat) => ErrorKind::InvalidFormat,
            EditorError::Upload(UploadError::TooLarge { .. }) => ErrorKind::TooLarge,
            EditorError::Upload(UploadError::Io { .. }) => ErrorKind::UnreadableFile,
            EditorError::Segmentation(e) => match e {
                SegmentationError::MissingApiKey => ErrorKind::ConfigError,
                SegmentationError::InvalidApiKey => ErrorKind::AuthError,
                SegmentationError::QuotaExceeded => ErrorKind::QuotaExceeded,
                SegmentationError::ApiError { .. }
                | SegmentationError::HttpError(_)
                | SegmentationError::InvalidResponse(_) => ErrorKind::ServiceError,
            },
            EditorError::Render(_) => ErrorKind::RenderError,
            EditorError::Export(_) => ErrorKind::ExportError,
            EditorError::InvalidColor(_) => ErrorKind::InvalidColor,
            EditorError::Busy
            | EditorError::NothingToProcess
            | EditorError::AlreadyProcessed
            | EditorError::NothingToExport => {
                ErrorKind::InvalidState
            }
        }
    }
}

/// A dismissible message describing the last failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&EditorError> for ErrorNotice {
    fn from(err: &EditorError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
