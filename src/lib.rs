//! profile-photo library crate.
//!
//! Turns a portrait into a profile photo: the background is removed by the
//! remove.bg service and replaced with a solid color or a blurred copy of
//! the subject, then exported as a PNG.
//!
//! [`editor::Editor`] is the entry point; it owns one editing session and
//! sequences the uploader, segmentation client, compositor and exporter.

pub mod background;
pub mod cli;
pub mod compositor;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod segmentation;
pub mod surface;
pub mod upload;
pub mod view;

pub use background::{BackgroundSpec, Color};
pub use compositor::{Compositor, RenderError, RenderedCanvas};
pub use editor::{Editor, EditorState, PendingRemoval};
pub use error::{EditorError, ErrorKind, ErrorNotice};
pub use segmentation::{ProcessedImage, RemoveBgClient, SegmentationConfig, SegmentationError, Segmenter};
pub use upload::{SelectedFile, SourceImage, UploadError, UploadOrigin};
pub use view::ViewTransform;
