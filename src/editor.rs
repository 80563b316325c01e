//! Editor - the editing session and its state machine.
//!
//! ```text
//! Empty --upload--> Uploaded --begin_removal--> Processing --success--> Ready
//!                      ^                            |
//!                      +---------- failure ---------+
//! any state --reset--> Empty        any state --upload--> Uploaded
//! ```
//!
//! Every user action is a method. Failures are returned to the caller and
//! also kept as a dismissible [`ErrorNotice`]; none of them end the session.
//! While `Ready`, changing the background or zoom re-renders synchronously.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::background::{BackgroundSpec, Color, DEFAULT_CUSTOM_COLOR};
use crate::compositor::{Compositor, RenderedCanvas};
use crate::error::{EditorError, ErrorKind, ErrorNotice};
use crate::export;
use crate::segmentation::{ProcessedImage, SegmentationError, Segmenter};
use crate::upload::{self, SelectedFile, SourceImage};
use crate::view::ViewTransform;

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Empty,
    Uploaded,
    Processing,
    Ready,
}

/// State plus the data that only exists in that state.
#[derive(Debug)]
enum Phase {
    Empty,
    Uploaded {
        source: Arc<SourceImage>,
    },
    Processing {
        source: Arc<SourceImage>,
    },
    Ready {
        source: Arc<SourceImage>,
        processed: ProcessedImage,
        rendered: Option<RenderedCanvas>,
    },
}

/// A background removal that has been started but not completed.
///
/// Hand it back to [`Editor::complete_removal`] with the service result.
#[derive(Debug)]
pub struct PendingRemoval {
    generation: u64,
    source: Arc<SourceImage>,
}

impl PendingRemoval {
    /// The photo to send to the service.
    pub fn source(&self) -> &SourceImage {
        &self.source
    }
}

/// One editing session.
#[derive(Debug)]
pub struct Editor {
    phase: Phase,
    background: BackgroundSpec,
    custom_color: Color,
    view: ViewTransform,
    compositor: Compositor,
    notice: Option<ErrorNotice>,
    /// Bumped whenever the source image is replaced or dropped.
    generation: u64,
}

impl Editor {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            phase: Phase::Empty,
            background: BackgroundSpec::default(),
            custom_color: DEFAULT_CUSTOM_COLOR,
            view: ViewTransform::default(),
            compositor,
            notice: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> EditorState {
        match self.phase {
            Phase::Empty => EditorState::Empty,
            Phase::Uploaded { .. } => EditorState::Uploaded,
            Phase::Processing { .. } => EditorState::Processing,
            Phase::Ready { .. } => EditorState::Ready,
        }
    }

    /// True while a background removal is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, Phase::Processing { .. })
    }

    pub fn source(&self) -> Option<&SourceImage> {
        match &self.phase {
            Phase::Empty => None,
            Phase::Uploaded { source }
            | Phase::Processing { source }
            | Phase::Ready { source, .. } => Some(source),
        }
    }

    pub fn processed(&self) -> Option<&ProcessedImage> {
        match &self.phase {
            Phase::Ready { processed, .. } => Some(processed),
            _ => None,
        }
    }

    /// The current composition, if the background has been removed.
    pub fn rendered(&self) -> Option<&RenderedCanvas> {
        match &self.phase {
            Phase::Ready { rendered, .. } => rendered.as_ref(),
            _ => None,
        }
    }

    pub fn background(&self) -> BackgroundSpec {
        self.background
    }

    /// The color `Custom` uses; kept while other backgrounds are selected.
    pub fn custom_color(&self) -> Color {
        self.custom_color
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// The message for the last failure, until dismissed or superseded.
    pub fn error(&self) -> Option<&ErrorNotice> {
        self.notice.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.notice = None;
    }

    /// Validate and load a new photo, replacing any previous one.
    ///
    /// On failure the session is left as it was.
    pub fn upload(&mut self, file: SelectedFile) -> Result<(), EditorError> {
        let source = match upload::load_source(file) {
            Ok(source) => source,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.generation += 1;
        self.phase = Phase::Uploaded {
            source: Arc::new(source),
        };
        self.view = ViewTransform::default();
        self.notice = None;
        Ok(())
    }

    /// Move from `Uploaded` to `Processing`.
    pub fn begin_removal(&mut self) -> Result<PendingRemoval, EditorError> {
        let source = match &self.phase {
            Phase::Uploaded { source } => Arc::clone(source),
            Phase::Processing { .. } => return Err(self.fail(EditorError::Busy)),
            Phase::Ready { .. } => return Err(self.fail(EditorError::AlreadyProcessed)),
            Phase::Empty => return Err(self.fail(EditorError::NothingToProcess)),
        };

        log::info!("Removing background from '{}'", source.name());
        self.notice = None;
        self.phase = Phase::Processing {
            source: Arc::clone(&source),
        };
        Ok(PendingRemoval {
            generation: self.generation,
            source,
        })
    }

    /// Apply the outcome of a removal started with [`Editor::begin_removal`].
    ///
    /// Success moves to `Ready` and renders; failure returns to `Uploaded`.
    /// Results for a photo that has since been reset or replaced are dropped.
    pub fn complete_removal(
        &mut self,
        pending: PendingRemoval,
        result: Result<ProcessedImage, SegmentationError>,
    ) -> Result<(), EditorError> {
        if pending.generation != self.generation || !self.is_busy() {
            log::debug!(
                "Dropping background removal result for '{}' (photo changed)",
                pending.source.name()
            );
            return Ok(());
        }

        let source = pending.source;
        match result {
            Ok(processed) => {
                self.phase = Phase::Ready {
                    source,
                    processed,
                    rendered: None,
                };
                self.rerender()
            }
            Err(e) => {
                self.phase = Phase::Uploaded { source };
                Err(self.fail(e.into()))
            }
        }
    }

    /// Run a full background removal against `segmenter`.
    ///
    /// The editor is borrowed for the whole call, so a second removal cannot
    /// start until this one settles.
    pub async fn remove_background<S: Segmenter + ?Sized>(
        &mut self,
        segmenter: &S,
    ) -> Result<(), EditorError> {
        let pending = self.begin_removal()?;
        let result = segmenter.remove_background(pending.source()).await;
        self.complete_removal(pending, result)
    }

    pub fn select_background(&mut self, background: BackgroundSpec) -> Result<(), EditorError> {
        if let BackgroundSpec::Custom(color) = background {
            self.custom_color = color;
        }
        self.background = background;
        self.rerender()
    }

    /// Select the custom background with a color given as hex text.
    ///
    /// Invalid text leaves the background unchanged.
    pub fn set_custom_color(&mut self, text: &str) -> Result<(), EditorError> {
        let color = match Color::from_hex(text) {
            Ok(color) => color,
            Err(e) => return Err(self.fail(e.into())),
        };
        self.select_background(BackgroundSpec::Custom(color))
    }

    /// Set the zoom in percent; clamped to 50..=150.
    pub fn set_zoom(&mut self, percent: u32) -> Result<(), EditorError> {
        self.view = ViewTransform::new(percent);
        self.rerender()
    }

    /// Drop the photo and everything derived from it.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Empty;
        self.notice = None;
    }

    /// Save the current composition as `dir/linkedin-profile-photo.png`.
    pub fn export(&mut self, dir: &Path) -> Result<PathBuf, EditorError> {
        let result = match self.rendered() {
            Some(canvas) => export::save_png(canvas, dir).map_err(EditorError::from),
            None => Err(EditorError::NothingToExport),
        };
        result.map_err(|e| self.fail(e))
    }

    /// PNG bytes of the current composition.
    pub fn export_bytes(&mut self) -> Result<Vec<u8>, EditorError> {
        let result = match self.rendered() {
            Some(canvas) => export::encode_png(canvas).map_err(EditorError::from),
            None => Err(EditorError::NothingToExport),
        };
        result.map_err(|e| self.fail(e))
    }

    /// Recompute the composition when `Ready`; a no-op otherwise.
    fn rerender(&mut self) -> Result<(), EditorError> {
        let result = match &self.phase {
            Phase::Ready { processed, .. } => {
                self.compositor
                    .render(processed, self.background, self.view)
            }
            _ => return Ok(()),
        };

        let (canvas, outcome) = match result {
            Ok(canvas) => {
                if self
                    .notice
                    .as_ref()
                    .is_some_and(|n| n.kind == ErrorKind::RenderError)
                {
                    self.notice = None;
                }
                (Some(canvas), Ok(()))
            }
            Err(e) => (None, Err(self.fail(e.into()))),
        };

        if let Phase::Ready { rendered, .. } = &mut self.phase {
            *rendered = canvas;
        }
        outcome
    }

    fn fail(&mut self, err: EditorError) -> EditorError {
        log::warn!("{}", err);
        self.notice = Some(ErrorNotice::from(&err));
        err
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Compositor::default())
    }
}
