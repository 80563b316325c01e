//! Compositor - layers the background and the cut-out into the final canvas.
//!
//! Layer order: background fill (solid color or blurred subject) first, then
//! the subject scaled by the zoom and centered on the canvas.

use image::RgbaImage;

use crate::background::BackgroundSpec;
use crate::segmentation::ProcessedImage;
use crate::surface::{PixelSurface, Placement, Surface};
use crate::view::ViewTransform;

/// Default output edge length in pixels (the canvas is square).
pub const DEFAULT_CANVAS_SIZE: u32 = 500;

/// Default blur radius for the blurred background, in pixels.
pub const DEFAULT_BLUR_RADIUS: f32 = 10.0;

/// How far the blurred copy overhangs each canvas edge, in pixels.
pub const DEFAULT_BLUR_BLEED: u32 = 10;

/// Largest accepted canvas edge, in pixels.
pub const MAX_CANVAS_SIZE: u32 = 8192;

/// Largest accepted blur radius, in pixels.
pub const MAX_BLUR_RADIUS: f32 = 256.0;

/// Largest accepted blur bleed, in pixels.
pub const MAX_BLUR_BLEED: u32 = 1024;

/// The composited output, ready to export.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCanvas {
    pixels: RgbaImage,
}

impl RenderedCanvas {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Renders cut-outs onto a square canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    canvas_size: u32,
    blur_radius: f32,
    blur_bleed: u32,
}

impl Compositor {
    pub fn new(canvas_size: u32) -> Self {
        Self {
            canvas_size,
            ..Self::default()
        }
    }

    pub fn with_blur(mut self, radius: f32, bleed: u32) -> Self {
        self.blur_radius = radius;
        self.blur_bleed = bleed;
        self
    }

    pub fn canvas_size(&self) -> u32 {
        self.canvas_size
    }

    pub fn blur_radius(&self) -> f32 {
        self.blur_radius
    }

    pub fn blur_bleed(&self) -> u32 {
        self.blur_bleed
    }

    /// Check the settings before anything is allocated.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidSettings` for a canvas above
    /// [`MAX_CANVAS_SIZE`], a blur radius that is not finite or lies outside
    /// `0..=MAX_BLUR_RADIUS`, or a bleed above [`MAX_BLUR_BLEED`].
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.canvas_size > MAX_CANVAS_SIZE {
            return Err(RenderError::InvalidSettings(format!(
                "canvas size {} exceeds {}",
                self.canvas_size, MAX_CANVAS_SIZE
            )));
        }
        let radius = self.blur_radius;
        if !radius.is_finite() || !(0.0..=MAX_BLUR_RADIUS).contains(&radius) {
            return Err(RenderError::InvalidSettings(format!(
                "blur radius {} is outside 0..={}",
                self.blur_radius, MAX_BLUR_RADIUS
            )));
        }
        if self.blur_bleed > MAX_BLUR_BLEED {
            return Err(RenderError::InvalidSettings(format!(
                "blur bleed {} exceeds {}",
                self.blur_bleed, MAX_BLUR_BLEED
            )));
        }
        Ok(())
    }

    /// Where the subject lands for a given zoom: scaled, then centered.
    pub fn subject_placement(&self, subject: &ProcessedImage, view: ViewTransform) -> Placement {
        let (width, height) = view.scaled_size(subject.width(), subject.height());
        let canvas = i64::from(self.canvas_size);
        Placement::new(
            (canvas - i64::from(width)).div_euclid(2),
            (canvas - i64::from(height)).div_euclid(2),
            width,
            height,
        )
    }

    /// Placement of the blurred background copy: the whole canvas plus the
    /// bleed on every side.
    pub fn blur_placement(&self) -> Placement {
        let bleed = self.blur_bleed;
        let size = self.canvas_size.saturating_add(bleed.saturating_mul(2));
        Placement::new(-i64::from(bleed), -i64::from(bleed), size, size)
    }

    /// Draw the composition onto any surface.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::InvalidSettings` if [`Compositor::validate`]
    /// fails, `RenderError::EmptySubject` for a zero-sized cut-out and
    /// `RenderError::SurfaceSize` if the surface is not the configured
    /// canvas size.
    pub fn render_onto<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        subject: &ProcessedImage,
        background: BackgroundSpec,
        view: ViewTransform,
    ) -> Result<(), RenderError> {
        self.validate()?;
        if subject.width() == 0 || subject.height() == 0 {
            return Err(RenderError::EmptySubject);
        }
        let expected = (self.canvas_size, self.canvas_size);
        if self.canvas_size == 0 || surface.size() != expected {
            return Err(RenderError::SurfaceSize {
                expected,
                actual: surface.size(),
            });
        }

        surface.clear();

        match background.fill_color() {
            Some(color) => surface.fill(color.to_rgba()),
            None => surface.draw_blurred(subject.bitmap(), self.blur_placement(), self.blur_radius),
        }

        surface.draw_image(subject.bitmap(), self.subject_placement(subject, view));
        Ok(())
    }

    /// Render into a fresh pixel buffer.
    pub fn render(
        &self,
        subject: &ProcessedImage,
        background: BackgroundSpec,
        view: ViewTransform,
    ) -> Result<RenderedCanvas, RenderError> {
        self.validate()?;
        let mut surface = PixelSurface::new(self.canvas_size, self.canvas_size);
        self.render_onto(&mut surface, subject, background, view)?;
        log::debug!(
            "Rendered {}x{} canvas: background={}, zoom={}%",
            self.canvas_size,
            self.canvas_size,
            background,
            view.zoom()
        );
        Ok(RenderedCanvas {
            pixels: surface.into_pixels(),
        })
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            blur_radius: DEFAULT_BLUR_RADIUS,
            blur_bleed: DEFAULT_BLUR_BLEED,
        }
    }
}

/// Errors raised while compositing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Could not render the image: the processed image is empty")]
    EmptySubject,

    #[error("Could not render the image: surface is {}x{}, expected {}x{}", actual.0, actual.1, expected.0, expected.1)]
    SurfaceSize {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Could not render the image: {0}")]
    InvalidSettings(String),
}
