//! Zoom applied to the cut-out before compositing.

/// Smallest allowed zoom, in percent.
pub const MIN_ZOOM: u32 = 50;

/// Largest allowed zoom, in percent.
pub const MAX_ZOOM: u32 = 150;

/// Zoom used after every upload.
pub const DEFAULT_ZOOM: u32 = 100;

/// Uniform scale factor for the subject, always within `MIN_ZOOM..=MAX_ZOOM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTransform {
    zoom: u32,
}

impl ViewTransform {
    /// Build a transform, clamping `percent` into the supported range.
    pub fn new(percent: u32) -> Self {
        let zoom = percent.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom != percent {
            log::debug!("Zoom {}% clamped to {}%", percent, zoom);
        }
        Self { zoom }
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.zoom) / 100.0
    }

    /// Scale a natural size, rounding to the nearest pixel (never below 1).
    pub fn scaled_size(&self, width: u32, height: u32) -> (u32, u32) {
        let scale = self.scale();
        let apply = |v: u32| ((f64::from(v) * scale).round() as u32).max(1);
        (apply(width), apply(height))
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { zoom: DEFAULT_ZOOM }
    }
}
