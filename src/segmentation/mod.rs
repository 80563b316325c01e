//! Background segmentation.
//!
//! The actual segmentation is done by an external service; this module holds
//! the [`Segmenter`] seam the editor talks to and the remove.bg client that
//! implements it.

mod client;

pub use client::{
    RemoveBgClient, SegmentationConfig, SegmentationError, API_KEY_HEADER, DEFAULT_ENDPOINT,
    IMAGE_FIELD, REMOVE_BG_API_KEY_ENV,
};

use async_trait::async_trait;
use image::RgbaImage;

use crate::upload::SourceImage;

/// A cut-out: the subject with a transparent background.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    bitmap: RgbaImage,
}

impl ProcessedImage {
    pub fn new(bitmap: RgbaImage) -> Self {
        Self { bitmap }
    }

    /// Decode an encoded image (as returned by the service).
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        Ok(Self::new(image::load_from_memory(bytes)?.to_rgba8()))
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

/// Anything that can strip the background from a photo.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn remove_background(
        &self,
        source: &SourceImage,
    ) -> Result<ProcessedImage, SegmentationError>;
}
