//! Drawing surfaces.
//!
//! The compositor only ever talks to the [`Surface`] trait, which exposes the
//! handful of canvas primitives it needs. [`PixelSurface`] is the in-memory
//! RGBA implementation used for real renders.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Where and how large to draw an image. Offsets may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Minimal 2D drawing interface.
pub trait Surface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Make every pixel fully transparent.
    fn clear(&mut self);

    /// Paint every pixel with an opaque color.
    fn fill(&mut self, color: Rgba<u8>);

    /// Scale `image` to the placement size and blend it over the surface.
    fn draw_image(&mut self, image: &RgbaImage, placement: Placement);

    /// Draw `image` into a transparent offscreen buffer the size of this
    /// surface, Gaussian-blur that buffer with the given radius, then blend
    /// the buffer over the surface.
    fn draw_blurred(&mut self, image: &RgbaImage, placement: Placement, radius: f32);
}

/// A surface backed by an RGBA pixel buffer.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    pixels: RgbaImage,
}

impl PixelSurface {
    /// A transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

impl Surface for PixelSurface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }

    fn fill(&mut self, color: Rgba<u8>) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = color;
        }
    }

    fn draw_image(&mut self, image: &RgbaImage, placement: Placement) {
        if placement.width == 0 || placement.height == 0 {
            return;
        }
        let scaled = scale_to(image, placement.width, placement.height);
        imageops::overlay(&mut self.pixels, &scaled, placement.x, placement.y);
    }

    fn draw_blurred(&mut self, image: &RgbaImage, placement: Placement, radius: f32) {
        let (width, height) = self.size();
        let mut offscreen = PixelSurface::new(width, height);
        offscreen.draw_image(image, placement);
        let blurred = blur_rgba(offscreen.pixels(), radius);
        imageops::overlay(&mut self.pixels, &blurred, 0, 0);
    }
}

/// Resize with a triangle filter; same-size draws are copied untouched.
fn scale_to(image: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// Gaussian blur of an RGBA image with `radius` as the standard deviation.
///
/// Color channels are blurred premultiplied by alpha so that transparent
/// pixels do not bleed their (meaningless) color into the result.
pub fn blur_rgba(image: &RgbaImage, radius: f32) -> RgbaImage {
    if !radius.is_finite() || radius <= 0.0 {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }

    let channels: [GrayImage; 4] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| {
            let p = image.get_pixel(x, y).0;
            if c == 3 {
                Luma([p[3]])
            } else {
                Luma([premultiply(p[c], p[3])])
            }
        })
    });

    let blurred: [GrayImage; 4] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], radius));

    RgbaImage::from_fn(w, h, |x, y| {
        let a = blurred[3].get_pixel(x, y).0[0];
        let channel = |c: usize| unpremultiply(blurred[c].get_pixel(x, y).0[0], a);
        Rgba([channel(0), channel(1), channel(2), a])
    })
}

fn premultiply(value: u8, alpha: u8) -> u8 {
    ((u16::from(value) * u16::from(alpha) + 127) / 255) as u8
}

fn unpremultiply(value: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        return 0;
    }
    ((u32::from(value) * 255 + u32::from(alpha) / 2) / u32::from(alpha)).min(255) as u8
}
