//! Replacement background choices.
//!
//! A [`BackgroundSpec`] describes what goes underneath the cut-out subject:
//! one of two preset solid colors, a user-picked color, or a blurred copy of
//! the subject itself.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

/// Preset white background (`#FFFFFF`).
pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

/// Preset light gray background (`#F3F4F6`).
pub const LIGHT_GRAY: Color = Color::rgb(0xF3, 0xF4, 0xF6);

/// Color used for `Custom` until the user picks one.
pub const DEFAULT_CUSTOM_COLOR: Color = WHITE;

/// An opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color such as `#1E40AF`, `1e40af` or `#fff`.
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::new(text));
        }

        match digits.len() {
            6 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError::new(text))
                };
                Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .map(|v| v * 0x11)
                        .map_err(|_| ColorParseError::new(text))
                };
                Ok(Self::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => Err(ColorParseError::new(text)),
        }
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 0xFF])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Text that is not a `#RGB` or `#RRGGBB` color.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{input}' is not a valid color (expected #RRGGBB)")]
pub struct ColorParseError {
    pub input: String,
}

impl ColorParseError {
    fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// The background drawn beneath the subject. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundSpec {
    #[default]
    White,
    LightGray,
    Custom(Color),
    /// A blurred, slightly oversized copy of the subject.
    Blurred,
}

impl BackgroundSpec {
    /// The solid fill color, or `None` for [`BackgroundSpec::Blurred`].
    pub fn fill_color(&self) -> Option<Color> {
        match self {
            BackgroundSpec::White => Some(WHITE),
            BackgroundSpec::LightGray => Some(LIGHT_GRAY),
            BackgroundSpec::Custom(color) => Some(*color),
            BackgroundSpec::Blurred => None,
        }
    }

    /// Short name used in logs and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            BackgroundSpec::White => "white",
            BackgroundSpec::LightGray => "light-gray",
            BackgroundSpec::Custom(_) => "custom",
            BackgroundSpec::Blurred => "blur",
        }
    }

    /// Look up a background by its short name. `custom` takes `custom_color`.
    pub fn from_name(name: &str, custom_color: Color) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "white" => Some(BackgroundSpec::White),
            "light-gray" | "light_gray" | "lightgray" => Some(BackgroundSpec::LightGray),
            "custom" => Some(BackgroundSpec::Custom(custom_color)),
            "blur" | "blurred" => Some(BackgroundSpec::Blurred),
            _ => None,
        }
    }
}

impl fmt::Display for BackgroundSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackgroundSpec::Custom(color) => write!(f, "custom ({})", color),
            other => f.write_str(other.name()),
        }
    }
}
