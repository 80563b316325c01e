//! CLI enums and their conversions into library types.

use clap::ValueEnum;

use crate::background::{BackgroundSpec, Color};

/// Background choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Background {
    White,
    LightGray,
    /// Solid color given with --color
    Custom,
    /// Blurred copy of the subject
    Blur,
}

impl Background {
    /// Resolve to a background; `Custom` takes `color`.
    pub fn resolve(self, color: Color) -> BackgroundSpec {
        match self {
            Background::White => BackgroundSpec::White,
            Background::LightGray => BackgroundSpec::LightGray,
            Background::Custom => BackgroundSpec::Custom(color),
            Background::Blur => BackgroundSpec::Blurred,
        }
    }
}
