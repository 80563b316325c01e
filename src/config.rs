//! Configuration file handling for profile-photo.
//!
//! Loads configuration from `~/.config/profile-photo/config.toml` or a custom path.
//! Every field is optional; anything left out falls back to the built-in default.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::background::{BackgroundSpec, Color, DEFAULT_CUSTOM_COLOR};
use crate::compositor::{
    Compositor, DEFAULT_BLUR_BLEED, DEFAULT_BLUR_RADIUS, DEFAULT_CANVAS_SIZE, MAX_BLUR_BLEED,
    MAX_BLUR_RADIUS, MAX_CANVAS_SIZE,
};
use crate::segmentation::{SegmentationConfig, DEFAULT_ENDPOINT, REMOVE_BG_API_KEY_ENV};
use crate::view::DEFAULT_ZOOM;

/// Configuration file structure for profile-photo.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ServiceConfig {
    pub endpoint: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct CanvasConfig {
    pub size: Option<u32>,
    pub blur_radius: Option<f32>,
    pub blur_bleed: Option<u32>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ExportConfig {
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct DefaultsConfig {
    pub background: Option<String>,
    pub custom_color: Option<String>,
    pub zoom: Option<u32>,
}

/// Contents written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# profile-photo configuration

[service]
# endpoint = "https://api.remove.bg/v1.0/removebg"
# api_key_env = "REMOVE_BG_API_KEY"
# timeout_secs = 60

[canvas]
# size = 500
# blur_radius = 10.0
# blur_bleed = 10

[export]
# directory = "."

[defaults]
# background = "white"   # white | light-gray | custom | blur
# custom_color = "#FFFFFF"
# zoom = 100
"##;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path that must exist.
    /// Out-of-range values are rejected here rather than at first use.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value that has a restricted range or format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compositor()?;
        self.background()?;
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn api_key_env(&self) -> &str {
        self.service
            .api_key_env
            .as_deref()
            .unwrap_or(REMOVE_BG_API_KEY_ENV)
    }

    /// Segmentation settings, with the API key read from the environment.
    pub fn segmentation(&self) -> SegmentationConfig {
        let mut config = SegmentationConfig::from_env_var(self.api_key_env())
            .with_endpoint(self.service.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT));
        if let Some(secs) = self.service.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    pub fn compositor(&self) -> Result<Compositor, ConfigError> {
        let size = self.canvas.size.unwrap_or(DEFAULT_CANVAS_SIZE);
        if size == 0 || size > MAX_CANVAS_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "canvas.size",
                message: format!("{} is outside 1..={}", size, MAX_CANVAS_SIZE),
            });
        }

        let radius = self.canvas.blur_radius.unwrap_or(DEFAULT_BLUR_RADIUS);
        if !radius.is_finite() || !(0.0..=MAX_BLUR_RADIUS).contains(&radius) {
            return Err(ConfigError::InvalidValue {
                field: "canvas.blur_radius",
                message: format!("{} is outside 0..={}", radius, MAX_BLUR_RADIUS),
            });
        }

        let bleed = self.canvas.blur_bleed.unwrap_or(DEFAULT_BLUR_BLEED);
        if bleed > MAX_BLUR_BLEED {
            return Err(ConfigError::InvalidValue {
                field: "canvas.blur_bleed",
                message: format!("{} is outside 0..={}", bleed, MAX_BLUR_BLEED),
            });
        }

        Ok(Compositor::new(size).with_blur(radius, bleed))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn custom_color(&self) -> Result<Color, ConfigError> {
        match &self.defaults.custom_color {
            Some(text) => Color::from_hex(text).map_err(|e| ConfigError::InvalidValue {
                field: "defaults.custom_color",
                message: e.to_string(),
            }),
            None => Ok(DEFAULT_CUSTOM_COLOR),
        }
    }

    pub fn background(&self) -> Result<BackgroundSpec, ConfigError> {
        let color = self.custom_color()?;
        match &self.defaults.background {
            Some(name) => {
                BackgroundSpec::from_name(name, color).ok_or_else(|| ConfigError::InvalidValue {
                    field: "defaults.background",
                    message: format!("unknown background '{}'", name),
                })
            }
            None => Ok(BackgroundSpec::default()),
        }
    }

    pub fn zoom(&self) -> u32 {
        self.defaults.zoom.unwrap_or(DEFAULT_ZOOM)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for {}: {}", field, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("profile-photo").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/profile-photo/config.toml")
        })
}
