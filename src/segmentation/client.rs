//! RemoveBgClient - handles communication with the remove.bg API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use super::{ProcessedImage, Segmenter};
use crate::upload::SourceImage;

/// The environment variable name for the remove.bg API key.
pub const REMOVE_BG_API_KEY_ENV: &str = "REMOVE_BG_API_KEY";

/// Default remove.bg endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Multipart field holding the image.
pub const IMAGE_FIELD: &str = "image_file";

/// Default timeout for the whole request (60 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default connection timeout (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings injected into [`RemoveBgClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationConfig {
    /// `None` or empty means the credential is not configured.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl SegmentationConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Read the API key from `REMOVE_BG_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_env_var(REMOVE_BG_API_KEY_ENV)
    }

    /// Read the API key from the named environment variable.
    pub fn from_env_var(name: &str) -> Self {
        Self::new(std::env::var(name).ok())
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Client for the remove.bg background removal API.
///
/// Makes exactly one request per call; there is no retry.
pub struct RemoveBgClient {
    config: SegmentationConfig,
    http_client: reqwest::Client,
}

impl RemoveBgClient {
    /// Create a client from an explicit configuration.
    ///
    /// A missing API key is not an error here; it is reported by
    /// [`RemoveBgClient::segment`] before any request is made.
    pub fn new(config: SegmentationConfig) -> Result<Self, SegmentationError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client with the default endpoint and the key from the environment.
    pub fn from_env() -> Result<Self, SegmentationError> {
        Self::new(SegmentationConfig::from_env())
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Upload an image and return the cut-out.
    ///
    /// # Errors
    ///
    /// Returns `SegmentationError::MissingApiKey` if no key is configured (no
    /// request is sent), `SegmentationError::QuotaExceeded` on HTTP 402,
    /// `SegmentationError::InvalidApiKey` on HTTP 401,
    /// `SegmentationError::ApiError` on any other non-2xx status,
    /// `SegmentationError::HttpError` if the request itself fails, and
    /// `SegmentationError::InvalidResponse` if the body is not an image.
    pub async fn segment(
        &self,
        bytes: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<ProcessedImage, SegmentationError> {
        let api_key = self.config.api_key().ok_or(SegmentationError::MissingApiKey)?;

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = Form::new().part(IMAGE_FIELD, part);

        log::info!(
            "Submitting {} ({} bytes) for background removal",
            file_name,
            bytes.len()
        );

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!(
                "remove.bg API error: status {} ({}): {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown"),
                error_text
            );
            return Err(SegmentationError::from_status(status, error_text));
        }

        let body = response.bytes().await?;
        let processed = ProcessedImage::decode(&body).map_err(|e| {
            log::error!("remove.bg returned an unreadable image: {}", e);
            SegmentationError::InvalidResponse(e.to_string())
        })?;

        log::info!(
            "Background removed: {}x{} cut-out",
            processed.width(),
            processed.height()
        );
        Ok(processed)
    }
}

#[async_trait]
impl Segmenter for RemoveBgClient {
    async fn remove_background(
        &self,
        source: &SourceImage,
    ) -> Result<ProcessedImage, SegmentationError> {
        self.segment(source.bytes(), source.name(), source.mime_type())
            .await
    }
}

/// Errors that can occur while removing a background.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("Remove.bg API key is not configured")]
    MissingApiKey,

    #[error("Invalid API key. Please check your configuration.")]
    InvalidApiKey,

    #[error("API credit limit reached. Please check your remove.bg account.")]
    QuotaExceeded,

    #[error("Failed to remove background: {}", status.canonical_reason().unwrap_or("unknown error"))]
    ApiError {
        status: StatusCode,
        /// Response body as returned by the service
        body: String,
    },

    #[error("Failed to remove background: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Failed to remove background: unreadable result ({0})")]
    InvalidResponse(String),
}

impl SegmentationError {
    /// Map a non-success status to its error.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::PAYMENT_REQUIRED => SegmentationError::QuotaExceeded,
            StatusCode::UNAUTHORIZED => SegmentationError::InvalidApiKey,
            _ => SegmentationError::ApiError { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SegmentationConfig::new(Some("key".to_string()));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.api_key(), Some("key"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert_eq!(SegmentationConfig::new(Some("   ".to_string())).api_key(), None);
        assert_eq!(SegmentationConfig::new(None).api_key(), None);
    }

    #[test]
    fn test_from_env_var_reads_named_variable() {
        let name = "PROFILE_PHOTO_TEST_KEY_FROM_ENV";
        std::env::set_var(name, "env-key");
        assert_eq!(SegmentationConfig::from_env_var(name).api_key(), Some("env-key"));
        std::env::remove_var(name);
        assert_eq!(SegmentationConfig::from_env_var(name).api_key(), None);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            SegmentationError::from_status(StatusCode::PAYMENT_REQUIRED, String::new()),
            SegmentationError::QuotaExceeded
        ));
        assert!(matches!(
            SegmentationError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            SegmentationError::InvalidApiKey
        ));
        assert!(matches!(
            SegmentationError::from_status(StatusCode::FORBIDDEN, "nope".to_string()),
            SegmentationError::ApiError { status, .. } if status == StatusCode::FORBIDDEN
        ));
    }

    #[test]
    fn test_api_error_message_uses_status_text() {
        let err = SegmentationError::from_status(StatusCode::BAD_REQUEST, "{}".to_string());
        assert_eq!(err.to_string(), "Failed to remove background: Bad Request");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        // unroutable endpoint: reaching the network would surface HttpError instead
        let config = SegmentationConfig::new(None).with_endpoint("http://127.0.0.1:9/removebg");
        let client = RemoveBgClient::new(config).unwrap();
        let result = client.segment(&[1, 2, 3], "me.png", "image/png").await;
        assert!(matches!(result, Err(SegmentationError::MissingApiKey)));
    }
}
