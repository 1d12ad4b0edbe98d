//! Configuration types for an OCR run.
//!
//! All run behaviour is controlled through [`OcrConfig`], built via its
//! [`OcrConfigBuilder`]. The file type and source type are required settings:
//! `build()` refuses to produce a config without them, so the pipeline never
//! has to guess which payload shape to send.

use crate::error::OcrAppError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default Mistral OCR model.
pub const DEFAULT_MODEL: &str = "mistral-ocr-latest";

/// Default API endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";

/// Configuration for one OCR run.
///
/// # Example
/// ```rust
/// use mistral_ocr::{FileType, OcrConfig, SourceType};
///
/// let config = OcrConfig::builder()
///     .api_key("sk-test")
///     .file_type(FileType::Pdf)
///     .source_type(SourceType::Url)
///     .pacing_delay_ms(500)
///     .build()
///     .unwrap();
/// assert_eq!(config.model, "mistral-ocr-latest");
/// ```
#[derive(Clone)]
pub struct OcrConfig {
    /// User-supplied credential, passed through as a bearer token. Never persisted.
    pub api_key: String,

    /// Whether sources are PDF documents or images.
    pub file_type: FileType,

    /// Whether sources are remote URLs or local uploads.
    pub source_type: SourceType,

    /// OCR model identifier. Default: `mistral-ocr-latest`.
    pub model: String,

    /// API root, without the `/v1/ocr` path. Default: `https://api.mistral.ai`.
    pub base_url: String,

    /// Ask the service to embed extracted images as base64. Default: true.
    pub include_image_base64: bool,

    /// Pause after every OCR call, success or failure. Default: 1000 ms.
    ///
    /// A simple pacing measure for the provider's rate limits. Set to 0 to
    /// disable.
    pub pacing_delay_ms: u64,

    /// Per-call HTTP timeout in seconds. Default: 120.
    pub api_timeout_secs: u64,

    /// Optional per-source progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for OcrConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfig")
            .field("api_key", &"<redacted>")
            .field("file_type", &self.file_type)
            .field("source_type", &self.source_type)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("include_image_base64", &self.include_image_base64)
            .field("pacing_delay_ms", &self.pacing_delay_ms)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl OcrConfig {
    /// Create a new builder for `OcrConfig`.
    pub fn builder() -> OcrConfigBuilder {
        OcrConfigBuilder::default()
    }

    /// Full URL of the OCR endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/ocr", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`OcrConfig`].
pub struct OcrConfigBuilder {
    api_key: Option<String>,
    file_type: Option<FileType>,
    source_type: Option<SourceType>,
    model: String,
    base_url: String,
    include_image_base64: bool,
    pacing_delay_ms: u64,
    api_timeout_secs: u64,
    progress_callback: Option<ProgressCallback>,
}

impl Default for OcrConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            file_type: None,
            source_type: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            include_image_base64: true,
            pacing_delay_ms: 1000,
            api_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for OcrConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrConfigBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("file_type", &self.file_type)
            .field("source_type", &self.source_type)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OcrConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn include_image_base64(mut self, v: bool) -> Self {
        self.include_image_base64 = v;
        self
    }

    pub fn pacing_delay_ms(mut self, ms: u64) -> Self {
        self.pacing_delay_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.api_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating required settings.
    pub fn build(self) -> Result<OcrConfig, OcrAppError> {
        let api_key = match self.api_key {
            Some(k) if !k.trim().is_empty() => k,
            _ => return Err(OcrAppError::MissingApiKey),
        };
        let file_type = self.file_type.ok_or(OcrAppError::MissingSetting("file type"))?;
        let source_type = self
            .source_type
            .ok_or(OcrAppError::MissingSetting("source type"))?;

        if self.model.trim().is_empty() {
            return Err(OcrAppError::InvalidConfig("model must not be empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(OcrAppError::InvalidConfig(format!(
                "base URL must be http(s), got '{}'",
                self.base_url
            )));
        }
        if self.api_timeout_secs == 0 {
            return Err(OcrAppError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }

        Ok(OcrConfig {
            api_key,
            file_type,
            source_type,
            model: self.model,
            base_url: self.base_url,
            include_image_base64: self.include_image_base64,
            pacing_delay_ms: self.pacing_delay_ms,
            api_timeout_secs: self.api_timeout_secs,
            progress_callback: self.progress_callback,
        })
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Kind of content being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// PDF documents, sent as `document_url`.
    Pdf,
    /// Raster images, sent as `image_url`.
    Image,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Pdf => f.write_str("PDF"),
            FileType::Image => f.write_str("Image"),
        }
    }
}

/// Where sources come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// Remote URLs passed to the service verbatim.
    Url,
    /// Local files inlined as base64 data URIs.
    Upload,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Url => f.write_str("URL"),
            SourceType::Upload => f.write_str("Upload"),
        }
    }
}
