//! Error types for the mistral-ocr library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`OcrAppError`] — **Fatal**: the run cannot start at all (no API key,
//!   no sources, a local file that cannot be read, missing configuration).
//!   Returned as `Err(OcrAppError)` from the top-level `process*` functions.
//!
//! * [`OcrError`] — **Non-fatal**: the OCR call for a single source failed
//!   (network, auth, malformed response, timeout). Stored inside
//!   [`crate::output::SourceResult`] and rendered into its text so the rest
//!   of the batch still runs.
//!
//! * [`ExportError`] — an export artifact could not be encoded. Not expected
//!   for any valid UTF-8 text; kept typed so the writer layer can propagate.

use std::path::PathBuf;
use thiserror::Error;

/// Prefix of the inline text stored for a source whose OCR call failed.
pub const OCR_ERROR_PREFIX: &str = "❌ Error extracting result: ";

/// All fatal errors returned by the mistral-ocr library.
#[derive(Debug, Error)]
pub enum OcrAppError {
    // ── Input-absence errors ──────────────────────────────────────────────
    /// No credential was supplied.
    #[error("No API key provided.\nPass --api-key or set MISTRAL_API_KEY.")]
    MissingApiKey,

    /// The batch contains no sources.
    #[error("No sources to process. Upload files or enter URLs.")]
    NoSources,

    // ── Input errors ──────────────────────────────────────────────────────
    /// A local file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// A source does not match the configured source type.
    #[error("Source {position} is {found} but the run is configured for {expected} sources")]
    SourceKindMismatch {
        position: usize,
        expected: String,
        found: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// A required setting was never provided.
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to build OCR client: {0}")]
    ClientBuild(String),

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an export file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An export artifact could not be rendered.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// No result exists at the requested 1-based position.
    #[error("Result {position} does not exist (run has {total} results)")]
    ResultOutOfRange { position: usize, total: usize },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal OCR failure for a single source.
///
/// Every variant collapses to the same inline message template, carrying
/// its `Display` output as the failure description.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OcrError {
    /// Transport-level failure (DNS, connection reset, TLS).
    #[error("request failed: {0}")]
    Http(String),

    /// The call exceeded the client timeout.
    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The service rejected the credential (401/403).
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The service returned any other non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl OcrError {
    /// The inline text stored in place of OCR output for a failed source.
    pub fn to_result_text(&self) -> String {
        format!("{OCR_ERROR_PREFIX}{self}")
    }
}

/// Failure while encoding an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF export failed: {0}")]
    Pdf(String),
}
