//! # mistral-ocr
//!
//! Extract text from PDFs and images with the Mistral OCR API, then export
//! each result as plain text, Markdown, JSON or a one-page PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! sources (URLs or local files)
//!  │
//!  ├─ 1. Collect     newline-separated URLs, or files read into memory
//!  ├─ 2. Describe    document_url / image_url payload; uploads → data URI
//!  ├─ 3. OCR         one call per source, strictly in order, paced
//!  ├─ 4. Normalise   join page markdown, "No text found.", or inline error
//!  └─ 5. Export      TXT · Markdown · JSON · PDF as OCR_Result_<n>.<ext>
//! ```
//!
//! A failure for one source never stops the batch: its text becomes
//! `"❌ Error extracting result: <description>"` and the next source runs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mistral_ocr::{process_batch, sources_from_url_text, export, ExportFormat,
//!                   FileType, OcrConfig, SourceType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OcrConfig::builder()
//!         .api_key(std::env::var("MISTRAL_API_KEY")?)
//!         .file_type(FileType::Pdf)
//!         .source_type(SourceType::Url)
//!         .build()?;
//!     let sources = sources_from_url_text("https://arxiv.org/pdf/2201.04234");
//!     let run = process_batch(&sources, &config).await?;
//!     for result in run.results() {
//!         let artifact = export(&result.text, ExportFormat::Json, result.position)?;
//!         std::fs::write(&artifact.file_name, &artifact.bytes)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mistral-ocr` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{MistralClient, OcrImage, OcrPage, OcrRequest, OcrResponse, OcrService};
pub use config::{FileType, OcrConfig, OcrConfigBuilder, SourceType, DEFAULT_MODEL};
pub use error::{ExportError, OcrAppError, OcrError, OCR_ERROR_PREFIX};
pub use export::{export, ExportArtifact, ExportFormat};
pub use output::{BatchStats, RunState, SourceResult, NO_TEXT_FOUND};
pub use pipeline::descriptor::{build_descriptor, DocumentDescriptor, PreparedSource};
pub use pipeline::source::{collect_sources, sources_from_url_text, Source, UploadedFile};
pub use process::{export_result, export_run, process_batch, process_batch_sync, process_batch_with};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{process_stream, process_stream_with, ResultStream};
