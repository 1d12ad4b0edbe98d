//! Eager (whole-batch) processing entry points.
//!
//! [`process_batch`] waits for every source, then returns the complete
//! [`RunState`]. Use [`crate::stream::process_stream`] instead to receive
//! results one at a time as each source finishes.

use crate::client::{MistralClient, OcrService};
use crate::config::OcrConfig;
use crate::error::OcrAppError;
use crate::export::{export, ExportArtifact, ExportFormat};
use crate::output::RunState;
use crate::pipeline::descriptor::build_descriptor;
use crate::pipeline::ocr::{pace, run_source};
use crate::pipeline::source::Source;
use crate::progress::progress_percent;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Run OCR over `sources` with a [`MistralClient`] built from `config`.
///
/// # Errors
/// Returns `Err(OcrAppError)` only when the run cannot start:
/// - empty credential
/// - no sources
/// - a source whose kind differs from `config.source_type`
///
/// Per-source OCR failures are stored in the returned [`RunState`].
pub async fn process_batch(
    sources: &[Source],
    config: &OcrConfig,
) -> Result<RunState, OcrAppError> {
    validate_batch(sources, config)?;
    let client = MistralClient::new(config)?;
    process_batch_with(&client, sources, config).await
}

/// Run OCR over `sources` with any [`OcrService`].
pub async fn process_batch_with(
    service: &dyn OcrService,
    sources: &[Source],
    config: &OcrConfig,
) -> Result<RunState, OcrAppError> {
    let total_start = Instant::now();
    validate_batch(sources, config)?;

    let total = sources.len();
    info!(
        "Processing {} {} {} source(s) with {}",
        total, config.file_type, config.source_type, config.model
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut run = RunState::new();
    for (index, source) in sources.iter().enumerate() {
        let position = index + 1;
        let label = source.label();
        if let Some(ref cb) = config.progress_callback {
            cb.on_source_start(position, total, label);
        }

        let prepared = build_descriptor(config.file_type, source);
        let result = run_source(service, position, label, prepared, config).await;
        pace(config).await;

        let percent = progress_percent(index, total);
        if let Some(ref cb) = config.progress_callback {
            match &result.error {
                None => cb.on_source_complete(position, total, percent, result.text.len()),
                Some(e) => cb.on_source_error(position, total, percent, &e.to_string()),
            }
        }
        debug!("Progress {}%", percent);

        run.stats.record(&result);
        run.push(result);
    }

    run.stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Processing complete: {}/{} succeeded, {}ms total",
        run.stats.succeeded, total, run.stats.total_duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, run.stats.succeeded);
    }

    Ok(run)
}

/// Synchronous wrapper around [`process_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_batch_sync(
    sources: &[Source],
    config: &OcrConfig,
) -> Result<RunState, OcrAppError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| OcrAppError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process_batch(sources, config))
}

/// Render the result at 1-based `position` in `format`.
pub fn export_result(
    run: &RunState,
    position: usize,
    format: ExportFormat,
) -> Result<ExportArtifact, OcrAppError> {
    let result = run.get(position).ok_or(OcrAppError::ResultOutOfRange {
        position,
        total: run.len(),
    })?;
    Ok(export(&result.text, format, position)?)
}

/// Write one artifact per result into `dir`, choosing each result's format
/// with `format_for(position)`.
///
/// Each file is written atomically (temp file in `dir`, then rename).
pub fn export_run(
    run: &RunState,
    dir: impl AsRef<Path>,
    format_for: impl Fn(usize) -> ExportFormat,
) -> Result<Vec<PathBuf>, OcrAppError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(|e| OcrAppError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::with_capacity(run.len());
    for result in run.results() {
        let artifact = export(&result.text, format_for(result.position), result.position)?;
        let path = dir.join(&artifact.file_name);
        write_atomic(&path, &artifact.bytes)?;
        debug!("Wrote {} ({} bytes)", path.display(), artifact.bytes.len());
        written.push(path);
    }
    info!("Exported {} file(s) to {}", written.len(), dir.display());
    Ok(written)
}

/// Write `bytes` to `path` via a temp file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OcrAppError> {
    let write_err = |e: std::io::Error| OcrAppError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Input-absence and configuration checks, done before any source is read.
pub(crate) fn validate_batch(sources: &[Source], config: &OcrConfig) -> Result<(), OcrAppError> {
    if config.api_key.trim().is_empty() {
        return Err(OcrAppError::MissingApiKey);
    }
    if sources.is_empty() {
        return Err(OcrAppError::NoSources);
    }
    if let Some((index, source)) = sources
        .iter()
        .enumerate()
        .find(|(_, s)| s.kind() != config.source_type)
    {
        return Err(OcrAppError::SourceKindMismatch {
            position: index + 1,
            expected: config.source_type.to_string(),
            found: source.kind().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileType, SourceType};
    use crate::pipeline::source::UploadedFile;

    fn config(source_type: SourceType) -> OcrConfig {
        OcrConfig::builder()
            .api_key("k")
            .file_type(FileType::Pdf)
            .source_type(source_type)
            .pacing_delay_ms(0)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_batch_rejected() {
        let err = validate_batch(&[], &config(SourceType::Url)).unwrap_err();
        assert!(matches!(err, OcrAppError::NoSources));
    }

    #[test]
    fn mixed_kinds_rejected() {
        let sources = vec![
            Source::Url("https://a".into()),
            Source::Upload(UploadedFile::new(vec![1], "application/pdf", "x.pdf")),
        ];
        let err = validate_batch(&sources, &config(SourceType::Url)).unwrap_err();
        match err {
            OcrAppError::SourceKindMismatch { position, .. } => assert_eq!(position, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_key_rejected_even_if_config_mutated() {
        let mut c = config(SourceType::Url);
        c.api_key = String::new();
        let err = validate_batch(&[Source::Url("u".into())], &c).unwrap_err();
        assert!(matches!(err, OcrAppError::MissingApiKey));
    }

    #[test]
    fn write_atomic_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OCR_Result_1.txt");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn export_result_out_of_range() {
        let run = RunState::new();
        let err = export_result(&run, 1, ExportFormat::Txt).unwrap_err();
        assert!(matches!(
            err,
            OcrAppError::ResultOutOfRange { position: 1, total: 0 }
        ));
    }
}
