//! Streaming API: yield each source's result as soon as it is done.
//!
//! Same semantics as [`crate::process::process_batch`]: strictly sequential,
//! with one pacing delay after every call. Results arrive one by one instead
//! of as a finished [`crate::output::RunState`]. `on_batch_complete` fires
//! when the last result is yielded; a stream dropped early never emits it.

use crate::client::{MistralClient, OcrService};
use crate::config::OcrConfig;
use crate::error::OcrAppError;
use crate::output::SourceResult;
use crate::pipeline::descriptor::build_descriptor;
use crate::pipeline::ocr::{pace, run_source};
use crate::pipeline::source::Source;
use crate::process::validate_batch;
use crate::progress::progress_percent;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

/// A boxed stream of per-source results, in source order.
pub type ResultStream = BoxStream<'static, SourceResult>;

/// Process `sources` with a [`MistralClient`], streaming results.
///
/// Validation happens up front; once a stream is returned every source will
/// be attempted as it is polled.
pub fn process_stream(sources: Vec<Source>, config: OcrConfig) -> Result<ResultStream, OcrAppError> {
    validate_batch(&sources, &config)?;
    let client: Arc<dyn OcrService> = Arc::new(MistralClient::new(&config)?);
    process_stream_with(client, sources, config)
}

/// Process `sources` with any [`OcrService`], streaming results.
pub fn process_stream_with(
    service: Arc<dyn OcrService>,
    sources: Vec<Source>,
    config: OcrConfig,
) -> Result<ResultStream, OcrAppError> {
    validate_batch(&sources, &config)?;

    let total = sources.len();
    info!("Starting streaming run over {} source(s)", total);
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let config = Arc::new(config);
    let succeeded = Arc::new(AtomicUsize::new(0));
    let results = stream::iter(sources.into_iter().enumerate()).then(move |(index, source)| {
        let service = Arc::clone(&service);
        let config = Arc::clone(&config);
        let succeeded = Arc::clone(&succeeded);
        async move {
            let position = index + 1;
            if let Some(ref cb) = config.progress_callback {
                cb.on_source_start(position, total, source.label());
            }
            let prepared = build_descriptor(config.file_type, &source);
            let result =
                run_source(service.as_ref(), position, source.label(), prepared, &config).await;
            pace(&config).await;

            if result.is_success() {
                succeeded.fetch_add(1, Ordering::Relaxed);
            }
            if let Some(ref cb) = config.progress_callback {
                let percent = progress_percent(index, total);
                match &result.error {
                    None => cb.on_source_complete(position, total, percent, result.text.len()),
                    Some(e) => cb.on_source_error(position, total, percent, &e.to_string()),
                }
                if position == total {
                    cb.on_batch_complete(total, succeeded.load(Ordering::Relaxed));
                }
            }
            result
        }
    });

    Ok(results.boxed())
}
