//! OCR invocation: send one prepared source and normalise the response.
//!
//! Always returns a [`SourceResult`]. A failed call becomes inline error
//! text for that source so the caller can move on to the next one.

use crate::client::{OcrRequest, OcrResponse, OcrService};
use crate::config::OcrConfig;
use crate::output::{SourceResult, NO_TEXT_FOUND};
use crate::pipeline::descriptor::PreparedSource;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Call the service for one source.
///
/// Does not sleep; pacing is the caller's job (see [`pace`]).
pub async fn run_source(
    service: &dyn OcrService,
    position: usize,
    label: &str,
    prepared: PreparedSource,
    config: &OcrConfig,
) -> SourceResult {
    let start = Instant::now();
    let request = OcrRequest {
        model: config.model.clone(),
        document: prepared.descriptor,
        include_image_base64: config.include_image_base64,
    };

    let outcome = service.process(&request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let mut result = SourceResult {
        position,
        label: label.to_string(),
        text: String::new(),
        preview_reference: prepared.preview_reference,
        raw_image_bytes: prepared.raw_image_bytes,
        page_count: 0,
        images: Vec::new(),
        duration_ms,
        error: None,
    };

    match outcome {
        Ok(response) => {
            debug!(
                "Source {}: {} pages in {}ms",
                position,
                response.pages.len(),
                duration_ms
            );
            result.page_count = response.pages.len();
            result.text = join_pages(&response);
            result.images = response
                .pages
                .into_iter()
                .flat_map(|p| p.images)
                .collect();
        }
        Err(e) => {
            warn!("Source {} ({}): {}", position, label, e);
            result.text = e.to_result_text();
            result.error = Some(e);
        }
    }

    result
}

/// Join page markdown with a blank line, substituting [`NO_TEXT_FOUND`] for
/// an empty result.
pub fn join_pages(response: &OcrResponse) -> String {
    let joined = response
        .pages
        .iter()
        .map(|p| p.markdown.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    if joined.is_empty() {
        NO_TEXT_FOUND.to_string()
    } else {
        joined
    }
}

/// Sleep for the configured pacing delay.
pub async fn pace(config: &OcrConfig) {
    if config.pacing_delay_ms > 0 {
        sleep(Duration::from_millis(config.pacing_delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::OcrPage;

    fn page(markdown: &str) -> OcrPage {
        OcrPage {
            markdown: markdown.into(),
            ..Default::default()
        }
    }

    #[test]
    fn pages_joined_with_blank_line() {
        let resp = OcrResponse {
            pages: vec![page("one"), page("two")],
            ..Default::default()
        };
        assert_eq!(join_pages(&resp), "one\n\ntwo");
    }

    #[test]
    fn zero_pages_is_placeholder() {
        assert_eq!(join_pages(&OcrResponse::default()), "No text found.");
    }

    #[test]
    fn single_empty_page_is_placeholder() {
        let resp = OcrResponse {
            pages: vec![page("")],
            ..Default::default()
        };
        assert_eq!(join_pages(&resp), NO_TEXT_FOUND);
    }

    #[test]
    fn failure_text_matches_template() {
        let text = crate::error::OcrError::Api {
            status: 429,
            message: "rate limited".into(),
        }
        .to_result_text();
        assert!(text.starts_with("❌ Error extracting result: "));
        assert!(text.contains("rate limited"));
    }
}
