//! Result types produced by an OCR run.

use crate::client::OcrImage;
use crate::error::OcrError;
use serde::Serialize;

/// Text stored when the service returned no pages or only empty pages.
pub const NO_TEXT_FOUND: &str = "No text found.";

/// Outcome for one source.
///
/// `text` is never empty: it holds the joined page markdown,
/// [`NO_TEXT_FOUND`], or the inline error message when `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct SourceResult {
    /// 1-based position of the source in the batch.
    pub position: usize,
    /// URL or file name.
    pub label: String,
    pub text: String,
    /// URL or data URI a viewer can display.
    pub preview_reference: String,
    /// Raw bytes of an uploaded image, for direct display.
    #[serde(skip)]
    pub raw_image_bytes: Option<Vec<u8>>,
    pub page_count: usize,
    /// Images embedded in the response, in page order.
    pub images: Vec<OcrImage>,
    pub duration_ms: u64,
    pub error: Option<OcrError>,
}

impl SourceResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything one processing invocation produced.
///
/// Created fresh for every run; results are indexed in source order, so
/// `results()[i]`, `preview_references()[i]` and `image_bytes()[i]` all refer
/// to source `i`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunState {
    results: Vec<SourceResult>,
    pub stats: BatchStats,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, result: SourceResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[SourceResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<SourceResult> {
        self.results
    }

    /// Result at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&SourceResult> {
        position.checked_sub(1).and_then(|i| self.results.get(i))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn preview_references(&self) -> Vec<&str> {
        self.results
            .iter()
            .map(|r| r.preview_reference.as_str())
            .collect()
    }

    pub fn image_bytes(&self) -> Vec<Option<&[u8]>> {
        self.results
            .iter()
            .map(|r| r.raw_image_bytes.as_deref())
            .collect()
    }
}

/// Aggregate numbers for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total_sources: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Successful calls that returned no text.
    pub empty: usize,
    pub total_pages: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    pub(crate) fn record(&mut self, result: &SourceResult) {
        self.total_sources += 1;
        self.total_pages += result.page_count;
        if result.is_success() {
            self.succeeded += 1;
            if result.text == NO_TEXT_FOUND {
                self.empty += 1;
            }
        } else {
            self.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(position: usize, text: &str, error: Option<OcrError>) -> SourceResult {
        SourceResult {
            position,
            label: format!("src-{position}"),
            text: text.into(),
            preview_reference: format!("https://example.com/{position}"),
            raw_image_bytes: None,
            page_count: 1,
            images: vec![],
            duration_ms: 0,
            error,
        }
    }

    #[test]
    fn get_is_one_based() {
        let mut run = RunState::new();
        run.push(result(1, "a", None));
        run.push(result(2, "b", None));
        assert_eq!(run.get(1).unwrap().text, "a");
        assert_eq!(run.get(2).unwrap().text, "b");
        assert!(run.get(0).is_none());
        assert!(run.get(3).is_none());
    }

    #[test]
    fn parallel_views_line_up() {
        let mut run = RunState::new();
        run.push(result(1, "a", None));
        run.push(result(2, "b", Some(OcrError::Http("x".into()))));
        assert_eq!(run.texts().len(), run.preview_references().len());
        assert_eq!(run.texts().len(), run.image_bytes().len());
        assert_eq!(run.preview_references()[1], "https://example.com/2");
    }

    #[test]
    fn stats_count_empty_and_failed() {
        let mut stats = BatchStats::default();
        stats.record(&result(1, "text", None));
        stats.record(&result(2, NO_TEXT_FOUND, None));
        stats.record(&result(3, "err", Some(OcrError::Timeout { secs: 5 })));
        assert_eq!(stats.total_sources, 3);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn raw_bytes_not_serialised() {
        let mut r = result(1, "a", None);
        r.raw_image_bytes = Some(vec![1, 2, 3]);
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("raw_image_bytes").is_none());
        assert_eq!(json["position"], 1);
    }
}
