//! Progress-callback trait for per-source batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::OcrConfigBuilder::progress_callback`] to receive events
//! as the pipeline works through each source.
//!
//! # Example
//!
//! ```rust
//! use mistral_ocr::{BatchProgressCallback, FileType, OcrConfig, SourceType};
//! use std::sync::{Arc, atomic::{AtomicU8, Ordering}};
//!
//! struct PercentTracker {
//!     last: AtomicU8,
//! }
//!
//! impl BatchProgressCallback for PercentTracker {
//!     fn on_source_complete(&self, _position: usize, _total: usize, percent: u8, _len: usize) {
//!         self.last.store(percent, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = OcrConfig::builder()
//!     .api_key("sk-test")
//!     .file_type(FileType::Pdf)
//!     .source_type(SourceType::Url)
//!     .progress_callback(Arc::new(PercentTracker { last: AtomicU8::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as it processes each source.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Sources are processed one at a time, but the trait
/// is `Send + Sync` so implementations can be shared with other tasks.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before the first source is processed.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before the OCR request for a source is sent.
    ///
    /// # Arguments
    /// * `position` — 1-based source position
    /// * `total`    — sources in the batch
    /// * `label`    — URL or file name
    fn on_source_start(&self, position: usize, total: usize, label: &str) {
        let _ = (position, total, label);
    }

    /// Called when a source produced text (including "No text found.").
    ///
    /// `percent` is `round(position / total * 100)`.
    fn on_source_complete(&self, position: usize, total: usize, percent: u8, text_len: usize) {
        let _ = (position, total, percent, text_len);
    }

    /// Called when the OCR call for a source failed.
    fn on_source_error(&self, position: usize, total: usize, percent: u8, error: &str) {
        let _ = (position, total, percent, error);
    }

    /// Called once after every source has been attempted.
    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let _ = (total, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::OcrConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;

/// Percentage of the batch complete once the source at 0-based `index` is done.
///
/// Rounds half away from zero; `total == 0` reports 100.
pub fn progress_percent(index: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = ((index + 1) as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        succeeded: AtomicUsize,
    }

    impl BatchProgressCallback for TrackingCallback {
        fn on_source_start(&self, _position: usize, _total: usize, _label: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_source_complete(&self, _p: usize, _t: usize, _pct: u8, _len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_source_error(&self, _p: usize, _t: usize, _pct: u8, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_batch_complete(&self, _total: usize, succeeded: usize) {
            self.succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_batch_start(2);
        cb.on_source_start(1, 2, "a.pdf");
        cb.on_source_complete(1, 2, 50, 10);
        cb.on_source_error(2, 2, 100, "boom");
        cb.on_batch_complete(2, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let t = TrackingCallback {
            starts: AtomicUsize::new(0),
            completes: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
        };
        t.on_source_start(1, 2, "a");
        t.on_source_complete(1, 2, 50, 3);
        t.on_source_start(2, 2, "b");
        t.on_source_error(2, 2, 100, "x");
        t.on_batch_complete(2, 1);
        assert_eq!(t.starts.load(Ordering::SeqCst), 2);
        assert_eq!(t.completes.load(Ordering::SeqCst), 1);
        assert_eq!(t.errors.load(Ordering::SeqCst), 1);
        assert_eq!(t.succeeded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn percent_rounds() {
        assert_eq!(progress_percent(0, 3), 33);
        assert_eq!(progress_percent(1, 3), 67);
        assert_eq!(progress_percent(2, 3), 100);
        assert_eq!(progress_percent(0, 1), 100);
        assert_eq!(progress_percent(0, 8), 13); // 12.5 rounds up
    }
}
