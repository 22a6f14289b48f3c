//! Process-wide batch instrumentation.
//!
//! A single recorder slot is shared by every [`Deduplicator`](crate::Deduplicator).
//! When the slot is empty, `process` skips reporting entirely.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::Lazy;

/// Receives one call per finished `process` batch.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// use matcher::{set_dedup_metrics, DedupConfig, DedupMetrics, Deduplicator};
///
/// #[derive(Default)]
/// struct PairCounter(AtomicUsize);
///
/// impl DedupMetrics for PairCounter {
///     fn record_batch(&self, _documents: usize, _latency: Duration, pair_count: usize) {
///         self.0.fetch_add(pair_count, Ordering::Relaxed);
///     }
/// }
///
/// let counter = Arc::new(PairCounter::default());
/// set_dedup_metrics(Some(counter.clone()));
///
/// let dedup = Deduplicator::new(DedupConfig::default()).unwrap();
/// dedup.process(&["one two three", "one two three"]);
/// assert_eq!(counter.0.load(Ordering::Relaxed), 1);
///
/// set_dedup_metrics(None);
/// ```
pub trait DedupMetrics: Send + Sync {
    /// `documents` in the batch, wall-clock `latency` of the whole call and
    /// the number of pairs returned.
    fn record_batch(&self, documents: usize, latency: Duration, pair_count: usize);
}

type SharedRecorder = Arc<dyn DedupMetrics>;

static RECORDER: Lazy<RwLock<Option<SharedRecorder>>> = Lazy::new(|| RwLock::new(None));

/// Current recorder, if one is installed. A poisoned slot is still read.
pub(crate) fn metrics_recorder() -> Option<SharedRecorder> {
    match RECORDER.read() {
        Ok(slot) => slot.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Replace the process-wide recorder; `None` turns reporting off.
pub fn set_dedup_metrics(recorder: Option<SharedRecorder>) {
    let mut slot = match RECORDER.write() {
        Ok(slot) => slot,
        Err(poisoned) => poisoned.into_inner(),
    };
    *slot = recorder;
}
