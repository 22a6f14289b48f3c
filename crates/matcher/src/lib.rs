//! # neardup Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` sits on top of the tokenizer (`canonical`) and the MinHash
//! layer (`perceptual`). Given a batch of documents it computes one
//! signature per document with a single shared hash family, then compares
//! every pair and reports those whose estimated Jaccard distance is below a
//! threshold.
//!
//! ## Core Types
//!
//! - [`DedupConfig`]: n-gram size, signature length, threshold, feature
//!   space, seed, parallelism and [`ScanStrategy`].
//! - [`Deduplicator`]: owns the extractor and hash family; `process` is a
//!   one-shot batch call with no state carried between calls.
//! - [`DuplicatePair`]: positions of both documents plus the estimated
//!   similarity and distance.
//!
//! The exhaustive scan is `O(D² · num_hashes)` for `D` documents. It is
//! meant for small batches; [`ScanStrategy::Banded`] trades recall for
//! fewer comparisons on larger ones.
//!
//! ## Example Usage
//!
//! ```
//! use matcher::{DedupConfig, Deduplicator};
//!
//! let dedup = Deduplicator::new(DedupConfig::default()).unwrap();
//! let docs = [
//!     "The quick brown fox jumps over the lazy dog",
//!     "different than the others",
//!     "The quick brown fox jumps over the lazy dog",
//! ];
//!
//! let pairs = dedup.process(&docs);
//! assert_eq!(pairs.len(), 1);
//! assert_eq!((pairs[0].left, pairs[0].right), (0, 2));
//! assert_eq!(pairs[0].similarity, 1.0);
//! ```
//!
//! ## Observability
//!
//! Each `process` call runs inside a `matcher.process` tracing span and
//! emits a `dedup_complete` event. Install a [`DedupMetrics`]
//! implementation via [`set_dedup_metrics`] to record per-batch latency and
//! pair counts.

pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::engine::Deduplicator;
pub use crate::metrics::{set_dedup_metrics, DedupMetrics};
pub use crate::types::{DedupConfig, DuplicatePair, MatchError, ScanStrategy, DEFAULT_THRESHOLD};
