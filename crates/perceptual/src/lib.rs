//! # neardup Perceptual Layer
//!
//! Turns text into compact, similarity-preserving MinHash signatures.
//!
//! ## Contract
//!
//! - Every operation is a pure function of `(text, config)` plus the hash
//!   family drawn from the configured seed. No I/O, no clocks, no global
//!   mutable state.
//! - Signatures are only comparable when they were produced by the same
//!   [`MinHasher`] family (same `num_hashes` and `seed`).
//!
//! ## Pipeline
//!
//! 1.  **Features**: a sliding window of `ngram_size` tokens is hashed with
//!     MurmurHash3 into `[0, num_features)`; the distinct indices form the
//!     document's [`FeatureSet`].
//! 2.  **MinHash**: for each of `num_hashes` universal hash functions
//!     `((1 + f) * a + b) mod P`, keep the minimum over the feature set. The
//!     fraction of agreeing slots between two signatures estimates the
//!     Jaccard similarity of the underlying feature sets.
//! 3.  **Banding** (optional): [`LshBuckets`] groups signatures by band so a
//!     caller can skip pairs that cannot be near-duplicates.
//!
//! ## Example Usage
//!
//! ```
//! use perceptual::{FeatureConfig, FeatureExtractor, MinHasher};
//!
//! let extractor = FeatureExtractor::new(FeatureConfig::default()).unwrap();
//! let hasher = MinHasher::new(13, 1).unwrap();
//!
//! let a = hasher.compute_signature(&extractor.extract("The quick brown fox jumps over the lazy dog"));
//! let b = hasher.compute_signature(&extractor.extract("The quick brown fox jumps over the lazy dog"));
//!
//! assert_eq!(a.len(), 13);
//! assert_eq!(MinHasher::jaccard_distance(&a, &b), 0.0);
//! ```
pub mod config;
mod features;
mod lsh;
mod minhash;

pub use crate::config::{
    FeatureConfig, MinHashConfig, PerceptualError, DEFAULT_NGRAM_SIZE, DEFAULT_NUM_FEATURES,
    DEFAULT_NUM_HASHES, DEFAULT_SEED,
};
pub use crate::features::{
    feature_index, FeatureExtractor, FeatureSet, WINDOW_HASH_SEED, WINDOW_SEPARATOR,
};
pub use crate::lsh::{BandingConfig, LshBuckets};
pub use crate::minhash::{HashCoefficients, MinHasher, Signature, MIN_HASH_PRIME};
