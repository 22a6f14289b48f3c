use perceptual::{
    BandingConfig, PerceptualError, DEFAULT_NGRAM_SIZE, DEFAULT_NUM_FEATURES, DEFAULT_NUM_HASHES,
    DEFAULT_SEED,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default distance threshold: pairs closer than this are duplicates.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// How candidate pairs are enumerated before the threshold check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanStrategy {
    /// Compare every unordered pair. Quadratic in the batch size.
    #[default]
    Exhaustive,
    /// Only compare pairs that share an LSH band bucket. Candidates are
    /// still checked against the threshold, so the result is always a subset
    /// of the exhaustive one.
    Banded(BandingConfig),
}

/// Configuration for a [`Deduplicator`](crate::Deduplicator).
///
/// Fixed at construction; every `process` call reuses the same hash family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DedupConfig {
    /// Tokens per n-gram window.
    #[serde(default = "DedupConfig::default_ngram_size")]
    pub ngram_size: usize,
    /// Signature length.
    #[serde(default = "DedupConfig::default_num_hashes")]
    pub num_hashes: usize,
    /// Pairs with estimated distance strictly below this are reported.
    #[serde(default = "DedupConfig::default_threshold")]
    pub threshold: f64,
    /// Feature-space size, conventionally a power of two.
    #[serde(default = "DedupConfig::default_num_features")]
    pub num_features: u32,
    /// Seed of the MinHash coefficient generator.
    #[serde(default = "DedupConfig::default_seed")]
    pub seed: u64,
    /// Compute signatures and scan pairs on the Rayon pool.
    #[serde(default)]
    pub use_parallel: bool,
    #[serde(default)]
    pub strategy: ScanStrategy,
}

impl DedupConfig {
    pub(crate) fn default_ngram_size() -> usize {
        DEFAULT_NGRAM_SIZE
    }

    pub(crate) fn default_num_hashes() -> usize {
        DEFAULT_NUM_HASHES
    }

    pub(crate) fn default_threshold() -> f64 {
        DEFAULT_THRESHOLD
    }

    pub(crate) fn default_num_features() -> u32 {
        DEFAULT_NUM_FEATURES
    }

    pub(crate) fn default_seed() -> u64 {
        DEFAULT_SEED
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ngram_size(mut self, ngram_size: usize) -> Self {
        self.ngram_size = ngram_size;
        self
    }

    pub fn with_num_hashes(mut self, num_hashes: usize) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_num_features(mut self, num_features: u32) -> Self {
        self.num_features = num_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Validate every knob, including the ones owned by the perceptual layer.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidThreshold {
                threshold: self.threshold,
            });
        }
        if self.ngram_size < 1 {
            return Err(PerceptualError::InvalidNgramSize {
                ngram_size: self.ngram_size,
            }
            .into());
        }
        if self.num_features < 1 {
            return Err(PerceptualError::InvalidNumFeatures {
                num_features: self.num_features,
            }
            .into());
        }
        if self.num_hashes < 1 {
            return Err(PerceptualError::InvalidNumHashes {
                num_hashes: self.num_hashes,
            }
            .into());
        }
        if let ScanStrategy::Banded(banding) = &self.strategy {
            banding.validate(self.num_hashes)?;
        }
        Ok(())
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ngram_size: DEFAULT_NGRAM_SIZE,
            num_hashes: DEFAULT_NUM_HASHES,
            threshold: DEFAULT_THRESHOLD,
            num_features: DEFAULT_NUM_FEATURES,
            seed: DEFAULT_SEED,
            use_parallel: false,
            strategy: ScanStrategy::Exhaustive,
        }
    }
}

/// A reported near-duplicate pair.
///
/// `left < right`, both positions in the input batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DuplicatePair {
    pub left: usize,
    pub right: usize,
    /// Estimated Jaccard similarity, `1 - distance`.
    pub similarity: f64,
    /// Estimated Jaccard distance.
    pub distance: f64,
}

/// Errors that can occur while building a deduplicator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("invalid config: threshold must be a finite value in [0, 1] (got {threshold})")]
    InvalidThreshold { threshold: f64 },
    #[error(transparent)]
    Perceptual(#[from] PerceptualError),
}
