//! Configuration and error types for neardup feature extraction and MinHash.
//!
//! This module is free of any I/O or environment-dependent behavior so that
//! features and signatures are a pure function of `(text, config)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default n-gram window width in tokens.
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// Default feature-space size. Matches the `numFeatures` default of Spark's
/// `HashingTF`; should be a power of two.
pub const DEFAULT_NUM_FEATURES: u32 = 262_144;

/// Default number of hash functions in a MinHash family.
pub const DEFAULT_NUM_HASHES: usize = 13;

/// Default seed for the MinHash coefficient generator.
pub const DEFAULT_SEED: u64 = 1;

/// Configuration for n-gram feature extraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureConfig {
    /// Number of consecutive tokens per window (the `N` of the n-gram).
    ///
    /// Documents with fewer tokens than this produce an empty feature set.
    pub ngram_size: usize,
    /// Size of the feature space. Every feature index is in
    /// `[0, num_features)`.
    pub num_features: u32,
}

impl FeatureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window width. Larger windows are stricter about word order.
    pub fn with_ngram_size(mut self, ngram_size: usize) -> Self {
        self.ngram_size = ngram_size;
        self
    }

    /// Set the feature-space size. Smaller spaces collide more often.
    pub fn with_num_features(mut self, num_features: u32) -> Self {
        self.num_features = num_features;
        self
    }

    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.ngram_size < 1 {
            return Err(PerceptualError::InvalidNgramSize {
                ngram_size: self.ngram_size,
            });
        }
        if self.num_features < 1 {
            return Err(PerceptualError::InvalidNumFeatures {
                num_features: self.num_features,
            });
        }
        Ok(())
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            ngram_size: DEFAULT_NGRAM_SIZE,
            num_features: DEFAULT_NUM_FEATURES,
        }
    }
}

/// Configuration for a MinHash family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MinHashConfig {
    /// Signature length. More hashes lower the estimator variance.
    pub num_hashes: usize,
    /// Seed for the coefficient generator.
    ///
    /// Two families built from the same seed and `num_hashes` are identical,
    /// so their signatures can be compared.
    pub seed: u64,
}

impl MinHashConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_hashes(mut self, num_hashes: usize) -> Self {
        self.num_hashes = num_hashes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.num_hashes < 1 {
            return Err(PerceptualError::InvalidNumHashes {
                num_hashes: self.num_hashes,
            });
        }
        Ok(())
    }
}

impl Default for MinHashConfig {
    fn default() -> Self {
        Self {
            num_hashes: DEFAULT_NUM_HASHES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Errors returned when building extractors, hashers or band indexes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: ngram_size must be >= 1 (got {ngram_size})")]
    InvalidNgramSize { ngram_size: usize },

    #[error("invalid config: num_features must be >= 1 (got {num_features})")]
    InvalidNumFeatures { num_features: u32 },

    #[error("invalid config: num_hashes must be >= 1 (got {num_hashes})")]
    InvalidNumHashes { num_hashes: usize },

    #[error(
        "invalid banding: bands={bands} rows_per_band={rows} does not fit num_hashes={num_hashes}"
    )]
    InvalidBanding {
        bands: usize,
        rows: usize,
        num_hashes: usize,
    },
}
