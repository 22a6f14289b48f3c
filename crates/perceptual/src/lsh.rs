//! Banding for MinHash signatures.
//!
//! Splits every signature into `bands` consecutive groups of
//! `rows_per_band` slots and buckets documents by the hash of each group.
//! Two documents become a candidate pair when they land in the same bucket
//! for at least one band. Banding only narrows which pairs get compared;
//! callers still verify every candidate with
//! [`MinHasher::jaccard_distance`](crate::MinHasher::jaccard_distance).

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

use crate::config::PerceptualError;
use crate::minhash::Signature;

/// Band layout over a signature.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BandingConfig {
    pub bands: usize,
    pub rows_per_band: usize,
}

impl BandingConfig {
    pub fn new(bands: usize, rows_per_band: usize) -> Self {
        Self {
            bands,
            rows_per_band,
        }
    }

    /// Check that the bands fit inside signatures of `num_hashes` slots.
    pub fn validate(&self, num_hashes: usize) -> Result<(), PerceptualError> {
        let fits = self
            .bands
            .checked_mul(self.rows_per_band)
            .is_some_and(|used| used <= num_hashes);
        if self.bands == 0 || self.rows_per_band == 0 || !fits {
            return Err(PerceptualError::InvalidBanding {
                bands: self.bands,
                rows: self.rows_per_band,
                num_hashes,
            });
        }
        Ok(())
    }

    /// Probability that a pair with true similarity `s` becomes a candidate:
    /// `1 - (1 - s^r)^b`.
    pub fn candidate_probability(&self, similarity: f64) -> f64 {
        let s = similarity.clamp(0.0, 1.0);
        1.0 - (1.0 - s.powi(self.rows_per_band as i32)).powi(self.bands as i32)
    }
}

/// Per-band buckets for a batch of signatures.
#[derive(Debug)]
pub struct LshBuckets {
    config: BandingConfig,
    buckets: Vec<HashMap<u64, Vec<usize>>>,
    len: usize,
}

impl LshBuckets {
    /// Bucket `signatures`; positions in the slice become document ids.
    pub fn build(
        signatures: &[Signature],
        config: &BandingConfig,
    ) -> Result<Self, PerceptualError> {
        let num_hashes = signatures
            .first()
            .map_or(config.bands.saturating_mul(config.rows_per_band), Signature::len);
        config.validate(num_hashes)?;

        let mut buckets: Vec<HashMap<u64, Vec<usize>>> =
            (0..config.bands).map(|_| HashMap::new()).collect();
        for (doc, sig) in signatures.iter().enumerate() {
            for (band, chunk) in sig
                .as_slice()
                .chunks_exact(config.rows_per_band)
                .take(config.bands)
                .enumerate()
            {
                buckets[band]
                    .entry(hash_band(band, chunk))
                    .or_default()
                    .push(doc);
            }
        }

        Ok(Self {
            config: *config,
            buckets,
            len: signatures.len(),
        })
    }

    pub fn config(&self) -> &BandingConfig {
        &self.config
    }

    /// Number of bucketed documents.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every `(i, j)` with `i < j` sharing a bucket, in lexicographic order.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = BTreeSet::new();
        for band in &self.buckets {
            for docs in band.values() {
                for (k, &i) in docs.iter().enumerate() {
                    for &j in &docs[k + 1..] {
                        pairs.insert((i, j));
                    }
                }
            }
        }
        pairs.into_iter().collect()
    }
}

fn hash_band(band: usize, rows: &[u32]) -> u64 {
    let mut bytes = Vec::with_capacity(rows.len() * 4);
    for r in rows {
        bytes.extend_from_slice(&r.to_le_bytes());
    }
    xxh3_64_with_seed(&bytes, band as u64)
}
