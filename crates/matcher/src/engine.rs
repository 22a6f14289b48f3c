use std::time::Instant;

use canonical::Tokenizer;
use perceptual::{
    BandingConfig, FeatureConfig, FeatureExtractor, FeatureSet, LshBuckets, MinHasher, Signature,
};
use rayon::prelude::*;
use tracing::{debug, info, warn, Level};

use crate::metrics::metrics_recorder;
use crate::types::{DedupConfig, DuplicatePair, MatchError, ScanStrategy};


/// Batch near-duplicate detector.
///
/// Owns one [`FeatureExtractor`] and one [`MinHasher`], both fixed at
/// construction, so every signature it produces, across any number of
/// `process` calls, is comparable with every other.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    config: DedupConfig,
    extractor: FeatureExtractor,
    hasher: MinHasher,
}

impl Deduplicator {
    pub fn new(config: DedupConfig) -> Result<Self, MatchError> {
        Self::with_tokenizer(config, Tokenizer::default())
    }

    /// Deduplicator splitting tokens with a custom tokenizer.
    pub fn with_tokenizer(config: DedupConfig, tokenizer: Tokenizer) -> Result<Self, MatchError> {
        config.validate()?;
        let extractor = FeatureExtractor::with_tokenizer(
            FeatureConfig::new()
                .with_ngram_size(config.ngram_size)
                .with_num_features(config.num_features),
            tokenizer,
        )?;
        let hasher = MinHasher::new(config.num_hashes, config.seed)?;
        Ok(Self {
            config,
            extractor,
            hasher,
        })
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn hasher(&self) -> &MinHasher {
        &self.hasher
    }

    /// Feature set of one document.
    pub fn extract_features(&self, text: &str) -> FeatureSet {
        self.extractor.extract(text)
    }

    /// Signature of one document.
    pub fn signature(&self, text: &str) -> Signature {
        self.hasher.compute_signature(&self.extractor.extract(text))
    }

    /// One signature per document, in input order.
    pub fn signatures<S>(&self, docs: &[S]) -> Vec<Signature>
    where
        S: AsRef<str> + Sync,
    {
        if self.config.use_parallel {
            docs.par_iter().map(|d| self.signature(d.as_ref())).collect()
        } else {
            docs.iter().map(|d| self.signature(d.as_ref())).collect()
        }
    }

    /// Estimated Jaccard distance between two texts.
    pub fn compare(&self, a: &str, b: &str) -> f64 {
        MinHasher::jaccard_distance(&self.signature(a), &self.signature(b))
    }

    /// Report every pair of documents whose estimated distance is below the
    /// threshold, ordered by `(left, right)`.
    pub fn process<S>(&self, docs: &[S]) -> Vec<DuplicatePair>
    where
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "matcher.process",
            documents = docs.len(),
            parallel = self.config.use_parallel
        );
        let _guard = span.enter();

        let signatures = self.signatures(docs);
        let degenerate = signatures.iter().filter(|s| s.is_degenerate()).count();
        if degenerate > 0 {
            debug!(degenerate, "documents_without_features");
        }

        let pairs = self.scan(&signatures);

        let latency = start.elapsed();
        info!(
            documents = docs.len(),
            pairs = pairs.len(),
            elapsed_micros = latency.as_micros() as u64,
            "dedup_complete"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_batch(docs.len(), latency, pairs.len());
        }
        pairs
    }

    /// Threshold scan over precomputed signatures.
    ///
    /// The signatures must come from this deduplicator's hash family.
    pub fn scan(&self, signatures: &[Signature]) -> Vec<DuplicatePair> {
        match &self.config.strategy {
            ScanStrategy::Exhaustive => self.scan_exhaustive(signatures),
            ScanStrategy::Banded(banding) => self.scan_banded(signatures, banding),
        }
    }

    fn scan_exhaustive(&self, signatures: &[Signature]) -> Vec<DuplicatePair> {
        let n = signatures.len();
        if self.config.use_parallel {
            let mut pairs: Vec<DuplicatePair> = (0..n)
                .into_par_iter()
                .flat_map_iter(|i| (i + 1..n).filter_map(move |j| self.check(signatures, i, j)))
                .collect();
            // Restore canonical (i, j) order regardless of how work was split.
            pairs.sort_unstable_by_key(|p| (p.left, p.right));
            pairs
        } else {
            let mut pairs = Vec::new();
            for i in 0..n {
                for j in i + 1..n {
                    if let Some(pair) = self.check(signatures, i, j) {
                        pairs.push(pair);
                    }
                }
            }
            pairs
        }
    }

    fn scan_banded(&self, signatures: &[Signature], banding: &BandingConfig) -> Vec<DuplicatePair> {
        let buckets = match LshBuckets::build(signatures, banding) {
            Ok(buckets) => buckets,
            Err(err) => {
                warn!(error = %err, "banding_rejected_falling_back_to_exhaustive");
                return self.scan_exhaustive(signatures);
            }
        };
        let candidates = buckets.candidate_pairs();
        debug!(candidates = candidates.len(), "lsh_candidates");

        if self.config.use_parallel {
            candidates
                .par_iter()
                .filter_map(|&(i, j)| self.check(signatures, i, j))
                .collect()
        } else {
            candidates
                .iter()
                .filter_map(|&(i, j)| self.check(signatures, i, j))
                .collect()
        }
    }

    #[inline]
    fn check(&self, signatures: &[Signature], i: usize, j: usize) -> Option<DuplicatePair> {
        let distance = MinHasher::jaccard_distance(&signatures[i], &signatures[j]);
        (distance < self.config.threshold).then(|| DuplicatePair {
            left: i,
            right: j,
            similarity: 1.0 - distance,
            distance,
        })
    }
}
