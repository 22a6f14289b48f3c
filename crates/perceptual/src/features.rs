//! N-gram feature extraction.
//!
//! A sliding window of the last `ngram_size` tokens is turned into one
//! feature index per position: the window's tokens are joined into a
//! canonical string (each token followed by `_`), hashed with MurmurHash3
//! x86_32 (seed 0), and reduced modulo `num_features`. The document's
//! feature set is the set of distinct indices. Collisions between distinct
//! windows are expected; the feature space is lossy on purpose.

use std::collections::VecDeque;

use canonical::Tokenizer;
use mur3::murmurhash3_x86_32;
use serde::{Deserialize, Serialize};

use crate::config::{FeatureConfig, PerceptualError};

/// Byte appended after every token of a window before hashing.
pub const WINDOW_SEPARATOR: u8 = b'_';

/// Seed passed to MurmurHash3 for window hashing.
pub const WINDOW_HASH_SEED: u32 = 0;

/// Distinct feature indices of one document, sorted ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FeatureSet {
    indices: Vec<u32>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = u32> + '_ {
        self.indices.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.indices
    }

    /// Largest index in the set, if any.
    pub fn max(&self) -> Option<u32> {
        self.indices.last().copied()
    }

    /// Exact Jaccard similarity `|A ∩ B| / |A ∪ B|`.
    ///
    /// Two empty sets compare as `1.0`, the same degenerate match the
    /// MinHash estimator reports for them.
    pub fn jaccard(&self, other: &FeatureSet) -> f64 {
        if self.is_empty() && other.is_empty() {
            return 1.0;
        }
        let (mut i, mut j, mut shared) = (0, 0, 0usize);
        let (a, b) = (&self.indices, &other.indices);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    shared += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        let union = a.len() + b.len() - shared;
        shared as f64 / union as f64
    }
}

impl FromIterator<u32> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut indices: Vec<u32> = iter.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }
}

impl<'a> IntoIterator for &'a FeatureSet {
    type Item = &'a u32;
    type IntoIter = std::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

/// Turns documents into feature sets.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    tokenizer: Tokenizer,
}

impl FeatureExtractor {
    /// Extractor using the default non-alphanumeric tokenizer.
    pub fn new(config: FeatureConfig) -> Result<Self, PerceptualError> {
        Self::with_tokenizer(config, Tokenizer::default())
    }

    pub fn with_tokenizer(
        config: FeatureConfig,
        tokenizer: Tokenizer,
    ) -> Result<Self, PerceptualError> {
        config.validate()?;
        Ok(Self { config, tokenizer })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Compute the feature set of `text`.
    ///
    /// Text with fewer than `ngram_size` tokens yields an empty set.
    pub fn extract(&self, text: &str) -> FeatureSet {
        let n = self.config.ngram_size;
        let mut window: VecDeque<&[u8]> = VecDeque::with_capacity(n + 1);
        let mut canonical: Vec<u8> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for token in self.tokenizer.tokens(text) {
            window.push_back(token.text);
            if window.len() > n {
                window.pop_front();
            }
            if window.len() == n {
                canonical.clear();
                for part in &window {
                    canonical.extend_from_slice(part);
                    canonical.push(WINDOW_SEPARATOR);
                }
                indices.push(feature_index(&canonical, self.config.num_features));
            }
        }

        FeatureSet::from_iter(indices)
    }
}

/// Hash a canonical window string into `[0, num_features)`.
#[inline]
pub fn feature_index(canonical: &[u8], num_features: u32) -> u32 {
    murmurhash3_x86_32(canonical, WINDOW_HASH_SEED) % num_features
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::DelimiterTable;

    const FOX: &str = "The quick brown fox jumps over the lazy dog";

    fn extractor(ngram_size: usize, num_features: u32) -> FeatureExtractor {
        FeatureExtractor::new(
            FeatureConfig::new()
                .with_ngram_size(ngram_size)
                .with_num_features(num_features),
        )
        .unwrap()
    }

    #[test]
    fn murmur_known_vectors() {
        assert_eq!(murmurhash3_x86_32(b"", 0), 0);
        assert_eq!(murmurhash3_x86_32(b"hello", 0), 0x248b_fa47);
    }

    #[test]
    fn first_window_index_is_pinned() {
        // murmur3("The_quick_brown_") = 762960058, mod 2^18 = 121018
        assert_eq!(feature_index(b"The_quick_brown_", 262_144), 121_018);
        let features = extractor(3, 262_144).extract(FOX);
        assert!(features.contains(121_018));
    }

    #[test]
    fn fox_sentence_has_seven_windows() {
        let features = extractor(3, 262_144).extract(FOX);
        assert_eq!(
            features.as_slice(),
            &[76_126, 76_145, 91_614, 99_514, 121_018, 162_592, 199_431]
        );
    }

    #[test]
    fn features_stay_in_range() {
        let texts = [
            FOX,
            "Roses are red, my love, violets are blue",
            "a b c d e f g h i j k l m n o p",
        ];
        for num_features in [1u32, 7, 64, 262_144] {
            let ex = extractor(2, num_features);
            for text in texts {
                let features = ex.extract(text);
                assert!(features.iter().all(|f| f < num_features));
            }
        }
    }

    #[test]
    fn single_bucket_space_collapses_everything() {
        let features = extractor(1, 1).extract(FOX);
        assert_eq!(features.as_slice(), &[0]);
    }

    #[test]
    fn short_documents_yield_empty_set() {
        let ex = extractor(3, 262_144);
        for text in ["", "|||", "||| a", "a|||", "AAAA,,,,,,|| ||", "two words"] {
            assert!(ex.extract(text).is_empty(), "expected no features for {text:?}");
        }
        assert_eq!(ex.extract("three words here").len(), 1);
    }

    #[test]
    fn delimiters_do_not_change_features() {
        let ex = extractor(3, 262_144);
        assert_eq!(
            ex.extract("the quick brown fox"),
            ex.extract("  the, quick -- brown...fox!!")
        );
    }

    #[test]
    fn repeated_windows_collapse() {
        let ex = extractor(2, 262_144);
        let features = ex.extract("a b a b a b a b");
        // Only "a_b_" and "b_a_" occur.
        assert_eq!(features.len(), 2);
    }

    #[test]
    fn extraction_is_deterministic() {
        let ex = extractor(3, 4096);
        assert_eq!(ex.extract(FOX), ex.extract(FOX));
    }

    #[test]
    fn separator_keeps_token_boundaries() {
        let ex = extractor(2, u32::MAX);
        assert_ne!(ex.extract("ab c"), ex.extract("a bc"));
    }

    #[test]
    fn custom_tokenizer_is_used() {
        let tokenizer = Tokenizer::new(DelimiterTable::from_delimiters(b"|"));
        let ex = FeatureExtractor::with_tokenizer(FeatureConfig::new().with_ngram_size(1), tokenizer)
            .unwrap();
        assert_eq!(ex.extract("hello world|x").len(), 2);
        assert_eq!(ex.tokenizer().delimiters().delimiter_count(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = FeatureExtractor::new(FeatureConfig::new().with_ngram_size(0)).unwrap_err();
        assert_eq!(err, PerceptualError::InvalidNgramSize { ngram_size: 0 });
    }

    #[test]
    fn feature_set_from_iter_sorts_and_dedups() {
        let set: FeatureSet = [5u32, 1, 5, 3, 1].into_iter().collect();
        assert_eq!(set.as_slice(), &[1, 3, 5]);
        assert_eq!(set.max(), Some(5));
        assert!(set.contains(3));
        assert!(!set.contains(4));
        assert_eq!((&set).into_iter().count(), 3);
    }

    #[test]
    fn exact_jaccard() {
        let a: FeatureSet = (0..10).collect();
        let b: FeatureSet = (5..15).collect();
        assert!((a.jaccard(&b) - 5.0 / 15.0).abs() < 1e-12);
        assert_eq!(a.jaccard(&a), 1.0);
        assert_eq!(a.jaccard(&FeatureSet::new()), 0.0);
        assert_eq!(FeatureSet::new().jaccard(&FeatureSet::new()), 1.0);
    }
}
