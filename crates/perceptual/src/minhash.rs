//! MinHash signatures over feature sets.
//!
//! Each slot of a signature is the minimum of a universal hash
//! `h_i(f) = ((1 + f) * a_i + b_i) mod P` over every feature index `f` of a
//! document, with `P` the prime [`MIN_HASH_PRIME`]. The probability that two
//! documents agree on a slot equals the Jaccard similarity of their feature
//! sets, so the fraction of agreeing slots is an unbiased estimate of it.
//!
//! The coefficient pairs `(a_i, b_i)` are drawn once per [`MinHasher`] from a
//! ChaCha8 generator seeded with a `u64`; the same seed always rebuilds the
//! same family. Signatures are only comparable when they come from the same
//! family.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{MinHashConfig, PerceptualError};
use crate::features::FeatureSet;

/// Prime modulus of the hash family. Also the sentinel stored in every slot
/// of an empty feature set's signature.
pub const MIN_HASH_PRIME: u32 = 2_038_074_743;

/// Fixed-length MinHash signature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Signature {
    values: Vec<u32>,
}

impl Signature {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.values
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.values
    }

    /// `true` when every slot holds the "no value seen" sentinel, i.e. the
    /// signature was computed from an empty feature set.
    pub fn is_degenerate(&self) -> bool {
        self.values.iter().all(|&v| v == MIN_HASH_PRIME)
    }
}

impl AsRef<[u32]> for Signature {
    fn as_ref(&self) -> &[u32] {
        &self.values
    }
}

/// One `(a, b)` pair of the universal hash family.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashCoefficients {
    /// Multiplier in `[1, P - 1]`.
    pub a: u32,
    /// Offset in `[0, P - 1]`.
    pub b: u32,
}

impl HashCoefficients {
    /// `((1 + feature) * a + b) mod P`, computed in 64 bits.
    ///
    /// `(2^32) * (P - 1) + (P - 1)` stays below `2^64`, so no feature index
    /// can overflow the intermediate product.
    ///
    /// Injective only for `feature < P - 1`: indices `f` and `f + P` always
    /// collide. The default feature space (2^18) is far below that bound.
    #[inline]
    pub fn hash(&self, feature: u32) -> u32 {
        let h = (1 + u64::from(feature)) * u64::from(self.a) + u64::from(self.b);
        (h % u64::from(MIN_HASH_PRIME)) as u32
    }
}

/// Immutable family of `num_hashes` universal hash functions.
///
/// Read-only after construction, so one instance can be shared across
/// threads and reused for every document whose signatures will be compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinHasher {
    seed: u64,
    coefficients: Vec<HashCoefficients>,
}

impl MinHasher {
    /// Sample a family of `num_hashes` functions from `seed`.
    pub fn new(num_hashes: usize, seed: u64) -> Result<Self, PerceptualError> {
        Self::from_config(&MinHashConfig { num_hashes, seed })
    }

    pub fn from_config(cfg: &MinHashConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        let coefficients = (0..cfg.num_hashes)
            .map(|_| {
                let a = rng.gen_range(1..MIN_HASH_PRIME);
                let b = rng.gen_range(0..MIN_HASH_PRIME);
                HashCoefficients { a, b }
            })
            .collect();

        Ok(Self {
            seed: cfg.seed,
            coefficients,
        })
    }

    pub fn num_hashes(&self) -> usize {
        self.coefficients.len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn coefficients(&self) -> &[HashCoefficients] {
        &self.coefficients
    }

    /// Compute the signature of `features`.
    ///
    /// Slot `i` is the minimum of `h_i` over the set, or [`MIN_HASH_PRIME`]
    /// when the set is empty.
    pub fn compute_signature(&self, features: &FeatureSet) -> Signature {
        let mut values = vec![MIN_HASH_PRIME; self.coefficients.len()];
        for f in features.iter() {
            for (slot, coeff) in values.iter_mut().zip(&self.coefficients) {
                let h = coeff.hash(f);
                if h < *slot {
                    *slot = h;
                }
            }
        }
        Signature { values }
    }

    /// Same result as [`compute_signature`](Self::compute_signature), with
    /// slots computed in parallel via Rayon. Worth it for large families or
    /// feature sets.
    pub fn compute_signature_par(&self, features: &FeatureSet) -> Signature {
        let mut values = Vec::with_capacity(self.coefficients.len());
        self.coefficients
            .par_iter()
            .map(|coeff| compute_slot(features.as_slice(), coeff))
            .collect_into_vec(&mut values);
        Signature { values }
    }

    /// Estimated Jaccard distance `1 - matches / len`.
    ///
    /// # Panics
    ///
    /// Panics when the signatures differ in length or are empty; such
    /// signatures cannot come from the same family.
    pub fn jaccard_distance(a: &Signature, b: &Signature) -> f64 {
        assert_eq!(
            a.len(),
            b.len(),
            "signatures from different hash families cannot be compared"
        );
        assert!(!a.is_empty(), "cannot compare empty signatures");

        let matches = a
            .values
            .iter()
            .zip(&b.values)
            .filter(|(x, y)| x == y)
            .count();
        1.0 - matches as f64 / a.len() as f64
    }

    /// Estimated Jaccard similarity, `1 - jaccard_distance`.
    pub fn similarity(a: &Signature, b: &Signature) -> f64 {
        1.0 - Self::jaccard_distance(a, b)
    }
}

#[inline]
fn compute_slot(features: &[u32], coeff: &HashCoefficients) -> u32 {
    features
        .iter()
        .map(|&f| coeff.hash(f))
        .min()
        .unwrap_or(MIN_HASH_PRIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: impl IntoIterator<Item = u32>) -> FeatureSet {
        values.into_iter().collect()
    }

    // ==================== Family construction ====================

    #[test]
    fn zero_hashes_rejected() {
        assert_eq!(
            MinHasher::new(0, 1).unwrap_err(),
            PerceptualError::InvalidNumHashes { num_hashes: 0 }
        );
    }

    #[test]
    fn coefficients_are_in_range() {
        let hasher = MinHasher::new(512, 42).unwrap();
        assert_eq!(hasher.num_hashes(), 512);
        assert_eq!(hasher.seed(), 42);
        for c in hasher.coefficients() {
            assert!(c.a >= 1 && c.a < MIN_HASH_PRIME);
            assert!(c.b < MIN_HASH_PRIME);
        }
    }

    #[test]
    fn same_seed_same_family() {
        assert_eq!(MinHasher::new(64, 7).unwrap(), MinHasher::new(64, 7).unwrap());
    }

    #[test]
    fn different_seed_different_family() {
        let a = MinHasher::new(64, 7).unwrap();
        let b = MinHasher::new(64, 8).unwrap();
        assert_ne!(a.coefficients(), b.coefficients());
    }

    #[test]
    fn shorter_family_is_prefix_of_longer() {
        let short = MinHasher::new(8, 3).unwrap();
        let long = MinHasher::new(32, 3).unwrap();
        assert_eq!(short.coefficients(), &long.coefficients()[..8]);
    }

    // ==================== Universal hash ====================

    #[test]
    fn hash_matches_formula() {
        let c = HashCoefficients { a: 3, b: 5 };
        assert_eq!(c.hash(0), 8);
        assert_eq!(c.hash(9), 35);
    }

    #[test]
    fn hash_uses_wide_intermediate() {
        let c = HashCoefficients {
            a: MIN_HASH_PRIME - 1,
            b: MIN_HASH_PRIME - 1,
        };
        let expected = ((1 + u64::from(u32::MAX)) * u64::from(MIN_HASH_PRIME - 1)
            + u64::from(MIN_HASH_PRIME - 1))
            % u64::from(MIN_HASH_PRIME);
        assert_eq!(u64::from(c.hash(u32::MAX)), expected);
        assert!(c.hash(u32::MAX) < MIN_HASH_PRIME);
    }

    // ==================== Signatures ====================

    #[test]
    fn empty_set_signature_is_all_sentinel() {
        let hasher = MinHasher::new(13, 1).unwrap();
        let sig = hasher.compute_signature(&FeatureSet::new());
        assert_eq!(sig.len(), 13);
        assert!(sig.as_slice().iter().all(|&v| v == MIN_HASH_PRIME));
        assert!(sig.is_degenerate());
    }

    #[test]
    fn single_feature_signature_is_the_hash() {
        let hasher = MinHasher::new(8, 1).unwrap();
        let sig = hasher.compute_signature(&set([42]));
        for (v, c) in sig.as_slice().iter().zip(hasher.coefficients()) {
            assert_eq!(*v, c.hash(42));
        }
        assert!(!sig.is_degenerate());
    }

    #[test]
    fn slot_is_minimum_over_features() {
        let hasher = MinHasher::new(16, 9).unwrap();
        let features = set([3, 17, 99, 4096, 200_000]);
        let sig = hasher.compute_signature(&features);
        for (v, c) in sig.as_slice().iter().zip(hasher.coefficients()) {
            let min = features.iter().map(|f| c.hash(f)).min().unwrap();
            assert_eq!(*v, min);
        }
    }

    #[test]
    fn signature_is_deterministic() {
        let features = set([1, 2, 3, 4, 5]);
        let a = MinHasher::new(32, 11).unwrap();
        let b = MinHasher::new(32, 11).unwrap();
        assert_eq!(a.compute_signature(&features), a.compute_signature(&features));
        assert_eq!(a.compute_signature(&features), b.compute_signature(&features));
    }

    #[test]
    fn parallel_equals_sequential() {
        let hasher = MinHasher::new(128, 5).unwrap();
        for features in [FeatureSet::new(), set([7]), set((0..500).map(|i| i * 37))] {
            assert_eq!(
                hasher.compute_signature(&features),
                hasher.compute_signature_par(&features)
            );
        }
    }

    // ==================== Distance ====================

    #[test]
    fn distance_to_self_is_zero() {
        let hasher = MinHasher::new(13, 1).unwrap();
        let sig = hasher.compute_signature(&set([10, 20, 30]));
        assert_eq!(MinHasher::jaccard_distance(&sig, &sig), 0.0);
        assert_eq!(MinHasher::similarity(&sig, &sig), 1.0);
    }

    #[test]
    fn distance_is_symmetric_and_bounded() {
        let hasher = MinHasher::new(64, 2).unwrap();
        let sets = [
            FeatureSet::new(),
            set(0..50),
            set(25..75),
            set(1000..1010),
            set([5]),
        ];
        let sigs: Vec<Signature> = sets.iter().map(|s| hasher.compute_signature(s)).collect();
        for a in &sigs {
            for b in &sigs {
                let d = MinHasher::jaccard_distance(a, b);
                assert!((0.0..=1.0).contains(&d));
                assert_eq!(d, MinHasher::jaccard_distance(b, a));
            }
        }
    }

    #[test]
    fn empty_sets_are_a_degenerate_match() {
        let hasher = MinHasher::new(13, 1).unwrap();
        let a = hasher.compute_signature(&FeatureSet::new());
        let b = hasher.compute_signature(&FeatureSet::new());
        assert_eq!(a, b);
        assert_eq!(MinHasher::jaccard_distance(&a, &b), 0.0);
    }

    #[test]
    fn empty_against_non_empty_is_maximally_distant() {
        let hasher = MinHasher::new(13, 1).unwrap();
        let a = hasher.compute_signature(&FeatureSet::new());
        let b = hasher.compute_signature(&set([1]));
        assert_eq!(MinHasher::jaccard_distance(&a, &b), 1.0);
    }

    #[test]
    fn disjoint_sets_never_share_a_slot() {
        // 1 + f stays in [1, P) for these indices, where h_i is injective.
        let hasher = MinHasher::new(256, 4).unwrap();
        let a = hasher.compute_signature(&set(0..100));
        let b = hasher.compute_signature(&set(100..200));
        assert_eq!(MinHasher::jaccard_distance(&a, &b), 1.0);
    }

    #[test]
    fn feature_indices_wrap_modulo_prime() {
        // 1 + P == 1 (mod P): beyond P - 1 disjoint sets can tie on every slot.
        let hasher = MinHasher::new(32, 4).unwrap();
        for c in hasher.coefficients() {
            assert_eq!(c.hash(MIN_HASH_PRIME), c.hash(0));
        }
        let a = hasher.compute_signature(&set([0]));
        let b = hasher.compute_signature(&set([MIN_HASH_PRIME]));
        assert_eq!(MinHasher::jaccard_distance(&a, &b), 0.0);
    }

    #[test]
    fn counts_matching_slots() {
        let a = Signature::new(vec![1, 2, 3, 4]);
        let b = Signature::new(vec![1, 9, 3, 9]);
        assert_eq!(MinHasher::jaccard_distance(&a, &b), 0.5);
    }

    #[test]
    #[should_panic(expected = "different hash families")]
    fn length_mismatch_panics() {
        let a = Signature::new(vec![1, 2, 3]);
        let b = Signature::new(vec![1, 2]);
        MinHasher::jaccard_distance(&a, &b);
    }

    #[test]
    #[should_panic(expected = "empty signatures")]
    fn empty_signatures_panic() {
        let a = Signature::new(Vec::new());
        MinHasher::jaccard_distance(&a, &a);
    }

    // ==================== Estimator quality ====================

    /// Two sets over pseudo-random feature indices with Jaccard exactly 1/3.
    fn one_third_overlap() -> (FeatureSet, FeatureSet) {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut universe: Vec<u32> = Vec::new();
        while universe.len() < 300 {
            let f = rng.gen_range(0..262_144u32);
            if !universe.contains(&f) {
                universe.push(f);
            }
        }
        let a: FeatureSet = universe[..200].iter().copied().collect();
        let b: FeatureSet = universe[100..].iter().copied().collect();
        (a, b)
    }

    fn squared_errors(num_hashes: usize, trials: u64) -> (f64, f64) {
        let (a, b) = one_third_overlap();
        let truth = a.jaccard(&b);
        let (mut sum, mut sq) = (0.0, 0.0);
        for seed in 0..trials {
            let hasher = MinHasher::new(num_hashes, seed).unwrap();
            let est = MinHasher::similarity(
                &hasher.compute_signature(&a),
                &hasher.compute_signature(&b),
            );
            sum += est;
            sq += (est - truth) * (est - truth);
        }
        (sum / trials as f64, sq / trials as f64)
    }

    #[test]
    fn estimator_centers_on_true_similarity() {
        let (mean, _) = squared_errors(128, 200);
        assert!((mean - 1.0 / 3.0).abs() < 0.05, "mean estimate {mean}");
    }

    #[test]
    fn more_hashes_lower_the_error() {
        let (_, mse_small) = squared_errors(8, 200);
        let (_, mse_large) = squared_errors(256, 200);
        assert!(
            mse_large < mse_small,
            "mse with 256 hashes ({mse_large}) should beat 8 hashes ({mse_small})"
        );
    }

    #[test]
    fn signature_serde_roundtrip() {
        let hasher = MinHasher::new(4, 1).unwrap();
        let sig = hasher.compute_signature(&set([1, 2]));
        let json = serde_json::to_string(&sig).unwrap();
        let back: Signature = serde_json::from_str(&json).unwrap();
        assert_eq!(sig, back);
        assert_eq!(back.into_inner().len(), 4);
    }
}
