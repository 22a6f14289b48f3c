//! Workspace umbrella crate for neardup.
//!
//! Re-exports the tokenizer, MinHash and matcher layers and adds the glue a
//! command-line front end needs: YAML configuration, a built-in demo corpus
//! and text/JSON report rendering.
//!
//! ```
//! use neardup::{find_duplicates, render_text_report, DedupConfig};
//!
//! let docs = ["a b c d e", "unrelated words here", "a b c d e"];
//! let pairs = find_duplicates(&docs, &DedupConfig::default()).unwrap();
//! let report = render_text_report(&docs, &pairs);
//! assert!(report.starts_with("Duplicate pair (Jaccard: 1):\n - a b c d e\n"));
//! ```

pub mod config;
mod demo;

pub use canonical::{tokenize, DelimiterTable, Token, Tokenizer, Tokens, NON_ALPHANUMERIC};
pub use config::{ConfigLoadError, NeardupConfig, OutputFormat};
pub use demo::demo_corpus;
pub use matcher::{
    set_dedup_metrics, DedupConfig, DedupMetrics, Deduplicator, DuplicatePair, MatchError,
    ScanStrategy,
};
pub use perceptual::{
    BandingConfig, FeatureConfig, FeatureExtractor, FeatureSet, MinHashConfig, MinHasher,
    PerceptualError, Signature,
};

use std::fmt::Write;

use serde::Serialize;

/// Run one batch through a freshly built [`Deduplicator`].
pub fn find_duplicates<S>(docs: &[S], config: &DedupConfig) -> Result<Vec<DuplicatePair>, MatchError>
where
    S: AsRef<str> + Sync,
{
    let dedup = Deduplicator::new(config.clone())?;
    Ok(dedup.process(docs))
}

/// Human-readable report, one block per pair:
///
/// ```text
/// Duplicate pair (Jaccard: <similarity>):
///  - <left document>
///  - <right document>
///
/// ```
///
/// # Panics
///
/// Panics if a pair refers to a position outside `docs`.
pub fn render_text_report<S: AsRef<str>>(docs: &[S], pairs: &[DuplicatePair]) -> String {
    let mut out = String::new();
    for pair in pairs {
        // writing into a String cannot fail
        let _ = write!(
            out,
            "Duplicate pair (Jaccard: {}):\n - {}\n - {}\n\n",
            pair.similarity,
            docs[pair.left].as_ref(),
            docs[pair.right].as_ref()
        );
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    documents: usize,
    pair_count: usize,
    pairs: Vec<JsonPair<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonPair<'a> {
    left: usize,
    right: usize,
    similarity: f64,
    distance: f64,
    left_text: &'a str,
    right_text: &'a str,
}

/// Pretty-printed JSON report carrying both positions, both texts and the
/// estimated similarity/distance of every pair.
///
/// # Panics
///
/// Panics if a pair refers to a position outside `docs`.
pub fn render_json_report<S: AsRef<str>>(
    docs: &[S],
    pairs: &[DuplicatePair],
) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        documents: docs.len(),
        pair_count: pairs.len(),
        pairs: pairs
            .iter()
            .map(|pair| JsonPair {
                left: pair.left,
                right: pair.right,
                similarity: pair.similarity,
                distance: pair.distance,
                left_text: docs[pair.left].as_ref(),
                right_text: docs[pair.right].as_ref(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(left: usize, right: usize, similarity: f64) -> DuplicatePair {
        DuplicatePair {
            left,
            right,
            similarity,
            distance: 1.0 - similarity,
        }
    }

    #[test]
    fn text_report_lists_both_documents_per_pair() {
        let docs = ["first doc", "second doc", "first doc"];
        let report = render_text_report(&docs, &[pair(0, 2, 1.0)]);
        assert_eq!(
            report,
            "Duplicate pair (Jaccard: 1):\n - first doc\n - first doc\n\n"
        );
    }

    #[test]
    fn text_report_is_empty_without_pairs() {
        let docs = ["a", "b"];
        assert!(render_text_report(&docs, &[]).is_empty());
    }

    #[test]
    fn text_report_keeps_pair_order() {
        let docs = ["a", "b", "c"];
        let report = render_text_report(&docs, &[pair(0, 1, 0.75), pair(1, 2, 0.5)]);
        let first = report.find(" - a\n - b").unwrap();
        let second = report.find(" - b\n - c").unwrap();
        assert!(first < second);
        assert!(report.contains("(Jaccard: 0.75)"));
        assert!(report.contains("(Jaccard: 0.5)"));
    }

    #[test]
    fn json_report_carries_texts_and_scores() {
        let docs = ["alpha beta", "gamma", "alpha beta"];
        let json = render_json_report(&docs, &[pair(0, 2, 1.0)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["documents"], 3);
        assert_eq!(value["pair_count"], 1);
        assert_eq!(value["pairs"][0]["left"], 0);
        assert_eq!(value["pairs"][0]["right"], 2);
        assert_eq!(value["pairs"][0]["similarity"], 1.0);
        assert_eq!(value["pairs"][0]["distance"], 0.0);
        assert_eq!(value["pairs"][0]["left_text"], "alpha beta");
    }

    #[test]
    fn find_duplicates_rejects_bad_config() {
        let config = DedupConfig::default().with_threshold(-0.1);
        let err = find_duplicates(&["a"], &config).unwrap_err();
        assert!(matches!(err, MatchError::InvalidThreshold { .. }));
    }

    #[test]
    fn demo_corpus_has_nine_documents() {
        let corpus = demo_corpus();
        assert_eq!(corpus.len(), 9);
        assert_eq!(corpus[4], corpus[5]);
        assert_eq!(corpus[6], "different than the others");
    }
}
