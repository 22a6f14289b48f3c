//! neardup tokenizer layer.
//!
//! Splits raw text into a lazy stream of tokens for n-gram feature
//! extraction. Downstream stages (perceptual, matcher) rely on this for a
//! stable, locale-free token sequence.
//!
//! ## What we do
//!
//! - Classify bytes with a precomputed 256-entry [`DelimiterTable`]
//! - Yield maximal runs of non-delimiter bytes, skipping delimiter runs
//! - Report byte offsets so callers can map tokens back to the source
//!
//! ## Pure function guarantee
//!
//! No I/O, no allocation per token, no global mutable state. The default
//! table is a compile-time constant.
//!
//! ```rust
//! use canonical::{tokenize, Tokenizer};
//!
//! let tokens = tokenize("The quick brown fox");
//! assert_eq!(tokens.len(), 4);
//! assert_eq!(tokens[1].text, b"quick");
//!
//! let tokenizer = Tokenizer::default();
//! assert_eq!(tokenizer.tokens("a--b").count(), 2);
//! ```

mod delimiters;
mod token;

pub use crate::delimiters::{DelimiterTable, NON_ALPHANUMERIC};
pub use crate::token::{tokenize, Token, Tokenizer, Tokens};
