//! Delimiter lookup table.
//!
//! The tokenizer decides whether a byte separates tokens by indexing a
//! 256-entry table. The default table marks every byte for which
//! [`u8::is_ascii_alphanumeric`] is false, which is the same classification
//! C-locale `isalnum` gives over `0..=255`. Every byte `>= 0x80` is therefore
//! a delimiter, so multi-byte UTF-8 sequences never end up inside a token.
//!
//! # Examples
//!
//! ```rust
//! use canonical::{DelimiterTable, NON_ALPHANUMERIC};
//!
//! assert!(NON_ALPHANUMERIC.is_delimiter(b' '));
//! assert!(!NON_ALPHANUMERIC.is_delimiter(b'q'));
//!
//! let commas = DelimiterTable::from_delimiters(b",");
//! assert!(commas.is_delimiter(b','));
//! assert!(!commas.is_delimiter(b' '));
//! ```

use std::fmt;

/// Immutable byte classification table.
///
/// Built once (at compile time for [`NON_ALPHANUMERIC`]) and only ever read
/// afterwards, so it can be shared freely between threads by reference or
/// copied by value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DelimiterTable {
    table: [bool; 256],
}

/// Default table: every byte that is not an ASCII letter or digit.
pub const NON_ALPHANUMERIC: DelimiterTable = DelimiterTable::non_alphanumeric();

impl DelimiterTable {
    /// Builds the non-alphanumeric table by scanning the full byte range.
    pub const fn non_alphanumeric() -> Self {
        let mut table = [false; 256];
        let mut b = 0usize;
        while b < 256 {
            table[b] = !(b as u8).is_ascii_alphanumeric();
            b += 1;
        }
        Self { table }
    }

    /// Builds a table where exactly the listed bytes are delimiters.
    pub const fn from_delimiters(delimiters: &[u8]) -> Self {
        let mut table = [false; 256];
        let mut i = 0usize;
        while i < delimiters.len() {
            table[delimiters[i] as usize] = true;
            i += 1;
        }
        Self { table }
    }

    /// Returns `true` when `byte` separates tokens.
    #[inline]
    pub const fn is_delimiter(&self, byte: u8) -> bool {
        self.table[byte as usize]
    }

    /// Number of byte values classified as delimiters.
    pub fn delimiter_count(&self) -> usize {
        self.table.iter().filter(|&&d| d).count()
    }
}

impl Default for DelimiterTable {
    fn default() -> Self {
        NON_ALPHANUMERIC
    }
}

impl fmt::Debug for DelimiterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelimiterTable")
            .field("delimiters", &self.delimiter_count())
            .finish()
    }
}
