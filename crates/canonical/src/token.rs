use std::iter::FusedIterator;

use serde::Serialize;

use crate::delimiters::{DelimiterTable, NON_ALPHANUMERIC};

/// A token with its byte offsets in the source text.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Token<'a> {
    /// The token bytes. Never empty and never contains a delimiter.
    #[serde(with = "lossy_text")]
    pub text: &'a [u8],
    /// Byte offset (inclusive) in the source text.
    pub start: usize,
    /// Byte offset (exclusive) in the source text.
    pub end: usize,
}

impl<'a> Token<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Token text as `&str` when the bytes are valid UTF-8.
    ///
    /// Always `Some` under [`NON_ALPHANUMERIC`], whose tokens are pure ASCII.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.text).ok()
    }
}

impl AsRef<[u8]> for Token<'_> {
    fn as_ref(&self) -> &[u8] {
        self.text
    }
}

mod lossy_text {
    use serde::Serializer;

    pub fn serialize<S: Serializer>(bytes: &&[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }
}

/// Lazy token stream over a text span.
///
/// Each call to `next` skips a run of delimiters and yields the following
/// maximal run of non-delimiter bytes. The stream cannot be rewound; clone it
/// before consuming, or ask the [`Tokenizer`] for a fresh one.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    bytes: &'a [u8],
    pos: usize,
    table: &'a DelimiterTable,
}

impl<'a> Tokens<'a> {
    pub fn new(bytes: &'a [u8], table: &'a DelimiterTable) -> Self {
        Self {
            bytes,
            pos: 0,
            table,
        }
    }

    /// Bytes not yet consumed by the stream.
    pub fn remainder(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.bytes.len();
        while self.pos < len && self.table.is_delimiter(self.bytes[self.pos]) {
            self.pos += 1;
        }
        if self.pos == len {
            return None;
        }

        let start = self.pos;
        while self.pos < len && !self.table.is_delimiter(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let end = self.pos;
        Some(Token {
            text: &self.bytes[start..end],
            start,
            end,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() - self.pos;
        // At most one token per two bytes (token byte + delimiter), rounded up.
        (0, Some(remaining.div_ceil(2)))
    }
}

impl FusedIterator for Tokens<'_> {}

/// Splits text into tokens using a fixed [`DelimiterTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tokenizer {
    delimiters: DelimiterTable,
}

impl Tokenizer {
    pub const fn new(delimiters: DelimiterTable) -> Self {
        Self { delimiters }
    }

    pub fn delimiters(&self) -> &DelimiterTable {
        &self.delimiters
    }

    /// Token stream over `text`.
    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens::new(text.as_bytes(), &self.delimiters)
    }

    /// Token stream over raw bytes.
    pub fn tokens_bytes<'a>(&'a self, bytes: &'a [u8]) -> Tokens<'a> {
        Tokens::new(bytes, &self.delimiters)
    }
}

/// Tokenizes `text` with the default non-alphanumeric delimiters.
///
/// Deterministic and locale-independent: any byte that is not an ASCII
/// letter or digit separates tokens.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    Tokens::new(text.as_bytes(), &NON_ALPHANUMERIC).collect()
}
