//! # Tokenizer for German Text
//!
//! Splits raw text into tokens while preserving the exact byte offsets of
//! every token in the original input. Offsets are what allow downstream
//! consumers (highlighting, entity spans, coreference chains) to point back
//! into the unmodified text.
//!
//! ## Algorithm
//!
//! A single left-to-right scan accumulates non-whitespace, non-punctuation
//! characters into a candidate token. Whitespace always ends the candidate
//! and is discarded. A punctuation character ends the candidate and is either
//! discarded or emitted as its own one-character token, depending on
//! [`TokenizerOptions::keep_punctuation`].
//!
//! ## Compound words
//!
//! German glues morphemes together. A finished candidate matching the shape
//! `lowerUpperUpper…` (one or more lowercase-initial segments followed by
//! capitalized segments, e.g. `donauDampfSchiff`) is split at each uppercase
//! boundary and emitted as one token per fragment. Fragment offsets are
//! recovered by searching for the fragment text inside the candidate, so a
//! fragment whose text repeats earlier in the same compound can be located at
//! the wrong occurrence.
//!
//! ## Example
//!
//! ```rust
//! use denlp_core::tokenizer::{Tokenizer, TokenizerOptions};
//!
//! let tokenizer = Tokenizer::new(TokenizerOptions {
//!     keep_punctuation: true,
//!     ..Default::default()
//! }).unwrap();
//!
//! let tokens = tokenizer.tokenize("Der Hund bellt.");
//! let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
//! assert_eq!(values, ["Der", "Hund", "bellt", "."]);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A token extracted from the original text.
///
/// The token is the atomic unit of the pipeline. `start` and `end` are
/// half-open byte offsets into the source text; `index` is the sequential
/// position among all emitted tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// The token text (e.g. "Hund", ".", "Dampf").
    pub value: String,
    /// Starting byte offset in the original text (inclusive).
    pub start: usize,
    /// Ending byte offset in the original text (exclusive).
    pub end: usize,
    /// Sequential index in the token list (0, 1, 2, ...).
    pub index: usize,
    /// Normalized form; reserved, never set by the tokenizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
    /// Lemma; reserved, never set by the tokenizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
}

impl Token {
    fn new(value: String, start: usize, end: usize) -> Self {
        Self {
            value,
            start,
            end,
            index: 0, // assigned after the scan
            normalized: None,
            lemma: None,
        }
    }
}

/// Tokenizer options.
///
/// Standalone use defaults to dropping punctuation; the pipeline constructs
/// its tokenizer with `keep_punctuation = true` unless configured otherwise.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenizerOptions {
    /// Emit punctuation characters as their own one-character tokens.
    pub keep_punctuation: bool,
    /// Accepted for parity with the pipeline options; token boundaries do
    /// not depend on it.
    pub case_sensitive: bool,
}

/// Characters that terminate a token candidate.
const PUNCTUATION: &[char] = &['.', ',', '!', '?', '(', ')', '{', '}', '[', ']'];

/// Splits text into [`Token`]s with a single character scan.
pub struct Tokenizer {
    options: TokenizerOptions,
    compound: Regex,
}

impl Tokenizer {
    pub fn new(options: TokenizerOptions) -> Result<Self> {
        Ok(Self {
            options,
            compound: Regex::new("^[a-zäöüß]+([A-ZÄÖÜ][a-zäöüß]+)+$")?,
        })
    }

    /// Tokenizes `text`, recomputing from scratch on every call.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_start = 0;

        for (byte_pos, ch) in text.char_indices() {
            if ch.is_whitespace() {
                self.flush(&mut tokens, &mut current, current_start, byte_pos);
            } else if PUNCTUATION.contains(&ch) {
                self.flush(&mut tokens, &mut current, current_start, byte_pos);
                if self.options.keep_punctuation {
                    tokens.push(Token::new(
                        ch.to_string(),
                        byte_pos,
                        byte_pos + ch.len_utf8(),
                    ));
                }
            } else {
                if current.is_empty() {
                    current_start = byte_pos;
                }
                current.push(ch);
            }
        }
        let end = text.len();
        self.flush(&mut tokens, &mut current, current_start, end);

        for (i, token) in tokens.iter_mut().enumerate() {
            token.index = i;
        }
        tokens
    }

    /// Closes the accumulated candidate, splitting compounds before emission.
    fn flush(&self, tokens: &mut Vec<Token>, current: &mut String, start: usize, end: usize) {
        if current.is_empty() {
            return;
        }
        if self.compound.is_match(current) {
            for (i, part) in split_compound(current).into_iter().enumerate() {
                // Fragment offsets come from a substring search inside the
                // candidate; a repeated fragment text resolves to its first
                // occurrence.
                let rel = if i > 0 {
                    current.find(&part).unwrap_or(0)
                } else {
                    0
                };
                let len = part.len();
                tokens.push(Token::new(part, start + rel, start + rel + len));
            }
        } else {
            tokens.push(Token::new(current.clone(), start, end));
        }
        current.clear();
    }
}

/// Splits a compound candidate at each uppercase letter boundary.
fn split_compound(word: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}
