//! Tokenizers and readers.
//!
//! A tokenizer turns a string into an ordered symbol sequence; the matching
//! reader is [`crate::symbol::join`], which folds the symbols' textual forms
//! back into a string.  Every tokenizer here preserves concatenation:
//! `join(&tokenizer.tokenize(s)) == s`.
//!
//! Separators stay attached to the segment they terminate, so a line symbol
//! carries its trailing newline and a delimited segment carries its
//! delimiter.

use std::borrow::Cow;

use crate::symbol::{Symbol, Token};

/// Turns a string into an ordered symbol sequence.
pub trait Tokenizer<T: Token> {
    /// Tokenizes `input`.
    fn tokenize(&self, input: &str) -> Vec<Symbol<T>>;
}

/// One symbol per character.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenizer;

impl Tokenizer<char> for CharTokenizer {
    fn tokenize(&self, input: &str) -> Vec<Symbol<char>> {
        input.chars().map(Symbol::new).collect()
    }
}

/// One symbol per line, newline included.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineTokenizer;

impl Tokenizer<String> for LineTokenizer {
    fn tokenize(&self, input: &str) -> Vec<Symbol<String>> {
        input
            .split_inclusive('\n')
            .map(|line| Symbol::new(line.to_string()))
            .collect()
    }
}

/// Splits after any of a supplied set of delimiter characters.
#[derive(Debug, Clone)]
pub struct DelimitedTokenizer {
    delimiters: Vec<char>,
}

impl DelimitedTokenizer {
    /// Creates a tokenizer splitting after any character of `delimiters`.
    pub fn new(delimiters: &str) -> DelimitedTokenizer {
        DelimitedTokenizer {
            delimiters: delimiters.chars().collect(),
        }
    }
}

impl Tokenizer<String> for DelimitedTokenizer {
    fn tokenize(&self, input: &str) -> Vec<Symbol<String>> {
        let mut out = Vec::new();
        let mut start = 0;
        for (idx, ch) in input.char_indices() {
            if self.delimiters.contains(&ch) {
                let end = idx + ch.len_utf8();
                out.push(Symbol::new(input[start..end].to_string()));
                start = end;
            }
        }
        if start < input.len() {
            out.push(Symbol::new(input[start..].to_string()));
        }
        out
    }
}

/// Starts a new symbol whenever the predicate's value flips.
///
/// The first character always continues the current symbol.
#[derive(Debug, Clone)]
pub struct BoundaryTokenizer<P> {
    predicate: P,
}

impl<P: Fn(char) -> bool> BoundaryTokenizer<P> {
    /// Creates a tokenizer from a character predicate.
    pub fn new(predicate: P) -> BoundaryTokenizer<P> {
        BoundaryTokenizer { predicate }
    }
}

impl<P: Fn(char) -> bool> Tokenizer<String> for BoundaryTokenizer<P> {
    fn tokenize(&self, input: &str) -> Vec<Symbol<String>> {
        let mut out = Vec::new();
        let mut start = 0;
        let mut previous = None;
        for (idx, ch) in input.char_indices() {
            let current = (self.predicate)(ch);
            if let Some(previous) = previous {
                if previous != current {
                    out.push(Symbol::new(input[start..idx].to_string()));
                    start = idx;
                }
            }
            previous = Some(current);
        }
        if start < input.len() {
            out.push(Symbol::new(input[start..].to_string()));
        }
        out
    }
}

/// Alternates letter-or-digit runs and non-run segments.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer<String> for WordTokenizer {
    fn tokenize(&self, input: &str) -> Vec<Symbol<String>> {
        BoundaryTokenizer::new(|ch: char| ch.is_alphanumeric()).tokenize(input)
    }
}

/// One symbol per unicode word boundary segment.
///
/// This requires the `unicode` feature.
#[cfg(feature = "unicode")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordTokenizer;

#[cfg(feature = "unicode")]
impl Tokenizer<String> for UnicodeWordTokenizer {
    fn tokenize(&self, input: &str) -> Vec<Symbol<String>> {
        use unicode_segmentation::UnicodeSegmentation;
        input
            .split_word_bounds()
            .map(|word| Symbol::new(word.to_string()))
            .collect()
    }
}

/// Payload of an HTML symbol stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Chunk {
    /// A fragment of text outside any tag.
    Text(String),
    /// A whole tag, `<` through `>`.
    Tag(String),
    /// A whole comment, `<!--` through `-->`.
    Comment(String),
}

impl Default for Chunk {
    fn default() -> Chunk {
        Chunk::Text(String::new())
    }
}

impl Token for Chunk {
    fn text(&self) -> Cow<'_, str> {
        match self {
            Chunk::Text(text) | Chunk::Tag(text) | Chunk::Comment(text) => Cow::Borrowed(text),
        }
    }
}

/// Tokenizes HTML into [`Chunk`] symbols.
///
/// Emits one symbol per tag and one per comment, and delegates the spans
/// between them to an inner text tokenizer.  Comment detection has priority
/// over tag detection, so `<` and `>` are literal inside a comment until the
/// closing `-->`.
#[derive(Debug, Clone, Default)]
pub struct HtmlTokenizer<I = WordTokenizer> {
    inner: I,
}

impl HtmlTokenizer<WordTokenizer> {
    /// Creates an HTML tokenizer with word-level text tokenization.
    pub fn new() -> HtmlTokenizer<WordTokenizer> {
        HtmlTokenizer {
            inner: WordTokenizer,
        }
    }
}

impl<I: Tokenizer<String>> HtmlTokenizer<I> {
    /// Creates an HTML tokenizer over a custom inner text tokenizer.
    pub fn with_inner(inner: I) -> HtmlTokenizer<I> {
        HtmlTokenizer { inner }
    }

    fn flush_text(&self, span: &str, out: &mut Vec<Symbol<Chunk>>) {
        for symbol in self.inner.tokenize(span) {
            out.push(Symbol::new(Chunk::Text(symbol.into_payload())));
        }
    }
}

impl<I: Tokenizer<String>> Tokenizer<Chunk> for HtmlTokenizer<I> {
    fn tokenize(&self, input: &str) -> Vec<Symbol<Chunk>> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < input.len() {
            let Some(rel) = input[pos..].find('<') else {
                self.flush_text(&input[pos..], &mut out);
                break;
            };
            let lt = pos + rel;
            if rel > 0 {
                self.flush_text(&input[pos..lt], &mut out);
            }
            if input[lt..].starts_with("<!--") {
                let end = input[lt..]
                    .find("-->")
                    .map(|close| lt + close + 3)
                    .unwrap_or(input.len());
                out.push(Symbol::new(Chunk::Comment(input[lt..end].to_string())));
                pos = end;
            } else {
                let end = input[lt..]
                    .find('>')
                    .map(|close| lt + close + 1)
                    .unwrap_or(input.len());
                out.push(Symbol::new(Chunk::Tag(input[lt..end].to_string())));
                pos = end;
            }
        }
        out
    }
}
