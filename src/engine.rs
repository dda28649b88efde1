//! Engine configuration.
//!
//! [`DiffMatchPatch`] carries the knobs shared by the diff, match and patch
//! operations.  An instance is owned by one caller; all configuration is
//! read-only while an operation runs.

use std::time::Duration;

use crate::diff::Diff;
use crate::symbol::Symbol;
use crate::tokenize::{CharTokenizer, LineTokenizer, Tokenizer, WordTokenizer};

/// Upper bound on Bitap pattern length, in symbols.
///
/// Position masks are machine words; 32 keeps them portable.
pub const MATCH_MAX_BITS: usize = 32;

/// The diff/match/patch engine.
///
/// ```rust
/// use semblance::{DiffMatchPatch, Operation};
///
/// let dmp = DiffMatchPatch::new();
/// let diffs = dmp.diff_chars("abc", "abd");
/// assert_eq!(diffs[0].op(), Operation::Equal);
/// assert_eq!(diffs[0].text(), "ab");
/// ```
#[derive(Debug, Clone)]
pub struct DiffMatchPatch {
    pub(crate) diff_timeout: Option<Duration>,
    pub(crate) diff_edit_cost: usize,
    pub(crate) delta_char_units: bool,
    pub(crate) match_threshold: f64,
    pub(crate) match_distance: usize,
    pub(crate) match_max_bits: usize,
    pub(crate) patch_delete_threshold: f64,
    pub(crate) patch_margin: usize,
}

impl Default for DiffMatchPatch {
    fn default() -> DiffMatchPatch {
        DiffMatchPatch {
            diff_timeout: Some(Duration::from_secs(1)),
            diff_edit_cost: 4,
            delta_char_units: false,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: MATCH_MAX_BITS,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}

impl DiffMatchPatch {
    /// Creates an engine with default configuration.
    pub fn new() -> DiffMatchPatch {
        DiffMatchPatch::default()
    }

    /// Changes the wall-clock limit of [`diff_main`](Self::diff_main).
    ///
    /// The default is one second.  `None` disables the deadline; a diff
    /// then runs to completion no matter how long it takes.
    pub fn diff_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.diff_timeout = timeout;
        self
    }

    /// Changes the cost of an empty edit operation in terms of symbols.
    ///
    /// Used by [`diff_cleanup_efficiency`](Self::diff_cleanup_efficiency).
    /// The default is `4`.
    pub fn diff_edit_cost(&mut self, cost: usize) -> &mut Self {
        self.diff_edit_cost = cost;
        self
    }

    /// Switches delta counts from symbol units to character units.
    ///
    /// Character units make deltas interoperable with ports that diff
    /// plain text, at the price of requiring count boundaries to land on
    /// symbol boundaries when a delta is read back.
    pub fn delta_char_units(&mut self, yes: bool) -> &mut Self {
        self.delta_char_units = yes;
        self
    }

    /// Changes the match score ceiling (0.0 = perfection, 1.0 = very loose).
    ///
    /// The default is `0.5`.
    pub fn match_threshold(&mut self, threshold: f64) -> &mut Self {
        self.match_threshold = threshold;
        self
    }

    /// Changes the proximity weight of fuzzy matching.
    ///
    /// How far to search for a match before giving up (0 = exact location
    /// matches only).  The default is `1000`.
    pub fn match_distance(&mut self, distance: usize) -> &mut Self {
        self.match_distance = distance;
        self
    }

    /// Changes how closely the contents of a sloppily matched patch region
    /// must resemble the expected contents before a delete is honored.
    ///
    /// The default is `0.5`.
    pub fn patch_delete_threshold(&mut self, threshold: f64) -> &mut Self {
        self.patch_delete_threshold = threshold;
        self
    }

    /// Changes the number of context symbols kept around a patch.
    ///
    /// The default is `4`.
    pub fn patch_margin(&mut self, margin: usize) -> &mut Self {
        self.patch_margin = margin;
        self
    }

    /// Returns the Bitap pattern length limit in symbols.
    pub fn match_max_bits(&self) -> usize {
        self.match_max_bits
    }

    /// Diffs two strings character by character.
    ///
    /// Equivalent to tokenizing with
    /// [`CharTokenizer`](crate::tokenize::CharTokenizer) and calling
    /// [`diff_main`](Self::diff_main).
    pub fn diff_chars(&self, old: &str, new: &str) -> Vec<Diff<char>> {
        self.diff_tokenized(&CharTokenizer, old, new)
    }

    /// Diffs two strings word by word.
    pub fn diff_words(&self, old: &str, new: &str) -> Vec<Diff<String>> {
        self.diff_tokenized(&WordTokenizer, old, new)
    }

    /// Diffs two strings line by line.
    pub fn diff_lines(&self, old: &str, new: &str) -> Vec<Diff<String>> {
        self.diff_tokenized(&LineTokenizer, old, new)
    }

    /// Diffs two strings through an arbitrary tokenizer.
    pub fn diff_tokenized<T, K>(&self, tokenizer: &K, old: &str, new: &str) -> Vec<Diff<T>>
    where
        T: crate::symbol::Token,
        K: Tokenizer<T>,
    {
        let old: Vec<Symbol<T>> = tokenizer.tokenize(old);
        let new: Vec<Symbol<T>> = tokenizer.tokenize(new);
        self.diff_main(&old, &new)
    }
}
