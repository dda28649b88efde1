//! The fuzzy match engine.
//!
//! Locates a pattern inside a symbol sequence near an expected location
//! using the Baeza-Yates/Gonnet bit-parallel algorithm.  Score is a blend
//! of error rate and distance from the expected location; lower is better.

use std::collections::HashMap;

use crate::engine::DiffMatchPatch;
use crate::symbol::{index_of, last_index_of, Symbol, Token};

impl DiffMatchPatch {
    /// Locates the best instance of `pattern` in `text` near `loc`.
    ///
    /// Returns `None` when no position scores within
    /// [`match_threshold`](Self::match_threshold).
    ///
    /// # Panics
    ///
    /// Panics when a fuzzy search is required for a pattern longer than
    /// [`match_max_bits`](Self::match_max_bits) symbols; such patterns do
    /// not fit the Bitap position masks.  The patch engine splits its
    /// patterns accordingly and never trips this.
    pub fn match_main<T: Token>(
        &self,
        text: &[Symbol<T>],
        pattern: &[Symbol<T>],
        loc: usize,
    ) -> Option<usize> {
        let loc = loc.min(text.len());
        if text == pattern {
            // Shortcut (potentially not guaranteed by the algorithm).
            return Some(0);
        }
        if text.is_empty() {
            return None;
        }
        if loc + pattern.len() <= text.len() && &text[loc..loc + pattern.len()] == pattern {
            // Perfect match at the perfect spot.
            return Some(loc);
        }
        self.match_bitap(text, pattern, loc)
    }

    fn match_bitap<T: Token>(
        &self,
        text: &[Symbol<T>],
        pattern: &[Symbol<T>],
        loc: usize,
    ) -> Option<usize> {
        assert!(
            pattern.len() <= self.match_max_bits,
            "pattern longer than match_max_bits symbols"
        );

        let alphabet = match_alphabet(pattern);

        // Highest score beyond which we give up.
        let mut score_threshold = self.match_threshold;
        // Is there a nearby exact match? (speedup)
        if let Some(best) = index_of(text, pattern, loc) {
            score_threshold =
                score_threshold.min(self.match_bitap_score(0, best, loc, pattern.len()));
            // What about in the other direction? (speedup)
            if let Some(best) = last_index_of(text, pattern, loc + pattern.len()) {
                score_threshold =
                    score_threshold.min(self.match_bitap_score(0, best, loc, pattern.len()));
            }
        }

        let match_mask: u32 = 1 << (pattern.len() - 1);
        let mut best_loc = None;

        let mut bin_max = pattern.len() + text.len();
        let mut last_rd: Vec<u32> = Vec::new();
        for d in 0..pattern.len() {
            // Scan for the best match; each iteration allows for one more
            // error.  Run a binary search to determine how far from `loc`
            // we can stray at this error level.
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if self.match_bitap_score(d, loc + bin_mid, loc, pattern.len()) <= score_threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            // Use the result from this iteration as the maximum for the next.
            bin_max = bin_mid;
            let mut start = 1.max(loc as isize - bin_mid as isize + 1) as usize;
            let finish = (loc + bin_mid).min(text.len()) + pattern.len();

            let mut rd = vec![0u32; finish + 2];
            rd[finish + 1] = (1u32 << d) - 1;
            let mut j = finish;
            while j >= start {
                let char_match = if text.len() < j {
                    // Out of range.
                    0
                } else {
                    alphabet.get(text[j - 1].payload()).copied().unwrap_or(0)
                };
                if d == 0 {
                    // First pass: exact match.
                    rd[j] = ((rd[j + 1] << 1) | 1) & char_match;
                } else {
                    // Subsequent passes: fuzzy match.
                    rd[j] = (((rd[j + 1] << 1) | 1) & char_match)
                        | (((last_rd[j + 1] | last_rd[j]) << 1) | 1)
                        | last_rd[j + 1];
                }
                if rd[j] & match_mask != 0 {
                    let score = self.match_bitap_score(d, j - 1, loc, pattern.len());
                    // This match will almost certainly be better than any
                    // existing match, but check anyway.
                    if score <= score_threshold {
                        score_threshold = score;
                        best_loc = Some(j - 1);
                        if j - 1 > loc {
                            // When passing loc, don't exceed our current
                            // distance from loc.
                            start = 1.max(2 * loc as isize - (j - 1) as isize) as usize;
                        } else {
                            // Already passed loc, downhill from here on in.
                            break;
                        }
                    }
                }
                j -= 1;
            }
            // No hope for a (better) match at greater error levels.
            if self.match_bitap_score(d + 1, loc, loc, pattern.len()) > score_threshold {
                break;
            }
            last_rd = rd;
        }
        best_loc
    }

    /// Computes a match score for `errors` errors at position `x`.
    fn match_bitap_score(&self, errors: usize, x: usize, loc: usize, pattern_len: usize) -> f64 {
        let accuracy = errors as f64 / pattern_len as f64;
        let proximity = (loc as isize - x as isize).unsigned_abs();
        if self.match_distance == 0 {
            // Dodge divide by zero.
            return if proximity == 0 { accuracy } else { 1.0 };
        }
        accuracy + proximity as f64 / self.match_distance as f64
    }
}

/// Maps each pattern symbol to its bitmask of positions.
fn match_alphabet<T: Token>(pattern: &[Symbol<T>]) -> HashMap<&T, u32> {
    let mut alphabet: HashMap<&T, u32> = HashMap::new();
    for (i, symbol) in pattern.iter().enumerate() {
        *alphabet.entry(symbol.payload()).or_insert(0) |= 1 << (pattern.len() - i - 1);
    }
    alphabet
}
