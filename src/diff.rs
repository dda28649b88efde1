//! The diff engine.
//!
//! [`DiffMatchPatch::diff_main`] computes an edit script between two symbol
//! sequences using common prefix/suffix stripping, a half-match heuristic
//! and Myers bisection, then normalizes the result with
//! [`DiffMatchPatch::diff_cleanup_merge`].  The other cleanup passes trade
//! optimality for human readability or for shorter scripts.
//!
//! The engine runs under a wall-clock deadline.  On overrun it degrades to
//! the trivial `[DELETE old, INSERT new]` script instead of failing.

use std::fmt;

use crate::deadline::{deadline_exceeded, duration_to_deadline, Instant};
use crate::engine::DiffMatchPatch;
use crate::errors::Error;
use crate::symbol::{char_len, index_of, join, Symbol, Token};
use crate::tokenize::Tokenizer;
use crate::uri;

/// The kind of a diff chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Symbols present only in the old sequence.
    Delete,
    /// Symbols present only in the new sequence.
    Insert,
    /// Symbols present in both sequences.
    Equal,
}

/// One tagged chunk of an edit script.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diff<T> {
    pub(crate) op: Operation,
    pub(crate) symbols: Vec<Symbol<T>>,
}

impl<T: Token> Diff<T> {
    /// Creates a diff chunk.
    pub fn new(op: Operation, symbols: Vec<Symbol<T>>) -> Diff<T> {
        Diff { op, symbols }
    }

    /// Creates a deletion.
    pub fn delete(symbols: Vec<Symbol<T>>) -> Diff<T> {
        Diff::new(Operation::Delete, symbols)
    }

    /// Creates an insertion.
    pub fn insert(symbols: Vec<Symbol<T>>) -> Diff<T> {
        Diff::new(Operation::Insert, symbols)
    }

    /// Creates an equality.
    pub fn equal(symbols: Vec<Symbol<T>>) -> Diff<T> {
        Diff::new(Operation::Equal, symbols)
    }

    /// Returns the operation.
    pub fn op(&self) -> Operation {
        self.op
    }

    /// Returns the symbols.
    pub fn symbols(&self) -> &[Symbol<T>] {
        &self.symbols
    }

    /// Unwraps the symbols.
    pub fn into_symbols(self) -> Vec<Symbol<T>> {
        self.symbols
    }

    /// Number of symbols in this chunk.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the chunk carries no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the chunk's textual form.
    pub fn text(&self) -> String {
        join(&self.symbols)
    }
}

impl<T: Token> fmt::Debug for Diff<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.op {
            Operation::Delete => "Delete",
            Operation::Insert => "Insert",
            Operation::Equal => "Equal",
        };
        write!(f, "{tag}({:?})", self.text())
    }
}

/// Reconstructs the old sequence from a diff list (all non-insert symbols).
pub fn diff_source<T: Token>(diffs: &[Diff<T>]) -> Vec<Symbol<T>> {
    diffs
        .iter()
        .filter(|diff| diff.op != Operation::Insert)
        .flat_map(|diff| diff.symbols.iter().cloned())
        .collect()
}

/// Reconstructs the new sequence from a diff list (all non-delete symbols).
pub fn diff_target<T: Token>(diffs: &[Diff<T>]) -> Vec<Symbol<T>> {
    diffs
        .iter()
        .filter(|diff| diff.op != Operation::Delete)
        .flat_map(|diff| diff.symbols.iter().cloned())
        .collect()
}

/// A half-match split: both sequences cut around a shared middle.
struct HalfMatch<'a, T> {
    prefix1: &'a [Symbol<T>],
    suffix1: &'a [Symbol<T>],
    prefix2: &'a [Symbol<T>],
    suffix2: &'a [Symbol<T>],
    common: &'a [Symbol<T>],
}

fn common_prefix_len<T: Eq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len<T: Eq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// `(long prefix, long suffix, short prefix, short suffix, common middle)`
/// around a shared substring seeded at `i`, or `None` when the best shared
/// substring is shorter than half of `long`.
#[allow(clippy::type_complexity)]
fn half_match_at<'a, T: Token>(
    long: &'a [Symbol<T>],
    short: &'a [Symbol<T>],
    i: usize,
) -> Option<(
    &'a [Symbol<T>],
    &'a [Symbol<T>],
    &'a [Symbol<T>],
    &'a [Symbol<T>],
    &'a [Symbol<T>],
)> {
    // Start with a quarter-length substring of long as a seed.
    let seed = &long[i..i + long.len() / 4];
    let mut best = None;
    let mut best_common_len = 0;
    let mut search = index_of(short, seed, 0);
    while let Some(j) = search {
        let prefix_len = common_prefix_len(&long[i..], &short[j..]);
        let suffix_len = common_suffix_len(&long[..i], &short[..j]);
        if best_common_len < suffix_len + prefix_len {
            best_common_len = suffix_len + prefix_len;
            best = Some((
                &long[..i - suffix_len],
                &long[i + prefix_len..],
                &short[..j - suffix_len],
                &short[j + prefix_len..],
                &short[j - suffix_len..j + prefix_len],
            ));
        }
        search = index_of(short, seed, j + 1);
    }
    if best_common_len * 2 >= long.len() {
        best
    } else {
        None
    }
}

impl DiffMatchPatch {
    /// Computes the edit script turning `old` into `new`.
    ///
    /// Runs under the configured [`diff_timeout`](Self::diff_timeout); on
    /// overrun the bisection falls back to a trivial delete/insert pair,
    /// so this never fails.
    pub fn diff_main<T: Token>(&self, old: &[Symbol<T>], new: &[Symbol<T>]) -> Vec<Diff<T>> {
        let deadline = self.diff_timeout.and_then(duration_to_deadline);
        self.diff_main_inner(old, new, deadline)
    }

    fn diff_main_inner<T: Token>(
        &self,
        old: &[Symbol<T>],
        new: &[Symbol<T>],
        deadline: Option<Instant>,
    ) -> Vec<Diff<T>> {
        if old == new {
            if old.is_empty() {
                return Vec::new();
            }
            return vec![Diff::equal(old.to_vec())];
        }

        // Trim off common prefix and suffix; they rejoin as equalities.
        let prefix = self.diff_common_prefix(old, new);
        let (head, old) = old.split_at(prefix);
        let new = &new[prefix..];
        let suffix = self.diff_common_suffix(old, new);
        let (old, tail) = old.split_at(old.len() - suffix);
        let new = &new[..new.len() - suffix];

        let mut diffs = self.diff_compute(old, new, deadline);
        if !head.is_empty() {
            diffs.insert(0, Diff::equal(head.to_vec()));
        }
        if !tail.is_empty() {
            diffs.push(Diff::equal(tail.to_vec()));
        }
        self.diff_cleanup_merge(&mut diffs);
        diffs
    }

    /// Finds the differences of two sequences which share no common ends.
    fn diff_compute<T: Token>(
        &self,
        old: &[Symbol<T>],
        new: &[Symbol<T>],
        deadline: Option<Instant>,
    ) -> Vec<Diff<T>> {
        if old.is_empty() {
            return vec![Diff::insert(new.to_vec())];
        }
        if new.is_empty() {
            return vec![Diff::delete(old.to_vec())];
        }

        let (long, short) = if old.len() > new.len() {
            (old, new)
        } else {
            (new, old)
        };
        if let Some(at) = index_of(long, short, 0) {
            // Shorter sequence is embedded entirely in the longer one.
            let op = if old.len() > new.len() {
                Operation::Delete
            } else {
                Operation::Insert
            };
            return vec![
                Diff::new(op, long[..at].to_vec()),
                Diff::equal(short.to_vec()),
                Diff::new(op, long[at + short.len()..].to_vec()),
            ];
        }
        if short.len() == 1 {
            // Single symbol, not embedded above: cannot share anything.
            return vec![Diff::delete(old.to_vec()), Diff::insert(new.to_vec())];
        }

        if let Some(hm) = self.diff_half_match(old, new) {
            let mut diffs = self.diff_main_inner(hm.prefix1, hm.prefix2, deadline);
            diffs.push(Diff::equal(hm.common.to_vec()));
            diffs.extend(self.diff_main_inner(hm.suffix1, hm.suffix2, deadline));
            return diffs;
        }

        self.diff_bisect(old, new, deadline)
    }

    /// Seeks a common subsequence of at least half the longer sequence.
    ///
    /// Speedup at the cost of a possibly non-optimal diff, so it only runs
    /// when a timeout is configured.
    fn diff_half_match<'a, T: Token>(
        &self,
        old: &'a [Symbol<T>],
        new: &'a [Symbol<T>],
    ) -> Option<HalfMatch<'a, T>> {
        self.diff_timeout?;

        let (long, short) = if old.len() > new.len() {
            (old, new)
        } else {
            (new, old)
        };
        if long.len() < 4 || short.len() * 2 < long.len() {
            return None;
        }

        // Check whether the second quarter or the midpoint anchors a match.
        let hm1 = half_match_at(long, short, (long.len() + 3) / 4);
        let hm2 = half_match_at(long, short, (long.len() + 1) / 2);
        let hm = match (hm1, hm2) {
            (None, None) => return None,
            (Some(hm), None) | (None, Some(hm)) => hm,
            (Some(hm1), Some(hm2)) => {
                if hm1.4.len() > hm2.4.len() {
                    hm1
                } else {
                    hm2
                }
            }
        };

        let (long_a, long_b, short_a, short_b, common) = hm;
        Some(if old.len() > new.len() {
            HalfMatch {
                prefix1: long_a,
                suffix1: long_b,
                prefix2: short_a,
                suffix2: short_b,
                common,
            }
        } else {
            HalfMatch {
                prefix1: short_a,
                suffix1: short_b,
                prefix2: long_a,
                suffix2: long_b,
                common,
            }
        })
    }

    /// Finds the middle snake of the edit graph, splits the problem in two
    /// and recurses.
    ///
    /// On deadline overrun the remaining region degrades to a trivial
    /// delete/insert pair.
    fn diff_bisect<T: Token>(
        &self,
        old: &[Symbol<T>],
        new: &[Symbol<T>],
        deadline: Option<Instant>,
    ) -> Vec<Diff<T>> {
        let old_len = old.len() as isize;
        let new_len = new.len() as isize;
        let max_d = (old_len + new_len + 1) / 2;
        let v_offset = max_d;
        let v_length = 2 * max_d;
        let mut v1 = vec![-1isize; v_length as usize];
        let mut v2 = vec![-1isize; v_length as usize];
        v1[(v_offset + 1) as usize] = 0;
        v2[(v_offset + 1) as usize] = 0;
        let delta = old_len - new_len;
        // If the total number of symbols is odd, the front path will collide
        // with the reverse path.
        let front = delta % 2 != 0;
        // Offsets for start and end of k loops, to trim the search space.
        let mut k1start: isize = 0;
        let mut k1end: isize = 0;
        let mut k2start: isize = 0;
        let mut k2end: isize = 0;
        for d in 0..max_d {
            if deadline_exceeded(deadline) {
                break;
            }
            // Walk the front path one step.
            let mut k1 = -d + k1start;
            while k1 <= d - k1end {
                let k1_offset = (v_offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                    v1[k1_offset + 1]
                } else {
                    v1[k1_offset - 1] + 1
                };
                let mut y1 = x1 - k1;
                while x1 < old_len && y1 < new_len && old[x1 as usize] == new[y1 as usize] {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_offset] = x1;
                if x1 > old_len {
                    // Ran off the right of the graph.
                    k1end += 2;
                } else if y1 > new_len {
                    // Ran off the bottom of the graph.
                    k1start += 2;
                } else if front {
                    let k2_offset = v_offset + delta - k1;
                    if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                        // Mirror x2 onto top-left coordinate system.
                        let x2 = old_len - v2[k2_offset as usize];
                        if x1 >= x2 {
                            return self.diff_bisect_split(
                                old,
                                new,
                                x1 as usize,
                                y1 as usize,
                                deadline,
                            );
                        }
                    }
                }
                k1 += 2;
            }
            // Walk the reverse path one step.
            let mut k2 = -d + k2start;
            while k2 <= d - k2end {
                let k2_offset = (v_offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                    v2[k2_offset + 1]
                } else {
                    v2[k2_offset - 1] + 1
                };
                let mut y2 = x2 - k2;
                while x2 < old_len
                    && y2 < new_len
                    && old[(old_len - x2 - 1) as usize] == new[(new_len - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_offset] = x2;
                if x2 > old_len {
                    k2end += 2;
                } else if y2 > new_len {
                    k2start += 2;
                } else if !front {
                    let k1_offset = v_offset + delta - k2;
                    if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                        let x1 = v1[k1_offset as usize];
                        let y1 = v_offset + x1 - k1_offset;
                        // Mirror x2 onto top-left coordinate system.
                        let x2 = old_len - x2;
                        if x1 >= x2 {
                            return self.diff_bisect_split(
                                old,
                                new,
                                x1 as usize,
                                y1 as usize,
                                deadline,
                            );
                        }
                    }
                }
                k2 += 2;
            }
        }
        // Number of diffs equals number of symbols, no commonality at all,
        // or the deadline fired.
        vec![Diff::delete(old.to_vec()), Diff::insert(new.to_vec())]
    }

    fn diff_bisect_split<T: Token>(
        &self,
        old: &[Symbol<T>],
        new: &[Symbol<T>],
        x: usize,
        y: usize,
        deadline: Option<Instant>,
    ) -> Vec<Diff<T>> {
        let (old_a, old_b) = old.split_at(x);
        let (new_a, new_b) = new.split_at(y);
        let mut diffs = self.diff_main_inner(old_a, new_a, deadline);
        diffs.extend(self.diff_main_inner(old_b, new_b, deadline));
        diffs
    }

    /// Length of the common prefix of two sequences.
    pub fn diff_common_prefix<T: Token>(&self, a: &[Symbol<T>], b: &[Symbol<T>]) -> usize {
        common_prefix_len(a, b)
    }

    /// Length of the common suffix of two sequences.
    pub fn diff_common_suffix<T: Token>(&self, a: &[Symbol<T>], b: &[Symbol<T>]) -> usize {
        common_suffix_len(a, b)
    }

    /// Length of the longest suffix of `a` that is a prefix of `b`.
    pub fn diff_common_overlap<T: Token>(&self, a: &[Symbol<T>], b: &[Symbol<T>]) -> usize {
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        // Truncate to equal lengths.
        let a = &a[a.len().saturating_sub(b.len())..];
        let b = &b[..b.len().min(a.len())];
        let len = a.len();
        if a == b {
            return len;
        }
        // Start with a one-symbol overlap candidate and grow by jumping to
        // each occurrence of the current suffix in `b`.
        let mut best = 0;
        let mut length = 1;
        loop {
            let pattern = &a[len - length..];
            let Some(found) = index_of(b, pattern, 0) else {
                return best;
            };
            length += found;
            if found == 0 || a[len - length..] == b[..length] {
                best = length;
                length += 1;
            }
        }
    }

    /// Reorders and merges like edit sections, merging equalities.
    ///
    /// After this pass no two adjacent diffs share an operation and no diff
    /// is empty.  Idempotent.
    pub fn diff_cleanup_merge<T: Token>(&self, diffs: &mut Vec<Diff<T>>) {
        if diffs.is_empty() {
            return;
        }
        diffs.push(Diff::equal(Vec::new())); // sentinel
        let mut pointer = 0;
        let mut count_delete = 0;
        let mut count_insert = 0;
        let mut text_delete: Vec<Symbol<T>> = Vec::new();
        let mut text_insert: Vec<Symbol<T>> = Vec::new();
        while pointer < diffs.len() {
            match diffs[pointer].op {
                Operation::Insert => {
                    count_insert += 1;
                    text_insert.extend_from_slice(&diffs[pointer].symbols);
                    pointer += 1;
                }
                Operation::Delete => {
                    count_delete += 1;
                    text_delete.extend_from_slice(&diffs[pointer].symbols);
                    pointer += 1;
                }
                Operation::Equal => {
                    // Upon reaching an equality, check for prior redundancies.
                    if count_delete + count_insert > 1 {
                        if count_delete != 0 && count_insert != 0 {
                            // Factor out any common prefix.
                            let common = self.diff_common_prefix(&text_insert, &text_delete);
                            if common != 0 {
                                let run_start = pointer - count_delete - count_insert;
                                if run_start > 0
                                    && diffs[run_start - 1].op == Operation::Equal
                                {
                                    diffs[run_start - 1]
                                        .symbols
                                        .extend_from_slice(&text_insert[..common]);
                                } else {
                                    diffs.insert(0, Diff::equal(text_insert[..common].to_vec()));
                                    pointer += 1;
                                }
                                text_insert.drain(..common);
                                text_delete.drain(..common);
                            }
                            // Factor out any common suffix.
                            let common = self.diff_common_suffix(&text_insert, &text_delete);
                            if common != 0 {
                                let mut merged = text_insert.split_off(text_insert.len() - common);
                                merged.extend_from_slice(&diffs[pointer].symbols);
                                diffs[pointer].symbols = merged;
                                text_delete.truncate(text_delete.len() - common);
                            }
                        }
                        // Delete the offending records and add the merged ones.
                        pointer -= count_delete + count_insert;
                        diffs.drain(pointer..pointer + count_delete + count_insert);
                        if !text_delete.is_empty() {
                            diffs.insert(pointer, Diff::delete(std::mem::take(&mut text_delete)));
                            pointer += 1;
                        }
                        if !text_insert.is_empty() {
                            diffs.insert(pointer, Diff::insert(std::mem::take(&mut text_insert)));
                            pointer += 1;
                        }
                        pointer += 1;
                    } else if pointer != 0 && diffs[pointer - 1].op == Operation::Equal {
                        // Merge this equality with the previous one.
                        let current = diffs.remove(pointer);
                        diffs[pointer - 1].symbols.extend(current.symbols);
                    } else {
                        pointer += 1;
                    }
                    count_insert = 0;
                    count_delete = 0;
                    text_delete.clear();
                    text_insert.clear();
                }
            }
        }
        if diffs.last().map_or(false, |diff| diff.is_empty()) {
            diffs.pop(); // drop the sentinel
        }

        // Second pass: look for single edits surrounded on both sides by
        // equalities which can be shifted sideways to eliminate an equality.
        // e.g: A<ins>BA</ins>C -> <ins>AB</ins>AC
        let mut changes = false;
        let mut pointer = 1;
        while pointer + 1 < diffs.len() {
            if diffs[pointer - 1].op == Operation::Equal
                && diffs[pointer + 1].op == Operation::Equal
            {
                let previous = diffs[pointer - 1].symbols.clone();
                let next = diffs[pointer + 1].symbols.clone();
                if diffs[pointer].symbols.ends_with(&previous) {
                    // Shift the edit over the previous equality.
                    let keep = diffs[pointer].symbols.len() - previous.len();
                    let mut shifted = previous.clone();
                    shifted.extend_from_slice(&diffs[pointer].symbols[..keep]);
                    diffs[pointer].symbols = shifted;
                    let mut merged = previous;
                    merged.extend_from_slice(&next);
                    diffs[pointer + 1].symbols = merged;
                    diffs.remove(pointer - 1);
                    changes = true;
                } else if diffs[pointer].symbols.starts_with(&next) {
                    // Shift the edit over the next equality.
                    diffs[pointer - 1].symbols.extend_from_slice(&next);
                    let mut shifted = diffs[pointer].symbols[next.len()..].to_vec();
                    shifted.extend_from_slice(&next);
                    diffs[pointer].symbols = shifted;
                    diffs.remove(pointer + 1);
                    changes = true;
                }
            }
            pointer += 1;
        }
        // If shifts were made, the path may have previously merged diffs.
        if changes {
            self.diff_cleanup_merge(diffs);
        }
    }

    /// Reduces the number of edits by eliminating semantically trivial
    /// equalities.  Idempotent.
    pub fn diff_cleanup_semantic<T: Token>(&self, diffs: &mut Vec<Diff<T>>) {
        let mut changes = false;
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality: Option<Vec<Symbol<T>>> = None;
        let mut pointer: isize = 0;
        // Number of symbols changed prior to / after the last equality.
        let mut length_insertions1 = 0;
        let mut length_deletions1 = 0;
        let mut length_insertions2 = 0;
        let mut length_deletions2 = 0;
        while (pointer as usize) < diffs.len() {
            let index = pointer as usize;
            if diffs[index].op == Operation::Equal {
                equalities.push(index);
                length_insertions1 = length_insertions2;
                length_deletions1 = length_deletions2;
                length_insertions2 = 0;
                length_deletions2 = 0;
                last_equality = Some(diffs[index].symbols.clone());
            } else {
                if diffs[index].op == Operation::Insert {
                    length_insertions2 += diffs[index].len();
                } else {
                    length_deletions2 += diffs[index].len();
                }
                // Eliminate an equality smaller than the edits on both sides.
                let eliminate = match (&last_equality, equalities.last()) {
                    (Some(equality), Some(&split))
                        if equality.len() <= length_insertions1.max(length_deletions1)
                            && equality.len() <= length_insertions2.max(length_deletions2) =>
                    {
                        Some((equality.clone(), split))
                    }
                    _ => None,
                };
                if let Some((equality, split)) = eliminate {
                    // Duplicate record: walk back and replace the equality
                    // with a delete/insert pair.
                    diffs.insert(split, Diff::delete(equality));
                    diffs[split + 1].op = Operation::Insert;
                    last_equality = None;
                    equalities.pop(); // throw away the equality just deleted
                    equalities.pop(); // and the previous one; it needs re-evaluation
                    pointer = equalities.last().map_or(-1, |&at| at as isize);
                    length_insertions1 = 0;
                    length_deletions1 = 0;
                    length_insertions2 = 0;
                    length_deletions2 = 0;
                    changes = true;
                }
            }
            pointer += 1;
        }

        if changes {
            self.diff_cleanup_merge(diffs);
        }
        self.diff_cleanup_semantic_lossless(diffs);

        // Factor out overlaps between adjacent delete/insert pairs:
        // <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>
        // <del>xxxabc</del><ins>defxxx</ins> -> <ins>def</ins>xxx<del>abc</del>
        // Only extract an overlap if it is as big as the edit ahead or behind it.
        let mut pointer = 1;
        while pointer < diffs.len() {
            if diffs[pointer - 1].op == Operation::Delete
                && diffs[pointer].op == Operation::Insert
            {
                let deletion = diffs[pointer - 1].symbols.clone();
                let insertion = diffs[pointer].symbols.clone();
                let overlap1 = self.diff_common_overlap(&deletion, &insertion);
                let overlap2 = self.diff_common_overlap(&insertion, &deletion);
                if overlap1 >= overlap2 {
                    if overlap1 * 2 >= deletion.len() || overlap1 * 2 >= insertion.len() {
                        diffs.insert(pointer, Diff::equal(insertion[..overlap1].to_vec()));
                        diffs[pointer - 1].symbols = deletion[..deletion.len() - overlap1].to_vec();
                        diffs[pointer + 1].symbols = insertion[overlap1..].to_vec();
                        pointer += 1;
                    }
                } else if overlap2 * 2 >= deletion.len() || overlap2 * 2 >= insertion.len() {
                    // Reversed overlap; swap the edit order around it.
                    diffs.insert(pointer, Diff::equal(deletion[..overlap2].to_vec()));
                    diffs[pointer - 1] =
                        Diff::insert(insertion[..insertion.len() - overlap2].to_vec());
                    diffs[pointer + 1] = Diff::delete(deletion[overlap2..].to_vec());
                    pointer += 1;
                }
                pointer += 1;
            }
            pointer += 1;
        }
    }

    /// Shifts edit boundaries onto nicer positions without changing the
    /// applied text.
    ///
    /// e.g: `The c<ins>at c</ins>ame.` -> `The <ins>cat </ins>came.`
    /// Idempotent.
    pub fn diff_cleanup_semantic_lossless<T: Token>(&self, diffs: &mut Vec<Diff<T>>) {
        // Score a seam between two sequences; edges beat any interior
        // boundary, otherwise the 0..=5 ladder applies.
        fn seam_score<T: Token>(one: &[Symbol<T>], two: &[Symbol<T>]) -> u8 {
            match (one.last(), two.first()) {
                (Some(last), Some(first)) => last.boundary_score(first),
                _ => 6,
            }
        }

        let mut pointer = 1;
        while pointer + 1 < diffs.len() {
            if diffs[pointer - 1].op == Operation::Equal
                && diffs[pointer + 1].op == Operation::Equal
            {
                // An edit surrounded by equalities.
                let mut equality1 = diffs[pointer - 1].symbols.clone();
                let mut edit = diffs[pointer].symbols.clone();
                let mut equality2 = diffs[pointer + 1].symbols.clone();

                // First, shift the edit as far left as possible.
                let common_offset = self.diff_common_suffix(&equality1, &edit);
                if common_offset > 0 {
                    let common = edit[edit.len() - common_offset..].to_vec();
                    equality1.truncate(equality1.len() - common_offset);
                    edit.truncate(edit.len() - common_offset);
                    let mut shifted = common.clone();
                    shifted.extend(edit);
                    edit = shifted;
                    let mut shifted = common;
                    shifted.extend(equality2);
                    equality2 = shifted;
                }

                // Second, step symbol by symbol right, looking for the best fit.
                let mut best_equality1 = equality1.clone();
                let mut best_edit = edit.clone();
                let mut best_equality2 = equality2.clone();
                let mut best_score =
                    seam_score(&equality1, &edit) + seam_score(&edit, &equality2);
                while !edit.is_empty()
                    && !equality2.is_empty()
                    && edit[0] == equality2[0]
                {
                    equality1.push(edit[0].clone());
                    edit.remove(0);
                    edit.push(equality2.remove(0));
                    let score = seam_score(&equality1, &edit) + seam_score(&edit, &equality2);
                    // The >= encourages trailing rather than leading whitespace on edits.
                    if score >= best_score {
                        best_score = score;
                        best_equality1 = equality1.clone();
                        best_edit = edit.clone();
                        best_equality2 = equality2.clone();
                    }
                }

                if diffs[pointer - 1].symbols != best_equality1 {
                    // We have an improvement, save it back to the diff.
                    if !best_equality1.is_empty() {
                        diffs[pointer - 1].symbols = best_equality1;
                    } else {
                        diffs.remove(pointer - 1);
                        pointer -= 1;
                    }
                    diffs[pointer].symbols = best_edit;
                    if !best_equality2.is_empty() {
                        diffs[pointer + 1].symbols = best_equality2;
                    } else {
                        diffs.remove(pointer + 1);
                        pointer -= 1;
                    }
                }
            }
            pointer += 1;
        }
    }

    /// Reduces the number of edits by eliminating operationally trivial
    /// equalities.  Idempotent.
    pub fn diff_cleanup_efficiency<T: Token>(&self, diffs: &mut Vec<Diff<T>>) {
        let mut changes = false;
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality: Option<Vec<Symbol<T>>> = None;
        let mut pointer: isize = 0;
        // Is there an insertion/deletion operation before/after the last equality?
        let mut pre_ins = false;
        let mut pre_del = false;
        let mut post_ins = false;
        let mut post_del = false;
        while (pointer as usize) < diffs.len() {
            let index = pointer as usize;
            if diffs[index].op == Operation::Equal {
                if diffs[index].len() < self.diff_edit_cost && (post_ins || post_del) {
                    // Candidate found.
                    equalities.push(index);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = Some(diffs[index].symbols.clone());
                } else {
                    // Not a candidate, and can never become one.
                    equalities.clear();
                    last_equality = None;
                }
                post_ins = false;
                post_del = false;
            } else {
                if diffs[index].op == Operation::Delete {
                    post_del = true;
                } else {
                    post_ins = true;
                }
                // Five types to be split:
                // <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
                // <ins>A</ins>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<ins>C</ins>
                // <ins>A</del>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<del>C</del>
                let sides =
                    pre_ins as usize + pre_del as usize + post_ins as usize + post_del as usize;
                let eliminate = match (&last_equality, equalities.last()) {
                    (Some(equality), Some(&split))
                        if (pre_ins && pre_del && post_ins && post_del)
                            || (equality.len() * 2 < self.diff_edit_cost && sides == 3) =>
                    {
                        Some((equality.clone(), split))
                    }
                    _ => None,
                };
                if let Some((equality, split)) = eliminate {
                    diffs.insert(split, Diff::delete(equality));
                    diffs[split + 1].op = Operation::Insert;
                    last_equality = None;
                    equalities.pop();
                    if pre_ins && pre_del {
                        // No changes made which could affect previous entry, keep going.
                        post_ins = true;
                        post_del = true;
                        equalities.clear();
                    } else {
                        equalities.pop(); // throw away the previous equality
                        pointer = equalities.last().map_or(-1, |&at| at as isize);
                        post_ins = false;
                        post_del = false;
                    }
                    changes = true;
                }
            }
            pointer += 1;
        }

        if changes {
            self.diff_cleanup_merge(diffs);
        }
    }

    /// Maps a position in the source sequence to its image in the target.
    ///
    /// e.g. "The cat" vs "The big cat", 1->1, 5->8
    pub fn diff_x_index<T: Token>(&self, diffs: &[Diff<T>], loc: usize) -> usize {
        let mut chars1 = 0;
        let mut chars2 = 0;
        let mut last_chars1 = 0;
        let mut last_chars2 = 0;
        let mut hit = None;
        for diff in diffs {
            if diff.op != Operation::Insert {
                chars1 += diff.len();
            }
            if diff.op != Operation::Delete {
                chars2 += diff.len();
            }
            if chars1 > loc {
                hit = Some(diff);
                break;
            }
            last_chars1 = chars1;
            last_chars2 = chars2;
        }
        if let Some(diff) = hit {
            if diff.op == Operation::Delete {
                // The location was deleted.
                return last_chars2;
            }
        }
        last_chars2 + (loc - last_chars1)
    }

    /// Computes the Levenshtein distance encoded in a diff list, in symbols.
    pub fn diff_levenshtein<T: Token>(&self, diffs: &[Diff<T>]) -> usize {
        let mut levenshtein = 0;
        let mut insertions = 0;
        let mut deletions = 0;
        for diff in diffs {
            match diff.op {
                Operation::Insert => insertions += diff.len(),
                Operation::Delete => deletions += diff.len(),
                Operation::Equal => {
                    // A deletion and an insertion is one substitution.
                    levenshtein += insertions.max(deletions);
                    insertions = 0;
                    deletions = 0;
                }
            }
        }
        levenshtein + insertions.max(deletions)
    }

    /// Returns a measure of the sequences' similarity in the range `0..=1`.
    ///
    /// `1.0` is a complete match, `0.0` completely distinct inputs.
    pub fn diff_ratio<T: Token>(&self, diffs: &[Diff<T>]) -> f32 {
        let matches: usize = diffs
            .iter()
            .filter(|diff| diff.op == Operation::Equal)
            .map(|diff| diff.len())
            .sum();
        let total = diffs
            .iter()
            .map(|diff| match diff.op {
                Operation::Equal => diff.len() * 2,
                _ => diff.len(),
            })
            .sum::<usize>();
        if total == 0 {
            1.0
        } else {
            2.0 * matches as f32 / total as f32
        }
    }

    /// Encodes a diff list as a compact delta.
    ///
    /// Equalities and deletions carry only a count (symbols, or characters
    /// under [`delta_char_units`](Self::delta_char_units)); insertions carry
    /// their URL-encoded text.  e.g. `=3\t-2\t+ing` keeps 3, deletes 2 and
    /// inserts "ing".  Operations are tab-separated.
    pub fn diff_to_delta<T: Token>(&self, diffs: &[Diff<T>]) -> String {
        let mut tokens = Vec::with_capacity(diffs.len());
        for diff in diffs {
            match diff.op {
                Operation::Insert => tokens.push(format!("+{}", uri::encode(&diff.text()))),
                Operation::Delete => tokens.push(format!("-{}", self.delta_units(diff))),
                Operation::Equal => tokens.push(format!("={}", self.delta_units(diff))),
            }
        }
        tokens.join("\t")
    }

    fn delta_units<T: Token>(&self, diff: &Diff<T>) -> usize {
        if self.delta_char_units {
            char_len(&diff.symbols)
        } else {
            diff.len()
        }
    }

    /// Decodes a delta against the source sequence it was made from.
    ///
    /// Inserted payloads are re-tokenized with `tokenizer`.  Fails with
    /// [`Error::InvalidInput`] on a malformed number, a bad escape, an
    /// unknown opcode, or when the counts do not add up to the source
    /// length (or split a symbol under character units).
    pub fn diff_from_delta<T, K>(
        &self,
        source: &[Symbol<T>],
        delta: &str,
        tokenizer: &K,
    ) -> Result<Vec<Diff<T>>, Error>
    where
        T: Token,
        K: Tokenizer<T>,
    {
        let mut diffs = Vec::new();
        let mut pointer = 0; // symbol index into source
        for token in delta.split('\t') {
            let mut opcode = token.chars();
            let Some(sign) = opcode.next() else {
                // Blank tokens are ok (from a trailing \t).
                continue;
            };
            let param = opcode.as_str();
            match sign {
                '+' => {
                    let text = uri::decode(param)?;
                    let symbols = tokenizer.tokenize(&text);
                    if !symbols.is_empty() {
                        diffs.push(Diff::insert(symbols));
                    }
                }
                sign @ ('-' | '=') => {
                    let count: isize = param.parse().map_err(|_| {
                        Error::InvalidInput(format!("invalid number in delta: {param:?}"))
                    })?;
                    if count < 0 {
                        return Err(Error::InvalidInput(format!(
                            "negative number in delta: {param:?}"
                        )));
                    }
                    let symbols = self.delta_take(source, &mut pointer, count as usize)?;
                    if !symbols.is_empty() {
                        if sign == '=' {
                            diffs.push(Diff::equal(symbols));
                        } else {
                            diffs.push(Diff::delete(symbols));
                        }
                    }
                }
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "invalid operation in delta: {token:?}"
                    )));
                }
            }
        }
        if pointer != source.len() {
            return Err(Error::InvalidInput(format!(
                "delta length ({pointer}) does not equal source length ({})",
                source.len()
            )));
        }
        Ok(diffs)
    }

    fn delta_take<T: Token>(
        &self,
        source: &[Symbol<T>],
        pointer: &mut usize,
        count: usize,
    ) -> Result<Vec<Symbol<T>>, Error> {
        if !self.delta_char_units {
            let end = pointer.saturating_add(count);
            if end > source.len() {
                return Err(Error::InvalidInput(format!(
                    "delta count {count} runs past the source end"
                )));
            }
            let taken = source[*pointer..end].to_vec();
            *pointer = end;
            return Ok(taken);
        }
        let mut chars = 0;
        let mut end = *pointer;
        while chars < count {
            let Some(symbol) = source.get(end) else {
                return Err(Error::InvalidInput(format!(
                    "delta count {count} runs past the source end"
                )));
            };
            chars += symbol.chars();
            end += 1;
        }
        if chars != count {
            return Err(Error::InvalidInput(format!(
                "delta count {count} splits a symbol"
            )));
        }
        let taken = source[*pointer..end].to_vec();
        *pointer = end;
        Ok(taken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{CharTokenizer, LineTokenizer};
    use std::time::Duration;

    fn chars(text: &str) -> Vec<Symbol<char>> {
        CharTokenizer.tokenize(text)
    }

    fn del(text: &str) -> Diff<char> {
        Diff::delete(chars(text))
    }

    fn ins(text: &str) -> Diff<char> {
        Diff::insert(chars(text))
    }

    fn eq(text: &str) -> Diff<char> {
        Diff::equal(chars(text))
    }

    #[test]
    fn test_common_prefix() {
        let dmp = DiffMatchPatch::new();
        assert_eq!(dmp.diff_common_prefix(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(
            dmp.diff_common_prefix(&chars("1234abcdef"), &chars("1234xyz")),
            4
        );
        assert_eq!(dmp.diff_common_prefix(&chars("1234"), &chars("1234xyz")), 4);
    }

    #[test]
    fn test_common_suffix() {
        let dmp = DiffMatchPatch::new();
        assert_eq!(dmp.diff_common_suffix(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(
            dmp.diff_common_suffix(&chars("abcdef1234"), &chars("xyz1234")),
            4
        );
        assert_eq!(dmp.diff_common_suffix(&chars("1234"), &chars("xyz1234")), 4);
    }

    #[test]
    fn test_common_overlap() {
        let dmp = DiffMatchPatch::new();
        assert_eq!(dmp.diff_common_overlap(&chars(""), &chars("abcd")), 0);
        assert_eq!(dmp.diff_common_overlap(&chars("abc"), &chars("abcd")), 3);
        assert_eq!(dmp.diff_common_overlap(&chars("123456"), &chars("abcd")), 0);
        assert_eq!(
            dmp.diff_common_overlap(&chars("123456xxx"), &chars("xxxabcd")),
            3
        );
        assert_eq!(dmp.diff_common_overlap(&chars("abcd"), &chars("cdef")), 2);
        // Unicode: a precomposed ligature shares no symbol with its parts.
        assert_eq!(
            dmp.diff_common_overlap(&chars("fi"), &chars("\u{fb01}i")),
            0
        );
    }

    #[test]
    fn test_half_match() {
        let mut dmp = DiffMatchPatch::new();
        dmp.diff_timeout(Some(Duration::from_secs(1)));

        assert!(dmp
            .diff_half_match(&chars("1234567890"), &chars("abcdef"))
            .is_none());
        assert!(dmp.diff_half_match(&chars("12345"), &chars("23")).is_none());

        let a = chars("1234567890");
        let b = chars("a345678z");
        let hm = dmp.diff_half_match(&a, &b).unwrap();
        assert_eq!(join(hm.prefix1), "12");
        assert_eq!(join(hm.suffix1), "90");
        assert_eq!(join(hm.prefix2), "a");
        assert_eq!(join(hm.suffix2), "z");
        assert_eq!(join(hm.common), "345678");

        let hm = dmp.diff_half_match(&b, &a).unwrap();
        assert_eq!(join(hm.prefix1), "a");
        assert_eq!(join(hm.suffix1), "z");
        assert_eq!(join(hm.prefix2), "12");
        assert_eq!(join(hm.suffix2), "90");
        assert_eq!(join(hm.common), "345678");

        let a = chars("121231234123451234123121");
        let b = chars("a1234123451234z");
        let hm = dmp.diff_half_match(&a, &b).unwrap();
        assert_eq!(join(hm.common), "1234123451234");

        // Optimal diff would be -q+x=H-i+e=lloHe+Hu=llo-Hew+y, not the
        // half-match split below.
        let a = chars("qHilloHelloHew");
        let b = chars("xHelloHeHulloy");
        let hm = dmp.diff_half_match(&a, &b).unwrap();
        assert_eq!(join(hm.prefix1), "qHillo");
        assert_eq!(join(hm.suffix1), "w");
        assert_eq!(join(hm.prefix2), "x");
        assert_eq!(join(hm.suffix2), "Hulloy");
        assert_eq!(join(hm.common), "HelloHe");

        dmp.diff_timeout(None);
        assert!(dmp.diff_half_match(&a, &b).is_none());
    }

    #[test]
    fn test_cleanup_merge() {
        let dmp = DiffMatchPatch::new();

        let mut diffs: Vec<Diff<char>> = vec![];
        dmp.diff_cleanup_merge(&mut diffs);
        assert!(diffs.is_empty());

        // No change case.
        let mut diffs = vec![eq("a"), del("b"), ins("c")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("a"), del("b"), ins("c")]);

        // Merge equalities.
        let mut diffs = vec![eq("a"), eq("b"), eq("c")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("abc")]);

        // Merge deletions.
        let mut diffs = vec![del("a"), del("b"), del("c")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![del("abc")]);

        // Merge insertions.
        let mut diffs = vec![ins("a"), ins("b"), ins("c")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![ins("abc")]);

        // Merge interweave.
        let mut diffs = vec![del("a"), ins("b"), del("c"), ins("d"), eq("e"), eq("f")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![del("ac"), ins("bd"), eq("ef")]);

        // Prefix and suffix detection.
        let mut diffs = vec![del("a"), ins("abc"), del("dc")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("a"), del("d"), ins("b"), eq("c")]);

        // Prefix and suffix detection with equalities.
        let mut diffs = vec![eq("x"), del("a"), ins("abc"), del("dc"), eq("y")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("xa"), del("d"), ins("b"), eq("cy")]);

        // Slide edit left.
        let mut diffs = vec![eq("a"), ins("ba"), eq("c")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![ins("ab"), eq("ac")]);

        // Slide edit right.
        let mut diffs = vec![eq("c"), ins("ab"), eq("a")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("ca"), ins("ba")]);

        // Slide edit left recursive.
        let mut diffs = vec![eq("a"), del("b"), eq("c"), del("ac"), eq("x")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![del("abc"), eq("acx")]);

        // Slide edit right recursive.
        let mut diffs = vec![eq("x"), del("ca"), eq("c"), del("b"), eq("a")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("xca"), del("cba")]);

        // Idempotence.
        let mut diffs = vec![eq("xa"), del("d"), ins("b"), eq("cy")];
        dmp.diff_cleanup_merge(&mut diffs);
        assert_eq!(diffs, vec![eq("xa"), del("d"), ins("b"), eq("cy")]);
    }

    #[test]
    fn test_cleanup_semantic() {
        let dmp = DiffMatchPatch::new();

        let mut diffs: Vec<Diff<char>> = vec![];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert!(diffs.is_empty());

        // No elimination #1.
        let mut diffs = vec![del("ab"), ins("cd"), eq("12"), del("e")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("ab"), ins("cd"), eq("12"), del("e")]);

        // No elimination #2.
        let mut diffs = vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("abc"), ins("ABC"), eq("1234"), del("wxyz")]);

        // Simple elimination.
        let mut diffs = vec![del("a"), eq("b"), del("c")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("abc"), ins("b")]);

        // Backpass elimination.
        let mut diffs = vec![del("ab"), eq("cd"), del("e"), eq("f"), ins("g")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("abcdef"), ins("cdfg")]);

        // Multiple eliminations.
        let mut diffs = vec![
            ins("1"),
            eq("A"),
            del("B"),
            ins("2"),
            eq("_"),
            ins("1"),
            eq("A"),
            del("B"),
            ins("2"),
        ];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("AB_AB"), ins("1A2_1A2")]);

        // Word boundaries.
        let mut diffs = vec![eq("The c"), del("ow and the c"), eq("at.")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![eq("The "), del("cow and the "), eq("cat.")]);

        // No overlap elimination.
        let mut diffs = vec![del("abcxx"), ins("xxdef")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("abcxx"), ins("xxdef")]);

        // Overlap elimination.
        let mut diffs = vec![del("abcxxx"), ins("xxxdef")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![del("abc"), eq("xxx"), ins("def")]);

        // Reverse overlap elimination.
        let mut diffs = vec![del("xxxabc"), ins("defxxx")];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(diffs, vec![ins("def"), eq("xxx"), del("abc")]);

        // Two overlap eliminations.
        let mut diffs = vec![
            del("abcd1212"),
            ins("1212efghi"),
            eq("----"),
            del("A3"),
            ins("3BC"),
        ];
        dmp.diff_cleanup_semantic(&mut diffs);
        assert_eq!(
            diffs,
            vec![
                del("abcd"),
                eq("1212"),
                ins("efghi"),
                eq("----"),
                del("A"),
                eq("3"),
                ins("BC"),
            ]
        );
    }

    #[test]
    fn test_cleanup_semantic_lossless() {
        let dmp = DiffMatchPatch::new();

        let mut diffs: Vec<Diff<char>> = vec![];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert!(diffs.is_empty());

        // Line boundaries.
        let mut diffs = vec![eq("AAA\r\nBBB"), ins(" DDD\r\nBBB"), eq(" EEE")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            diffs,
            vec![eq("AAA\r\n"), ins("BBB DDD\r\n"), eq("BBB EEE")]
        );

        // Word boundaries.
        let mut diffs = vec![eq("The c"), ins("ow and the c"), eq("at.")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(diffs, vec![eq("The "), ins("cow and the "), eq("cat.")]);

        // Alphanumeric boundaries.
        let mut diffs = vec![eq("The-c"), ins("ow-and-the-c"), eq("at.")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(diffs, vec![eq("The-"), ins("cow-and-the-"), eq("at.")]);

        // Hitting the start.
        let mut diffs = vec![eq("a"), del("a"), eq("ax")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(diffs, vec![del("a"), eq("aax")]);

        // Hitting the end.
        let mut diffs = vec![eq("xa"), del("a"), eq("a")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(diffs, vec![eq("xaa"), del("a")]);

        // Sentence boundaries.
        let mut diffs = vec![eq("The xxx. The "), ins("zzz. The "), eq("yyy.")];
        dmp.diff_cleanup_semantic_lossless(&mut diffs);
        assert_eq!(
            diffs,
            vec![eq("The xxx."), ins(" The zzz."), eq(" The yyy.")]
        );
    }

    #[test]
    fn test_cleanup_efficiency() {
        let mut dmp = DiffMatchPatch::new();
        dmp.diff_edit_cost(4);

        let mut diffs: Vec<Diff<char>> = vec![];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert!(diffs.is_empty());

        // No elimination.
        let mut diffs = vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert_eq!(
            diffs,
            vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")]
        );

        // Four-edit elimination.
        let mut diffs = vec![del("ab"), ins("12"), eq("xyz"), del("cd"), ins("34")];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert_eq!(diffs, vec![del("abxyzcd"), ins("12xyz34")]);

        // Three-edit elimination.
        let mut diffs = vec![ins("12"), eq("x"), del("cd"), ins("34")];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert_eq!(diffs, vec![del("xcd"), ins("12x34")]);

        // Backpass elimination.
        let mut diffs = vec![
            del("ab"),
            ins("12"),
            eq("xy"),
            ins("34"),
            eq("z"),
            del("cd"),
            ins("56"),
        ];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert_eq!(diffs, vec![del("abxyzcd"), ins("12xy34z56")]);

        // High cost elimination.
        dmp.diff_edit_cost(5);
        let mut diffs = vec![del("ab"), ins("12"), eq("wxyz"), del("cd"), ins("34")];
        dmp.diff_cleanup_efficiency(&mut diffs);
        assert_eq!(diffs, vec![del("abwxyzcd"), ins("12wxyz34")]);
    }

    #[test]
    fn test_x_index() {
        let dmp = DiffMatchPatch::new();
        let diffs = vec![del("a"), ins("1234"), eq("xyz")];
        assert_eq!(dmp.diff_x_index(&diffs, 2), 5);
        let diffs = vec![eq("a"), del("1234"), eq("xyz")];
        assert_eq!(dmp.diff_x_index(&diffs, 3), 1);
    }

    #[test]
    fn test_levenshtein() {
        let dmp = DiffMatchPatch::new();
        assert_eq!(
            dmp.diff_levenshtein(&[del("abc"), ins("1234"), eq("xyz")]),
            4
        );
        assert_eq!(
            dmp.diff_levenshtein(&[eq("xyz"), del("abc"), ins("1234")]),
            4
        );
        assert_eq!(
            dmp.diff_levenshtein(&[del("abc"), eq("xyz"), ins("1234")]),
            7
        );
    }

    #[test]
    fn test_ratio() {
        let dmp = DiffMatchPatch::new();
        let diffs = dmp.diff_chars("abcd", "bcde");
        assert_eq!(dmp.diff_ratio(&diffs), 0.75);
        assert_eq!(dmp.diff_ratio::<char>(&[]), 1.0);
    }

    #[test]
    fn test_source_target() {
        let diffs = vec![eq("jump"), del("s"), ins("ed"), eq(" over "), del("the"), ins("a")];
        assert_eq!(join(&diff_source(&diffs)), "jumps over the");
        assert_eq!(join(&diff_target(&diffs)), "jumped over a");
    }

    #[test]
    fn test_delta_round_trip() {
        let dmp = DiffMatchPatch::new();
        let diffs = vec![eq("jump"), del("s over"), ins(" jumped over ")];
        let delta = dmp.diff_to_delta(&diffs);
        insta::assert_snapshot!(&delta, @"=4\t-6\t+%20jumped%20over%20");

        let source = diff_source(&diffs);
        let restored = dmp.diff_from_delta(&source, &delta, &CharTokenizer).unwrap();
        assert_eq!(restored, diffs);
    }

    #[test]
    fn test_delta_special_characters() {
        let dmp = DiffMatchPatch::new();
        let diffs = vec![
            eq("\u{0680} \x00 \t %"),
            del("\u{0681} \x01 \n ^"),
            ins("\u{0682} \x02 \\ |"),
        ];
        let delta = dmp.diff_to_delta(&diffs);
        assert_eq!(delta, "=7\t-7\t+%da%82%20%02%20%5c%20%7c");
        let source = diff_source(&diffs);
        let restored = dmp.diff_from_delta(&source, &delta, &CharTokenizer).unwrap();
        assert_eq!(restored, diffs);
    }

    #[test]
    fn test_delta_errors() {
        let dmp = DiffMatchPatch::new();
        let source = chars("abc");
        // Too long.
        assert!(dmp
            .diff_from_delta(&source, "=4", &CharTokenizer)
            .is_err());
        // Too short.
        assert!(dmp
            .diff_from_delta(&source, "=2", &CharTokenizer)
            .is_err());
        // Invalid number.
        assert!(dmp
            .diff_from_delta(&source, "=x", &CharTokenizer)
            .is_err());
        // Negative count.
        assert!(dmp
            .diff_from_delta(&source, "=-3", &CharTokenizer)
            .is_err());
        // Unknown opcode.
        assert!(dmp
            .diff_from_delta(&source, "?3", &CharTokenizer)
            .is_err());
        // Bad escape.
        assert!(dmp
            .diff_from_delta(&source, "=3\t+%zz", &CharTokenizer)
            .is_err());
    }

    #[test]
    fn test_delta_char_units() {
        let mut dmp = DiffMatchPatch::new();
        dmp.delta_char_units(true);
        let lines = LineTokenizer.tokenize("ab\ncd\n");
        let diffs = vec![Diff::equal(lines.clone())];
        let delta = dmp.diff_to_delta(&diffs);
        assert_eq!(delta, "=6");
        let restored = dmp.diff_from_delta(&lines, &delta, &LineTokenizer).unwrap();
        assert_eq!(restored, diffs);
        // A count landing inside a line symbol is rejected.
        assert!(dmp
            .diff_from_delta(&lines, "=2\t=4", &LineTokenizer)
            .is_err());
    }

    #[test]
    fn test_diff_main_trivial() {
        let dmp = DiffMatchPatch::new();
        assert!(dmp.diff_chars("", "").is_empty());
        assert_eq!(dmp.diff_chars("abc", "abc"), vec![eq("abc")]);
        assert_eq!(
            dmp.diff_chars("abc", "ab123c"),
            vec![eq("ab"), ins("123"), eq("c")]
        );
        assert_eq!(
            dmp.diff_chars("a123bc", "abc"),
            vec![eq("a"), del("123"), eq("bc")]
        );
        assert_eq!(
            dmp.diff_chars("abc", "a123b456c"),
            vec![eq("a"), ins("123"), eq("b"), ins("456"), eq("c")]
        );
        assert_eq!(
            dmp.diff_chars("a123b456c", "abc"),
            vec![eq("a"), del("123"), eq("b"), del("456"), eq("c")]
        );
        // The tail of a replaced symbol stays shared.
        assert_eq!(
            dmp.diff_chars("abc", "abd"),
            vec![eq("ab"), del("c"), ins("d")]
        );
    }

    #[test]
    fn test_diff_main_real() {
        let mut dmp = DiffMatchPatch::new();
        // Switch off the timeout so half-match stays out of the way and the
        // results are the optimal scripts.
        dmp.diff_timeout(None);

        assert_eq!(dmp.diff_chars("a", "b"), vec![del("a"), ins("b")]);
        assert_eq!(
            dmp.diff_chars("Apples are a fruit.", "Bananas are also fruit."),
            vec![
                del("Apple"),
                ins("Banana"),
                eq("s are a"),
                ins("lso"),
                eq(" fruit."),
            ]
        );
        assert_eq!(
            dmp.diff_chars("ax\t", "\u{0680}x\x00"),
            vec![
                del("a"),
                ins("\u{0680}"),
                eq("x"),
                del("\t"),
                ins("\x00"),
            ]
        );
        assert_eq!(
            dmp.diff_chars("1ayb2", "abxab"),
            vec![
                del("1"),
                eq("a"),
                del("y"),
                eq("b"),
                del("2"),
                ins("xab"),
            ]
        );
        assert_eq!(
            dmp.diff_chars("abcy", "xaxcxabc"),
            vec![ins("xaxcx"), eq("abc"), del("y")]
        );
    }

    #[test]
    fn test_diff_coverage() {
        let dmp = DiffMatchPatch::new();
        let old = "The quick brown fox jumps over the lazy dog.";
        let new = "That quick brown fox jumped over a lazy dog.";
        let diffs = dmp.diff_chars(old, new);
        assert_eq!(join(&diff_source(&diffs)), old);
        assert_eq!(join(&diff_target(&diffs)), new);
    }

    #[test]
    fn test_bisect() {
        let dmp = DiffMatchPatch::new();
        let a = chars("cat");
        let b = chars("map");
        let far = duration_to_deadline(Duration::from_secs(60));
        assert_eq!(
            dmp.diff_bisect(&a, &b, far),
            vec![del("c"), ins("m"), eq("a"), del("t"), ins("p")]
        );
        // An already expired deadline degrades to a trivial script.
        let expired = Instant::now().checked_sub(Duration::from_secs(1));
        assert_eq!(
            dmp.diff_bisect(&a, &b, expired),
            vec![del("cat"), ins("map")]
        );
    }
}
