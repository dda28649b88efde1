//! The patch engine.
//!
//! Patches carry an edit script plus enough equal context to survive being
//! applied against text that has drifted from the original.  Application is
//! fuzzy: each patch is located with the match engine near its expected
//! position, and per-patch success is reported instead of failing the whole
//! operation.

use std::fmt;

use crate::diff::{diff_source, diff_target, Diff, Operation};
use crate::engine::DiffMatchPatch;
use crate::errors::Error;
use crate::symbol::{index_of, last_index_of, Symbol, Token};
use crate::tokenize::Tokenizer;
use crate::uri;

/// An edit with positional metadata and rolling context.
///
/// `start1`/`length1` address the source sequence, `start2`/`length2` the
/// target, both 0-based and in symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patch<T: Token> {
    pub(crate) diffs: Vec<Diff<T>>,
    pub(crate) start1: usize,
    pub(crate) start2: usize,
    pub(crate) length1: usize,
    pub(crate) length2: usize,
}

impl<T: Token> Default for Patch<T> {
    fn default() -> Patch<T> {
        Patch {
            diffs: Vec::new(),
            start1: 0,
            start2: 0,
            length1: 0,
            length2: 0,
        }
    }
}

impl<T: Token> Patch<T> {
    /// Returns the patch's diffs (context and edits).
    pub fn diffs(&self) -> &[Diff<T>] {
        &self.diffs
    }

    /// Returns the 0-based source position.
    pub fn start1(&self) -> usize {
        self.start1
    }

    /// Returns the 0-based target position.
    pub fn start2(&self) -> usize {
        self.start2
    }

    /// Returns the source span length in symbols.
    pub fn length1(&self) -> usize {
        self.length1
    }

    /// Returns the target span length in symbols.
    pub fn length2(&self) -> usize {
        self.length2
    }
}

fn coords(start: usize, length: usize) -> String {
    match length {
        // An empty range begins at the position just before it, printed
        // verbatim (no 1-based shift).
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

impl<T: Token> fmt::Display for Patch<T> {
    /// Emits the patch in a GNU-diff-like format, e.g.
    /// `@@ -382,8 +481,9 @@`, with URL-encoded body lines.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            coords(self.start1, self.length1),
            coords(self.start2, self.length2)
        )?;
        for diff in &self.diffs {
            let sign = match diff.op() {
                Operation::Insert => '+',
                Operation::Delete => '-',
                Operation::Equal => ' ',
            };
            writeln!(f, "{sign}{}", uri::encode(&diff.text()))?;
        }
        Ok(())
    }
}

impl DiffMatchPatch {
    /// Computes a patch list turning `old` into `new`.
    ///
    /// A diff is computed internally and run through the semantic and
    /// efficiency cleanups first.
    pub fn patch_make_from_texts<T: Token>(
        &self,
        old: &[Symbol<T>],
        new: &[Symbol<T>],
    ) -> Result<Vec<Patch<T>>, Error> {
        let mut diffs = self.diff_main(old, new);
        if diffs.len() > 2 {
            self.diff_cleanup_semantic(&mut diffs);
            self.diff_cleanup_efficiency(&mut diffs);
        }
        self.patch_make(old, &diffs)
    }

    /// Computes a patch list from a diff list alone.
    ///
    /// The source sequence is reconstructed from the diffs.
    pub fn patch_make_from_diffs<T: Token>(
        &self,
        diffs: &[Diff<T>],
    ) -> Result<Vec<Patch<T>>, Error> {
        let source = diff_source(diffs);
        self.patch_make(&source, diffs)
    }

    /// Computes a patch list from a source sequence and its diffs.
    ///
    /// Fails with [`Error::OutOfRange`] when the diffs describe a source
    /// of a different length than `source`.
    pub fn patch_make<T: Token>(
        &self,
        source: &[Symbol<T>],
        diffs: &[Diff<T>],
    ) -> Result<Vec<Patch<T>>, Error> {
        if diffs.is_empty() {
            return Ok(Vec::new());
        }
        let described: usize = diffs
            .iter()
            .filter(|diff| diff.op() != Operation::Insert)
            .map(|diff| diff.len())
            .sum();
        if described != source.len() {
            return Err(Error::OutOfRange(format!(
                "diffs span {described} source symbols, text has {}",
                source.len()
            )));
        }

        let mut patches = Vec::new();
        let mut patch: Patch<T> = Patch::default();
        let mut char_count1 = 0; // number of symbols into the source sequence
        let mut char_count2 = 0; // number of symbols into the target sequence
        // The text within which to look for context; starts as the source
        // and progressively mutates into the target as patches close.
        let mut prepatch: Vec<Symbol<T>> = source.to_vec();
        let mut postpatch: Vec<Symbol<T>> = source.to_vec();
        for (x, diff) in diffs.iter().enumerate() {
            if patch.diffs.is_empty() && diff.op() != Operation::Equal {
                // A new patch starts here.
                patch.start1 = char_count1;
                patch.start2 = char_count2;
            }
            match diff.op() {
                Operation::Insert => {
                    patch.diffs.push(diff.clone());
                    patch.length2 += diff.len();
                    postpatch.splice(char_count2..char_count2, diff.symbols().iter().cloned());
                }
                Operation::Delete => {
                    patch.length1 += diff.len();
                    patch.diffs.push(diff.clone());
                    postpatch.splice(char_count2..char_count2 + diff.len(), std::iter::empty());
                }
                Operation::Equal => {
                    if diff.len() <= 2 * self.patch_margin
                        && !patch.diffs.is_empty()
                        && x != diffs.len() - 1
                    {
                        // Small equality inside a patch.
                        patch.diffs.push(diff.clone());
                        patch.length1 += diff.len();
                        patch.length2 += diff.len();
                    }
                    if diff.len() >= 2 * self.patch_margin && !patch.diffs.is_empty() {
                        // Time for a new patch.
                        self.patch_add_context(&mut patch, &prepatch);
                        patches.push(std::mem::take(&mut patch));
                        // The patch list has a rolling context, unlike
                        // unidiff: each patch's coordinates assume all
                        // previous patches have already been applied.
                        prepatch = postpatch.clone();
                        char_count1 = char_count2;
                    }
                }
            }
            if diff.op() != Operation::Insert {
                char_count1 += diff.len();
            }
            if diff.op() != Operation::Delete {
                char_count2 += diff.len();
            }
        }
        // Pick up the leftover patch if not empty.
        if !patch.diffs.is_empty() {
            self.patch_add_context(&mut patch, &prepatch);
            patches.push(patch);
        }
        Ok(patches)
    }

    /// Grows a patch's context until its pattern is unique in `text`,
    /// bounded so the pattern still fits the match engine.
    pub(crate) fn patch_add_context<T: Token>(&self, patch: &mut Patch<T>, text: &[Symbol<T>]) {
        if text.is_empty() {
            return;
        }
        let mut pattern = text[patch.start2..patch.start2 + patch.length1].to_vec();
        let mut padding = 0;

        while index_of(text, &pattern, 0) != last_index_of(text, &pattern, text.len())
            && pattern.len() < self.match_max_bits - 2 * self.patch_margin
        {
            padding += self.patch_margin;
            let begin = patch.start2.saturating_sub(padding);
            let end = (patch.start2 + patch.length1 + padding).min(text.len());
            pattern = text[begin..end].to_vec();
        }
        // Add one chunk for good luck.
        padding += self.patch_margin;

        let begin = patch.start2.saturating_sub(padding);
        let prefix = &text[begin..patch.start2];
        if !prefix.is_empty() {
            patch.diffs.insert(0, Diff::equal(prefix.to_vec()));
        }
        let end = (patch.start2 + patch.length1 + padding).min(text.len());
        let suffix = &text[patch.start2 + patch.length1..end];
        if !suffix.is_empty() {
            patch.diffs.push(Diff::equal(suffix.to_vec()));
        }
        // Roll back the start points and extend the lengths.
        patch.start1 -= prefix.len();
        patch.start2 -= prefix.len();
        patch.length1 += prefix.len() + suffix.len();
        patch.length2 += prefix.len() + suffix.len();
    }

    /// Applies a patch list to a source sequence.
    ///
    /// Returns the patched sequence and a per-patch success vector.  A
    /// patch that cannot be located (or whose located region diverges past
    /// [`patch_delete_threshold`](Self::patch_delete_threshold)) is skipped
    /// and reported as `false`; the rest still apply.
    pub fn patch_apply<T: Token + Default>(
        &self,
        patches: &[Patch<T>],
        source: &[Symbol<T>],
    ) -> (Vec<Symbol<T>>, Vec<bool>) {
        if patches.is_empty() {
            return (source.to_vec(), Vec::new());
        }
        // Deep copy so no changes are made to the caller's patches.
        let mut patches = self.patch_deep_copy(patches);
        let null_padding = self.patch_add_padding(&mut patches);
        let mut text: Vec<Symbol<T>> = null_padding
            .iter()
            .cloned()
            .chain(source.iter().cloned())
            .chain(null_padding.iter().cloned())
            .collect();
        self.patch_split_max(&mut patches);

        // delta tracks the offset between the expected and actual location
        // of the previous patch.  If there are patches expected at positions
        // 10 and 20, but the first was found at 12, delta is 2 and the
        // second patch has an effective expected position of 22.
        let mut delta: isize = 0;
        let mut results = vec![false; patches.len()];
        for (x, patch) in patches.iter().enumerate() {
            let expected_loc = (patch.start2 as isize + delta).max(0) as usize;
            let text1 = diff_source(&patch.diffs);
            let mut start_loc;
            let mut end_loc = None;
            if text1.len() > self.match_max_bits {
                // patch_split_max only leaves an oversized pattern behind
                // for a monster delete; anchor its head and tail separately.
                start_loc = self.match_main(&text, &text1[..self.match_max_bits], expected_loc);
                if let Some(head) = start_loc {
                    end_loc = self.match_main(
                        &text,
                        &text1[text1.len() - self.match_max_bits..],
                        expected_loc + text1.len() - self.match_max_bits,
                    );
                    let tail_valid = match end_loc {
                        None => false,
                        Some(tail) => head < tail,
                    };
                    if !tail_valid {
                        // Can't find a valid trailing context.  Drop this patch.
                        start_loc = None;
                    }
                }
            } else {
                start_loc = self.match_main(&text, &text1, expected_loc);
            }
            let Some(start_loc) = start_loc else {
                // No match found.  Subtract the delta for this failed patch
                // from subsequent patches.
                delta -= patch.length2 as isize - patch.length1 as isize;
                continue;
            };
            results[x] = true;
            delta = start_loc as isize - expected_loc as isize;
            let text2: Vec<Symbol<T>> = match end_loc {
                None => text[start_loc..(start_loc + text1.len()).min(text.len())].to_vec(),
                Some(tail) => {
                    text[start_loc..(tail + self.match_max_bits).min(text.len())].to_vec()
                }
            };
            if text1 == text2 {
                // Perfect match, just shove the replacement text in.
                let target = diff_target(&patch.diffs);
                let end = (start_loc + text1.len()).min(text.len());
                text.splice(start_loc..end, target);
            } else {
                // Imperfect match.  Run a diff to get a framework of
                // equivalent indices.
                let mut diffs = self.diff_main(&text1, &text2);
                if text1.len() > self.match_max_bits
                    && self.diff_levenshtein(&diffs) as f64 / text1.len() as f64
                        > self.patch_delete_threshold
                {
                    // The end points match, but the content is unacceptably bad.
                    results[x] = false;
                } else {
                    self.diff_cleanup_semantic_lossless(&mut diffs);
                    let mut index1 = 0;
                    for diff in &patch.diffs {
                        if diff.op() != Operation::Equal {
                            let index2 = self.diff_x_index(&diffs, index1);
                            if diff.op() == Operation::Insert {
                                text.splice(
                                    start_loc + index2..start_loc + index2,
                                    diff.symbols().iter().cloned(),
                                );
                            } else {
                                let del_end = self.diff_x_index(&diffs, index1 + diff.len());
                                text.splice(
                                    start_loc + index2..start_loc + del_end,
                                    std::iter::empty(),
                                );
                            }
                        }
                        if diff.op() != Operation::Delete {
                            index1 += diff.len();
                        }
                    }
                }
            }
        }
        // Strip the padding off.
        text.drain(..null_padding.len());
        text.truncate(text.len() - null_padding.len());
        (text, results)
    }

    /// Adds a margin of sentinel symbols on both sides of the patched text
    /// so patches at the edges gain full context.  Returns the padding.
    pub fn patch_add_padding<T: Token + Default>(
        &self,
        patches: &mut [Patch<T>],
    ) -> Vec<Symbol<T>> {
        let padding_length = self.patch_margin;
        let null_padding: Vec<Symbol<T>> = (0..padding_length)
            .map(|_| Symbol::new(T::default()))
            .collect();

        // Bump all the patches forward.
        for patch in patches.iter_mut() {
            patch.start1 += padding_length;
            patch.start2 += padding_length;
        }

        // Add some padding on start of first diff.
        if let Some(patch) = patches.first_mut() {
            match patch.diffs.first_mut() {
                Some(first) if first.op() == Operation::Equal => {
                    if padding_length > first.len() {
                        // Grow first equality.
                        let extra = padding_length - first.len();
                        let mut grown = null_padding[first.len()..].to_vec();
                        grown.extend_from_slice(first.symbols());
                        first.symbols = grown;
                        patch.start1 -= extra;
                        patch.start2 -= extra;
                        patch.length1 += extra;
                        patch.length2 += extra;
                    }
                }
                _ => {
                    patch.diffs.insert(0, Diff::equal(null_padding.clone()));
                    patch.start1 -= padding_length; // now 0
                    patch.start2 -= padding_length; // now 0
                    patch.length1 += padding_length;
                    patch.length2 += padding_length;
                }
            }
        }

        // Add some padding on end of last diff.
        if let Some(patch) = patches.last_mut() {
            match patch.diffs.last_mut() {
                Some(last) if last.op() == Operation::Equal => {
                    if padding_length > last.len() {
                        // Grow last equality.
                        let extra = padding_length - last.len();
                        last.symbols.extend_from_slice(&null_padding[..extra]);
                        patch.length1 += extra;
                        patch.length2 += extra;
                    }
                }
                _ => {
                    patch.diffs.push(Diff::equal(null_padding.clone()));
                    patch.length1 += padding_length;
                    patch.length2 += padding_length;
                }
            }
        }

        null_padding
    }

    /// Splits patches whose source pattern would not fit the match engine
    /// into smaller pieces, preserving semantics.
    pub fn patch_split_max<T: Token>(&self, patches: &mut Vec<Patch<T>>) {
        let patch_size = self.match_max_bits;
        let mut x = 0;
        while x < patches.len() {
            if patches[x].length1 <= patch_size {
                x += 1;
                continue;
            }
            // Remove the big old patch and cut pieces off it.
            let mut bigpatch = patches.remove(x);
            let mut insert_at = x;
            let mut start1 = bigpatch.start1;
            let mut start2 = bigpatch.start2;
            let mut precontext: Vec<Symbol<T>> = Vec::new();
            while !bigpatch.diffs.is_empty() {
                let mut patch: Patch<T> = Patch::default();
                let mut empty = true;
                patch.start1 = start1 - precontext.len();
                patch.start2 = start2 - precontext.len();
                if !precontext.is_empty() {
                    patch.length1 = precontext.len();
                    patch.length2 = precontext.len();
                    patch.diffs.push(Diff::equal(precontext.clone()));
                }
                while !bigpatch.diffs.is_empty()
                    && patch.length1 < patch_size - self.patch_margin
                {
                    let diff_type = bigpatch.diffs[0].op();
                    if diff_type == Operation::Insert {
                        // Insertions are harmless.
                        let diff = bigpatch.diffs.remove(0);
                        patch.length2 += diff.len();
                        start2 += diff.len();
                        patch.diffs.push(diff);
                        empty = false;
                    } else if diff_type == Operation::Delete
                        && patch.diffs.len() == 1
                        && patch.diffs[0].op() == Operation::Equal
                        && bigpatch.diffs[0].len() > 2 * patch_size
                    {
                        // This is a large deletion.  Let it pass in one chunk.
                        let diff = bigpatch.diffs.remove(0);
                        patch.length1 += diff.len();
                        start1 += diff.len();
                        empty = false;
                        patch.diffs.push(diff);
                    } else {
                        // Deletion or equality.  Only take as much as we can stomach.
                        let take = bigpatch.diffs[0]
                            .len()
                            .min(patch_size - patch.length1 - self.patch_margin);
                        let taken = bigpatch.diffs[0].symbols()[..take].to_vec();
                        patch.length1 += take;
                        start1 += take;
                        if diff_type == Operation::Equal {
                            patch.length2 += take;
                            start2 += take;
                        } else {
                            empty = false;
                        }
                        patch.diffs.push(Diff::new(diff_type, taken));
                        if take == bigpatch.diffs[0].len() {
                            bigpatch.diffs.remove(0);
                        } else {
                            bigpatch.diffs[0].symbols.drain(..take);
                        }
                    }
                }
                // Compute the head context for the next patch.
                let target = diff_target(&patch.diffs);
                precontext = target[target.len().saturating_sub(self.patch_margin)..].to_vec();
                // Append the end context for this patch.
                let remaining_source = diff_source(&bigpatch.diffs);
                let postcontext = &remaining_source[..remaining_source.len().min(self.patch_margin)];
                if !postcontext.is_empty() {
                    patch.length1 += postcontext.len();
                    patch.length2 += postcontext.len();
                    match patch.diffs.last_mut() {
                        Some(last) if last.op() == Operation::Equal => {
                            last.symbols.extend_from_slice(postcontext);
                        }
                        _ => patch.diffs.push(Diff::equal(postcontext.to_vec())),
                    }
                }
                if !empty {
                    patches.insert(insert_at, patch);
                    insert_at += 1;
                }
            }
            x = insert_at;
        }
    }

    /// Clones a patch list into independently mutable patches.
    pub fn patch_deep_copy<T: Token>(&self, patches: &[Patch<T>]) -> Vec<Patch<T>> {
        patches.to_vec()
    }

    /// Serializes a patch list to text.
    pub fn patch_to_text<T: Token>(&self, patches: &[Patch<T>]) -> String {
        patches.iter().map(|patch| patch.to_string()).collect()
    }

    /// Parses a patch list from text, re-tokenizing payloads with
    /// `tokenizer`.
    ///
    /// Fails with [`Error::InvalidInput`] on a malformed header, an
    /// unknown body mode, or a bad escape.
    pub fn patch_from_text<T, K>(&self, text: &str, tokenizer: &K) -> Result<Vec<Patch<T>>, Error>
    where
        T: Token,
        K: Tokenizer<T>,
    {
        let mut patches = Vec::new();
        if text.is_empty() {
            return Ok(patches);
        }
        let lines: Vec<&str> = text.split('\n').collect();
        let mut pointer = 0;
        while pointer < lines.len() {
            let line = lines[pointer];
            if line.is_empty() {
                pointer += 1;
                continue;
            }
            let (start1, length1, start2, length2) = parse_patch_header(line)
                .ok_or_else(|| Error::InvalidInput(format!("invalid patch header: {line:?}")))?;
            let mut patch = Patch {
                diffs: Vec::new(),
                start1,
                start2,
                length1,
                length2,
            };
            pointer += 1;
            while pointer < lines.len() {
                let line = lines[pointer];
                let mut body = line.chars();
                let Some(sign) = body.next() else {
                    // Blank line?  Whatever.
                    pointer += 1;
                    continue;
                };
                let op = match sign {
                    '@' => break, // start of the next patch
                    '+' => Operation::Insert,
                    '-' => Operation::Delete,
                    ' ' => Operation::Equal,
                    _ => {
                        return Err(Error::InvalidInput(format!(
                            "invalid patch mode {sign:?} in {line:?}"
                        )));
                    }
                };
                let payload = uri::decode(body.as_str())?;
                patch.diffs.push(Diff::new(op, tokenizer.tokenize(&payload)));
                pointer += 1;
            }
            patches.push(patch);
        }
        Ok(patches)
    }
}

/// Parses `@@ -s1[,l1] +s2[,l2] @@` back to 0-based coordinates.
fn parse_patch_header(line: &str) -> Option<(usize, usize, usize, usize)> {
    let body = line.strip_prefix("@@ -")?.strip_suffix(" @@")?;
    let (old_part, new_part) = body.split_once(" +")?;
    let (start1, length1) = parse_patch_coords(old_part)?;
    let (start2, length2) = parse_patch_coords(new_part)?;
    Some((start1, length1, start2, length2))
}

fn parse_patch_coords(part: &str) -> Option<(usize, usize)> {
    match part.split_once(',') {
        Some((start, length)) => {
            let start: usize = start.parse().ok()?;
            let length: usize = length.parse().ok()?;
            if length == 0 {
                Some((start, 0))
            } else {
                Some((start.checked_sub(1)?, length))
            }
        }
        None => {
            let start: usize = part.parse().ok()?;
            Some((start.checked_sub(1)?, 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::join;
    use crate::tokenize::{CharTokenizer, Tokenizer};

    fn chars(text: &str) -> Vec<Symbol<char>> {
        CharTokenizer.tokenize(text)
    }

    fn make(dmp: &DiffMatchPatch, old: &str, new: &str) -> Vec<Patch<char>> {
        dmp.patch_make_from_texts(&chars(old), &chars(new)).unwrap()
    }

    #[test]
    fn test_patch_display() {
        let patch = Patch {
            diffs: vec![
                Diff::equal(chars("jump")),
                Diff::delete(chars("s")),
                Diff::insert(chars("ed")),
                Diff::equal(chars(" over ")),
                Diff::delete(chars("the")),
                Diff::insert(chars("a")),
                Diff::equal(chars("\nlaz")),
            ],
            start1: 20,
            start2: 21,
            length1: 18,
            length2: 17,
        };
        assert_eq!(
            patch.to_string(),
            "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n %20over%20\n-the\n+a\n %0alaz\n"
        );
    }

    #[test]
    fn test_patch_header_coords() {
        assert_eq!(coords(20, 18), "21,18");
        assert_eq!(coords(0, 1), "1");
        assert_eq!(coords(0, 0), "0,0");
        assert_eq!(parse_patch_coords("21,18"), Some((20, 18)));
        assert_eq!(parse_patch_coords("1"), Some((0, 1)));
        assert_eq!(parse_patch_coords("0,0"), Some((0, 0)));
        assert_eq!(parse_patch_coords("x"), None);
    }

    #[test]
    fn test_patch_from_text() {
        let dmp = DiffMatchPatch::new();
        assert!(dmp
            .patch_from_text::<char, _>("", &CharTokenizer)
            .unwrap()
            .is_empty());

        let text = "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n %20over%20\n-the\n+a\n %0alaz\n";
        let patches = dmp.patch_from_text(text, &CharTokenizer).unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(dmp.patch_to_text(&patches), text);

        // Header variants.
        for text in ["@@ -1 +1 @@\n-a\n+b\n", "@@ -1,3 +0,0 @@\n-abc\n", "@@ -0,0 +1,3 @@\n+abc\n"] {
            let patches = dmp.patch_from_text(text, &CharTokenizer).unwrap();
            assert_eq!(dmp.patch_to_text(&patches), text);
        }

        // Bad headers and bodies.
        assert!(dmp
            .patch_from_text::<char, _>("Bad\nPatch\n", &CharTokenizer)
            .is_err());
        assert!(dmp
            .patch_from_text::<char, _>("@@ -1 +1 @@\nxa\n", &CharTokenizer)
            .is_err());
    }

    #[test]
    fn test_patch_add_context() {
        let mut dmp = DiffMatchPatch::new();
        dmp.patch_margin(4);
        let source = "The quick brown fox jumps over the lazy dog.";

        let mut patch = dmp
            .patch_from_text("@@ -21,4 +21,10 @@\n-jump\n+somersault\n", &CharTokenizer)
            .unwrap()
            .remove(0);
        dmp.patch_add_context(&mut patch, &chars(source));
        assert_eq!(
            patch.to_string(),
            "@@ -17,12 +17,18 @@\n fox%20\n-jump\n+somersault\n s%20ov\n"
        );

        // Not enough trailing context.
        let mut patch = dmp
            .patch_from_text("@@ -21,4 +21,10 @@\n-jump\n+somersault\n", &CharTokenizer)
            .unwrap()
            .remove(0);
        dmp.patch_add_context(&mut patch, &chars("The quick brown fox jumps."));
        assert_eq!(
            patch.to_string(),
            "@@ -17,10 +17,18 @@\n fox%20\n-jump\n+somersault\n s.\n"
        );

        // Not enough leading context.
        let mut patch = dmp
            .patch_from_text("@@ -3 +3,2 @@\n-e\n+at\n", &CharTokenizer)
            .unwrap()
            .remove(0);
        dmp.patch_add_context(&mut patch, &chars("The quick brown fox jumps."));
        assert_eq!(
            patch.to_string(),
            "@@ -1,7 +1,8 @@\n Th\n-e\n+at\n %20qui\n"
        );

        // Ambiguous pattern forces more context.
        let mut patch = dmp
            .patch_from_text("@@ -3 +3,2 @@\n-e\n+at\n", &CharTokenizer)
            .unwrap()
            .remove(0);
        dmp.patch_add_context(
            &mut patch,
            &chars("The quick brown fox jumps.  The quick brown fox crashes."),
        );
        assert_eq!(
            patch.to_string(),
            "@@ -1,27 +1,28 @@\n Th\n-e\n+at\n %20quick%20brown%20fox%20jumps.%20\n"
        );
    }

    #[test]
    fn test_patch_make() {
        let dmp = DiffMatchPatch::new();
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "That quick brown fox jumped over a lazy dog.";

        assert!(make(&dmp, "", "").is_empty());

        let patches = make(&dmp, text1, text2);
        assert_eq!(patches.len(), 2);
        // The second patch's source coordinates assume the first patch has
        // been applied (rolling context).
        assert_eq!(patches[0].start1, 0);
        assert_eq!(patches[0].start2, 0);
        assert_eq!(patches[1].start1, 21);
        assert_eq!(patches[1].start2, 21);
        assert_eq!(join(&diff_source(&patches[0].diffs)), "The quick b");
        // Round-trip through text.
        let text = dmp.patch_to_text(&patches);
        let parsed = dmp.patch_from_text(&text, &CharTokenizer).unwrap();
        assert_eq!(parsed, patches);
    }

    #[test]
    fn test_patch_make_from_diffs() {
        let dmp = DiffMatchPatch::new();
        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "That quick brown fox jumped over a lazy dog.";
        let mut diffs = dmp.diff_chars(text1, text2);
        dmp.diff_cleanup_semantic(&mut diffs);
        dmp.diff_cleanup_efficiency(&mut diffs);

        let from_texts = dmp.patch_make(&chars(text1), &diffs).unwrap();
        let from_diffs = dmp.patch_make_from_diffs(&diffs).unwrap();
        assert_eq!(from_texts, from_diffs);

        // A mismatched source is rejected.
        assert!(matches!(
            dmp.patch_make(&chars("too short"), &diffs),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn test_patch_add_padding() {
        let dmp = DiffMatchPatch::new();

        // Both edges full.
        let mut patches = make(&dmp, "", "test");
        assert_eq!(dmp.patch_to_text(&patches), "@@ -0,0 +1,4 @@\n+test\n");
        dmp.patch_add_padding(&mut patches);
        assert_eq!(
            dmp.patch_to_text(&patches),
            "@@ -1,8 +1,12 @@\n %00%00%00%00\n+test\n %00%00%00%00\n"
        );

        // Both edges partial.
        let mut patches = make(&dmp, "XY", "XtestY");
        assert_eq!(dmp.patch_to_text(&patches), "@@ -1,2 +1,6 @@\n X\n+test\n Y\n");
        dmp.patch_add_padding(&mut patches);
        assert_eq!(
            dmp.patch_to_text(&patches),
            "@@ -2,8 +2,12 @@\n %00%00%00X\n+test\n Y%00%00%00\n"
        );

        // Both edges none.
        let mut patches = make(&dmp, "XXXXYYYY", "XXXXtestYYYY");
        assert_eq!(
            dmp.patch_to_text(&patches),
            "@@ -1,8 +1,12 @@\n XXXX\n+test\n YYYY\n"
        );
        dmp.patch_add_padding(&mut patches);
        assert_eq!(
            dmp.patch_to_text(&patches),
            "@@ -5,8 +5,12 @@\n XXXX\n+test\n YYYY\n"
        );
    }

    #[test]
    fn test_patch_apply() {
        let mut dmp = DiffMatchPatch::new();
        dmp.match_distance(1000)
            .match_threshold(0.5)
            .patch_delete_threshold(0.5);

        let (result, ok) = dmp.patch_apply::<char>(&[], &chars("Hello world."));
        assert_eq!(join(&result), "Hello world.");
        assert!(ok.is_empty());

        let text1 = "The quick brown fox jumps over the lazy dog.";
        let text2 = "That quick brown fox jumped over a lazy dog.";
        let patches = make(&dmp, text1, text2);

        // Exact application.
        let (result, ok) = dmp.patch_apply(&patches, &chars(text1));
        assert_eq!(join(&result), text2);
        assert_eq!(ok, vec![true, true]);

        // Fuzzy application against drifted text.
        let (result, ok) = dmp.patch_apply(
            &patches,
            &chars("The quick red rabbit jumps over the tired tiger."),
        );
        assert_eq!(join(&result), "That quick red rabbit jumped over a tired tiger.");
        assert_eq!(ok, vec![true, true]);

        // Failed application.
        let (result, ok) = dmp.patch_apply(
            &patches,
            &chars("I am the very model of a modern major general."),
        );
        assert_eq!(join(&result), "I am the very model of a modern major general.");
        assert_eq!(ok, vec![false, false]);

        // Big delete, small change.
        let patches = make(
            &dmp,
            "x1234567890123456789012345678901234567890123456789012345678901234567890y",
            "xabcy",
        );
        let (result, ok) = dmp.patch_apply(
            &patches,
            &chars("x123456789012345678901234567890-----++++++++++-----123456789012345678901234567890y"),
        );
        assert_eq!(join(&result), "xabcy");
        assert_eq!(ok, vec![true, true]);

        // Insertion into empty text.
        let patches = make(&dmp, "", "test");
        let (result, ok) = dmp.patch_apply(&patches, &chars(""));
        assert_eq!(join(&result), "test");
        assert_eq!(ok, vec![true]);

        // No side effects on the input patches.
        let patches = make(&dmp, "", "test");
        let before = dmp.patch_to_text(&patches);
        dmp.patch_apply(&patches, &chars(""));
        assert_eq!(dmp.patch_to_text(&patches), before);
    }

    #[test]
    fn test_patch_split_max() {
        let dmp = DiffMatchPatch::new();
        let mut patches = make(
            &dmp,
            "abcdefghijklmnopqrstuvwxyz01234567890",
            "XabXcdXefXghXijXklXmnXopXqrXstXuvXwxXyzX01X23X45X67X89X0",
        );
        dmp.patch_split_max(&mut patches);
        for patch in &patches {
            assert!(patch.length1 <= dmp.match_max_bits());
        }
        // Splitting preserves semantics.
        let (result, ok) = dmp.patch_apply(&patches, &chars("abcdefghijklmnopqrstuvwxyz01234567890"));
        assert_eq!(
            join(&result),
            "XabXcdXefXghXijXklXmnXopXqrXstXuvXwxXyzX01X23X45X67X89X0"
        );
        assert!(ok.iter().all(|&b| b));
    }
}
