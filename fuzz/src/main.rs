#![allow(clippy::all)]

use afl::fuzz;
use arbitrary::Arbitrary;
use semblance::symbol::join;
use semblance::tokenize::{CharTokenizer, LineTokenizer, Tokenizer, WordTokenizer};
use semblance::{diff_source, diff_target, DiffMatchPatch};

#[derive(Arbitrary, Debug)]
enum FuzzVariant {
    Chars(String, String),
    Words(String, String),
    Lines(String, String),
    Patch(String, String),
    Delta(String, String),
    PatchText(String),
    DeltaText(String, String),
}

fn main() {
    fuzz!(|data: FuzzVariant| {
        let dmp = DiffMatchPatch::new();
        match data {
            FuzzVariant::Chars(old, new) => {
                let old = CharTokenizer.tokenize(&old);
                let new = CharTokenizer.tokenize(&new);
                let diffs = dmp.diff_main(&old, &new);
                assert_eq!(diff_source(&diffs), old);
                assert_eq!(diff_target(&diffs), new);
            }
            FuzzVariant::Words(old, new) => {
                let old = WordTokenizer.tokenize(&old);
                let new = WordTokenizer.tokenize(&new);
                let diffs = dmp.diff_main(&old, &new);
                assert_eq!(diff_source(&diffs), old);
                assert_eq!(diff_target(&diffs), new);
            }
            FuzzVariant::Lines(old, new) => {
                let old = LineTokenizer.tokenize(&old);
                let new = LineTokenizer.tokenize(&new);
                let diffs = dmp.diff_main(&old, &new);
                assert_eq!(diff_source(&diffs), old);
                assert_eq!(diff_target(&diffs), new);
            }
            FuzzVariant::Patch(old, new) => {
                let old = CharTokenizer.tokenize(&old);
                let new_symbols = CharTokenizer.tokenize(&new);
                let patches = dmp.patch_make_from_texts(&old, &new_symbols).unwrap();
                let (patched, results) = dmp.patch_apply(&patches, &old);
                assert!(results.iter().all(|&ok| ok));
                assert_eq!(join(&patched), new);
            }
            FuzzVariant::Delta(old, new) => {
                let old = CharTokenizer.tokenize(&old);
                let new = CharTokenizer.tokenize(&new);
                let diffs = dmp.diff_main(&old, &new);
                let delta = dmp.diff_to_delta(&diffs);
                let restored = dmp.diff_from_delta(&old, &delta, &CharTokenizer).unwrap();
                assert_eq!(restored, diffs);
            }
            FuzzVariant::PatchText(text) => {
                // Must never panic, only reject.
                let _ = dmp.patch_from_text::<char, _>(&text, &CharTokenizer);
            }
            FuzzVariant::DeltaText(source, delta) => {
                let source = CharTokenizer.tokenize(&source);
                let _ = dmp.diff_from_delta(&source, &delta, &CharTokenizer);
            }
        }
    });
}
