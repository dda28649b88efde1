//! This crate implements diff, fuzzy match and patch utilities over
//! sequences of symbols, plus a renderer that marks up the differences
//! between two HTML documents.  The engine is generic: the same algorithms
//! run over characters, words, lines or HTML fragments, depending on which
//! tokenizer produced the symbols.
//!
//! ```rust
//! use semblance::{DiffMatchPatch, Operation};
//!
//! let dmp = DiffMatchPatch::new();
//! let diffs = dmp.diff_chars("The quick brown fox", "The slow brown fox");
//!
//! for diff in &diffs {
//!     let sign = match diff.op() {
//!         Operation::Delete => "-",
//!         Operation::Insert => "+",
//!         Operation::Equal => " ",
//!     };
//!     println!("{}{}", sign, diff.text());
//! }
//! ```
//!
//! ## Functionality
//!
//! * [`symbol`]: the symbol model shared by everything else.
//! * [`tokenize`]: tokenizers turning strings into symbol sequences and the
//!   reader joining them back.
//! * [`DiffMatchPatch`]: diff computation and cleanup, Bitap fuzzy
//!   matching, and context-bearing patches with fuzzy application.
//! * [`html`]: the HTML diff renderer, producing a third HTML document with
//!   insertions and deletions visibly marked.
//!
//! ## Features
//!
//! * `html`: the HTML diff renderer, enabled by default.
//! * `unicode`: a word tokenizer that follows the unicode segmentation
//!   rules.  This pulls in some relatively complex dependencies for
//!   working with the unicode database.
//! * `serde`: serialization support for the public value types.
//! * `wasm32_web_time`: deadlines via `web-time` so diff timeouts keep
//!   working in browsers.
#![warn(missing_docs)]

pub mod symbol;
pub mod tokenize;

#[cfg(feature = "html")]
pub mod html;

mod bitap;
mod deadline;
mod diff;
mod engine;
mod errors;
mod patch;
mod uri;

pub use self::diff::{diff_source, diff_target, Diff, Operation};
pub use self::engine::{DiffMatchPatch, MATCH_MAX_BITS};
pub use self::errors::Error;
pub use self::patch::Patch;
pub use self::symbol::{Symbol, Token};
