use thiserror::Error;

/// Errors reported by the parsing and application surfaces of the crate.
///
/// Timeouts and failed fuzzy matches are deliberately *not* errors:
/// [`diff_main`](crate::DiffMatchPatch::diff_main) degrades to a trivial
/// diff on deadline overrun, and [`patch_apply`](crate::DiffMatchPatch::patch_apply)
/// reports per-patch failures in its result vector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed delta or patch text, a bad percent escape, an unknown
    /// opcode, or a length mismatch against the source sequence.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A patch span points outside its source sequence.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// A programming mistake in a consumer of [`DiffSeg`](crate::html::DiffSeg),
    /// such as reading children from a non-container segment.  Not meant to
    /// be recovered from.
    #[error("logic error: {0}")]
    Logic(String),
}
