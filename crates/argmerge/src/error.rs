//! Merge error types.

use thiserror::Error;

/// Errors raised while tokenizing an argument string.
///
/// These indicate a configuration authoring mistake and are surfaced to the
/// caller rather than silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// A quote was opened but never closed.
    #[error("unbalanced quote in argument string: {input}")]
    UnbalancedQuote { input: String },

    /// The string ends with a lone backslash.
    #[error("dangling escape at end of argument string: {input}")]
    DanglingEscape { input: String },
}
