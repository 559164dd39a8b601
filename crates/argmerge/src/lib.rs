//! Layered command-line argument merging.
//!
//! User configuration carries argument strings at two levels (global defaults
//! and per-stream overrides). This crate tokenizes both with shell-word
//! rules, merges them flag-by-flag, substitutes `$SC.*` markers, and returns
//! a flat argument vector ready for process spawning. The output is never
//! re-joined into a shell string: every token is passed to the child as a
//! discrete argument.

mod error;
mod merge;
mod token;

pub use error::MergeError;
pub use merge::{Context, merge, substitute};
pub use token::tokenize;
