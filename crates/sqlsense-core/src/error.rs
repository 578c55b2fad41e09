//! Error types.
//!
//! Completion itself never fails: malformed input degrades to fewer
//! proposals and the public entry point returns a plain vector. The error
//! type here covers the lexing interior and input loading done by callers
//! (the CLI); it never crosses `get_code_completion_list`.

use thiserror::Error;

/// Error raised while turning SQL text into a token stream.
#[derive(Debug, Clone, Error)]
pub enum LexError {
    /// The underlying tokenizer rejected the input.
    #[error("tokenizer error at line {line}, column {column}: {message}")]
    Tokenizer {
        message: String,
        line: u64,
        column: u64,
    },
    /// A source position could not be mapped back to a byte offset.
    #[error("position {line}:{column} lies outside the input")]
    PositionOutOfBounds { line: u64, column: u64 },
}
