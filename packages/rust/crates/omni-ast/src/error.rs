//! Error types for markup parsing.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_types::{PatchError, SourceSpan};
use thiserror::Error;

/// Errors raised while parsing or rewriting markup sources.
#[derive(Error, Debug)]
pub enum MarkupError {
    /// File type has no JSX grammar.
    #[error("Unsupported markup language: {0}")]
    UnsupportedLanguage(String),

    /// Source does not parse cleanly.
    #[error("Syntax error in {file_path} at {span}")]
    Syntax {
        /// File being parsed.
        file_path: String,
        /// First error position.
        span: SourceSpan,
    },

    /// A location record could not be turned into a token.
    #[error("Failed to encode location: {0}")]
    Location(#[from] omni_location::EncodeError),

    /// Generated edits did not apply.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
