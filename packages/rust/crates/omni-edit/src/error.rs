//! Error types for structural editing operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_ast::MarkupError;
use omni_types::{PatchError, SelectorError};
use thiserror::Error;

/// Error types for edit operations.
///
/// Each variant represents a specific failure mode in the editing pipeline.
/// None of them leave a partially edited tree behind.
#[derive(Error, Debug)]
pub enum EditError {
    /// Selector resolved to no element.
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// The element's current text differs from what the edit expected.
    #[error("Content mismatch: expected '{expected}', found '{actual}'")]
    ContentMismatch {
        /// Text the caller saw.
        expected: String,
        /// Text currently in source.
        actual: String,
    },

    /// No window of the source is similar enough to the snippet.
    #[error("No confident match for snippet (best score {best_score:.3}, {ties} ties)")]
    AmbiguousMatch {
        /// Highest similarity seen, 0 when nothing was comparable.
        best_score: f64,
        /// Other windows sharing the best score.
        ties: usize,
    },

    /// Placement is impossible (cycle, root removal, bad offset).
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    /// Source construct the mutator does not rewrite.
    #[error("Unsupported edit: {0}")]
    Unsupported(String),

    /// Malformed selector.
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Source failed to parse before or after the edit.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Computed edits did not apply.
    #[error(transparent)]
    Patch(#[from] PatchError),
}
