//! Error types for the action pipeline.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_ast::MarkupError;
use omni_edit::EditError;
use omni_index::IndexError;
use omni_io::StoreError;
use omni_location::DecodeError;
use thiserror::Error;

use crate::engine::Phase;

/// Reasons an action did not apply. None of them leave a source file
/// partially edited.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A target or anchor resolves to nothing.
    #[error("Target not found: {0}")]
    TargetNotFound(String),

    /// The element's text changed since the edit was made.
    #[error("Content mismatch: expected '{expected}', found '{actual}'")]
    ContentMismatch {
        /// Text the caller saw.
        expected: String,
        /// Text currently in source.
        actual: String,
    },

    /// No confident location for a code edit.
    #[error("Ambiguous match (best score {best_score:.3}, {ties} ties)")]
    AmbiguousMatch {
        /// Highest similarity seen.
        best_score: f64,
        /// Other windows sharing the best score.
        ties: usize,
    },

    /// The store did not confirm a write; every file was rolled back.
    #[error("Writer failed for {file_path}: {reason}")]
    WriterFailure {
        /// File whose write failed.
        file_path: String,
        /// Store message.
        reason: String,
    },

    /// Malformed location token.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Structural edit failure.
    #[error(transparent)]
    Edit(EditError),

    /// Live index failure.
    #[error(transparent)]
    Index(IndexError),

    /// Source does not parse.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Reading a source failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The action is malformed.
    #[error("Invalid action: {0}")]
    InvalidAction(String),
}

impl EngineError {
    /// Pipeline phase the action failed in.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            Self::TargetNotFound(_) | Self::Decode(_) | Self::Index(_) | Self::InvalidAction(_) => {
                Phase::Resolving
            }
            Self::WriterFailure { .. } => Phase::Patched,
            Self::ContentMismatch { .. }
            | Self::AmbiguousMatch { .. }
            | Self::Edit(_)
            | Self::Markup(_)
            | Self::Store(_) => Phase::Mutating,
        }
    }
}

impl From<EditError> for EngineError {
    fn from(error: EditError) -> Self {
        match error {
            EditError::TargetNotFound(selector) => Self::TargetNotFound(selector),
            EditError::ContentMismatch { expected, actual } => Self::ContentMismatch { expected, actual },
            EditError::AmbiguousMatch { best_score, ties } => Self::AmbiguousMatch { best_score, ties },
            EditError::Markup(error) => Self::Markup(error),
            other => Self::Edit(other),
        }
    }
}

impl From<IndexError> for EngineError {
    fn from(error: IndexError) -> Self {
        match error {
            IndexError::SurfaceNotFound(surface) => Self::TargetNotFound(format!("surface {surface}")),
            IndexError::Decode { source, .. } => Self::Decode(source),
            other => Self::Index(other),
        }
    }
}
