//! Error types for the live element index.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_location::DecodeError;
use omni_types::SelectorError;
use thiserror::Error;

/// Errors raised while ingesting or querying host nodes.
#[derive(Error, Debug)]
pub enum IndexError {
    /// No tree was ever set for the surface.
    #[error("Unknown surface: {0}")]
    SurfaceNotFound(String),

    /// A node's location token did not decode.
    #[error("Bad location token on node {runtime_id}: {source}")]
    Decode {
        /// Node carrying the token.
        runtime_id: String,
        /// Decoder failure.
        #[source]
        source: DecodeError,
    },

    /// An added node names a parent the surface does not hold.
    #[error("Node {runtime_id} added under unknown parent {parent_id}")]
    UnknownParent {
        /// Added node.
        runtime_id: String,
        /// Missing parent.
        parent_id: String,
    },

    /// Selector text is malformed.
    #[error(transparent)]
    Selector(#[from] SelectorError),
}
