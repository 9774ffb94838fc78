//! Error types for source file I/O.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use omni_types::PatchError;
use thiserror::Error;

/// Failures reading or writing a single file.
#[derive(Error, Debug)]
pub enum IoError {
    /// File does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// File exceeds size limit.
    #[error("File too large: {0} bytes (limit: {1})")]
    TooLarge(u64, u64),

    /// File contains binary content (NULL bytes detected).
    #[error("Binary file detected")]
    BinaryFile,

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    System(#[from] std::io::Error),

    /// Source is not valid UTF-8; patching it would corrupt bytes.
    #[error("Source is not valid UTF-8 (first bad byte at {0})")]
    Encoding(usize),
}

/// Failures of a [`SourceStore`](crate::SourceStore).
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the file failed.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: String,
        /// Underlying failure.
        #[source]
        source: IoError,
    },

    /// Patches do not fit the current file content.
    #[error("{path}: {source}")]
    Patch {
        /// File involved.
        path: String,
        /// Patch failure.
        #[source]
        source: PatchError,
    },

    /// Path escapes the store root.
    #[error("Path outside store root: {0}")]
    OutsideRoot(String),

    /// The file no longer matches the content the patches were planned
    /// against.
    #[error("Source changed since it was read: {path}")]
    Conflict {
        /// File involved.
        path: String,
    },

    /// The store refused the write.
    #[error("Write rejected for {path}: {reason}")]
    Rejected {
        /// File involved.
        path: String,
        /// Why.
        reason: String,
    },
}
