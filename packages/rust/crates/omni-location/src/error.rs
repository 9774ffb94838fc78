//! Error types for location token handling.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// A location token could not be turned back into a record.
///
/// Decoding never guesses: any of these aborts the operation that needed the
/// record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Token is not valid URL-safe base64.
    #[error("Invalid token encoding: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// Token bytes are not a valid deflate stream.
    #[error("Corrupt token payload: {0}")]
    Compression(#[from] std::io::Error),

    /// Payload does not describe a location record.
    #[error("Malformed location record: {0}")]
    Structure(#[from] serde_json::Error),

    /// Record decoded but violates the tag ordering invariant.
    #[error("Location record spans are out of order")]
    Invariant,
}

/// A record could not be serialized into a token.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Record spans are out of order.
    #[error("Location record spans are out of order")]
    Invariant,

    /// Serialization failed.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Serialized record is larger than a token may carry.
    #[error("Location record too large: {0} bytes")]
    TooLarge(usize),

    /// Compression failed.
    #[error("Failed to compress record: {0}")]
    Compression(#[from] std::io::Error),
}
