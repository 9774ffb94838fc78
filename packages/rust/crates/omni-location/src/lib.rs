//! omni-location - Source location tokens for rendered elements
//!
//! Every element the build annotates carries a token naming where its tags
//! live in source. This crate turns [`LocationRecord`]s into those tokens and
//! back, and converts between byte offsets and line/column positions.
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_location::{decode, encode};
//!
//! let token = encode(&record)?;
//! assert_eq!(decode(&token)?, record);
//! ```
//!
//! [`LocationRecord`]: omni_types::LocationRecord

// ============================================================================
// Module Declarations
// ============================================================================

mod codec;
mod error;
mod line_index;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use codec::{LOCATION_ATTRIBUTE, compare, decode, encode, equals};
pub use error::{DecodeError, EncodeError};
pub use line_index::{LineIndex, remap_record};
