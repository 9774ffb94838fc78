//! omni-types - Common type definitions for Omni Canvas
//!
//! This crate provides the shared data model used across all Omni crates:
//! source positions, location records, file patches, selectors, and the
//! payloads carried by visual edit actions.
//!
//! # Schema Singularity
//! Transport types derive `schemars::JsonSchema` so that the UI layer and the
//! rendering host can retrieve authoritative schemas from Rust.

#![allow(clippy::doc_markdown)]

// ============================================================================
// Module Declarations
// ============================================================================

mod element;
mod patch;
mod selector;
mod span;
mod style;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use element::{ElementSpec, InsertLocation, InsertPosition, MoveLocation};
pub use patch::{Bias, ByteRange, FilePatch, PatchError, apply_patches};
pub use selector::{Selectable, Selector, SelectorError, SimpleSelector};
pub use span::{LocationRecord, SourceSpan, TagRange};
pub use style::{AttributeSnapshot, StyleDelta, StyleProperty};

use thiserror::Error;

/// Schema generation error
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The requested type is not registered.
    #[error("Unknown type: {0}")]
    UnknownType(String),
}

/// Get JSON Schema for a registered type.
///
/// # Errors
/// Returns `SchemaError::UnknownType` if the type name is not registered.
pub fn get_schema_json(type_name: &str) -> Result<String, SchemaError> {
    let schema = match type_name {
        "SourceSpan" => schemars::schema_for!(SourceSpan),
        "LocationRecord" => schemars::schema_for!(LocationRecord),
        "FilePatch" => schemars::schema_for!(FilePatch),
        "ElementSpec" => schemars::schema_for!(ElementSpec),
        "InsertLocation" => schemars::schema_for!(InsertLocation),
        "MoveLocation" => schemars::schema_for!(MoveLocation),
        "StyleDelta" => schemars::schema_for!(StyleDelta),
        _ => return Err(SchemaError::UnknownType(type_name.to_string())),
    };
    serde_json::to_string_pretty(&schema)
        .map_err(|e| SchemaError::UnknownType(format!("Serialization failed: {e}")))
}

/// Get list of all registered type names.
#[must_use]
pub fn get_registered_types() -> Vec<&'static str> {
    vec![
        "SourceSpan",
        "LocationRecord",
        "FilePatch",
        "ElementSpec",
        "InsertLocation",
        "MoveLocation",
        "StyleDelta",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_registered_type_has_schema() {
        for name in get_registered_types() {
            let schema = get_schema_json(name).expect("schema");
            assert!(schema.contains("\"title\""), "{name}");
        }
    }

    #[test]
    fn test_unknown_type() {
        assert!(matches!(get_schema_json("Skill"), Err(SchemaError::UnknownType(_))));
    }
}
