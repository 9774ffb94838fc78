#![allow(clippy::doc_markdown)]

//! omni-edit - Structural edits for Omni Canvas
//!
//! Turns visual edit intents into minimal source patches. Edits are computed
//! against a parsed `MarkupTree` rather than by blind text replacement, so
//! formatting, siblings and unrelated code survive.
//!
//! # Features
//!
//! - **Structural Mutations**: insert, remove, move, restyle and retext elements
//! - **Class Merging**: utility-class conflict groups with variant scoping
//! - **Fuzzy Location**: find drifted snippets under whitespace/quote normalization
//! - **Diff Preview**: unified diffs of any patch
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-edit/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # EditError enum (thiserror)
//! ├── types.rs    # Mutation, Prior, EditConfig
//! ├── mutator.rs  # AstMutator
//! ├── style.rs    # style / className attribute rewriting
//! ├── classes.rs  # utility-class conflict groups
//! ├── fuzzy.rs    # snippet location
//! ├── snippet.rs  # snippet replacement
//! └── diff.rs     # Diff generation utilities
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_ast::MarkupTree;
//! use omni_edit::AstMutator;
//! use omni_types::{ElementSpec, InsertLocation};
//!
//! let tree = MarkupTree::parse("App.tsx", source)?;
//! let mutation = AstMutator::default().apply_insert_element(
//!     &tree,
//!     &InsertLocation::inside("#root", 0),
//!     &ElementSpec::new("h1").with_text("Hello"),
//! )?;
//! println!("{}", mutation.tree.source());
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod classes;
mod diff;
mod error;
mod fuzzy;
mod mutator;
mod snippet;
mod style;
mod types;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::EditError;
pub use mutator::{AstMutator, element_at_offset};
pub use types::{EditConfig, Mutation, Prior};

// Fuzzy snippet location
pub use fuzzy::{
    DEFAULT_THRESHOLD, MatchReport, best_window, find_best_match, find_best_match_report,
    line_range, normalize, reindent, similarity,
};
pub use snippet::{SnippetEdit, replace_snippet};

pub use classes::merge_classes;

// Re-export diff utility for external use
pub use diff::{diff_stats, generate_unified_diff};
