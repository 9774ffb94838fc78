//! omni-ast - JSX/TSX markup trees built on ast-grep
//!
//! This crate is the parser collaborator of the visual editor: it turns a
//! component source file into an owned tree of elements with exact byte
//! ranges, so edits can be computed against the original text.
//!
//! ## Architecture
//!
//! ```text
//! omni-ast/src/
//! ├── lib.rs           # Re-exports (entry point)
//! ├── re_exports.rs    # ast-grep re-exports
//! ├── lang.rs          # Lang enum (js / ts / tsx)
//! ├── markup.rs        # MarkupTree, Element, Attribute
//! ├── render.rs        # ElementSpec -> JSX
//! └── annotate.rs      # location token injection
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use omni_ast::MarkupTree;
//!
//! let tree = MarkupTree::parse("App.tsx", "const App = () => <div id=\"root\" />;").unwrap();
//! assert_eq!(tree.len(), 1);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod annotate;
mod error;
mod lang;
mod markup;
mod re_exports;
mod render;

// ============================================================================
// Public Re-exports
// ============================================================================

// Re-exports module
pub use re_exports::*;

// Lang enum
pub use lang::Lang;

pub use error::MarkupError;

// Markup tree
pub use markup::{
    AttrValue, Attribute, Content, Element, ElementId, MarkupTree, ObjectEntry, ObjectLiteral,
    normalize_text,
};

// Rendering
pub use render::{
    QuoteStyle, RenderOptions, attribute_value, camel_case, escape_text, render_element,
    style_key, style_value,
};

pub use annotate::annotate;
