//! Core types for structural editing.
//!
//! Defines the data structures used throughout the editing pipeline.

use omni_ast::{MarkupTree, QuoteStyle, RenderOptions};
use omni_types::{AttributeSnapshot, FilePatch};

use crate::fuzzy::DEFAULT_THRESHOLD;

/// Result of one structural edit.
///
/// Offsets refer to the post-edit source held by `tree`.
#[derive(Debug, Clone)]
pub struct Mutation {
    /// Re-parsed tree after the edit.
    pub tree: MarkupTree,
    /// Minimal replacement turning the old source into the new one, `None`
    /// when nothing changed.
    pub patch: Option<FilePatch>,
    /// Opening-tag offset of the element the edit produced or touched.
    pub focus: Option<usize>,
    /// Opening-tag offset of that element's parent.
    pub parent_focus: Option<usize>,
    /// Child index of the element under its parent.
    pub index: Option<usize>,
    /// Whatever the edit overwrote, for building the inverse.
    pub prior: Prior,
}

impl Mutation {
    /// A mutation that changes nothing.
    #[must_use]
    pub fn unchanged(tree: &MarkupTree) -> Self {
        Self {
            tree: tree.clone(),
            patch: None,
            focus: None,
            parent_focus: None,
            index: None,
            prior: Prior::Nothing,
        }
    }

    /// Whether the source changed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.patch.is_none()
    }
}

/// State captured before an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prior {
    /// Nothing worth restoring.
    Nothing,
    /// Exact `style` / `className` attribute sources (`target_index` 0).
    Attributes(Vec<AttributeSnapshot>),
    /// Bytes removed at `offset` (post-edit coordinates).
    Removed {
        /// Removed text, including surrounding layout.
        markup: String,
        /// Where the text was.
        offset: usize,
    },
    /// Where a moved element came from.
    Moved {
        /// Opening-tag offset of the old parent (post-edit coordinates).
        original_parent_focus: usize,
        /// Old child index.
        original_index: usize,
    },
    /// Text and full element source before a text edit.
    Text {
        /// Normalized text content.
        text: String,
        /// Element source.
        markup: String,
    },
}

/// Configuration for edit operations.
///
/// Controls generated formatting and snippet matching.
#[derive(Debug, Clone, PartialEq)]
pub struct EditConfig {
    /// Quote style for generated literals.
    pub quote: QuoteStyle,
    /// One level of indentation for generated markup.
    pub indent_unit: String,
    /// Minimum similarity for snippet matches.
    pub fuzzy_threshold: f64,
    /// Fail snippet edits whose best score is shared by several windows.
    pub refuse_tied_matches: bool,
}

impl EditConfig {
    /// Rendering options derived from this config.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            quote: self.quote,
            indent_unit: self.indent_unit.clone(),
        }
    }
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            quote: QuoteStyle::Double,
            indent_unit: "  ".to_string(),
            fuzzy_threshold: DEFAULT_THRESHOLD,
            refuse_tied_matches: false,
        }
    }
}
