//! Source positions and location records.

use std::cmp::Ordering;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A position in a source file.
///
/// `line` is 1-indexed, `column` is a 0-indexed character column.
/// Spans order lexicographically: line first, then column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
pub struct SourceSpan {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed, in characters).
    pub column: u32,
}

impl SourceSpan {
    /// Create a new span.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start and end of one tag (`<div ...>` or `</div>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct TagRange {
    /// Position of the `<`.
    pub start: SourceSpan,
    /// Position just past the closing `>`.
    pub end: SourceSpan,
}

impl TagRange {
    /// Create a new tag range.
    #[must_use]
    pub const fn new(start: SourceSpan, end: SourceSpan) -> Self {
        Self { start, end }
    }
}

/// Pointer from a rendered element back to the markup that produced it.
///
/// Records are immutable value objects: "changing" one produces a new record.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    /// Source file the element lives in.
    pub file_path: String,
    /// Whether the element is the outermost markup of its component.
    pub is_component_root: bool,
    /// Span of the opening (or self-closing) tag.
    pub open_tag: TagRange,
    /// Span of the closing tag, absent for self-closing elements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_tag: Option<TagRange>,
}

impl LocationRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(
        file_path: impl Into<String>,
        is_component_root: bool,
        open_tag: TagRange,
        close_tag: Option<TagRange>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            is_component_root,
            open_tag,
            close_tag,
        }
    }

    /// Check the tag-order invariant.
    ///
    /// `open_tag.start <= open_tag.end`, and when a closing tag is present,
    /// `open_tag.end <= close_tag.start`.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.open_tag.start > self.open_tag.end {
            return false;
        }
        match &self.close_tag {
            Some(close) => self.open_tag.end <= close.start && close.start <= close.end,
            None => true,
        }
    }

    /// Order two records by the start of their opening tags.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        self.open_tag.start.cmp(&other.open_tag.start)
    }

    /// Source locator selector (`@file:line:column`) for this record.
    #[must_use]
    pub fn locator(&self) -> String {
        format!(
            "@{}:{}:{}",
            self.file_path, self.open_tag.start.line, self.open_tag.start.column
        )
    }
}

/// Records are equal when they name the same file, agree on component-root
/// status, and start at the same position.
impl PartialEq for LocationRecord {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
            && self.is_component_root == other.is_component_root
            && self.compare(other) == Ordering::Equal
    }
}

impl Eq for LocationRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: u32, column: u32) -> LocationRecord {
        LocationRecord::new(
            "src/App.tsx",
            false,
            TagRange::new(SourceSpan::new(line, column), SourceSpan::new(line, column + 5)),
            None,
        )
    }

    #[test]
    fn test_span_order_is_lexicographic() {
        assert!(SourceSpan::new(1, 40) < SourceSpan::new(2, 0));
        assert!(SourceSpan::new(3, 2) < SourceSpan::new(3, 10));
    }

    #[test]
    fn test_equality_ignores_tag_ends() {
        let mut a = record(4, 2);
        let b = record(4, 2);
        a.open_tag.end = SourceSpan::new(9, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_component_root_breaks_equality() {
        let mut a = record(4, 2);
        a.is_component_root = true;
        assert_ne!(a, record(4, 2));
    }

    #[test]
    fn test_well_formed() {
        let mut r = record(1, 0);
        assert!(r.is_well_formed());
        r.close_tag = Some(TagRange::new(SourceSpan::new(1, 2), SourceSpan::new(1, 8)));
        assert!(!r.is_well_formed());
    }

    #[test]
    fn test_locator() {
        assert_eq!(record(12, 4).locator(), "@src/App.tsx:12:4");
    }
}
