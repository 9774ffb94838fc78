//! Diff generation utilities.
//!
//! Provides unified diff previews of source patches using the `similar` crate.

use similar::{ChangeTag, TextDiff};

/// Generate a unified diff between two versions of `file_path`.
///
/// Hunks carry three lines of context and `a/` / `b/` headers. Identical
/// inputs produce an empty string.
#[must_use]
pub fn generate_unified_diff(file_path: &str, original: &str, modified: &str) -> String {
    if original == modified {
        return String::new();
    }
    TextDiff::from_lines(original, modified)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{file_path}"), &format!("b/{file_path}"))
        .to_string()
}

/// Count inserted and deleted lines.
#[must_use]
pub fn diff_stats(original: &str, modified: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(original, modified);
    diff.iter_all_changes()
        .fold((0, 0), |(added, removed), change| match change.tag() {
            ChangeTag::Insert => (added + 1, removed),
            ChangeTag::Delete => (added, removed + 1),
            ChangeTag::Equal => (added, removed),
        })
}
