//! Byte-range patches against source files.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct ByteRange {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
}

impl ByteRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length of the range in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if the range is empty (a pure insertion point).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// A byte-range replacement to be written into one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePatch {
    /// File the patch applies to.
    pub file_path: String,
    /// Replaced byte range in the current file content.
    pub range: ByteRange,
    /// Replacement text.
    pub replacement: String,
}

impl FilePatch {
    /// Create a new patch.
    #[must_use]
    pub fn new(file_path: impl Into<String>, range: ByteRange, replacement: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            range,
            replacement: replacement.into(),
        }
    }

    /// Minimal single patch turning `old` into `new`.
    ///
    /// Trims the common prefix and suffix (on char boundaries). A pure
    /// insertion or deletion is slid left onto a line start or a tag start
    /// when the text around it allows several positions, so it never splits
    /// a tag name. Returns `None` when both texts are identical.
    #[must_use]
    pub fn between(file_path: impl Into<String>, old: &str, new: &str) -> Option<Self> {
        if old == new {
            return None;
        }
        let prefix = common_prefix_len(old, new);
        let suffix = common_suffix_len(&old[prefix..], &new[prefix..]);
        let (end, new_end) = (old.len() - suffix, new.len() - suffix);
        let shift = if prefix == end {
            boundary_shift(old, prefix, &new[prefix..new_end])
        } else if prefix == new_end {
            boundary_shift(old, prefix, &old[prefix..end])
        } else {
            0
        };
        Some(Self::new(
            file_path,
            ByteRange::new(prefix - shift, end - shift),
            &new[prefix - shift..new_end - shift],
        ))
    }

    /// Byte delta this patch introduces (`new_len - old_len`).
    #[must_use]
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.len() as isize
    }

    /// Patch undoing this one, given the content it was applied to.
    ///
    /// # Errors
    /// Returns `PatchError::OutOfBounds` if the range does not fit `original`.
    pub fn invert(&self, original: &str) -> Result<Self, PatchError> {
        let replaced = original
            .get(self.range.start..self.range.end)
            .ok_or(PatchError::OutOfBounds {
                start: self.range.start,
                end: self.range.end,
                len: original.len(),
            })?;
        Ok(Self::new(
            self.file_path.clone(),
            ByteRange::new(self.range.start, self.range.start + self.replacement.len()),
            replaced,
        ))
    }

    /// Map an offset in the pre-patch content to the post-patch content.
    ///
    /// Offsets strictly inside the replaced range have no image. `bias`
    /// decides which side of an insertion point an equal offset lands on.
    #[must_use]
    pub fn map_offset(&self, offset: usize, bias: Bias) -> Option<usize> {
        let ByteRange { start, end } = self.range;
        let shifted = || offset - self.range.len() + self.replacement.len();
        match bias {
            Bias::Left if offset <= start => Some(offset),
            Bias::Right if offset < start => Some(offset),
            _ if offset >= end => Some(shifted()),
            _ => None,
        }
    }
}

/// Side an offset sticks to when text is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    /// Stay before the inserted text (ends of tags).
    Left,
    /// Move past the inserted text (starts of tags).
    Right,
}

/// Errors raised when patches cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// Range lies outside the content or splits a UTF-8 character.
    #[error("Patch range {start}..{end} out of bounds (len {len})")]
    OutOfBounds {
        /// Start offset.
        start: usize,
        /// End offset.
        end: usize,
        /// Content length.
        len: usize,
    },

    /// Two patches touch the same bytes.
    #[error("Overlapping patches at byte {0}")]
    Overlap(usize),
}

/// Apply a set of non-overlapping patches to `content`.
///
/// Ranges are interpreted against the original `content`; patches are applied
/// back to front so earlier offsets stay valid. Either every patch applies or
/// an error is returned and nothing is produced.
///
/// # Errors
/// Returns `PatchError` on out-of-bounds or overlapping ranges.
pub fn apply_patches(content: &str, patches: &[FilePatch]) -> Result<String, PatchError> {
    let mut ordered: Vec<&FilePatch> = patches.iter().collect();
    ordered.sort_by_key(|p| (p.range.start, p.range.end));

    let mut cursor = 0usize;
    for patch in &ordered {
        let ByteRange { start, end } = patch.range;
        if start > end
            || end > content.len()
            || !content.is_char_boundary(start)
            || !content.is_char_boundary(end)
        {
            return Err(PatchError::OutOfBounds {
                start,
                end,
                len: content.len(),
            });
        }
        if start < cursor {
            return Err(PatchError::Overlap(start));
        }
        cursor = end;
    }

    let mut output = content.to_string();
    for patch in ordered.iter().rev() {
        output.replace_range(patch.range.start..patch.range.end, &patch.replacement);
    }
    Ok(output)
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    for ((i, ca), cb) in a.char_indices().zip(b.chars()) {
        if ca != cb {
            return i;
        }
        len = i + ca.len_utf8();
    }
    len
}

/// Bytes to slide text `moving`, inserted into or deleted from `old` at
/// `at`, to the left.
///
/// The rightmost line start in the ambiguity window wins, then the rightmost
/// position where the moved text opens a tag.
fn boundary_shift(old: &str, at: usize, moving: &str) -> usize {
    let mut line = None;
    let mut tag = None;
    let mut shift = 0;
    loop {
        let pos = at - shift;
        if line.is_none() && (pos == 0 || old[..pos].ends_with('\n')) {
            line = Some(shift);
        }
        let first = if shift == 0 { moving.chars().next() } else { old[pos..].chars().next() };
        if tag.is_none() && first == Some('<') {
            tag = Some(shift);
        }
        if shift == moving.len() {
            break;
        }
        match old[..pos].chars().next_back() {
            Some(c) if moving[..moving.len() - shift].ends_with(c) => shift += c.len_utf8(),
            _ => break,
        }
    }
    line.or(tag).unwrap_or(0)
}

fn common_suffix_len(a: &str, b: &str) -> usize {
    let mut len = 0;
    for (ca, cb) in a.chars().rev().zip(b.chars().rev()) {
        if ca != cb {
            break;
        }
        len += ca.len_utf8();
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_trims_common_affixes() {
        let patch = FilePatch::between("a.tsx", "<div>old</div>", "<div>new</div>").expect("patch");
        assert_eq!(patch.range, ByteRange::new(5, 8));
        assert_eq!(patch.replacement, "new");
    }

    #[test]
    fn test_between_identical_is_none() {
        assert!(FilePatch::between("a.tsx", "same", "same").is_none());
    }

    #[test]
    fn test_between_pure_insertion() {
        let patch = FilePatch::between("a.tsx", "ab", "aXb").expect("patch");
        assert!(patch.range.is_empty());
        assert_eq!(patch.range.start, 1);
        assert_eq!(patch.replacement, "X");
    }

    #[test]
    fn test_between_insertion_lands_on_line_start() {
        let old = "<div>\n  <header />\n</div>";
        let new = "<div>\n  <h1 />\n  <header />\n</div>";
        let patch = FilePatch::between("a.tsx", old, new).expect("patch");
        assert_eq!(patch.range, ByteRange::new(6, 6));
        assert_eq!(patch.replacement, "  <h1 />\n");
        assert_eq!(apply_patches(old, &[patch]).expect("apply"), new);
    }

    #[test]
    fn test_between_inline_insertion_lands_on_tag() {
        let old = "<p><b/></p>";
        let new = "<p><span /><b/></p>";
        let patch = FilePatch::between("a.tsx", old, new).expect("patch");
        assert_eq!(patch.range, ByteRange::new(3, 3));
        assert_eq!(patch.replacement, "<span />");
        // The start of `<b/>` moves past the inserted element.
        assert_eq!(patch.map_offset(3, Bias::Right), Some(11));
    }

    #[test]
    fn test_between_deletion_keeps_next_sibling() {
        let old = "<ul>\n  <a/>\n  <b/>\n</ul>";
        let new = "<ul>\n  <b/>\n</ul>";
        let patch = FilePatch::between("a.tsx", old, new).expect("patch");
        assert_eq!(patch.range, ByteRange::new(5, 12));
        assert!(patch.replacement.is_empty());
        let b = old.find("<b/>").expect("b");
        assert_eq!(patch.map_offset(b, Bias::Right), new.find("<b/>"));
    }

    #[test]
    fn test_invert_restores_original() {
        let original = "hello world";
        let patch = FilePatch::new("f", ByteRange::new(6, 11), "there");
        let patched = apply_patches(original, std::slice::from_ref(&patch)).expect("apply");
        let inverse = patch.invert(original).expect("invert");
        assert_eq!(apply_patches(&patched, &[inverse]).expect("apply"), original);
    }

    #[test]
    fn test_apply_rejects_overlap() {
        let patches = vec![
            FilePatch::new("f", ByteRange::new(0, 4), "x"),
            FilePatch::new("f", ByteRange::new(2, 6), "y"),
        ];
        assert_eq!(apply_patches("abcdefgh", &patches), Err(PatchError::Overlap(2)));
    }

    #[test]
    fn test_map_offset() {
        let patch = FilePatch::new("f", ByteRange::new(4, 6), "abcd");
        assert_eq!(patch.map_offset(2, Bias::Left), Some(2));
        assert_eq!(patch.map_offset(5, Bias::Left), None);
        assert_eq!(patch.map_offset(6, Bias::Left), Some(8));
        assert_eq!(patch.map_offset(4, Bias::Right), None);
    }

    #[test]
    fn test_map_offset_at_insertion_point() {
        let patch = FilePatch::new("f", ByteRange::new(3, 3), "xy");
        assert_eq!(patch.map_offset(3, Bias::Left), Some(3));
        assert_eq!(patch.map_offset(3, Bias::Right), Some(5));
    }
}
