//! Byte offset <-> line/column conversion.

use omni_types::{Bias, FilePatch, LocationRecord, SourceSpan, TagRange};

/// Line start table for one text.
///
/// Lines are 1-indexed and columns are 0-indexed character counts, matching
/// [`SourceSpan`].
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    /// Build the table for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(memchr::memchr_iter(b'\n', text.as_bytes()).map(|i| i + 1))
            .collect();
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where 0-indexed line `line` starts.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Byte offset where 0-indexed line `line` ends (excluding its newline).
    #[must_use]
    pub fn line_end(&self, text: &str, line: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let next = self.line_start(line + 1).unwrap_or(self.len);
        let mut end = next;
        if end > start && text.as_bytes().get(end - 1) == Some(&b'\n') {
            end -= 1;
        }
        if end > start && text.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some(end)
    }

    /// Position of byte `offset` in `text`.
    ///
    /// Offsets past the end clamp to the end; offsets inside a UTF-8 sequence
    /// round down to the character start.
    #[must_use]
    pub fn span_at(&self, text: &str, offset: usize) -> SourceSpan {
        let mut offset = offset.min(self.len);
        while offset > 0 && !text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = text[self.line_starts[line]..offset].chars().count();
        SourceSpan::new(to_u32(line + 1), to_u32(column))
    }

    /// Byte offset of `span` in `text`, `None` if it lies outside the text.
    #[must_use]
    pub fn offset_of(&self, text: &str, span: SourceSpan) -> Option<usize> {
        let line = (span.line as usize).checked_sub(1)?;
        let start = self.line_start(line)?;
        let end = self.line_start(line + 1).unwrap_or(self.len);
        let column = span.column as usize;
        let mut seen = 0usize;
        for (i, _) in text.get(start..end)?.char_indices() {
            if seen == column {
                return Some(start + i);
            }
            seen += 1;
        }
        (seen == column).then_some(end)
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Shift every span of `record` through `patch`.
///
/// `old_text` is the content the patch applies to, `new_text` the result.
/// Tag starts move past text inserted exactly at them, tag ends stay. Returns
/// `None` when any span falls inside the replaced range: the element itself
/// was rewritten and its record is stale.
#[must_use]
pub fn remap_record(
    record: &LocationRecord,
    old_text: &str,
    old_index: &LineIndex,
    new_text: &str,
    new_index: &LineIndex,
    patch: &FilePatch,
) -> Option<LocationRecord> {
    let remap = |span: SourceSpan, bias: Bias| -> Option<SourceSpan> {
        let offset = old_index.offset_of(old_text, span)?;
        let mapped = patch.map_offset(offset, bias)?;
        Some(new_index.span_at(new_text, mapped))
    };
    let remap_tag = |tag: &TagRange| -> Option<TagRange> {
        Some(TagRange::new(
            remap(tag.start, Bias::Right)?,
            remap(tag.end, Bias::Left)?,
        ))
    };

    let open_tag = remap_tag(&record.open_tag)?;
    let close_tag = match &record.close_tag {
        Some(tag) => Some(remap_tag(tag)?),
        None => None,
    };
    Some(LocationRecord::new(
        record.file_path.clone(),
        record.is_component_root,
        open_tag,
        close_tag,
    ))
}
