//! Snippet replacement for code edits made outside the canvas.

use omni_types::{ByteRange, FilePatch};

use crate::error::EditError;
use crate::fuzzy::{best_window, line_range, normalize, reindent, similarity};
use crate::types::EditConfig;

/// Outcome of a snippet replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetEdit {
    /// Patch against the old source.
    pub patch: FilePatch,
    /// New source.
    pub source: String,
    /// 0-based line the snippet was found at.
    pub line: usize,
    /// Similarity of the matched window.
    pub score: f64,
    /// Text that was replaced.
    pub replaced: String,
    /// Text written in its place.
    pub inserted: String,
}

/// Replace the window most similar to `original` with `updated`.
///
/// `line_hint` is tried first and used when it matches exactly (after
/// normalization); otherwise the whole source is scanned.
///
/// # Errors
/// `AmbiguousMatch` when no window reaches the threshold, or when several
/// windows share the best score and `refuse_tied_matches` is set.
pub fn replace_snippet(
    file_path: &str,
    source: &str,
    original: &str,
    updated: &str,
    config: &EditConfig,
    line_hint: Option<usize>,
) -> Result<SnippetEdit, EditError> {
    let count = original.lines().count();
    let hinted = line_hint.and_then(|line| {
        let range = line_range(source, line, count)?;
        let score = similarity(&normalize(&source[range.start..range.end]), &normalize(original));
        (score >= 1.0).then_some((line, score, range))
    });

    let (line, score, range) = match hinted {
        Some(found) => found,
        None => {
            let report = best_window(source, original).ok_or(EditError::AmbiguousMatch {
                best_score: 0.0,
                ties: 0,
            })?;
            if report.score < config.fuzzy_threshold || (config.refuse_tied_matches && report.ties > 0) {
                return Err(EditError::AmbiguousMatch {
                    best_score: report.score,
                    ties: report.ties,
                });
            }
            if report.ties > 0 {
                tracing::warn!(
                    file = file_path,
                    line = report.line,
                    ties = report.ties,
                    "Snippet matched several windows equally; using the first"
                );
            }
            let range = line_range(source, report.line, count).ok_or(EditError::AmbiguousMatch {
                best_score: report.score,
                ties: report.ties,
            })?;
            (report.line, report.score, range)
        }
    };

    let ByteRange { start, end } = range;
    let replaced = source[start..end].to_string();
    let updated = updated.strip_suffix('\n').unwrap_or(updated);
    let indent = base_indent(&replaced);
    let inserted = if updated.trim().is_empty() || base_indent(updated) == indent {
        updated.to_string()
    } else {
        reindent(updated, indent)
    };
    let patch = FilePatch::new(file_path, range, inserted.clone());
    let mut new_source = String::with_capacity(source.len() + inserted.len());
    new_source.push_str(&source[..start]);
    new_source.push_str(&inserted);
    new_source.push_str(&source[end..]);

    tracing::debug!(file = file_path, line, score, "Applied snippet edit");
    Ok(SnippetEdit {
        patch,
        source: new_source,
        line,
        score,
        replaced,
        inserted,
    })
}

/// Indentation of the least-indented non-blank line.
fn base_indent(text: &str) -> &str {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| &l[..l.len() - l.trim_start_matches([' ', '\t']).len()])
        .min_by_key(|indent| indent.len())
        .unwrap_or("")
}
