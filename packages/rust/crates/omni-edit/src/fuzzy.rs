//! Drift-tolerant snippet location.
//!
//! Finds where an "original" snippet from an external edit lives in the
//! current source, tolerating re-indentation and quote style changes. The
//! normalization is deliberately narrow: renamed identifiers, reflowed
//! expressions or edited comments are expected to fail the threshold.

use omni_types::ByteRange;
use similar::{ChangeTag, TextDiff};

/// Similarity a window must reach to be accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Best window found for a snippet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchReport {
    /// 0-based index of the window's first line.
    pub line: usize,
    /// Similarity in `[0, 1]`.
    pub score: f64,
    /// Later windows with exactly the same score.
    pub ties: usize,
}

/// Collapse whitespace runs to one space, map `'` to `"`, trim.
#[must_use]
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(if c == '\'' { '"' } else { c });
    }
    out
}

/// Word-diff similarity of two normalized strings.
///
/// Total length of the unchanged runs divided by the longer length.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let common: usize = TextDiff::from_words(a, b)
        .iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Equal)
        .map(|change| change.value().chars().count())
        .sum();
    common as f64 / longest as f64
}

/// Highest-scoring window regardless of threshold; earliest wins ties.
///
/// `None` for an empty snippet or a source with fewer lines than it.
#[must_use]
pub fn best_window(source: &str, snippet: &str) -> Option<MatchReport> {
    let window = snippet.lines().count();
    let lines: Vec<&str> = source.lines().collect();
    if window == 0 || lines.len() < window {
        return None;
    }
    let target = normalize(snippet);

    let mut best: Option<MatchReport> = None;
    for start in 0..=lines.len() - window {
        let candidate = normalize(&lines[start..start + window].join("\n"));
        let score = similarity(&candidate, &target);
        match &mut best {
            Some(report) if score > report.score => {
                *report = MatchReport {
                    line: start,
                    score,
                    ties: 0,
                };
            }
            Some(report) if score == report.score => report.ties += 1,
            Some(_) => {}
            None => {
                best = Some(MatchReport {
                    line: start,
                    score,
                    ties: 0,
                });
            }
        }
    }
    best
}

/// Best window scoring at least `threshold`.
#[must_use]
pub fn find_best_match_report(source: &str, snippet: &str, threshold: f64) -> Option<MatchReport> {
    best_window(source, snippet).filter(|report| report.score >= threshold)
}

/// Starting line (0-based) of the best window scoring at least `threshold`.
///
/// `None` means "cannot safely apply", never "apply at line 0".
#[must_use]
pub fn find_best_match(source: &str, snippet: &str, threshold: f64) -> Option<usize> {
    find_best_match_report(source, snippet, threshold).map(|report| report.line)
}

/// Byte range of `count` lines starting at 0-based `line`, excluding the
/// final line break.
#[must_use]
pub fn line_range(source: &str, line: usize, count: usize) -> Option<ByteRange> {
    if count == 0 {
        return None;
    }
    let mut starts = std::iter::once(0).chain(memchr::memchr_iter(b'\n', source.as_bytes()).map(|i| i + 1));
    let start = starts.nth(line)?;
    if start > source.len() {
        return None;
    }
    let rest = &source[start..];
    let mut end = start;
    for (i, l) in rest.split_inclusive('\n').enumerate().take(count) {
        let body = l.strip_suffix('\n').unwrap_or(l);
        let body = body.strip_suffix('\r').unwrap_or(body);
        end = if i + 1 == count { end + body.len() } else { end + l.len() };
    }
    Some(ByteRange::new(start, end))
}

/// Re-indent `text` so its least-indented line sits at `indent`.
///
/// Relative indentation and blank lines are preserved.
#[must_use]
pub fn reindent(text: &str, indent: &str) -> String {
    let common = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    text.lines()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                format!("{indent}{}", &l[common..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  <div className='a'>\n\t  x  </div> "), "<div className=\"a\"> x </div>");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_keeps_case_and_comments() {
        assert_eq!(normalize("Foo // Note"), "Foo // Note");
    }

    #[test]
    fn test_similarity_identical() {
        assert!((similarity("a b c", "a b c") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_snippet() {
        assert_eq!(find_best_match("a\nb\n", "", DEFAULT_THRESHOLD), None);
    }

    #[test]
    fn test_snippet_longer_than_source() {
        assert_eq!(find_best_match("a\n", "a\nb\nc", DEFAULT_THRESHOLD), None);
    }

    #[test]
    fn test_line_range() {
        let source = "zero\none\r\ntwo\nthree";
        let range = line_range(source, 1, 2).expect("range");
        assert_eq!(&source[range.start..range.end], "one\r\ntwo");
        let last = line_range(source, 3, 1).expect("range");
        assert_eq!(&source[last.start..last.end], "three");
        assert_eq!(line_range(source, 9, 1), None);
    }

    #[test]
    fn test_reindent() {
        let text = "    <a>\n      <b />\n\n    </a>";
        assert_eq!(reindent(text, "  "), "  <a>\n    <b />\n\n  </a>");
    }
}
