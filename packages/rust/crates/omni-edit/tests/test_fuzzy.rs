//! Tests for drift-tolerant snippet location.

use omni_edit::{
    DEFAULT_THRESHOLD, find_best_match, find_best_match_report, line_range, normalize, similarity,
};

fn jsx_file() -> String {
    let mut lines: Vec<String> = (1..=9).map(|i| format!("// filler line {i}")).collect();
    lines.push("    <div className=\"card\">".to_string());
    lines.push("      <h2 title=\"Greeting\">Hello</h2>".to_string());
    lines.push("    </div>".to_string());
    lines.extend((13..=20).map(|i| format!("// trailing line {i}")));
    lines.join("\n")
}

#[test]
fn test_drifted_jsx_block_found_at_line_ten() {
    let source = jsx_file();
    let snippet = "<div className='card'>\n<h2  title='Greeting'>Hello</h2>\n</div>";

    let report = find_best_match_report(&source, snippet, DEFAULT_THRESHOLD).expect("match");
    assert_eq!(report.line, 9);
    assert!((report.score - 1.0).abs() < f64::EPSILON);

    let range = line_range(&source, report.line, 3).expect("range");
    assert!(source[range.start..range.end].starts_with("    <div"));
    assert!(source[range.start..range.end].ends_with("</div>"));
}

#[test]
fn test_repeated_calls_are_deterministic() {
    let source = jsx_file();
    let snippet = "<h2 title=\"Greeting\">Hello</h2>";
    let first = find_best_match(&source, snippet, DEFAULT_THRESHOLD);
    for _ in 0..5 {
        assert_eq!(find_best_match(&source, snippet, DEFAULT_THRESHOLD), first);
    }
    assert_eq!(first, Some(10));
}

#[test]
fn test_equal_windows_keep_earliest() {
    let source = "<Item />\n<Other />\n<Item />\n";
    let report = find_best_match_report(source, "<Item />", DEFAULT_THRESHOLD).expect("match");
    assert_eq!(report.line, 0);
    assert_eq!(report.ties, 1);
}

#[test]
fn test_threshold_boundary() {
    // 17 of 20 characters survive the word diff: exactly 0.85.
    let source = "abcdefghijklmnop xyz";
    let snippet = "abcdefghijklmnop xyw";
    assert!((similarity(source, snippet) - 0.85).abs() < 1e-12);

    assert_eq!(find_best_match(source, snippet, 0.85), Some(0));
    assert_eq!(find_best_match(source, snippet, 0.850_001), None);
}

#[test]
fn test_renamed_identifier_fails() {
    let source = "const total = computeTotal(items);";
    let snippet = "const sum = computeSum(items);";
    assert_eq!(find_best_match(source, snippet, DEFAULT_THRESHOLD), None);
}

#[test]
fn test_normalize_does_not_touch_tokens() {
    assert_eq!(normalize("/* Note */  Foo('x')"), "/* Note */ Foo(\"x\")");
}
