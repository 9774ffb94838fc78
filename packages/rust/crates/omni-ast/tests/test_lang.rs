//! Tests for lang module - dialect detection.

use omni_ast::{Lang, MarkupError, MarkupTree};

#[test]
fn test_from_extension() {
    assert_eq!(Lang::from_extension("tsx"), Some(Lang::Tsx));
    assert_eq!(Lang::from_extension("jsx"), Some(Lang::JavaScript));
    assert_eq!(Lang::from_extension("mts"), Some(Lang::TypeScript));
    assert_eq!(Lang::from_extension("vue"), None);
}

#[test]
fn test_as_str() {
    assert_eq!(Lang::Tsx.as_str(), "tsx");
    assert_eq!(Lang::JavaScript.as_str(), "js");
}

#[test]
fn test_parse_rejects_unknown_extension() {
    let result = MarkupTree::parse("styles.css", ".a { color: red; }");
    assert!(matches!(result, Err(MarkupError::UnsupportedLanguage(_))));
}

#[test]
fn test_jsx_in_js_file() {
    let tree = MarkupTree::parse("Button.jsx", "export const B = () => <button>Go</button>;")
        .expect("parse");
    assert_eq!(tree.lang(), Lang::JavaScript);
    assert_eq!(tree.len(), 1);
}
