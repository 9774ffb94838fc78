//! Tests for location token encoding.

use std::cmp::Ordering;

use omni_location::{DecodeError, compare, decode, encode, equals};
use omni_types::{LocationRecord, SourceSpan, TagRange};

fn record(file: &str, root: bool, line: u32, column: u32) -> LocationRecord {
    LocationRecord::new(
        file,
        root,
        TagRange::new(
            SourceSpan::new(line, column),
            SourceSpan::new(line, column + 12),
        ),
        Some(TagRange::new(
            SourceSpan::new(line + 3, column),
            SourceSpan::new(line + 3, column + 6),
        )),
    )
}

#[test]
fn test_roundtrip_preserves_record() {
    let original = record("src/App.tsx", true, 4, 2);
    let token = encode(&original).expect("encode");
    let decoded = decode(&token).expect("decode");

    assert_eq!(decoded.file_path, original.file_path);
    assert!(decoded.is_component_root);
    assert_eq!(decoded.open_tag, original.open_tag);
    assert_eq!(decoded.close_tag, original.close_tag);
}

#[test]
fn test_self_closing_roundtrip() {
    let original = LocationRecord::new(
        "src/Icon.jsx",
        false,
        TagRange::new(SourceSpan::new(1, 0), SourceSpan::new(1, 9)),
        None,
    );
    let decoded = decode(&encode(&original).expect("encode")).expect("decode");
    assert!(decoded.close_tag.is_none());
    assert!(equals(&decoded, &original));
}

#[test]
fn test_non_ascii_path_roundtrip() {
    let original = record("src/页面/Über.tsx", false, 10, 0);
    let decoded = decode(&encode(&original).expect("encode")).expect("decode");
    assert_eq!(decoded.file_path, "src/页面/Über.tsx");
}

#[test]
fn test_decoded_order_matches_source_order() {
    let earlier = record("src/App.tsx", false, 3, 8);
    let later = record("src/App.tsx", false, 3, 9);
    let a = decode(&encode(&earlier).expect("encode")).expect("decode");
    let b = decode(&encode(&later).expect("encode")).expect("decode");

    assert_eq!(compare(&a, &b), Ordering::Less);
    assert_eq!(compare(&b, &a), Ordering::Greater);
    assert_eq!(compare(&a, &a), Ordering::Equal);
}

#[test]
fn test_equality_ignores_tag_ends() {
    let a = record("src/App.tsx", false, 5, 4);
    let mut b = a.clone();
    b.open_tag.end = SourceSpan::new(5, 40);
    b.close_tag = None;
    assert!(equals(&a, &b));

    let other_file = record("src/Other.tsx", false, 5, 4);
    assert!(!equals(&a, &other_file));

    let root_flag = record("src/App.tsx", true, 5, 4);
    assert!(!equals(&a, &root_flag));
}

#[test]
fn test_empty_token_fails() {
    assert!(decode("").is_err());
}

#[test]
fn test_invalid_alphabet_fails() {
    assert!(matches!(decode("ab+/cd=="), Err(DecodeError::Encoding(_))));
}
