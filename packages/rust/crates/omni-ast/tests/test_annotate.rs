//! Tests for location annotation.

use omni_ast::{MarkupTree, annotate};
use omni_location::{LOCATION_ATTRIBUTE, decode};

const SOURCE: &str = r#"export const Card = () => (
  <section className="card">
    <>
      <h2>Title</h2>
    </>
    <img src="/a.png" />
  </section>
);
"#;

#[test]
fn test_tokens_point_at_original_tags() {
    let tree = MarkupTree::parse("src/Card.tsx", SOURCE).expect("parse");
    let annotated = annotate(&tree).expect("annotate");
    let annotated_tree = MarkupTree::parse("src/Card.tsx", annotated).expect("reparse");
    assert_eq!(annotated_tree.len(), tree.len());

    for id in tree.ids() {
        let element = annotated_tree.element(id);
        let token = element.attribute(LOCATION_ATTRIBUTE).and_then(|a| a.literal());
        if element.is_fragment() {
            assert!(token.is_none());
            continue;
        }
        let record = decode(token.expect("token")).expect("decode");
        assert_eq!(record, tree.record(id));
        assert_eq!(record.open_tag, tree.record(id).open_tag);
    }
}

#[test]
fn test_annotate_is_idempotent() {
    let tree = MarkupTree::parse("src/Card.tsx", SOURCE).expect("parse");
    let once = annotate(&tree).expect("annotate");
    let again = annotate(&MarkupTree::parse("src/Card.tsx", once.clone()).expect("reparse"))
        .expect("annotate");
    assert_eq!(once, again);
}
