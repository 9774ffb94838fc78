//! Tests for the markup tree.

use omni_ast::{AttrValue, MarkupError, MarkupTree, ObjectEntry};
use omni_types::{Selector, SourceSpan};

const APP: &str = r#"import React from 'react';

export function App() {
  return (
    <div id="root" className="p-4 flex">
      <Header title="Hi" />
      <p style={{ color: 'red', ...base }}>Hello {name} world</p>
      {items.map((i) => <li key={i}>{i}</li>)}
    </div>
  );
}
"#;

fn app() -> MarkupTree {
    MarkupTree::parse("src/App.tsx", APP).expect("parse")
}

fn select(tree: &MarkupTree, selector: &str) -> Vec<usize> {
    let selector: Selector = selector.parse().expect("selector");
    tree.select(&selector).into_iter().map(|id| id.index()).collect()
}

#[test]
fn test_elements_in_document_order() {
    let tree = app();
    let tags: Vec<&str> = tree.ids().map(|id| tree.element(id).tag.as_str()).collect();
    assert_eq!(tags, vec!["div", "Header", "p", "li"]);
}

#[test]
fn test_structure() {
    let tree = app();
    let roots: Vec<_> = tree.roots().collect();
    assert_eq!(roots.len(), 1);
    let root = roots[0];

    let children = tree.children(root);
    assert_eq!(children.len(), 2);
    assert_eq!(tree.child_index(children[1]), Some(1));

    let li = tree.ids().last().expect("li");
    let li_element = tree.element(li);
    assert!(li_element.embedded);
    assert_eq!(li_element.parent, Some(root));
    assert_eq!(li_element.depth, 1);
    assert_eq!(tree.child_index(li), None);
    assert!(tree.contains(root, li));
    assert!(!tree.contains(li, root));
}

#[test]
fn test_self_closing_and_ranges() {
    let tree = app();
    let header = tree.children(tree.roots().next().expect("root"))[0];
    let element = tree.element(header);
    assert!(element.is_self_closing());
    assert_eq!(tree.element_source(header), "<Header title=\"Hi\" />");
    assert_eq!(tree.indent_of(header), "      ");
}

#[test]
fn test_attributes() {
    let tree = app();
    let root = tree.element(tree.roots().next().expect("root"));
    let class = root.attribute("className").expect("className");
    assert_eq!(class.literal(), Some("p-4 flex"));

    let p = tree.element(tree.children(tree.roots().next().expect("root"))[1]);
    let style = p.attribute("style").expect("style");
    let AttrValue::Expression {
        object: Some(object),
        ..
    } = &style.value
    else {
        panic!("style should be an object expression");
    };
    assert_eq!(object.entries.len(), 2);
    assert!(matches!(&object.entries[0], ObjectEntry::Property { key, .. } if key == "color"));
    assert!(matches!(object.entries[1], ObjectEntry::Spread { .. }));
}

#[test]
fn test_text_content_skips_dynamic_expressions() {
    let tree = app();
    let p = tree.children(tree.roots().next().expect("root"))[1];
    assert_eq!(tree.text_content(p), "Hello world");
}

#[test]
fn test_select() {
    let tree = app();
    assert_eq!(select(&tree, "#root"), vec![0]);
    assert_eq!(select(&tree, ".flex"), vec![0]);
    assert_eq!(select(&tree, "div.p-4"), vec![0]);
    assert_eq!(select(&tree, "Header[title=\"Hi\"]"), vec![1]);
    assert_eq!(select(&tree, "li[key]"), Vec::<usize>::new());
    assert_eq!(select(&tree, "@src/App.tsx:7:6"), vec![2]);
    assert_eq!(select(&tree, "@7:6"), vec![2]);
    assert!(select(&tree, "@src/Other.tsx:7:6").is_empty());
    assert!(select(&tree, "span").is_empty());
}

#[test]
fn test_records() {
    let tree = app();
    let root = tree.roots().next().expect("root");
    let record = tree.record(root);
    assert_eq!(record.file_path, "src/App.tsx");
    assert!(record.is_component_root);
    assert_eq!(record.open_tag.start, SourceSpan::new(5, 4));
    assert_eq!(record.close_tag.expect("close").start, SourceSpan::new(9, 4));
    assert!(record.is_well_formed());
    assert_eq!(tree.locator(root), "@src/App.tsx:5:4");

    let header = tree.children(root)[0];
    assert!(!tree.record(header).is_component_root);
    assert_eq!(tree.find_at(SourceSpan::new(6, 6)), Some(header));
}

#[test]
fn test_syntax_error() {
    let result = MarkupTree::parse("src/Broken.tsx", "const x = <div>;\n");
    assert!(matches!(result, Err(MarkupError::Syntax { .. })));
}

#[test]
fn test_fragment() {
    let tree = MarkupTree::parse("src/F.tsx", "const f = <><a /><b /></>;").expect("parse");
    let root = tree.roots().next().expect("root");
    assert!(tree.element(root).is_fragment());
    assert_eq!(tree.children(root).len(), 2);
    assert!(select(&tree, "*").iter().all(|i| *i != root.index()));
}

#[test]
fn test_string_expression_counts_as_text() {
    let tree = MarkupTree::parse("src/T.tsx", "const t = <p>{\"a < b\"}</p>;").expect("parse");
    let p = tree.roots().next().expect("root");
    assert_eq!(tree.text_content(p), "a < b");
}
