//! Location annotation of markup sources.
//!
//! The build step runs sources through [`annotate`] before handing them to
//! the renderer, so every rendered element carries a token pointing back at
//! its original tags.

use omni_location::{LOCATION_ATTRIBUTE, encode};
use omni_types::{ByteRange, FilePatch, apply_patches};

use crate::error::MarkupError;
use crate::markup::MarkupTree;

/// Tags that reject extra attributes.
const FRAGMENT_TAGS: &[&str] = &["Fragment", "React.Fragment"];

/// Source of `tree` with a location token attribute on every element.
///
/// Records describe the un-annotated source. Fragments and elements that
/// already carry a token are left alone.
///
/// # Errors
/// Returns `MarkupError::Location` if a record cannot be encoded.
pub fn annotate(tree: &MarkupTree) -> Result<String, MarkupError> {
    let mut patches = Vec::new();
    for id in tree.ids() {
        let element = tree.element(id);
        if element.is_fragment()
            || FRAGMENT_TAGS.contains(&element.tag.as_str())
            || element.attribute(LOCATION_ATTRIBUTE).is_some()
        {
            continue;
        }
        let token = encode(&tree.record(id))?;
        patches.push(FilePatch::new(
            tree.file_path(),
            ByteRange::new(element.name_end, element.name_end),
            format!(" {LOCATION_ATTRIBUTE}=\"{token}\""),
        ));
    }
    Ok(apply_patches(tree.source(), &patches)?)
}
