//! Structural mutations on JSX/TSX markup.
//!
//! Every operation computes byte-range edits against the current tree,
//! applies them, and re-parses the result. A result that no longer parses is
//! rejected, so callers never see a half-edited file.

use omni_ast::{Content, ElementId, MarkupTree, escape_text, normalize_text, render_element};
use omni_types::{
    ByteRange, ElementSpec, FilePatch, InsertLocation, InsertPosition, MoveLocation, Selector,
    StyleDelta, apply_patches,
};

use crate::error::EditError;
use crate::style;
use crate::types::{EditConfig, Mutation, Prior};

/// Where new markup lands: `prefix + markup + suffix` replaces `range`.
#[derive(Debug)]
struct Slot {
    range: ByteRange,
    prefix: String,
    suffix: String,
    indent: String,
}

impl Slot {
    fn at(offset: usize, prefix: String, suffix: String, indent: String) -> Self {
        Self {
            range: ByteRange::new(offset, offset),
            prefix,
            suffix,
            indent,
        }
    }

    fn fill(&self, markup: &str) -> String {
        format!("{}{markup}{}", self.prefix, self.suffix)
    }

    /// Offset of the markup in the edited source, ignoring other edits.
    fn focus(&self) -> usize {
        self.range.start + self.prefix.len()
    }
}

/// Structural editor for one markup tree at a time.
#[derive(Debug, Clone, Default)]
pub struct AstMutator {
    config: EditConfig,
}

impl AstMutator {
    /// Create a mutator with the given formatting config.
    #[must_use]
    pub fn new(config: EditConfig) -> Self {
        Self { config }
    }

    /// Formatting config.
    #[must_use]
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// First element matching `selector`, in document order.
    ///
    /// # Errors
    /// Returns `EditError::Selector` for a malformed selector.
    pub fn resolve(&self, tree: &MarkupTree, selector: &str) -> Result<Option<ElementId>, EditError> {
        let parsed: Selector = selector.parse()?;
        let matches = tree.select(&parsed);
        if matches.len() > 1 {
            tracing::warn!(
                file = tree.file_path(),
                selector,
                matches = matches.len(),
                "Selector matched several elements; editing the first"
            );
        }
        Ok(matches.first().copied())
    }

    fn require(&self, tree: &MarkupTree, selector: &str) -> Result<ElementId, EditError> {
        self.resolve(tree, selector)?
            .ok_or_else(|| EditError::TargetNotFound(selector.to_string()))
    }

    /// Apply `edits` and re-parse, failing closed on broken output.
    fn commit(&self, tree: &MarkupTree, edits: &[FilePatch]) -> Result<(MarkupTree, Option<FilePatch>), EditError> {
        let source = apply_patches(tree.source(), edits)?;
        let next = MarkupTree::parse_as(tree.file_path(), source, tree.lang())?;
        let patch = FilePatch::between(tree.file_path(), tree.source(), next.source());
        Ok((next, patch))
    }

    fn edit(tree: &MarkupTree, range: ByteRange, text: impl Into<String>) -> FilePatch {
        FilePatch::new(tree.file_path(), range, text)
    }

    // ------------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------------

    /// Merge or restore inline styles and classes of one element.
    ///
    /// # Errors
    /// `TargetNotFound`, `Unsupported` for computed attributes, or a parse
    /// failure of the result.
    pub fn apply_style_update(
        &self,
        tree: &MarkupTree,
        selector: &str,
        delta: &StyleDelta,
    ) -> Result<Mutation, EditError> {
        let id = self.require(tree, selector)?;
        let element = tree.element(id);
        let plan = style::plan(tree, id, delta, &self.config.render_options())?;
        let (next, patch) = self.commit(tree, &plan.patches)?;
        Ok(Mutation {
            tree: next,
            patch,
            focus: Some(element.open_tag.start),
            parent_focus: element.parent.map(|p| tree.element(p).open_tag.start),
            index: tree.child_index(id),
            prior: Prior::Attributes(plan.prior),
        })
    }

    // ------------------------------------------------------------------------
    // Insert
    // ------------------------------------------------------------------------

    /// Insert a rendered (or verbatim) element.
    ///
    /// # Errors
    /// `TargetNotFound` when the anchor does not resolve, `InvalidLocation`
    /// for a root anchor with `before`/`after` or a bad restore offset.
    pub fn apply_insert_element(
        &self,
        tree: &MarkupTree,
        location: &InsertLocation,
        spec: &ElementSpec,
    ) -> Result<Mutation, EditError> {
        let anchor = self.require(tree, &location.anchor_selector)?;
        let (parent, index) = placement(tree, anchor, location.position, location.index, None)?;
        let siblings = tree.children(parent);
        let index = index.min(siblings.len());
        let options = self.config.render_options();

        let (edit, focus) = if let Some(offset) = location.restore_offset {
            let element = tree.element(parent);
            let inside = element
                .inner_range()
                .is_some_and(|inner| inner.start <= offset && offset <= inner.end);
            if !inside {
                return Err(EditError::InvalidLocation(format!(
                    "restore offset {offset} is outside <{}>",
                    element.tag
                )));
            }
            let markup = render_element(spec, "", &options);
            let lead = markup.len() - markup.trim_start().len();
            (Self::edit(tree, ByteRange::new(offset, offset), markup), offset + lead)
        } else {
            let slot = self.slot(tree, parent, &siblings, index);
            let markup = render_element(spec, &slot.indent, &options);
            (Self::edit(tree, slot.range, slot.fill(&markup)), slot.focus())
        };

        let (next, patch) = self.commit(tree, &[edit])?;
        if element_at_offset(&next, focus).is_none() {
            return Err(EditError::InvalidLocation(
                "inserted markup does not start with an element".to_string(),
            ));
        }
        tracing::debug!(file = tree.file_path(), focus, index, "Inserted element");
        Ok(Mutation {
            tree: next,
            patch,
            focus: Some(focus),
            parent_focus: Some(tree.element(parent).open_tag.start),
            index: Some(index),
            prior: Prior::Nothing,
        })
    }

    /// Where child `index` of `parent` goes, given its other children.
    fn slot(&self, tree: &MarkupTree, parent: ElementId, siblings: &[ElementId], index: usize) -> Slot {
        let element = tree.element(parent);
        let parent_indent = tree.indent_of(parent).to_string();
        let child_indent = siblings
            .first()
            .filter(|_| tree.is_multiline(parent))
            .map_or_else(
                || format!("{parent_indent}{}", self.config.indent_unit),
                |first| tree.indent_of(*first).to_string(),
            );

        let Some(inner) = element.inner_range() else {
            let start = self_closing_tail(tree, parent);
            return Slot {
                range: ByteRange::new(start, element.open_tag.end),
                prefix: format!(">\n{child_indent}"),
                suffix: format!("\n{parent_indent}</{}>", element.tag),
                indent: child_indent,
            };
        };

        if tree.slice(inner).trim().is_empty() {
            return Slot {
                range: inner,
                prefix: format!("\n{child_indent}"),
                suffix: format!("\n{parent_indent}"),
                indent: child_indent,
            };
        }

        if tree.is_multiline(parent) {
            if index == 0
                && let Some(first) = siblings.first()
            {
                let start = tree.element(*first).range.start;
                let line_start = tree.line_start_of(start);
                let own_line = line_start > inner.start
                    && tree.slice(ByteRange::new(line_start, start)).trim().is_empty();
                if own_line {
                    return Slot::at(line_start, child_indent.clone(), "\n".to_string(), child_indent);
                }
            }
            let after = index
                .checked_sub(1)
                .and_then(|i| siblings.get(i))
                .map_or(inner.start, |prev| tree.element(*prev).range.end);
            return Slot::at(after, format!("\n{child_indent}"), String::new(), child_indent);
        }

        let at = match index.checked_sub(1).and_then(|i| siblings.get(i)) {
            Some(prev) => tree.element(*prev).range.end,
            None => siblings
                .first()
                .map_or(inner.end, |first| tree.element(*first).range.start),
        };
        Slot::at(at, String::new(), String::new(), parent_indent)
    }

    // ------------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------------

    /// Remove an element, together with its line when it stands alone.
    ///
    /// When `selector` does not resolve, `location` (parent + index) is tried.
    ///
    /// # Errors
    /// `TargetNotFound` when nothing resolves and `allow_absent` is false,
    /// `InvalidLocation` for roots and elements nested in expressions.
    pub fn apply_remove_element(
        &self,
        tree: &MarkupTree,
        selector: &str,
        location: Option<&InsertLocation>,
        allow_absent: bool,
    ) -> Result<Mutation, EditError> {
        let mut target = self.resolve(tree, selector)?;
        if target.is_none()
            && let Some(location) = location
            && let Some(anchor) = self.resolve(tree, &location.anchor_selector)?
        {
            let (parent, index) = placement(tree, anchor, location.position, location.index, None)?;
            target = tree.children(parent).get(index).copied();
        }
        let Some(id) = target else {
            if allow_absent {
                tracing::debug!(file = tree.file_path(), selector, "Element already absent");
                return Ok(Mutation::unchanged(tree));
            }
            return Err(EditError::TargetNotFound(selector.to_string()));
        };

        let (parent, index) = attached(tree, id)?;
        let range = removal_range(tree, id, parent);
        let markup = tree.slice(range).to_string();
        let (next, patch) = self.commit(tree, &[Self::edit(tree, range, "")])?;
        tracing::debug!(file = tree.file_path(), offset = range.start, index, "Removed element");
        Ok(Mutation {
            tree: next,
            patch,
            focus: None,
            parent_focus: Some(tree.element(parent).open_tag.start),
            index: Some(index),
            prior: Prior::Removed {
                markup,
                offset: range.start,
            },
        })
    }

    // ------------------------------------------------------------------------
    // Move
    // ------------------------------------------------------------------------

    /// Move an element so it ends up as child `index` of the destination.
    ///
    /// # Errors
    /// `TargetNotFound`, or `InvalidLocation` when moving into itself or a
    /// descendant, or moving a root.
    pub fn apply_move_element(
        &self,
        tree: &MarkupTree,
        selector: &str,
        location: &MoveLocation,
    ) -> Result<Mutation, EditError> {
        let id = self.require(tree, selector)?;
        let anchor = self.require(tree, &location.anchor_selector)?;
        let (source_parent, source_index) = attached(tree, id)?;
        if anchor == id && location.position != InsertPosition::Inside {
            return Ok(Mutation::unchanged(tree));
        }
        let (dest, index) = placement(tree, anchor, location.position, location.index, Some(id))?;
        if tree.contains(id, dest) {
            return Err(EditError::InvalidLocation(
                "cannot move an element into itself or a descendant".to_string(),
            ));
        }

        let siblings: Vec<ElementId> = tree.children(dest).into_iter().filter(|c| *c != id).collect();
        let index = index.min(siblings.len());
        if dest == source_parent && index == source_index {
            return Ok(Mutation::unchanged(tree));
        }

        let element = tree.element(id);
        let removal = removal_range(tree, id, source_parent);
        let slot = self.slot(tree, dest, &siblings, index);
        let text = tree.element_source(id);
        let text = if tree.element(dest).depth + 1 == element.depth {
            text.to_string()
        } else {
            shift_indent(text, tree.indent_of(id), &slot.indent)
        };

        let edits = vec![
            Self::edit(tree, removal, ""),
            Self::edit(tree, slot.range, slot.fill(&text)),
        ];
        let (next, patch) = self.commit(tree, &edits)?;
        let focus = shift_through(&edits[..1], slot.range.start) + slot.prefix.len();
        let parent_focus = shift_through(&edits, tree.element(dest).open_tag.start);
        let original_parent_focus = shift_through(&edits, tree.element(source_parent).open_tag.start);
        tracing::debug!(
            file = tree.file_path(),
            from = source_index,
            to = index,
            "Moved element"
        );
        Ok(Mutation {
            tree: next,
            patch,
            focus: Some(focus),
            parent_focus: Some(parent_focus),
            index: Some(index),
            prior: Prior::Moved {
                original_parent_focus,
                original_index: source_index,
            },
        })
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    /// Replace the text of an element.
    ///
    /// With `prior_markup` the whole element source is written back verbatim.
    ///
    /// # Errors
    /// `ContentMismatch` when the current text differs from `original_text`,
    /// `Unsupported` when the text is split around child elements.
    pub fn apply_edit_text(
        &self,
        tree: &MarkupTree,
        selector: &str,
        original_text: &str,
        new_text: &str,
        prior_markup: Option<&str>,
    ) -> Result<Mutation, EditError> {
        let id = self.require(tree, selector)?;
        let element = tree.element(id);
        let current = tree.text_content(id);
        if normalize_text(original_text) != current {
            return Err(EditError::ContentMismatch {
                expected: original_text.to_string(),
                actual: current,
            });
        }
        if prior_markup.is_none() && normalize_text(new_text) == current {
            return Ok(Mutation::unchanged(tree));
        }

        let escaped = escape_text(new_text);
        let edit = if let Some(markup) = prior_markup {
            Self::edit(tree, element.range, markup)
        } else if let Some(inner) = element.inner_range() {
            let leaf = element.content.iter().all(|c| match c {
                Content::Text(_) => true,
                Content::Expression(range) => is_string_literal(tree.slice(*range)),
                Content::Element(_) => false,
            });
            if leaf {
                Self::edit(tree, trimmed(tree, inner), escaped)
            } else {
                let pieces: Vec<ByteRange> = element
                    .content
                    .iter()
                    .filter_map(|c| match c {
                        Content::Text(range) if !tree.slice(*range).trim().is_empty() => Some(*range),
                        _ => None,
                    })
                    .collect();
                let [piece] = pieces.as_slice() else {
                    return Err(EditError::Unsupported(format!(
                        "text of <{}> is split around child elements",
                        element.tag
                    )));
                };
                Self::edit(tree, trimmed(tree, *piece), escaped)
            }
        } else {
            let start = self_closing_tail(tree, id);
            Self::edit(
                tree,
                ByteRange::new(start, element.open_tag.end),
                format!(">{escaped}</{}>", element.tag),
            )
        };

        let (next, patch) = self.commit(tree, &[edit])?;
        Ok(Mutation {
            tree: next,
            patch,
            focus: Some(element.open_tag.start),
            parent_focus: element.parent.map(|p| tree.element(p).open_tag.start),
            index: tree.child_index(id),
            prior: Prior::Text {
                text: current,
                markup: tree.element_source(id).to_string(),
            },
        })
    }
}

/// Element whose opening tag starts at `offset`.
#[must_use]
pub fn element_at_offset(tree: &MarkupTree, offset: usize) -> Option<ElementId> {
    tree.ids().find(|id| tree.element(*id).open_tag.start == offset)
}

/// Parent and child index an anchor-relative position refers to.
///
/// `moving` is left out of the sibling count so indices are final.
fn placement(
    tree: &MarkupTree,
    anchor: ElementId,
    position: InsertPosition,
    index: usize,
    moving: Option<ElementId>,
) -> Result<(ElementId, usize), EditError> {
    match position {
        InsertPosition::Inside => Ok((anchor, index)),
        InsertPosition::Before | InsertPosition::After => {
            let (parent, _) = attached(tree, anchor)?;
            let at = tree
                .children(parent)
                .into_iter()
                .filter(|c| Some(*c) != moving)
                .position(|c| c == anchor)
                .unwrap_or(0);
            let offset = usize::from(position == InsertPosition::After);
            Ok((parent, at + offset))
        }
    }
}

/// Parent and index of an element written directly inside another.
fn attached(tree: &MarkupTree, id: ElementId) -> Result<(ElementId, usize), EditError> {
    let element = tree.element(id);
    let parent = element
        .parent
        .ok_or_else(|| EditError::InvalidLocation(format!("<{}> is a root element", element.tag)))?;
    let index = tree.child_index(id).ok_or_else(|| {
        EditError::InvalidLocation(format!("<{}> is nested in an expression", element.tag))
    })?;
    Ok((parent, index))
}

/// Bytes removed together with an element.
fn removal_range(tree: &MarkupTree, id: ElementId, parent: ElementId) -> ByteRange {
    let range = tree.element(id).range;
    let Some(inner) = tree.element(parent).inner_range() else {
        return range;
    };
    let before = tree.slice(ByteRange::new(inner.start, range.start));
    let after = tree.slice(ByteRange::new(range.end, inner.end));
    if before.trim().is_empty() && after.trim().is_empty() {
        return inner;
    }

    let line_start = tree.line_start_of(range.start);
    let rest = tree.slice(ByteRange::new(range.end, inner.end));
    let line_rest = &rest[..rest.find('\n').unwrap_or(rest.len())];
    let alone = line_start > inner.start
        && tree.slice(ByteRange::new(line_start, range.start)).trim().is_empty()
        && line_rest.trim().is_empty()
        && rest.contains('\n');
    if !alone {
        return range;
    }
    let mut start = line_start - 1;
    if start > inner.start && tree.slice(ByteRange::new(start - 1, start)) == "\r" {
        start -= 1;
    }
    let spaces = line_rest.len() - line_rest.trim_start_matches([' ', '\t']).len();
    let end = range.end + spaces;
    ByteRange::new(start, end)
}

/// Start of the `/>` of a self-closing tag, including the space before it.
fn self_closing_tail(tree: &MarkupTree, id: ElementId) -> usize {
    let open = tree.element(id).open_tag;
    let text = tree.slice(open);
    let body = text.strip_suffix("/>").unwrap_or(text);
    open.start + body.trim_end().len()
}

/// `range` without its leading and trailing whitespace; an all-whitespace
/// range is returned whole.
fn trimmed(tree: &MarkupTree, range: ByteRange) -> ByteRange {
    let text = tree.slice(range);
    if text.trim().is_empty() {
        return range;
    }
    let lead = text.len() - text.trim_start().len();
    let trail = text.len() - text.trim_end().len();
    ByteRange::new(range.start + lead, range.end - trail)
}

/// `{"..."}`, `{'...'}` or a template literal without substitutions.
fn is_string_literal(container: &str) -> bool {
    let inner = container
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .map(str::trim)
        .unwrap_or_default();
    let quoted = ['"', '\'', '`']
        .iter()
        .any(|q| inner.len() >= 2 && inner.starts_with(*q) && inner.ends_with(*q));
    quoted && !inner.contains("${")
}

/// Offset of a tag start after applying `edits`; insertions exactly at it
/// push it right.
fn shift_through(edits: &[FilePatch], offset: usize) -> usize {
    let delta: isize = edits
        .iter()
        .filter(|e| e.range.end <= offset)
        .map(FilePatch::delta)
        .sum();
    offset.saturating_add_signed(delta)
}

/// Swap the indentation of continuation lines from `from` to `to`.
fn shift_indent(text: &str, from: &str, to: &str) -> String {
    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        match line.strip_prefix(from) {
            Some(rest) => {
                out.push_str(to);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_indent() {
        assert_eq!(shift_indent("<a>\n    <b />\n  </a>", "  ", "    "), "<a>\n      <b />\n    </a>");
    }

    #[test]
    fn test_is_string_literal() {
        assert!(is_string_literal("{\"a < b\"}"));
        assert!(is_string_literal("{ 'x' }"));
        assert!(!is_string_literal("{count}"));
        assert!(!is_string_literal("{`${a}`}"));
    }

    #[test]
    fn test_shift_through() {
        let edits = vec![
            FilePatch::new("a", ByteRange::new(2, 4), ""),
            FilePatch::new("a", ByteRange::new(10, 10), "xyz"),
        ];
        assert_eq!(shift_through(&edits, 1), 1);
        assert_eq!(shift_through(&edits, 6), 4);
        assert_eq!(shift_through(&edits, 10), 11);
        assert_eq!(shift_through(&edits, 12), 13);
    }
}
