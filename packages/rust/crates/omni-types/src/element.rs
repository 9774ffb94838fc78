//! Element payloads and placement for insert/move edits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::style::StyleProperty;

/// Where an element goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    /// Immediately before the anchor, under the anchor's parent.
    Before,
    /// Immediately after the anchor, under the anchor's parent.
    After,
    /// As a child of the anchor, at `index`.
    #[default]
    Inside,
}

/// Target position for an inserted element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertLocation {
    /// Placement relative to the anchor.
    pub position: InsertPosition,
    /// Selector of the anchor element.
    pub anchor_selector: String,
    /// Element-child index under the parent (used with `Inside`).
    pub index: usize,
    /// Exact byte offset to insert verbatim markup at. Only set by inverse
    /// actions, which run against the exact post-edit source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_offset: Option<usize>,
}

impl InsertLocation {
    /// Insert as child `index` of the element matched by `anchor_selector`.
    #[must_use]
    pub fn inside(anchor_selector: impl Into<String>, index: usize) -> Self {
        Self {
            position: InsertPosition::Inside,
            anchor_selector: anchor_selector.into(),
            index,
            restore_offset: None,
        }
    }

    /// Insert next to the element matched by `anchor_selector`.
    #[must_use]
    pub fn beside(anchor_selector: impl Into<String>, position: InsertPosition) -> Self {
        Self {
            position,
            anchor_selector: anchor_selector.into(),
            index: 0,
            restore_offset: None,
        }
    }
}

/// Destination of a moved element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveLocation {
    /// Placement relative to the anchor.
    pub position: InsertPosition,
    /// Selector of the anchor element.
    pub anchor_selector: String,
    /// Final element-child index under the destination parent.
    pub index: usize,
    /// Element-child index under the original parent before the move.
    pub original_index: usize,
}

/// Description of a new element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    /// Tag name (`div`, `Button`, ...).
    pub tag_name: String,
    /// Literal attributes in insertion order.
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    /// Inline style properties.
    #[serde(default)]
    pub styles: Vec<StyleProperty>,
    /// Utility classes for `className`.
    #[serde(default)]
    pub class_names: Vec<String>,
    /// Text content placed before any children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    /// Child elements.
    #[serde(default)]
    pub children: Vec<ElementSpec>,
    /// Verbatim markup; when set, every other field is ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
}

impl ElementSpec {
    /// Start a spec for `tag_name`.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// Spec carrying verbatim markup.
    #[must_use]
    pub fn verbatim(markup: impl Into<String>) -> Self {
        Self {
            markup: Some(markup.into()),
            ..Self::default()
        }
    }

    /// Add a literal attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add an inline style property.
    #[must_use]
    pub fn with_style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push(StyleProperty::set(name, value));
        self
    }

    /// Add a utility class.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class_names.push(class.into());
        self
    }

    /// Set the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}
