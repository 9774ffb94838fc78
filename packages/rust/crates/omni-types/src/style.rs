//! Style edits.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One inline style property. A `None` value deletes the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StyleProperty {
    /// CSS property name, kebab-case or camelCase.
    pub name: String,
    /// New value, or `None` to remove the property.
    pub value: Option<String>,
}

impl StyleProperty {
    /// Set `name` to `value`.
    #[must_use]
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Remove `name`.
    #[must_use]
    pub fn remove(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// Exact source of one styling attribute before an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSnapshot {
    /// Index of the target (within the action's target list) this belongs to.
    pub target_index: usize,
    /// Attribute name (`style`, `className`).
    pub name: String,
    /// Full attribute source (`style={{ color: "red" }}`), `None` if absent.
    pub source: Option<String>,
}

/// Change applied by a style update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StyleDelta {
    /// Merge properties into `style` and classes into `className`;
    /// the last value for a property or class group wins.
    #[serde(rename_all = "camelCase")]
    Merge {
        /// Inline style properties, applied in order.
        #[serde(default)]
        properties: Vec<StyleProperty>,
        /// Utility classes, applied in order.
        #[serde(default)]
        class_names: Vec<String>,
    },
    /// Write captured attribute sources back verbatim.
    Restore {
        /// Snapshots for every target.
        attributes: Vec<AttributeSnapshot>,
    },
}

impl StyleDelta {
    /// Merge delta from style properties only.
    #[must_use]
    pub fn properties(properties: Vec<StyleProperty>) -> Self {
        Self::Merge {
            properties,
            class_names: Vec::new(),
        }
    }

    /// Merge delta from utility classes only.
    #[must_use]
    pub fn classes<I, S>(class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Merge {
            properties: Vec::new(),
            class_names: class_names.into_iter().map(Into::into).collect(),
        }
    }

    /// The part of this delta that applies to target `index`.
    #[must_use]
    pub fn for_target(&self, index: usize) -> Self {
        match self {
            Self::Merge { .. } => self.clone(),
            Self::Restore { attributes } => Self::Restore {
                attributes: attributes
                    .iter()
                    .filter(|a| a.target_index == index)
                    .cloned()
                    .collect(),
            },
        }
    }

    /// Whether applying this delta can change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Merge {
                properties,
                class_names,
            } => properties.is_empty() && class_names.is_empty(),
            Self::Restore { attributes } => attributes.is_empty(),
        }
    }
}
