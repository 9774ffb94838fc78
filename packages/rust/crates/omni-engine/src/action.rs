//! Visual edit actions.

use omni_types::{ElementSpec, InsertLocation, MoveLocation, StyleDelta};
use serde::{Deserialize, Serialize};

/// Element on a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    /// Rendering surface the element lives on.
    pub surface_id: String,
    /// Stable selector: CSS-like or a source locator (`@file:line:col`).
    pub selector: String,
    /// Location token read from the rendered element; wins over `selector`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_token: Option<String>,
}

impl Target {
    /// Target by selector.
    pub fn new(surface_id: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            selector: selector.into(),
            location_token: None,
        }
    }

    /// Attach the element's location token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.location_token = Some(token.into());
        self
    }
}

/// One reversible edit intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Merge style properties / classes into every target.
    UpdateStyle {
        /// Elements to restyle, all-or-nothing.
        targets: Vec<Target>,
        /// What to merge or restore.
        style_delta: StyleDelta,
    },
    /// Insert a new element.
    InsertElement {
        /// Element the insert was made on; anchors it when
        /// `location.anchor_selector` is empty.
        target: Target,
        /// Placement.
        location: InsertLocation,
        /// Element to render.
        element: ElementSpec,
    },
    /// Remove an element.
    RemoveElement {
        /// Element to remove.
        target: Target,
        /// Parent and index, tried when `target` no longer resolves.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<InsertLocation>,
    },
    /// Move an element within its file.
    MoveElement {
        /// Element to move.
        target: Target,
        /// Destination.
        location: MoveLocation,
    },
    /// Replace an element's text.
    EditText {
        /// Element to edit.
        target: Target,
        /// Text the user saw.
        original_text: String,
        /// Replacement text.
        new_text: String,
        /// Exact element source to write back instead (undo).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prior_markup: Option<String>,
    },
    /// Replace a snippet located by similarity (code edits from outside the
    /// canvas).
    CodeEdit {
        /// Surface whose history records the edit.
        surface_id: String,
        /// File to edit.
        file_path: String,
        /// Snippet as the editor last saw it.
        original: String,
        /// Replacement.
        updated: String,
        /// 0-based line to try first.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_hint: Option<usize>,
    },
}

impl Action {
    /// Surface the action belongs to.
    #[must_use]
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            Self::UpdateStyle { targets, .. } => targets.first().map(|t| t.surface_id.as_str()),
            Self::InsertElement { target, .. }
            | Self::RemoveElement { target, .. }
            | Self::MoveElement { target, .. }
            | Self::EditText { target, .. } => Some(&target.surface_id),
            Self::CodeEdit { surface_id, .. } => Some(surface_id),
        }
    }

    /// Variant name, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpdateStyle { .. } => "updateStyle",
            Self::InsertElement { .. } => "insertElement",
            Self::RemoveElement { .. } => "removeElement",
            Self::MoveElement { .. } => "moveElement",
            Self::EditText { .. } => "editText",
            Self::CodeEdit { .. } => "codeEdit",
        }
    }
}
