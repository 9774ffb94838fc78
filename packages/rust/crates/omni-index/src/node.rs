//! Live nodes and the raw host snapshots they are built from.

use std::collections::BTreeMap;

use omni_location::{LOCATION_ATTRIBUTE, decode};
use omni_types::{LocationRecord, Selectable};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Bounding rectangle reported by the host, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Whether the point lies inside (edges included).
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && y >= self.y && x <= self.x + self.width && y <= self.y + self.height
    }
}

/// Node as reported by the rendering host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostNode {
    /// Host-assigned id, stable for the node's lifetime.
    pub runtime_id: String,
    /// Tag name.
    pub tag_name: String,
    /// Attributes as rendered.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Computed style.
    #[serde(default)]
    pub computed_style: BTreeMap<String, String>,
    /// Text content.
    #[serde(default)]
    pub text_content: Option<String>,
    /// Bounding rectangle.
    #[serde(default)]
    pub bounding_rect: Option<Bounds>,
    /// Child nodes in order.
    #[serde(default)]
    pub children: Vec<HostNode>,
}

impl HostNode {
    /// Node with no attributes or children.
    #[must_use]
    pub fn new(runtime_id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            runtime_id: runtime_id.into(),
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// Add an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: HostNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Indexed element of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveElementNode {
    /// Host-assigned id.
    pub runtime_id: String,
    /// Tag name.
    pub tag_name: String,
    /// Attributes as rendered.
    pub attributes: BTreeMap<String, String>,
    /// Computed style.
    pub styles: BTreeMap<String, String>,
    /// Text content.
    pub text_content: Option<String>,
    /// Child runtime ids in order.
    pub children: Vec<String>,
    /// Parent runtime id.
    pub parent: Option<String>,
    /// Decoded source location, `None` for unannotated or stale nodes.
    pub location: Option<LocationRecord>,
    /// Bounding rectangle.
    pub bounds: Option<Bounds>,
}

impl LiveElementNode {
    /// Build from a host node, decoding its location token.
    ///
    /// # Errors
    /// `IndexError::Decode` when the token is malformed.
    pub fn from_host(host: &HostNode, parent: Option<String>) -> Result<Self, IndexError> {
        let location = host
            .attributes
            .get(LOCATION_ATTRIBUTE)
            .map(|token| decode(token))
            .transpose()
            .map_err(|source| IndexError::Decode {
                runtime_id: host.runtime_id.clone(),
                source,
            })?;
        Ok(Self {
            runtime_id: host.runtime_id.clone(),
            tag_name: host.tag_name.clone(),
            attributes: host.attributes.clone(),
            styles: host.computed_style.clone(),
            text_content: host.text_content.clone(),
            children: host.children.iter().map(|c| c.runtime_id.clone()).collect(),
            parent,
            location,
            bounds: host.bounding_rect,
        })
    }

    /// Source locator of the node's opening tag.
    #[must_use]
    pub fn locator(&self) -> Option<String> {
        self.location.as_ref().map(LocationRecord::locator)
    }
}

impl Selectable for LiveElementNode {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        let value = self.attributes.get(name);
        let value = match (value, name) {
            (None, "class") => self.attributes.get("className"),
            _ => value,
        };
        value.map(String::as_str)
    }
}
