//! Per-surface live element forest.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use dashmap::DashMap;
use omni_location::{LineIndex, remap_record};
use omni_types::{FilePatch, Selector};

use crate::error::IndexError;
use crate::node::{HostNode, LiveElementNode};

/// Host-native selector resolution.
///
/// Returns matching runtime ids in document order.
pub trait SelectorQuery: Send + Sync {
    /// Run `selector` against the host's view of `surface_id`.
    fn query(&self, surface_id: &str, selector: &str) -> Vec<String>;
}

/// Node addition reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedNode {
    /// Parent runtime id; `None` replaces the surface root.
    pub parent_id: Option<String>,
    /// Child position under the parent; appended when `None`.
    pub index: Option<usize>,
    /// The node and its subtree.
    pub node: HostNode,
}

/// Ids added and removed since the last full resync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingDelta {
    /// Runtime ids added.
    pub added: BTreeSet<String>,
    /// Runtime ids removed.
    pub removed: BTreeSet<String>,
}

impl PendingDelta {
    /// Whether nothing changed since the last resync.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    fn record_added(&mut self, id: &str) {
        if !self.removed.remove(id) {
            self.added.insert(id.to_string());
        }
    }

    fn record_removed(&mut self, id: &str) {
        if !self.added.remove(id) {
            self.removed.insert(id.to_string());
        }
    }
}

/// One surface's nodes.
#[derive(Debug, Clone, Default)]
struct SurfaceTree {
    root: Option<String>,
    nodes: HashMap<String, LiveElementNode>,
    delta: PendingDelta,
}

impl SurfaceTree {
    /// Insert `host` and its subtree, returning the inserted ids.
    fn ingest(&mut self, host: &HostNode, parent: Option<String>) -> Result<Vec<String>, IndexError> {
        let mut staged = Vec::new();
        let mut stack = vec![(host, parent)];
        while let Some((node, parent)) = stack.pop() {
            staged.push(LiveElementNode::from_host(node, parent)?);
            for child in node.children.iter().rev() {
                stack.push((child, Some(node.runtime_id.clone())));
            }
        }
        let ids = staged.iter().map(|n| n.runtime_id.clone()).collect();
        for node in staged {
            self.nodes.insert(node.runtime_id.clone(), node);
        }
        Ok(ids)
    }

    /// Drop `id` and its subtree, returning the removed ids.
    fn detach(&mut self, id: &str) -> Vec<String> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        if let Some(parent) = node.parent.clone()
            && let Some(parent) = self.nodes.get_mut(&parent)
        {
            parent.children.retain(|c| c != id);
        }
        if self.root.as_deref() == Some(id) {
            self.root = None;
        }

        let mut removed = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed.push(current);
            }
        }
        removed
    }

    /// Runtime ids in document (pre-)order.
    fn ordered(&self) -> Vec<&LiveElementNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&str> = self.root.iter().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(node);
                stack.extend(node.children.iter().rev().map(String::as_str));
            }
        }
        out
    }
}

/// Live element index over every rendering surface.
///
/// Surfaces are independent entries of a concurrent map; all mutations of one
/// surface go through its map entry.
#[derive(Default)]
pub struct LiveElementIndex {
    surfaces: DashMap<String, SurfaceTree>,
    query: Option<Arc<dyn SelectorQuery>>,
}

impl std::fmt::Debug for LiveElementIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveElementIndex")
            .field("surfaces", &self.surfaces.len())
            .field("host_query", &self.query.is_some())
            .finish()
    }
}

impl LiveElementIndex {
    /// Empty index using the built-in selector matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty index delegating selector resolution to the host.
    #[must_use]
    pub fn with_query(query: Arc<dyn SelectorQuery>) -> Self {
        Self {
            surfaces: DashMap::new(),
            query: Some(query),
        }
    }

    /// Replace a surface's tree with a full snapshot.
    ///
    /// # Errors
    /// `IndexError::Decode` when any node carries a malformed token; the
    /// previous tree is kept in that case.
    pub fn set_root(&self, surface_id: &str, root: &HostNode) -> Result<(), IndexError> {
        let mut tree = SurfaceTree::default();
        tree.ingest(root, None)?;
        tree.root = Some(root.runtime_id.clone());
        tracing::debug!(surface = surface_id, nodes = tree.nodes.len(), "Surface resynced");
        self.surfaces.insert(surface_id.to_string(), tree);
        Ok(())
    }

    /// Root node of a surface.
    #[must_use]
    pub fn get_root(&self, surface_id: &str) -> Option<LiveElementNode> {
        let tree = self.surfaces.get(surface_id)?;
        let root = tree.root.as_ref()?;
        tree.nodes.get(root).cloned()
    }

    /// Apply a host delta without rebuilding the tree.
    ///
    /// Removals run first, then additions parents-first.
    ///
    /// # Errors
    /// `SurfaceNotFound`, `UnknownParent` or `Decode`. On error the surface is
    /// left exactly as it was.
    pub fn merge_incremental(
        &self,
        surface_id: &str,
        added: &[AddedNode],
        removed: &[String],
    ) -> Result<(), IndexError> {
        let mut slot = self
            .surfaces
            .get_mut(surface_id)
            .ok_or_else(|| IndexError::SurfaceNotFound(surface_id.to_string()))?;
        // Staged on a copy, swapped in once the whole delta applies.
        let mut tree = slot.clone();

        for id in removed {
            for gone in tree.detach(id) {
                tree.delta.record_removed(&gone);
            }
        }

        let mut pending: Vec<&AddedNode> = added.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for entry in pending {
                let ready = entry
                    .parent_id
                    .as_ref()
                    .is_none_or(|p| tree.nodes.contains_key(p));
                if !ready {
                    deferred.push(entry);
                    continue;
                }
                // Re-adding an id replaces the old node.
                for gone in tree.detach(&entry.node.runtime_id) {
                    tree.delta.record_removed(&gone);
                }
                let ids = tree.ingest(&entry.node, entry.parent_id.clone())?;
                let id = entry.node.runtime_id.clone();
                match &entry.parent_id {
                    Some(parent) => {
                        if let Some(parent) = tree.nodes.get_mut(parent) {
                            let at = entry.index.unwrap_or(parent.children.len()).min(parent.children.len());
                            parent.children.insert(at, id);
                        }
                    }
                    None => {
                        if let Some(old) = tree.root.clone() {
                            for gone in tree.detach(&old) {
                                tree.delta.record_removed(&gone);
                            }
                        }
                        tree.root = Some(id);
                    }
                }
                for id in ids {
                    tree.delta.record_added(&id);
                }
            }
            if deferred.len() == before {
                let entry = deferred[0];
                return Err(IndexError::UnknownParent {
                    runtime_id: entry.node.runtime_id.clone(),
                    parent_id: entry.parent_id.clone().unwrap_or_default(),
                });
            }
            pending = deferred;
        }
        *slot = tree;
        tracing::debug!(
            surface = surface_id,
            added = added.len(),
            removed = removed.len(),
            "Merged incremental delta"
        );
        Ok(())
    }

    /// Ids added and removed since the last `set_root`.
    #[must_use]
    pub fn pending_delta(&self, surface_id: &str) -> Option<PendingDelta> {
        self.surfaces.get(surface_id).map(|t| t.delta.clone())
    }

    /// Node by runtime id.
    #[must_use]
    pub fn node(&self, surface_id: &str, runtime_id: &str) -> Option<LiveElementNode> {
        self.surfaces.get(surface_id)?.nodes.get(runtime_id).cloned()
    }

    /// First node matching `selector`, in document order.
    ///
    /// # Errors
    /// `SurfaceNotFound`, or `Selector` for malformed selectors.
    pub fn resolve(&self, surface_id: &str, selector: &str) -> Result<Option<LiveElementNode>, IndexError> {
        let tree = self
            .surfaces
            .get(surface_id)
            .ok_or_else(|| IndexError::SurfaceNotFound(surface_id.to_string()))?;

        let matches: Vec<&LiveElementNode> = if let Some(query) = &self.query {
            query
                .query(surface_id, selector)
                .iter()
                .filter_map(|id| tree.nodes.get(id))
                .collect()
        } else {
            let parsed: Selector = selector.parse()?;
            tree.ordered()
                .into_iter()
                .filter(|node| matches_selector(node, &parsed))
                .collect()
        };

        if matches.len() > 1 {
            tracing::warn!(
                surface = surface_id,
                selector,
                matches = matches.len(),
                "Selector matched several live nodes; using the first"
            );
        }
        Ok(matches.first().map(|n| (*n).clone()))
    }

    /// Deepest node whose bounds contain the point.
    #[must_use]
    pub fn element_at(&self, surface_id: &str, x: f64, y: f64) -> Option<LiveElementNode> {
        let tree = self.surfaces.get(surface_id)?;
        let mut current = tree.nodes.get(tree.root.as_ref()?)?;
        if !current.bounds.is_some_and(|b| b.contains(x, y)) {
            return None;
        }
        'descend: loop {
            for child in current.children.iter().rev() {
                if let Some(node) = tree.nodes.get(child)
                    && node.bounds.is_some_and(|b| b.contains(x, y))
                {
                    current = node;
                    continue 'descend;
                }
            }
            return Some(current.clone());
        }
    }

    /// Shift locations pointing into `file_path` through a committed patch.
    ///
    /// Records the patch rewrote are cleared. Returns the number of records
    /// that moved.
    pub fn shift_locations(&self, file_path: &str, old_text: &str, new_text: &str, patch: &FilePatch) -> usize {
        let old_index = LineIndex::new(old_text);
        let new_index = LineIndex::new(new_text);
        let mut shifted = 0;
        for mut surface in self.surfaces.iter_mut() {
            let surface_id = surface.key().clone();
            for node in surface.nodes.values_mut() {
                let Some(record) = node.location.as_ref().filter(|r| r.file_path == file_path) else {
                    continue;
                };
                match remap_record(record, old_text, &old_index, new_text, &new_index, patch) {
                    Some(next) => {
                        if next.open_tag != record.open_tag || next.close_tag != record.close_tag {
                            shifted += 1;
                        }
                        node.location = Some(next);
                    }
                    None => {
                        tracing::debug!(
                            surface = %surface_id,
                            runtime_id = %node.runtime_id,
                            "Location rewritten by patch; cleared"
                        );
                        node.location = None;
                    }
                }
            }
        }
        shifted
    }

    /// Surfaces currently indexed.
    #[must_use]
    pub fn surfaces(&self) -> Vec<String> {
        self.surfaces.iter().map(|s| s.key().clone()).collect()
    }

    /// Forget a surface.
    pub fn remove_surface(&self, surface_id: &str) -> bool {
        self.surfaces.remove(surface_id).is_some()
    }
}

fn matches_selector(node: &LiveElementNode, selector: &Selector) -> bool {
    match selector {
        Selector::Location { file_path, span } => node.location.as_ref().is_some_and(|record| {
            record.open_tag.start == *span
                && file_path.as_deref().is_none_or(|f| f == record.file_path)
        }),
        Selector::Compound(simple) => simple.matches(node),
    }
}
