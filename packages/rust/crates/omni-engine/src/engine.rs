//! Action pipeline: resolve, mutate, patch, log.
//!
//! Each surface has one history and one lock; an action runs to completion
//! (including its store writes) before the next one on the same surface.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use omni_ast::{Lang, MarkupTree};
use omni_edit::{AstMutator, EditError, Prior, diff_stats, element_at_offset, generate_unified_diff, replace_snippet};
use omni_index::LiveElementIndex;
use omni_io::{FsSourceStore, SourceStore, StoreError};
use omni_types::{
    AttributeSnapshot, Bias, ElementSpec, FilePatch, InsertLocation, InsertPosition, LocationRecord, MoveLocation,
    Selector, StyleDelta,
};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::action::{Action, Target};
use crate::error::EngineError;
use crate::log::{CommandLog, CommandLogEntry, HistoryDepth};
use crate::settings::EngineConfig;

/// Pipeline stage of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Accepted, nothing done yet.
    Received,
    /// Targets are being resolved to source locations.
    Resolving,
    /// Source trees are being edited in memory.
    Mutating,
    /// Patches are written.
    Patched,
    /// The history entry is recorded.
    Logged,
    /// Stopped; no source changed.
    Failed,
}

/// Outcome of an applied, undone or redone action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    /// Last phase reached.
    pub phase: Phase,
    /// The action with every target resolved to a source locator.
    pub action: Action,
    /// Action that reverts it.
    pub inverse: Action,
    /// One patch per changed file.
    pub patches: Vec<FilePatch>,
    /// Live locations moved by the patches.
    pub shifted_locations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Apply,
    Undo,
    Redo,
}

/// A target pinned to source.
#[derive(Debug, Clone)]
struct SourceTarget {
    file_path: String,
    locator: String,
}

impl SourceTarget {
    fn from_record(record: &LocationRecord) -> Self {
        Self {
            file_path: record.file_path.clone(),
            locator: record.locator(),
        }
    }
}

/// New content for one file.
#[derive(Debug)]
struct FileWrite {
    file_path: String,
    old: String,
    new: String,
    patch: FilePatch,
}

impl FileWrite {
    fn between(file_path: &str, old: String, new: &str) -> Option<Self> {
        let patch = FilePatch::between(file_path, &old, new)?;
        Some(Self {
            file_path: file_path.to_string(),
            new: new.to_string(),
            old,
            patch,
        })
    }
}

/// Why a store write was not confirmed.
#[derive(Debug, thiserror::Error)]
enum WriteFailure {
    /// No answer in time; the write may still land.
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error(transparent)]
    Store(StoreError),
}

/// Everything an action will do, computed before any write.
#[derive(Debug)]
struct Plan {
    resolved: Action,
    inverse: Action,
    writes: Vec<FileWrite>,
}

impl Plan {
    fn unchanged(action: Action) -> Self {
        Self {
            inverse: action.clone(),
            resolved: action,
            writes: Vec::new(),
        }
    }
}

/// Turns visual edit actions into source patches.
pub struct ActionEngine {
    index: Arc<LiveElementIndex>,
    store: Arc<dyn SourceStore>,
    mutator: AstMutator,
    config: EngineConfig,
    logs: DashMap<String, Arc<Mutex<CommandLog>>>,
}

impl std::fmt::Debug for ActionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("index", &self.index)
            .field("config", &self.config)
            .field("surfaces", &self.logs.len())
            .finish_non_exhaustive()
    }
}

impl ActionEngine {
    /// Engine over `index`, writing through `store`.
    pub fn new(index: Arc<LiveElementIndex>, store: Arc<dyn SourceStore>, config: EngineConfig) -> Self {
        Self {
            mutator: AstMutator::new(config.edit.clone()),
            index,
            store,
            config,
            logs: DashMap::new(),
        }
    }

    /// Engine editing files under `root` on disk.
    pub fn for_project(root: impl Into<PathBuf>, index: Arc<LiveElementIndex>, config: EngineConfig) -> Self {
        let store = FsSourceStore::new(root).with_max_file_size(config.max_file_size);
        Self::new(index, Arc::new(store), config)
    }

    /// Live element index.
    #[must_use]
    pub fn index(&self) -> &Arc<LiveElementIndex> {
        &self.index
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn log_for(&self, surface_id: &str) -> Arc<Mutex<CommandLog>> {
        self.logs
            .entry(surface_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(CommandLog::new(self.config.history_limit))))
            .value()
            .clone()
    }

    // ========================================================================
    // Public API
    // ========================================================================

    /// Apply an action and record it in its surface's history.
    ///
    /// # Errors
    /// Any [`EngineError`]; on error no source file is changed and the history
    /// is untouched.
    pub async fn apply(&self, action: Action) -> Result<ApplyResult, EngineError> {
        let surface_id = action
            .surface_id()
            .ok_or_else(|| EngineError::InvalidAction(format!("{} without targets", action.kind())))?
            .to_string();
        let log = self.log_for(&surface_id);
        let mut log = log.lock().await;
        let mut result = self.run(&action, Mode::Apply).await?;
        log.record(CommandLogEntry {
            action: result.action.clone(),
            inverse_action: result.inverse.clone(),
            patches_applied: result.patches.clone(),
        });
        result.phase = Phase::Logged;
        Ok(result)
    }

    /// Locate `original` in `file_path` by similarity and replace it.
    ///
    /// # Errors
    /// `AmbiguousMatch` when no confident location exists, or any writer
    /// failure.
    pub async fn apply_code_edit(
        &self,
        surface_id: &str,
        file_path: &str,
        original: &str,
        updated: &str,
    ) -> Result<ApplyResult, EngineError> {
        self.apply(Action::CodeEdit {
            surface_id: surface_id.to_string(),
            file_path: file_path.to_string(),
            original: original.to_string(),
            updated: updated.to_string(),
            line_hint: None,
        })
        .await
    }

    /// Revert the latest action of a surface. `None` when there is nothing to
    /// undo.
    ///
    /// # Errors
    /// As [`apply`](Self::apply); the entry stays undoable.
    pub async fn undo(&self, surface_id: &str) -> Result<Option<ApplyResult>, EngineError> {
        let log = self.log_for(surface_id);
        let mut log = log.lock().await;
        let Some(entry) = log.pop_undo() else {
            return Ok(None);
        };
        match self.run(&entry.inverse_action, Mode::Undo).await {
            Ok(mut result) => {
                log.push_redo(CommandLogEntry {
                    action: result.inverse.clone(),
                    inverse_action: result.action.clone(),
                    patches_applied: result.patches.clone(),
                });
                result.phase = Phase::Logged;
                Ok(Some(result))
            }
            Err(error) => {
                log.push_undo(entry);
                Err(error)
            }
        }
    }

    /// Re-apply the latest undone action of a surface. `None` when there is
    /// nothing to redo.
    ///
    /// # Errors
    /// As [`apply`](Self::apply); the entry stays redoable.
    pub async fn redo(&self, surface_id: &str) -> Result<Option<ApplyResult>, EngineError> {
        let log = self.log_for(surface_id);
        let mut log = log.lock().await;
        let Some(entry) = log.pop_redo() else {
            return Ok(None);
        };
        match self.run(&entry.action, Mode::Redo).await {
            Ok(mut result) => {
                log.push_undo(CommandLogEntry {
                    action: result.action.clone(),
                    inverse_action: result.inverse.clone(),
                    patches_applied: result.patches.clone(),
                });
                result.phase = Phase::Logged;
                Ok(Some(result))
            }
            Err(error) => {
                log.push_redo(entry);
                Err(error)
            }
        }
    }

    /// Unified diff of every file `action` would change, without writing
    /// anything or touching history.
    ///
    /// # Errors
    /// As [`apply`](Self::apply) up to the point where it would write.
    pub async fn preview(&self, action: &Action) -> Result<Vec<String>, EngineError> {
        let plan = self.plan(action, Mode::Apply).await?;
        Ok(plan
            .writes
            .iter()
            .map(|w| generate_unified_diff(&w.file_path, &w.old, &w.new))
            .collect())
    }

    /// Undo/redo depth of a surface.
    pub async fn history(&self, surface_id: &str) -> HistoryDepth {
        let log = self.log_for(surface_id);
        let log = log.lock().await;
        log.depth()
    }

    /// Forget a surface: its history and its live nodes.
    pub async fn remove_surface(&self, surface_id: &str) {
        if let Some((_, log)) = self.logs.remove(surface_id) {
            log.lock().await.clear();
        }
        self.index.remove_surface(surface_id);
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    async fn run(&self, action: &Action, mode: Mode) -> Result<ApplyResult, EngineError> {
        let kind = action.kind();
        tracing::debug!(action = kind, ?mode, phase = ?Phase::Received, "Action received");
        let plan = self.plan(action, mode).await.inspect_err(|error| {
            tracing::debug!(
                action = kind,
                phase = ?Phase::Failed,
                failed_in = ?error.phase(),
                error = %error,
                "Action failed"
            );
        })?;

        self.commit(&plan.writes).await?;

        let (mut shifted, mut added, mut removed) = (0, 0, 0);
        for write in &plan.writes {
            shifted += self
                .index
                .shift_locations(&write.file_path, &write.old, &write.new, &write.patch);
            let (a, r) = diff_stats(&write.old, &write.new);
            added += a;
            removed += r;
        }
        tracing::info!(
            action = kind,
            ?mode,
            files = plan.writes.len(),
            lines_added = added,
            lines_removed = removed,
            shifted,
            phase = ?Phase::Patched,
            "Action applied"
        );
        Ok(ApplyResult {
            phase: Phase::Patched,
            action: plan.resolved,
            inverse: plan.inverse,
            patches: plan.writes.into_iter().map(|w| w.patch).collect(),
            shifted_locations: shifted,
        })
    }

    /// Write every file; on failure revert the ones already written.
    ///
    /// Each write is conditional on the file still holding the content the
    /// plan was built from.
    async fn commit(&self, writes: &[FileWrite]) -> Result<(), EngineError> {
        for (n, write) in writes.iter().enumerate() {
            let limit = self.config.writer_timeout;
            if let Err(failure) = self.write(&write.patch, &write.old, limit).await {
                tracing::warn!(
                    file = %write.file_path,
                    reason = %failure,
                    rollback = n,
                    "Writer failed; rolling back"
                );
                if matches!(failure, WriteFailure::TimedOut(_)) {
                    self.rollback(write, false).await;
                }
                for done in writes[..n].iter().rev() {
                    self.rollback(done, true).await;
                }
                return Err(EngineError::WriterFailure {
                    file_path: write.file_path.clone(),
                    reason: failure.to_string(),
                });
            }
        }
        Ok(())
    }

    async fn write(&self, patch: &FilePatch, base: &str, limit: Option<Duration>) -> Result<(), WriteFailure> {
        let pending = self
            .store
            .write_patches(&patch.file_path, base, std::slice::from_ref(patch));
        let written = match limit {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| WriteFailure::TimedOut(limit))?,
            None => pending.await,
        };
        written.map(drop).map_err(WriteFailure::Store)
    }

    /// Restore `write.old`, provided the file still holds `write.new`.
    ///
    /// `landed` is false for a write whose outcome is unknown; finding the
    /// file unchanged is then expected. Rollbacks are not bounded by the
    /// writer timeout.
    async fn rollback(&self, write: &FileWrite, landed: bool) {
        let inverse = match write.patch.invert(&write.old) {
            Ok(inverse) => inverse,
            Err(error) => {
                tracing::error!(file = %write.file_path, error = %error, "Rollback patch invalid");
                return;
            }
        };
        match self.write(&inverse, &write.new, None).await {
            Ok(()) => tracing::debug!(file = %write.file_path, "Rolled back"),
            Err(WriteFailure::Store(StoreError::Conflict { .. })) if !landed => {
                tracing::debug!(file = %write.file_path, "Timed-out write never landed");
            }
            Err(failure) => {
                tracing::error!(file = %write.file_path, reason = %failure, "Rollback failed");
            }
        }
    }

    async fn plan(&self, action: &Action, mode: Mode) -> Result<Plan, EngineError> {
        match action {
            Action::UpdateStyle { targets, style_delta } => self.plan_style(targets, style_delta).await,
            Action::InsertElement {
                target,
                location,
                element,
            } => self.plan_insert(target, location, element).await,
            Action::RemoveElement { target, location } => {
                self.plan_remove(target, location.as_ref(), mode != Mode::Apply).await
            }
            Action::MoveElement { target, location } => self.plan_move(target, location).await,
            Action::EditText {
                target,
                original_text,
                new_text,
                prior_markup,
            } => {
                self.plan_edit_text(target, original_text, new_text, prior_markup.as_deref())
                    .await
            }
            Action::CodeEdit {
                surface_id,
                file_path,
                original,
                updated,
                line_hint,
            } => {
                self.plan_code_edit(surface_id, file_path, original, updated, *line_hint)
                    .await
            }
        }
    }

    // ========================================================================
    // Resolving
    // ========================================================================

    fn resolve_target(&self, target: &Target) -> Result<SourceTarget, EngineError> {
        if let Some(token) = &target.location_token {
            let record = omni_location::decode(token)?;
            return Ok(SourceTarget::from_record(&record));
        }
        self.resolve_selector(&target.surface_id, &target.selector)
    }

    /// Live selector → location record → source locator. Locators naming a
    /// file are used as-is.
    fn resolve_selector(&self, surface_id: &str, selector: &str) -> Result<SourceTarget, EngineError> {
        let parsed: Selector = selector
            .parse()
            .map_err(|e| EngineError::InvalidAction(format!("{e}")))?;
        if let Selector::Location {
            file_path: Some(file_path),
            ..
        } = parsed
        {
            return Ok(SourceTarget {
                file_path,
                locator: selector.to_string(),
            });
        }
        let node = self
            .index
            .resolve(surface_id, selector)?
            .ok_or_else(|| EngineError::TargetNotFound(selector.to_string()))?;
        let record = node
            .location
            .ok_or_else(|| EngineError::TargetNotFound(format!("{selector} has no source location")))?;
        Ok(SourceTarget::from_record(&record))
    }

    async fn load(&self, file_path: &str) -> Result<(String, MarkupTree), EngineError> {
        let source = self.store.read_source(file_path).await?;
        let tree = MarkupTree::parse(file_path, source.clone())?;
        Ok((source, tree))
    }

    // ========================================================================
    // Mutating
    // ========================================================================

    async fn plan_style(&self, targets: &[Target], delta: &StyleDelta) -> Result<Plan, EngineError> {
        let surface_id = targets
            .first()
            .map(|t| t.surface_id.clone())
            .ok_or_else(|| EngineError::InvalidAction("style update without targets".to_string()))?;

        let mut files: Vec<(String, Vec<(usize, String)>)> = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            let found = self.resolve_target(target)?;
            match files.iter_mut().find(|(file, _)| *file == found.file_path) {
                Some((_, list)) => list.push((i, found.locator)),
                None => files.push((found.file_path, vec![(i, found.locator)])),
            }
        }

        let mut forward: Vec<(usize, String)> = Vec::new();
        let mut reverse: Vec<(usize, String, Vec<AttributeSnapshot>)> = Vec::new();
        let mut writes = Vec::new();
        for (file_path, list) in files {
            let (source, tree) = self.load(&file_path).await?;

            let mut located: Vec<(usize, String, usize)> = Vec::with_capacity(list.len());
            for (i, locator) in list {
                let id = self
                    .mutator
                    .resolve(&tree, &locator)?
                    .ok_or_else(|| EngineError::TargetNotFound(locator.clone()))?;
                let offset = tree.element(id).open_tag.start;
                if located.iter().any(|(_, _, o)| *o == offset) {
                    tracing::warn!(file = %file_path, locator = %locator, "Duplicate style target skipped");
                    continue;
                }
                located.push((i, locator, offset));
            }
            // Back to front: an edit never moves the elements before it.
            located.sort_by(|a, b| b.2.cmp(&a.2));

            let mut current = tree;
            let mut steps: Vec<(usize, usize, Vec<AttributeSnapshot>)> = Vec::new();
            for (i, locator, offset) in located {
                let mutation = self
                    .mutator
                    .apply_style_update(&current, &locator, &delta.for_target(i))?;
                let prior = match mutation.prior {
                    Prior::Attributes(prior) => prior,
                    _ => Vec::new(),
                };
                if let Some(patch) = &mutation.patch {
                    for step in &mut steps {
                        step.1 = patch
                            .map_offset(step.1, Bias::Right)
                            .ok_or_else(|| EngineError::InvalidAction("overlapping style targets".to_string()))?;
                    }
                }
                forward.push((i, locator));
                steps.push((i, offset, prior));
                current = mutation.tree;
            }
            for (i, focus, prior) in steps {
                reverse.push((i, locator_at(&current, Some(focus))?, prior));
            }
            writes.extend(FileWrite::between(&file_path, source, current.source()));
        }
        forward.sort_by_key(|(i, _)| *i);
        reverse.sort_by_key(|(i, ..)| *i);

        let forward_delta = match delta {
            StyleDelta::Merge { .. } => delta.clone(),
            StyleDelta::Restore { .. } => StyleDelta::Restore {
                attributes: forward
                    .iter()
                    .enumerate()
                    .flat_map(|(j, (i, _))| retarget(delta.for_target(*i), j))
                    .collect(),
            },
        };
        let inverse_delta = StyleDelta::Restore {
            attributes: reverse
                .iter()
                .enumerate()
                .flat_map(|(j, (_, _, prior))| {
                    prior.iter().cloned().map(move |mut snapshot| {
                        snapshot.target_index = j;
                        snapshot
                    })
                })
                .collect(),
        };

        Ok(Plan {
            resolved: Action::UpdateStyle {
                targets: forward
                    .into_iter()
                    .map(|(_, locator)| Target::new(&surface_id, locator))
                    .collect(),
                style_delta: forward_delta,
            },
            inverse: Action::UpdateStyle {
                targets: reverse
                    .into_iter()
                    .map(|(_, locator, _)| Target::new(&surface_id, locator))
                    .collect(),
                style_delta: inverse_delta,
            },
            writes,
        })
    }

    async fn plan_insert(
        &self,
        target: &Target,
        location: &InsertLocation,
        element: &ElementSpec,
    ) -> Result<Plan, EngineError> {
        let surface_id = &target.surface_id;
        let anchor = if location.anchor_selector.is_empty() {
            self.resolve_target(target)?
        } else {
            self.resolve_selector(surface_id, &location.anchor_selector)?
        };
        let (source, tree) = self.load(&anchor.file_path).await?;
        let resolved_location = InsertLocation {
            anchor_selector: anchor.locator.clone(),
            ..location.clone()
        };
        let mutation = self
            .mutator
            .apply_insert_element(&tree, &resolved_location, element)?;

        let inserted = locator_at(&mutation.tree, mutation.focus)?;
        let parent = locator_at(&mutation.tree, mutation.parent_focus)?;
        let index = mutation.index.unwrap_or_default();
        Ok(Plan {
            resolved: Action::InsertElement {
                target: Target::new(surface_id, anchor.locator),
                location: resolved_location,
                element: element.clone(),
            },
            inverse: Action::RemoveElement {
                target: Target::new(surface_id, inserted),
                location: Some(InsertLocation::inside(parent, index)),
            },
            writes: FileWrite::between(&anchor.file_path, source, mutation.tree.source())
                .into_iter()
                .collect(),
        })
    }

    async fn plan_remove(
        &self,
        target: &Target,
        location: Option<&InsertLocation>,
        allow_absent: bool,
    ) -> Result<Plan, EngineError> {
        let surface_id = &target.surface_id;
        let found = match self.resolve_target(target) {
            Ok(found) => Some(found),
            Err(EngineError::TargetNotFound(_)) if location.is_some() || allow_absent => None,
            Err(error) => return Err(error),
        };
        let parent = match location {
            Some(location) => match self.resolve_selector(surface_id, &location.anchor_selector) {
                Ok(parent) => Some(parent),
                Err(EngineError::TargetNotFound(_)) if found.is_some() || allow_absent => None,
                Err(error) => return Err(error),
            },
            None => None,
        };
        let Some(file_path) = found.as_ref().or(parent.as_ref()).map(|t| t.file_path.clone()) else {
            tracing::debug!(selector = %target.selector, "Element already absent");
            return Ok(Plan::unchanged(Action::RemoveElement {
                target: target.clone(),
                location: location.cloned(),
            }));
        };
        if let (Some(found), Some(parent)) = (&found, &parent)
            && found.file_path != parent.file_path
        {
            return Err(EngineError::InvalidAction(
                "element and its parent resolve to different files".to_string(),
            ));
        }

        let selector = found.map_or_else(|| target.selector.clone(), |f| f.locator);
        let resolved_location = location.zip(parent).map(|(location, parent)| InsertLocation {
            anchor_selector: parent.locator,
            ..location.clone()
        });
        let (source, tree) = self.load(&file_path).await?;
        let mutation =
            self.mutator
                .apply_remove_element(&tree, &selector, resolved_location.as_ref(), allow_absent)?;

        let Prior::Removed { markup, offset } = mutation.prior else {
            return Ok(Plan::unchanged(Action::RemoveElement {
                target: Target::new(surface_id, selector),
                location: resolved_location,
            }));
        };
        let parent = locator_at(&mutation.tree, mutation.parent_focus)?;
        let index = mutation.index.unwrap_or_default();
        Ok(Plan {
            resolved: Action::RemoveElement {
                target: Target::new(surface_id, selector),
                location: Some(InsertLocation::inside(parent.clone(), index)),
            },
            inverse: Action::InsertElement {
                target: Target::new(surface_id, parent.clone()),
                location: InsertLocation {
                    restore_offset: Some(offset),
                    ..InsertLocation::inside(parent, index)
                },
                element: ElementSpec::verbatim(markup),
            },
            writes: FileWrite::between(&file_path, source, mutation.tree.source())
                .into_iter()
                .collect(),
        })
    }

    async fn plan_move(&self, target: &Target, location: &MoveLocation) -> Result<Plan, EngineError> {
        let surface_id = &target.surface_id;
        let moved = self.resolve_target(target)?;
        let anchor = self.resolve_selector(surface_id, &location.anchor_selector)?;
        if anchor.file_path != moved.file_path {
            return Err(EngineError::InvalidAction(format!(
                "cannot move an element from {} into {}",
                moved.file_path, anchor.file_path
            )));
        }

        let (source, tree) = self.load(&moved.file_path).await?;
        let resolved_location = MoveLocation {
            anchor_selector: anchor.locator,
            ..location.clone()
        };
        let mutation = self
            .mutator
            .apply_move_element(&tree, &moved.locator, &resolved_location)?;
        let resolved = Action::MoveElement {
            target: Target::new(surface_id, moved.locator),
            location: resolved_location,
        };
        let Prior::Moved {
            original_parent_focus,
            original_index,
        } = mutation.prior
        else {
            return Ok(Plan::unchanged(resolved));
        };

        let inverse = Action::MoveElement {
            target: Target::new(surface_id, locator_at(&mutation.tree, mutation.focus)?),
            location: MoveLocation {
                position: InsertPosition::Inside,
                anchor_selector: locator_at(&mutation.tree, Some(original_parent_focus))?,
                index: original_index,
                original_index: mutation.index.unwrap_or_default(),
            },
        };
        Ok(Plan {
            resolved,
            inverse,
            writes: FileWrite::between(&moved.file_path, source, mutation.tree.source())
                .into_iter()
                .collect(),
        })
    }

    async fn plan_edit_text(
        &self,
        target: &Target,
        original_text: &str,
        new_text: &str,
        prior_markup: Option<&str>,
    ) -> Result<Plan, EngineError> {
        let surface_id = &target.surface_id;
        let found = self.resolve_target(target)?;
        let (source, tree) = self.load(&found.file_path).await?;
        let mutation = self
            .mutator
            .apply_edit_text(&tree, &found.locator, original_text, new_text, prior_markup)?;
        let resolved = Action::EditText {
            target: Target::new(surface_id, found.locator),
            original_text: original_text.to_string(),
            new_text: new_text.to_string(),
            prior_markup: prior_markup.map(str::to_string),
        };
        let Prior::Text { text, markup } = mutation.prior else {
            return Ok(Plan::unchanged(resolved));
        };

        let edited = mutation
            .focus
            .and_then(|focus| element_at_offset(&mutation.tree, focus))
            .ok_or_else(|| EngineError::Edit(EditError::InvalidLocation("edited element vanished".to_string())))?;
        let inverse = Action::EditText {
            target: Target::new(surface_id, mutation.tree.locator(edited)),
            original_text: mutation.tree.text_content(edited),
            new_text: text,
            prior_markup: Some(markup),
        };
        Ok(Plan {
            resolved,
            inverse,
            writes: FileWrite::between(&found.file_path, source, mutation.tree.source())
                .into_iter()
                .collect(),
        })
    }

    async fn plan_code_edit(
        &self,
        surface_id: &str,
        file_path: &str,
        original: &str,
        updated: &str,
        line_hint: Option<usize>,
    ) -> Result<Plan, EngineError> {
        let source = self.store.read_source(file_path).await?;
        let edit = replace_snippet(file_path, &source, original, updated, &self.config.edit, line_hint)?;
        if Lang::from_path(Path::new(file_path)).is_some() {
            // Fail closed on edits that break the file.
            MarkupTree::parse(file_path, edit.source.clone())?;
        }
        Ok(Plan {
            resolved: Action::CodeEdit {
                surface_id: surface_id.to_string(),
                file_path: file_path.to_string(),
                original: original.to_string(),
                updated: updated.to_string(),
                line_hint: Some(edit.line),
            },
            inverse: Action::CodeEdit {
                surface_id: surface_id.to_string(),
                file_path: file_path.to_string(),
                original: edit.inserted.clone(),
                updated: edit.replaced.clone(),
                line_hint: Some(edit.line),
            },
            writes: FileWrite::between(file_path, source, &edit.source)
                .into_iter()
                .collect(),
        })
    }
}

/// Locator of the element whose opening tag starts at `offset`.
fn locator_at(tree: &MarkupTree, offset: Option<usize>) -> Result<String, EngineError> {
    offset
        .and_then(|offset| element_at_offset(tree, offset))
        .map(|id| tree.locator(id))
        .ok_or_else(|| {
            EngineError::Edit(EditError::InvalidLocation(format!(
                "no element at the edited position in {}",
                tree.file_path()
            )))
        })
}

/// Snapshots of `delta` moved to target slot `index`.
fn retarget(delta: StyleDelta, index: usize) -> Vec<AttributeSnapshot> {
    match delta {
        StyleDelta::Restore { attributes } => attributes
            .into_iter()
            .map(|mut snapshot| {
                snapshot.target_index = index;
                snapshot
            })
            .collect(),
        StyleDelta::Merge { .. } => Vec::new(),
    }
}
