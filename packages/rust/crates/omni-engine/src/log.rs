//! Per-surface undo/redo history.

use std::collections::VecDeque;

use omni_types::FilePatch;

use crate::action::Action;

/// One applied action and how to revert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLogEntry {
    /// Action as applied, with targets resolved to source locators.
    pub action: Action,
    /// Action reverting it, against the post-apply source.
    pub inverse_action: Action,
    /// Patches that were written.
    pub patches_applied: Vec<FilePatch>,
}

/// Depth of both stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryDepth {
    /// Entries that can be undone.
    pub undo: usize,
    /// Entries that can be redone.
    pub redo: usize,
}

/// Bounded undo/redo stacks. O(1) push, drops the oldest entry when over
/// capacity.
#[derive(Debug)]
pub struct CommandLog {
    undo: VecDeque<CommandLogEntry>,
    redo: Vec<CommandLogEntry>,
    limit: usize,
}

impl CommandLog {
    /// Log keeping at most `limit` undoable entries; 0 disables history.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit.min(256)),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record a newly applied action. Clears the redo stack.
    pub fn record(&mut self, entry: CommandLogEntry) {
        self.redo.clear();
        self.push_undo(entry);
    }

    /// Push onto the undo stack, keeping redo intact.
    pub fn push_undo(&mut self, entry: CommandLogEntry) {
        if self.limit == 0 {
            return;
        }
        self.undo.push_back(entry);
        while self.undo.len() > self.limit {
            if self.undo.pop_front().is_none() {
                break;
            }
        }
    }

    /// Most recent undoable entry.
    pub fn pop_undo(&mut self) -> Option<CommandLogEntry> {
        self.undo.pop_back()
    }

    /// Push onto the redo stack.
    pub fn push_redo(&mut self, entry: CommandLogEntry) {
        if self.limit > 0 {
            self.redo.push(entry);
        }
    }

    /// Most recent redoable entry.
    pub fn pop_redo(&mut self) -> Option<CommandLogEntry> {
        self.redo.pop()
    }

    /// Stack depths.
    #[must_use]
    pub fn depth(&self) -> HistoryDepth {
        HistoryDepth {
            undo: self.undo.len(),
            redo: self.redo.len(),
        }
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> CommandLogEntry {
        let action = Action::CodeEdit {
            surface_id: "s".to_string(),
            file_path: "a.tsx".to_string(),
            original: n.to_string(),
            updated: String::new(),
            line_hint: None,
        };
        CommandLogEntry {
            action: action.clone(),
            inverse_action: action,
            patches_applied: Vec::new(),
        }
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let mut log = CommandLog::new(2);
        for n in 0..3 {
            log.record(entry(n));
        }
        assert_eq!(log.depth(), HistoryDepth { undo: 2, redo: 0 });
        assert_eq!(log.pop_undo(), Some(entry(2)));
        assert_eq!(log.pop_undo(), Some(entry(1)));
        assert_eq!(log.pop_undo(), None);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut log = CommandLog::new(10);
        log.record(entry(0));
        let undone = log.pop_undo().expect("entry");
        log.push_redo(undone);
        assert_eq!(log.depth().redo, 1);

        log.push_undo(entry(1));
        assert_eq!(log.depth().redo, 1);
        log.record(entry(2));
        assert_eq!(log.depth(), HistoryDepth { undo: 2, redo: 0 });
    }

    #[test]
    fn test_zero_limit_disables_history() {
        let mut log = CommandLog::new(0);
        log.record(entry(0));
        assert_eq!(log.depth(), HistoryDepth::default());
    }
}
