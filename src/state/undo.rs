//! Undo/Redo System
//!
//! Snapshot-based undo/redo over the live editor state. Each entry holds a
//! complete copy of the state, so restoring is a full replace.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::EditorState;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// A single snapshot on either stack.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub id: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub state: EditorState,
}

impl UndoEntry {
    pub fn new(description: impl Into<String>, state: EditorState) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            timestamp: Utc::now(),
            state,
        }
    }
}

/// Two bounded stacks of editor-state snapshots.
///
/// - `record` pushes the state being replaced and clears the redo stack,
///   since history has diverged
/// - `undo`/`redo` swap the caller's current state with the top of the
///   opposite stack
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<UndoEntry>,
    redo_stack: Vec<UndoEntry>,
    max_undo_levels: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl UndoManager {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: max_levels,
        }
    }

    /// Record the state that an edit is about to replace.
    pub fn record(&mut self, description: impl Into<String>, previous: EditorState) {
        self.redo_stack.clear();
        self.undo_stack.push(UndoEntry::new(description, previous));
        Self::trim(&mut self.undo_stack, self.max_undo_levels);
    }

    /// Step back. `current` moves to the redo stack; the restored state is
    /// returned. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: EditorState) -> Option<EditorState> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(UndoEntry::new(entry.description.clone(), current));
        Self::trim(&mut self.redo_stack, self.max_undo_levels);
        Some(entry.state)
    }

    /// Step forward again. Mirror of [`UndoManager::undo`].
    pub fn redo(&mut self, current: EditorState) -> Option<EditorState> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(UndoEntry::new(entry.description.clone(), current));
        Self::trim(&mut self.undo_stack, self.max_undo_levels);
        Some(entry.state)
    }

    /// Oldest entries go first.
    fn trim(stack: &mut Vec<UndoEntry>, max: usize) {
        if stack.len() > max {
            let excess = stack.len() - max;
            stack.drain(..excess);
        }
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Lowering the limit trims both stacks.
    pub fn set_max_undo_levels(&mut self, max_levels: usize) {
        self.max_undo_levels = max_levels;
        Self::trim(&mut self.undo_stack, max_levels);
        Self::trim(&mut self.redo_stack, max_levels);
    }

    pub fn peek_undo(&self) -> Option<&UndoEntry> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoEntry> {
        self.redo_stack.last()
    }

    /// Drop all history. Called when a different portfolio is loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Descriptions on the undo stack, most recent first.
    pub fn undo_stack_summary(&self) -> Vec<(String, String)> {
        self.undo_stack
            .iter()
            .rev()
            .map(|e| (e.id.clone(), e.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str) -> EditorState {
        EditorState {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_undo_manager() {
        let manager = UndoManager::new(10);
        assert_eq!(manager.max_undo_levels(), 10);
        assert_eq!(manager.undo_count(), 0);
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_undo_then_redo_restores_exact_state() {
        let mut manager = UndoManager::default();
        manager.record("rename", state("a"));
        let current = state("b");

        let undone = manager.undo(current.clone()).unwrap();
        assert_eq!(undone, state("a"));
        let redone = manager.redo(undone).unwrap();
        assert_eq!(redone, current);
        assert_eq!(manager.undo_count(), 1);
        assert_eq!(manager.redo_count(), 0);
    }

    #[test]
    fn test_record_clears_redo_stack() {
        let mut manager = UndoManager::default();
        manager.record("one", state("a"));
        manager.undo(state("b")).unwrap();
        assert!(manager.can_redo());

        manager.record("two", state("a"));
        assert!(!manager.can_redo());
        assert!(manager.redo(state("c")).is_none());
    }

    #[test]
    fn test_empty_stacks_return_none() {
        let mut manager = UndoManager::default();
        assert!(manager.undo(state("x")).is_none());
        assert!(manager.redo(state("x")).is_none());
    }

    #[test]
    fn test_trim_drops_oldest() {
        let mut manager = UndoManager::new(3);
        for i in 0..5 {
            manager.record(format!("edit {}", i), state(&i.to_string()));
        }
        assert_eq!(manager.undo_count(), 3);

        let summary = manager.undo_stack_summary();
        assert_eq!(summary[0].1, "edit 4");
        assert_eq!(summary[2].1, "edit 2");
    }

    #[test]
    fn test_set_max_undo_levels() {
        let mut manager = UndoManager::new(10);
        for i in 0..5 {
            manager.record("edit", state(&i.to_string()));
        }
        manager.set_max_undo_levels(2);
        assert_eq!(manager.undo_count(), 2);
        assert_eq!(manager.peek_undo().unwrap().state, state("4"));
    }

    #[test]
    fn test_clear() {
        let mut manager = UndoManager::default();
        manager.record("a", state("a"));
        manager.record("b", state("b"));
        manager.undo(state("c"));
        manager.clear();
        assert_eq!(manager.undo_count(), 0);
        assert_eq!(manager.redo_count(), 0);
        assert!(manager.peek_redo().is_none());
    }
}
