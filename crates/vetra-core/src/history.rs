//! Undo/redo history over surface snapshots.
//!
//! The undo stack holds the sequence of states including the current one
//! (each mutation pushes the state it produced), so undo restores the entry
//! below the top. History is scoped to a page visit: switching pages resets
//! both stacks.

use crate::layer::Layer;
use serde::{Deserialize, Serialize};

/// Maximum number of states to keep.
const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of document state for undo/redo: the serialized surface plus
/// the layer list that was valid at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub canvas_data: Option<String>,
    pub layers: Vec<Layer>,
}

/// Undo/redo stacks of [`HistorySnapshot`]s.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<HistorySnapshot>,
    redo_stack: Vec<HistorySnapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push the state a mutation produced. Clears the redo stack and caps
    /// the undo stack at [`MAX_UNDO_HISTORY`].
    pub fn push(&mut self, snapshot: HistorySnapshot) {
        // Coalesce identical consecutive snapshots (debounced writers can
        // fire without an actual change in between).
        if self.undo_stack.last() == Some(&snapshot) {
            return;
        }
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo: move the current state onto the redo stack and return the state
    /// below it. `None` when there is no earlier state.
    pub fn undo(&mut self) -> Option<HistorySnapshot> {
        if self.undo_stack.len() < 2 {
            return None;
        }
        let current = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        self.undo_stack.last().cloned()
    }

    /// Redo: move the most recently undone state back onto the undo stack
    /// and return it. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<HistorySnapshot> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(snapshot.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop both stacks (page switch, reset).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tag: &str) -> HistorySnapshot {
        HistorySnapshot {
            canvas_data: Some(tag.to_string()),
            layers: Vec::new(),
        }
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut history = History::new();
        history.push(snap("a"));
        history.push(snap("b"));

        let restored = history.undo().unwrap();
        assert_eq!(restored.canvas_data.as_deref(), Some("a"));
        assert!(history.can_redo());

        let redone = history.redo().unwrap();
        assert_eq!(redone.canvas_data.as_deref(), Some("b"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new();
        history.push(snap("a"));
        history.push(snap("b"));
        history.undo();
        assert!(history.can_redo());

        history.push(snap("c"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_single_state_cannot_undo() {
        let mut history = History::new();
        assert!(history.undo().is_none());

        history.push(snap("a"));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_identical_snapshots_coalesce() {
        let mut history = History::new();
        history.push(snap("a"));
        history.push(snap("b"));
        history.push(snap("b"));

        assert_eq!(history.undo().unwrap().canvas_data.as_deref(), Some("a"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_history_cap() {
        let mut history = History::new();
        for i in 0..60 {
            history.push(snap(&format!("s{i}")));
        }
        let mut count = 0;
        while history.undo().is_some() {
            count += 1;
        }
        assert_eq!(count, 49);
    }
}
