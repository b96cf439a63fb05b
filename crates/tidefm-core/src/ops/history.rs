//! Undo/redo stacks for executed operations.

use std::collections::VecDeque;

use crate::config::HistoryConfig;
use crate::ops::UndoableOperation;
use crate::outcome::Outcome;

/// Default number of operations kept on the undo stack.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Records executed operations so they can be undone and redone.
///
/// Executing a new operation clears the redo stack, the same way a browser
/// drops its forward history when a new page is visited. The undo stack is
/// bounded; once full, the oldest operation is dropped.
pub struct UndoHistory {
    undo_stack: VecDeque<Box<dyn UndoableOperation>>,
    redo_stack: Vec<Box<dyn UndoableOperation>>,
    max_depth: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl UndoHistory {
    /// Creates an empty history that keeps at most `max_depth` operations.
    /// A depth of zero is treated as one.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Creates an empty history bounded by `history.max_depth`.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(config.max_depth)
    }

    /// Invokes `op` and records it.
    ///
    /// The operation is recorded even when it reports errors: a partially
    /// applied batch still has applied entries that undo can put back.
    pub fn execute(&mut self, mut op: Box<dyn UndoableOperation>) -> Outcome {
        tracing::debug!("execute: {}", op.description());
        let outcome = op.invoke();
        self.redo_stack.clear();
        self.undo_stack.push_back(op);
        while self.undo_stack.len() > self.max_depth {
            if let Some(dropped) = self.undo_stack.pop_front() {
                tracing::trace!("history full, dropping: {}", dropped.description());
            }
        }
        outcome
    }

    /// Undoes the most recent operation. Returns `None` if there is nothing
    /// to undo.
    pub fn undo(&mut self) -> Option<Outcome> {
        let mut op = self.undo_stack.pop_back()?;
        tracing::debug!("undo: {}", op.description());
        let outcome = op.undo();
        self.redo_stack.push(op);
        Some(outcome)
    }

    /// Re-invokes the most recently undone operation. Returns `None` if there
    /// is nothing to redo.
    pub fn redo(&mut self) -> Option<Outcome> {
        let mut op = self.redo_stack.pop()?;
        tracing::debug!("redo: {}", op.description());
        let outcome = op.invoke();
        self.undo_stack.push_back(op);
        Some(outcome)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of operations that can be undone.
    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Description of the operation `undo` would revert next.
    pub fn next_undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|op| op.description())
    }

    /// Description of the operation `redo` would re-apply next.
    pub fn next_redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|op| op.description())
    }
}
