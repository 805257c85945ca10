//! # Undo/Redo History
//!
//! Keeps the undo changes returned by successful transactions.
//!
//! ## Design
//!
//! - Undo runs the stored change through a transaction and moves the change
//!   it returns onto the redo stack
//! - Redo is symmetric
//! - Pushing a new entry clears the redo stack
//! - Entries dropped from history (redo clearing, trimming, `clear`) are
//!   disposed
//! - A failed undo or redo flushes the whole history: the workspace no
//!   longer matches what the remaining entries expect
//! - An irreversible change (no undo) is refused and flushes the history
//!   for the same reason

use crate::change::Change;
use crate::composite::CompositeChange;
use crate::context::ExecutionContext;
use crate::errors::TransactionError;
use crate::transaction::ChangeExecutionTransaction;
use std::fmt;
use tracing::{debug, warn};

struct UndoEntry<W> {
    change: CompositeChange<W>,
    description: String,
}

pub struct UndoManager<W> {
    /// Most recent last
    undo_stack: Vec<UndoEntry<W>>,

    /// Most recent last
    redo_stack: Vec<UndoEntry<W>>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl<W: 'static> UndoManager<W> {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the undo of a change that was just applied.
    ///
    /// Returns `false` when the change had no undo; older entries can no
    /// longer be replayed past it, so the history is cleared.
    pub fn push(&mut self, description: impl Into<String>, undo: Option<CompositeChange<W>>) -> bool {
        let description = description.into();
        let Some(change) = undo else {
            warn!(description = %description, "Change cannot be undone, flushing history");
            self.clear();
            return false;
        };

        debug!(description = %description, "Recorded undo entry");
        self.undo_stack.push(UndoEntry { change, description });

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            let mut evicted = self.undo_stack.remove(0);
            evicted.change.dispose();
        }

        dispose_all(&mut self.redo_stack);
        true
    }

    /// Undo the most recent entry. Returns `Ok(false)` when there is nothing to undo.
    pub fn undo<C: ExecutionContext>(&mut self, workspace: &mut W, context: &mut C) -> Result<bool, TransactionError> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };

        match ChangeExecutionTransaction::new(entry.change).execute(workspace, context) {
            Ok(outcome) => {
                debug!(description = %entry.description, "Undone");
                match outcome.undo {
                    Some(change) => self.redo_stack.push(UndoEntry {
                        change,
                        description: entry.description,
                    }),
                    None => warn!(description = %entry.description, "Undo cannot be redone"),
                }
                Ok(true)
            }
            Err(err) => {
                warn!(description = %entry.description, error = %err, "Undo failed, flushing history");
                self.clear();
                Err(err)
            }
        }
    }

    /// Redo the most recently undone entry. Returns `Ok(false)` when there is nothing to redo.
    pub fn redo<C: ExecutionContext>(&mut self, workspace: &mut W, context: &mut C) -> Result<bool, TransactionError> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };

        match ChangeExecutionTransaction::new(entry.change).execute(workspace, context) {
            Ok(outcome) => {
                debug!(description = %entry.description, "Redone");
                match outcome.undo {
                    Some(change) => self.undo_stack.push(UndoEntry {
                        change,
                        description: entry.description,
                    }),
                    None => {
                        // Earlier entries sit below a change that cannot be undone
                        warn!(description = %entry.description, "Redo cannot be undone, flushing history");
                        self.clear();
                    }
                }
                Ok(true)
            }
            Err(err) => {
                warn!(description = %entry.description, error = %err, "Redo failed, flushing history");
                self.clear();
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Dispose and drop all history
    pub fn clear(&mut self) {
        dispose_all(&mut self.undo_stack);
        dispose_all(&mut self.redo_stack);
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|entry| entry.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|entry| entry.description.as_str())
    }
}

fn dispose_all<W: 'static>(entries: &mut Vec<UndoEntry<W>>) {
    for mut entry in entries.drain(..) {
        entry.change.dispose();
    }
}

impl<W: 'static> Default for UndoManager<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> fmt::Debug for UndoManager<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo_levels", &self.undo_stack.len())
            .field("redo_levels", &self.redo_stack.len())
            .field("max_levels", &self.max_levels)
            .finish()
    }
}
