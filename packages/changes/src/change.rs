use crate::errors::ChangeError;
use crate::progress::ProgressMonitor;
use hoist_common::RefactoringStatus;
use std::fmt;

/// Lifecycle of a change inside a composite.
///
/// `Unperformed → Performed → Disposed`, or `Unperformed → Failed → Disposed`.
/// Changes that never ran go straight to `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    Unperformed,
    Performed,
    Failed,
    Disposed,
}

/// What a failed `perform` left applied
pub enum PartialUndo<W> {
    /// Nothing was applied
    Nothing,

    /// Reverts the part that was applied
    Undo(Box<dyn Change<W>>),

    /// Some of the change was applied and cannot be reverted
    Unavailable,
}

impl<W> fmt::Debug for PartialUndo<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialUndo::Nothing => f.write_str("Nothing"),
            PartialUndo::Undo(undo) => f.debug_tuple("Undo").field(undo).finish(),
            PartialUndo::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// One edit against a workspace `W`.
///
/// Each change implements:
/// - Validation against the current workspace
/// - Apply logic that returns the change undoing it
/// - Resource release
pub trait Change<W>: fmt::Debug {
    /// Human-readable name
    fn name(&self) -> String;

    /// Label of the element this change modifies, if it modifies one
    fn modified_element(&self) -> Option<String> {
        None
    }

    /// Check that the change can still be applied to `workspace`
    fn is_valid(&self, workspace: &W, monitor: &mut dyn ProgressMonitor) -> RefactoringStatus;

    /// Apply the change. Returns the change that undoes it, if undo is possible.
    fn perform(
        &mut self,
        workspace: &mut W,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<W>>>, ChangeError>;

    /// Release resources. Called exactly once, whether or not the change ran.
    fn dispose(&mut self) {}

    /// Number of atomic edits this change stands for
    fn edit_count(&self) -> usize {
        1
    }

    /// After a failed `perform`, the undo of whatever part of this change
    /// did apply. Only composites apply anything before failing.
    fn take_partial_undo(&mut self) -> PartialUndo<W> {
        PartialUndo::Nothing
    }
}
