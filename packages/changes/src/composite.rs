//! # Composite changes
//!
//! An ordered group of changes applied as a unit.
//!
//! ## Semantics
//!
//! - Children are performed strictly in order; later edits may depend on
//!   state written by earlier ones.
//! - The first failure stops the sequence. Later children never run.
//! - The undo of a sequence `A; B; C` is `C⁻¹; B⁻¹; A⁻¹`. After a failure,
//!   the undo-until-exception holds exactly the undos of the children that
//!   completed, in that reverse order.
//! - The failed child and the children that never ran are disposed right
//!   away; they contribute nothing to the undo.
//! - A performed child that returns no undo makes the whole sequence
//!   irreversible: reverting the others would act on state they do not
//!   expect. The undo is then `None`, and the undos already collected are
//!   disposed.

use crate::change::{Change, ChangeState, PartialUndo};
use crate::errors::ChangeError;
use crate::progress::{ProgressMonitor, SubProgressMonitor};
use hoist_common::RefactoringStatus;
use std::fmt;
use tracing::{debug, warn};

struct Slot<W> {
    change: Box<dyn Change<W>>,
    state: ChangeState,
}

/// Result of [`CompositeChange::execute`]
pub enum PerformOutcome<W> {
    /// Every child was performed; `undo` reverts all of them, unless one
    /// of them could not be undone
    Completed { undo: Option<CompositeChange<W>> },

    /// Child `index` failed; `undo_until_exception` reverts the children
    /// before it, unless one of them could not be undone
    Failed {
        index: usize,
        failed: String,
        error: ChangeError,
        undo_until_exception: Option<CompositeChange<W>>,
    },
}

impl<W> fmt::Debug for PerformOutcome<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformOutcome::Completed { undo } => f.debug_struct("Completed").field("undo", undo).finish(),
            PerformOutcome::Failed {
                index,
                failed,
                error,
                undo_until_exception,
            } => f
                .debug_struct("Failed")
                .field("index", index)
                .field("failed", failed)
                .field("error", error)
                .field("undo_until_exception", undo_until_exception)
                .finish(),
        }
    }
}

/// Ordered, exclusively owned sequence of changes
pub struct CompositeChange<W> {
    name: String,
    children: Vec<Slot<W>>,

    /// Set when a `perform` through the `Change` trait failed
    undo_until_exception: Option<PartialUndo<W>>,
}

impl<W: 'static> CompositeChange<W> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            undo_until_exception: None,
        }
    }

    /// Build the undo of a performed prefix: `completed` holds undos in
    /// application order and is reversed here. Without `reversible`, the
    /// collected undos are disposed and there is no undo.
    fn undo_of(name: &str, completed: Vec<Box<dyn Change<W>>>, reversible: bool) -> Option<Self> {
        if !reversible {
            for mut change in completed {
                change.dispose();
            }
            return None;
        }

        let mut undo = Self::new(name);
        for change in completed.into_iter().rev() {
            undo.add(change);
        }
        Some(undo)
    }

    pub fn add(&mut self, change: Box<dyn Change<W>>) {
        self.children.push(Slot {
            change,
            state: ChangeState::Unperformed,
        });
    }

    pub fn with(mut self, change: Box<dyn Change<W>>) -> Self {
        self.add(change);
        self
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn state(&self, index: usize) -> Option<ChangeState> {
        self.children.get(index).map(|s| s.state)
    }

    pub fn child(&self, index: usize) -> Option<&dyn Change<W>> {
        self.children.get(index).map(|s| s.change.as_ref())
    }

    /// Names of the children, in order
    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|s| s.change.name()).collect()
    }

    /// Perform every child in order, stopping at the first failure.
    ///
    /// Cancellation is polled before each child and reported as
    /// [`ChangeError::Canceled`] with the same partial undo as a failure.
    pub fn execute(&mut self, workspace: &mut W, monitor: &mut dyn ProgressMonitor) -> PerformOutcome<W> {
        if self.children.iter().any(|s| s.state != ChangeState::Unperformed) {
            return PerformOutcome::Failed {
                index: 0,
                failed: self.name.clone(),
                error: ChangeError::AlreadyPerformed(self.name.clone()),
                undo_until_exception: Some(Self::new(self.name.clone())),
            };
        }

        monitor.begin_task(&self.name, self.children.len() as u32);
        let mut completed: Vec<Box<dyn Change<W>>> = Vec::with_capacity(self.children.len());
        let mut reversible = true;

        for index in 0..self.children.len() {
            let slot = &mut self.children[index];

            let error = if monitor.is_canceled() {
                ChangeError::Canceled
            } else {
                let mut sub = SubProgressMonitor::new(&mut *monitor, 1);
                match slot.change.perform(workspace, &mut sub) {
                    Ok(undo) => {
                        sub.done();
                        slot.state = ChangeState::Performed;
                        match undo {
                            Some(undo) => completed.push(undo),
                            None => {
                                warn!(change = %slot.change.name(), composite = %self.name, "Performed change has no undo, sequence is irreversible");
                                reversible = false;
                            }
                        }
                        debug!(composite = %self.name, index, "Performed child change");
                        continue;
                    }
                    Err(error) => {
                        slot.state = ChangeState::Failed;
                        // A failing composite child rolls back its own applied part first
                        match slot.change.take_partial_undo() {
                            PartialUndo::Nothing => {}
                            PartialUndo::Undo(partial) => completed.push(partial),
                            PartialUndo::Unavailable => reversible = false,
                        }
                        error
                    }
                }
            };

            let failed = slot.change.name();
            warn!(composite = %self.name, index, failed = %failed, error = %error, "Change sequence stopped");
            self.dispose_from(index);
            monitor.done();

            return PerformOutcome::Failed {
                index,
                failed,
                error,
                undo_until_exception: Self::undo_of(&self.name, completed, reversible),
            };
        }

        monitor.done();
        PerformOutcome::Completed {
            undo: Self::undo_of(&self.name, completed, reversible),
        }
    }

    /// Undo left behind by a failed `Change::perform`
    pub fn take_undo_until_exception(&mut self) -> Option<PartialUndo<W>> {
        self.undo_until_exception.take()
    }

    fn dispose_from(&mut self, index: usize) {
        for slot in &mut self.children[index..] {
            if slot.state != ChangeState::Disposed {
                slot.change.dispose();
                slot.state = ChangeState::Disposed;
            }
        }
    }
}

impl<W: 'static> Change<W> for CompositeChange<W> {
    fn name(&self) -> String {
        self.name.clone()
    }

    /// Validates children in order, stopping at the first fatal finding
    fn is_valid(&self, workspace: &W, monitor: &mut dyn ProgressMonitor) -> RefactoringStatus {
        monitor.begin_task(&self.name, self.children.len() as u32);
        let mut status = RefactoringStatus::new();

        for slot in &self.children {
            if slot.state == ChangeState::Disposed {
                continue;
            }
            let mut sub = SubProgressMonitor::new(&mut *monitor, 1);
            status.merge(slot.change.is_valid(workspace, &mut sub));
            sub.done();
            if status.has_fatal_error() {
                break;
            }
        }

        monitor.done();
        status
    }

    fn perform(
        &mut self,
        workspace: &mut W,
        monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<W>>>, ChangeError> {
        match self.execute(workspace, monitor) {
            PerformOutcome::Completed { undo } => Ok(undo.map(|undo| Box::new(undo) as Box<dyn Change<W>>)),
            PerformOutcome::Failed {
                error,
                undo_until_exception,
                ..
            } => {
                self.undo_until_exception = Some(match undo_until_exception {
                    Some(undo) if undo.is_empty() => PartialUndo::Nothing,
                    Some(undo) => PartialUndo::Undo(Box::new(undo)),
                    None => PartialUndo::Unavailable,
                });
                Err(error)
            }
        }
    }

    fn dispose(&mut self) {
        self.dispose_from(0);
        if let Some(PartialUndo::Undo(mut undo)) = self.undo_until_exception.take() {
            undo.dispose();
        }
    }

    fn edit_count(&self) -> usize {
        self.children.iter().map(|s| s.change.edit_count()).sum()
    }

    fn take_partial_undo(&mut self) -> PartialUndo<W> {
        self.undo_until_exception.take().unwrap_or(PartialUndo::Nothing)
    }
}

impl<W> fmt::Debug for CompositeChange<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeChange")
            .field("name", &self.name)
            .field(
                "children",
                &self.children.iter().map(|s| (&s.change, s.state)).collect::<Vec<_>>(),
            )
            .finish()
    }
}
