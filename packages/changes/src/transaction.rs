//! # Change execution transaction
//!
//! Drives apply and recovery for one composite change.
//!
//! ## Forward pass (cancellable)
//!
//! ```text
//! validate (1 unit) ── fatal? ──> TransactionError::Invalid, nothing performed
//!     │
//! perform  (9 units) ── ok ─────> TransactionOutcome { undo }
//!     │
//!   failed
//!     ↓
//! recovery pass (not cancellable, 11 units; skipped with
//! Recovery::Unavailable when an applied edit had no undo)
//!   validate undo         1
//!   check fatal findings  1 ── fatal? ──> Recovery::Aborted, nothing undone
//!   perform undo          9
//! ```
//!
//! The split of the recovery budget does not track the number or cost of
//! the undone edits. Its only purpose is to run the rollback under a
//! monitor that cannot be canceled.

use crate::change::Change;
use crate::composite::{CompositeChange, PerformOutcome};
use crate::context::ExecutionContext;
use crate::errors::{Recovery, TransactionError};
use crate::progress::{ProgressMonitor, SubProgressMonitor};
use hoist_common::RefactoringStatus;
use std::fmt;
use tracing::{debug, error, info, warn};

pub const FORWARD_VALIDATE_UNITS: u32 = 1;
pub const FORWARD_PERFORM_UNITS: u32 = 9;

pub const RECOVERY_VALIDATE_UNITS: u32 = 1;
pub const RECOVERY_CHECK_UNITS: u32 = 1;
pub const RECOVERY_PERFORM_UNITS: u32 = 9;
pub const RECOVERY_TOTAL_UNITS: u32 = RECOVERY_VALIDATE_UNITS + RECOVERY_CHECK_UNITS + RECOVERY_PERFORM_UNITS;

/// A successfully applied change
pub struct TransactionOutcome<W> {
    /// Reverts everything the transaction applied; `None` when an edit
    /// could not be undone
    pub undo: Option<CompositeChange<W>>,

    /// Non-fatal findings from validation
    pub status: RefactoringStatus,
}

impl<W> fmt::Debug for TransactionOutcome<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionOutcome")
            .field("undo", &self.undo)
            .field("status", &self.status)
            .finish()
    }
}

/// Applies a composite change as a unit, rolling back the applied prefix
/// when it fails part-way.
///
/// The change is consumed and disposed whatever the result.
pub struct ChangeExecutionTransaction<W> {
    change: CompositeChange<W>,
}

impl<W: 'static> ChangeExecutionTransaction<W> {
    pub fn new(change: CompositeChange<W>) -> Self {
        Self { change }
    }

    pub fn execute<C: ExecutionContext>(
        self,
        workspace: &mut W,
        context: &mut C,
    ) -> Result<TransactionOutcome<W>, TransactionError> {
        let mut change = self.change;
        let name = change.name();
        info!(change = %name, edits = change.len(), "Applying change");

        let forward = context.run(true, |monitor| {
            monitor.begin_task(&name, FORWARD_VALIDATE_UNITS + FORWARD_PERFORM_UNITS);

            let status = {
                let mut sub = SubProgressMonitor::new(&mut *monitor, FORWARD_VALIDATE_UNITS);
                let status = change.is_valid(workspace, &mut sub);
                sub.done();
                status
            };
            if status.has_fatal_error() {
                monitor.done();
                return Err(status);
            }

            let outcome = {
                let mut sub = SubProgressMonitor::new(&mut *monitor, FORWARD_PERFORM_UNITS);
                let outcome = change.execute(workspace, &mut sub);
                sub.done();
                outcome
            };
            monitor.done();
            Ok((status, outcome))
        });

        let result = match forward {
            Err(status) => {
                warn!(change = %name, status = %status, "Change rejected by validation");
                Err(TransactionError::Invalid(status))
            }
            Ok((status, PerformOutcome::Completed { undo })) => {
                info!(change = %name, "Change applied");
                Ok(TransactionOutcome { undo, status })
            }
            Ok((
                _,
                PerformOutcome::Failed {
                    index,
                    failed,
                    error: source,
                    undo_until_exception,
                },
            )) => {
                error!(change = %name, failed = %failed, index, error = %source, "Change failed, rolling back");
                let recovery = match undo_until_exception {
                    Some(undo) => recover(undo, workspace, context),
                    None => {
                        warn!(change = %name, "Applied edits cannot be undone, workspace left partially modified");
                        Recovery::Unavailable
                    }
                };
                Err(TransactionError::Apply {
                    change: failed,
                    source,
                    recovery,
                })
            }
        };

        change.dispose();
        result
    }
}

/// Replay the undo-until-exception without cancellation, then dispose it
fn recover<W: 'static, C: ExecutionContext>(
    mut undo: CompositeChange<W>,
    workspace: &mut W,
    context: &mut C,
) -> Recovery {
    let undone = undo.edit_count();
    if undone == 0 {
        debug!("Nothing applied before the failure");
        undo.dispose();
        return Recovery::NotNeeded;
    }

    let name = undo.name();

    let recovery = context.run(false, |monitor| {
        monitor.begin_task(&name, RECOVERY_TOTAL_UNITS);

        let status = {
            let mut sub = SubProgressMonitor::new(&mut *monitor, RECOVERY_VALIDATE_UNITS);
            let status = undo.is_valid(workspace, &mut sub);
            sub.done();
            status
        };

        let fatal = {
            let mut sub = SubProgressMonitor::new(&mut *monitor, RECOVERY_CHECK_UNITS);
            sub.begin_task("Checking rollback preconditions", 1);
            let fatal = status.has_fatal_error();
            sub.worked(1);
            sub.done();
            fatal
        };
        if fatal {
            monitor.done();
            return Recovery::Aborted(status);
        }

        let outcome = {
            let mut sub = SubProgressMonitor::new(&mut *monitor, RECOVERY_PERFORM_UNITS);
            let outcome = undo.execute(workspace, &mut sub);
            sub.done();
            outcome
        };
        monitor.done();

        match outcome {
            PerformOutcome::Completed { undo: redo } => {
                if let Some(mut redo) = redo {
                    redo.dispose();
                }
                Recovery::RolledBack { undone }
            }
            PerformOutcome::Failed {
                failed,
                error,
                undo_until_exception,
                ..
            } => {
                // Never undo the undo
                error!(failed = %failed, error = %error, "Rollback failed");
                if let Some(mut partial) = undo_until_exception {
                    partial.dispose();
                }
                Recovery::Failed(error)
            }
        }
    });

    undo.dispose();

    match &recovery {
        Recovery::RolledBack { undone } => info!(undone, "Rolled back applied edits"),
        Recovery::Aborted(status) => warn!(status = %status, "Rollback aborted, workspace left partially modified"),
        _ => {}
    }
    recovery
}
