//! # Hoist Changes
//!
//! Transactional application of workspace edits.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Change: one atomic edit, returns its undo   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ CompositeChange: ordered children           │
//! │  - strictly sequential perform              │
//! │  - stops at the first failure               │
//! │  - undo-until-exception in reverse order    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ ChangeExecutionTransaction                  │
//! │  - validate, perform (cancellable)          │
//! │  - on failure: replay partial undo under a  │
//! │    non-cancellable monitor                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ UndoManager: undo/redo history              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hoist_changes::{BlockingContext, ChangeExecutionTransaction, CompositeChange, NullProgressMonitor};
//!
//! let mut change = CompositeChange::new("Pull up");
//! change.add(Box::new(first_edit));
//! change.add(Box::new(second_edit));
//!
//! let mut context = BlockingContext::new(NullProgressMonitor::new());
//! match ChangeExecutionTransaction::new(change).execute(&mut workspace, &mut context) {
//!     Ok(outcome) => {
//!         // Refused (and history flushed) when an edit had no undo
//!         undo_manager.push("Pull up", outcome.undo);
//!     }
//!     Err(err) => eprintln!("{}", err), // workspace already rolled back
//! }
//! ```
//!
//! Only one transaction may run against a workspace at a time; nothing in
//! this crate locks the workspace.

mod change;
mod composite;
mod context;
mod errors;
mod progress;
#[cfg(test)]
mod test_support;
mod transaction;
mod undo;

pub use change::{Change, ChangeState, PartialUndo};
pub use composite::{CompositeChange, PerformOutcome};
pub use context::{BlockingContext, ExecutionContext};
pub use errors::{ChangeError, Recovery, TransactionError};
pub use progress::{
    CancellationToken, LoggingProgressMonitor, NotCancelableProgressMonitor, NullProgressMonitor,
    ProgressMonitor, SubProgressMonitor,
};
pub use transaction::{
    ChangeExecutionTransaction, TransactionOutcome, FORWARD_PERFORM_UNITS, FORWARD_VALIDATE_UNITS,
    RECOVERY_CHECK_UNITS, RECOVERY_PERFORM_UNITS, RECOVERY_TOTAL_UNITS, RECOVERY_VALIDATE_UNITS,
};
pub use undo::UndoManager;

// Re-export for implementors of `Change::is_valid`
pub use hoist_common::{RefactoringStatus, Severity};
