//! Error types for change application

use hoist_common::RefactoringStatus;
use std::fmt;
use thiserror::Error;

/// Failure of a single change's `perform`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeError {
    #[error("Operation canceled")]
    Canceled,

    #[error("Element is read-only: {0}")]
    ReadOnly(String),

    #[error("Element not found: {0}")]
    MissingElement(String),

    #[error("Conflicting edit: {0}")]
    Conflict(String),

    #[error("Change was already performed: {0}")]
    AlreadyPerformed(String),

    #[error("{0}")]
    Other(String),
}

/// What happened to the workspace after a failed apply
#[derive(Debug, Clone, PartialEq)]
pub enum Recovery {
    /// Nothing had been applied, so nothing was undone
    NotNeeded,

    /// Every successfully applied edit was undone; `undone` counts atomic
    /// edits, nested groups included
    RolledBack { undone: usize },

    /// An applied edit had no undo, so nothing was undone
    Unavailable,

    /// The partial undo failed validation; nothing was undone
    Aborted(RefactoringStatus),

    /// The partial undo itself failed part-way; no further rollback attempted
    Failed(ChangeError),
}

impl Recovery {
    /// True when the workspace is known to be back in its original state
    pub fn is_consistent(&self) -> bool {
        matches!(self, Recovery::NotNeeded | Recovery::RolledBack { .. })
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovery::NotNeeded => f.write_str("nothing to roll back"),
            Recovery::RolledBack { undone } => write!(f, "rolled back {} edit(s)", undone),
            Recovery::Unavailable => f.write_str("no undo available"),
            Recovery::Aborted(status) => write!(f, "rollback aborted: {}", status),
            Recovery::Failed(err) => write!(f, "rollback failed: {}", err),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransactionError {
    /// Validation found a fatal problem; nothing was performed
    #[error("Change cannot be applied: {0}")]
    Invalid(RefactoringStatus),

    /// An edit failed mid-sequence; `recovery` reports the rollback
    #[error("{change} failed: {source} ({recovery})")]
    Apply {
        change: String,
        source: ChangeError,
        recovery: Recovery,
    },
}

impl TransactionError {
    pub fn recovery(&self) -> Option<&Recovery> {
        match self {
            TransactionError::Apply { recovery, .. } => Some(recovery),
            TransactionError::Invalid(_) => None,
        }
    }
}
