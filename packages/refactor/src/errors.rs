//! Error types for the pull-up refactoring

use hoist_changes::{RefactoringStatus, TransactionError};
use hoist_hierarchy::{HierarchyError, TypeId};
use hoist_members::InvalidActionError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefactorError {
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Invalid member action: {0}")]
    InvalidAction(#[from] InvalidActionError),

    #[error("Unknown type: {0}")]
    UnknownType(TypeId),

    #[error("{declaring_type} has no supertype to pull members into")]
    NoDestination { declaring_type: String },

    #[error("{destination} is not a supertype of {declaring_type}")]
    NotACandidate {
        declaring_type: String,
        destination: String,
    },

    /// Final conditions found errors; no change was built
    #[error("Refactoring cannot proceed: {0}")]
    Incomplete(RefactoringStatus),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
