//! Error types for member action assignment

use crate::action::MemberAction;
use hoist_hierarchy::{MemberId, MemberKind};
use thiserror::Error;

/// Precondition violation: the caller asked for an action the member's
/// kind does not admit, or named a member outside the assignment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidActionError {
    #[error("\"{action}\" is not permitted for {kind} {member}")]
    NotPermitted {
        member: String,
        kind: MemberKind,
        action: MemberAction,
    },

    #[error("Member {0} is not part of the assignment")]
    UnknownMember(MemberId),
}
