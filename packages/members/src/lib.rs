//! # Hoist Members
//!
//! Decides, for every member of a type, whether it migrates to a
//! destination supertype and in what form.
//!
//! ## Pieces
//!
//! ```text
//! ActionAssignment ──membersFor/isComplete──▶ effective member sets
//!        │                                        (interface rule applied)
//!        ├──owner types──▶ SubtypeVisibilityFilter ──▶ ShowableTypes
//!        └──active members──▶ RequiredMemberClosure ──▶ suggested members
//! ```
//!
//! - Stored actions are what the user chose. Effective actions are derived
//!   on every read against the current [`DestinationType`]: a method stored
//!   as `PullUp` is effectively `DeclareAbstract` when the destination is an
//!   interface. Changing the destination back restores the original intent.
//! - Nothing here caches derived member sets; only the visibility filter
//!   caches, keyed on the assignment revision.

mod action;
mod assignment;
mod closure;
mod errors;
mod validation;
mod visibility;

pub use action::{permitted_actions, MemberAction};
pub use assignment::{ActionAssignment, DestinationType};
pub use closure::{ReferenceResolver, ReferenceTable, RequiredMemberClosure};
pub use errors::InvalidActionError;
pub use validation::check_final_conditions;
pub use visibility::{ShowableTypes, SubtypeVisibilityFilter};
