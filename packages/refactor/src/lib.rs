//! # Hoist Refactor
//!
//! The pull-up refactoring over an in-memory workspace.
//!
//! ## Flow
//!
//! ```text
//! TypeHierarchy ──▶ PullUpRefactoring ──create_change──▶ CompositeChange<Workspace>
//!                     │  destination                        │ MemberEdit children
//!                     │  member actions                     ▼
//!                     │  required members         ChangeExecutionTransaction
//!                     └─ final conditions                   │
//!                                                           ▼
//!                                             Workspace (edited or rolled back)
//! ```

mod edits;
mod errors;
mod refactoring;
mod workspace;

pub use edits::MemberEdit;
pub use errors::RefactorError;
pub use refactoring::{candidate_destinations, PullUpRefactoring};
pub use workspace::{Declaration, TypeBody, Workspace};
