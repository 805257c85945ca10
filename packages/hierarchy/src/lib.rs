//! # Hoist Hierarchy
//!
//! Read-only model of a type hierarchy: classes with a single superclass
//! chain, interfaces with multiple super-interfaces, and the members each
//! type declares.
//!
//! ```text
//!            Object            (universal root)
//!           /      \
//!       Shape     «Drawable»
//!        /   \    /
//!   Square   Circle
//! ```
//!
//! The hierarchy is an arena: types and members are addressed by
//! [`TypeId`] / [`MemberId`] indices, which keeps traversals cheap and
//! makes memoization by identity trivial. Engines consume it through the
//! [`HierarchyProvider`] trait and never mutate it.

mod builder;
mod errors;
mod hierarchy;
mod provider;
mod types;

pub use builder::HierarchyBuilder;
pub use errors::HierarchyError;
pub use hierarchy::TypeHierarchy;
pub use provider::HierarchyProvider;
pub use types::{Member, MemberId, MemberKind, TypeDecl, TypeId};

/// Name given to the universal root when none is specified
pub const DEFAULT_ROOT_NAME: &str = "Object";
