use crate::action::MemberAction;
use crate::errors::InvalidActionError;
use hoist_hierarchy::{HierarchyProvider, Member, MemberId, TypeId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// The type members are migrated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationType {
    pub id: TypeId,
    pub is_interface: bool,
}

impl DestinationType {
    pub fn new(id: TypeId, is_interface: bool) -> Self {
        Self { id, is_interface }
    }

    /// Look up the interface flag in the hierarchy
    pub fn of<P: HierarchyProvider + ?Sized>(provider: &P, id: TypeId) -> Self {
        Self::new(id, provider.is_interface(id))
    }
}

#[derive(Debug, Clone)]
struct Entry {
    member: Member,
    action: MemberAction,
}

/// Stored action per pullable member.
///
/// Always total over the members it was created with: every member starts
/// at `NoAction`. Reads never mutate; derived views are recomputed from the
/// stored actions on each call.
#[derive(Debug, Clone, Default)]
pub struct ActionAssignment {
    entries: IndexMap<MemberId, Entry>,

    /// Bumped whenever a stored action actually changes
    revision: u64,
}

impl ActionAssignment {
    pub fn new(members: impl IntoIterator<Item = Member>) -> Self {
        let entries = members
            .into_iter()
            .map(|member| {
                (
                    member.id,
                    Entry {
                        member,
                        action: MemberAction::NoAction,
                    },
                )
            })
            .collect();

        Self {
            entries,
            revision: 0,
        }
    }

    /// Assignment over every member declared by `ty`
    pub fn for_type<P: HierarchyProvider + ?Sized>(provider: &P, ty: TypeId) -> Self {
        Self::new(provider.members_of(ty).into_iter().cloned())
    }

    /// Record `action` for `member`.
    ///
    /// Fails if the member is unknown or its kind does not admit the action.
    pub fn set_action(&mut self, member: MemberId, action: MemberAction) -> Result<(), InvalidActionError> {
        let entry = self
            .entries
            .get_mut(&member)
            .ok_or(InvalidActionError::UnknownMember(member))?;

        if !action.is_permitted_for(&entry.member) {
            return Err(InvalidActionError::NotPermitted {
                member: entry.member.label(),
                kind: entry.member.kind,
                action,
            });
        }

        if entry.action != action {
            debug!(member = %entry.member.label(), from = ?entry.action, to = ?action, "Set member action");
            entry.action = action;
            self.revision += 1;
        }

        Ok(())
    }

    /// Stored action, as chosen by the user
    pub fn action(&self, member: MemberId) -> Option<MemberAction> {
        self.entries.get(&member).map(|e| e.action)
    }

    /// Action after applying the interface-destination rule
    pub fn effective_action(&self, member: MemberId, destination: &DestinationType) -> Option<MemberAction> {
        self.entries
            .get(&member)
            .map(|e| effective(&e.member, e.action, destination))
    }

    /// Members whose effective action equals `action`, in assignment order
    pub fn members_for(&self, action: MemberAction, destination: &DestinationType) -> Vec<&Member> {
        self.entries
            .values()
            .filter(|e| effective(&e.member, e.action, destination) == action)
            .map(|e| &e.member)
            .collect()
    }

    /// True if at least one member is effectively moved or declared abstract
    pub fn is_complete(&self, destination: &DestinationType) -> bool {
        self.entries
            .values()
            .any(|e| effective(&e.member, e.action, destination).is_active())
    }

    /// Declaring types of all members with an active action
    pub fn owner_types(&self) -> BTreeSet<TypeId> {
        self.entries
            .values()
            .filter(|e| e.action.is_active())
            .map(|e| e.member.declaring_type)
            .collect()
    }

    /// Members with an active stored action, in assignment order
    pub fn active_members(&self) -> impl Iterator<Item = &Member> {
        self.entries
            .values()
            .filter(|e| e.action.is_active())
            .map(|e| &e.member)
    }

    /// Mark each suggested member that is still `NoAction` as `PullUp`.
    ///
    /// Returns how many members changed.
    pub fn accept_required(&mut self, members: &[MemberId]) -> Result<usize, InvalidActionError> {
        let mut accepted = 0;
        for id in members {
            if self.action(*id) == Some(MemberAction::NoAction) {
                self.set_action(*id, MemberAction::PullUp)?;
                accepted += 1;
            } else if !self.contains(*id) {
                return Err(InvalidActionError::UnknownMember(*id));
            }
        }
        Ok(accepted)
    }

    pub fn member(&self, id: MemberId) -> Option<&Member> {
        self.entries.get(&id).map(|e| &e.member)
    }

    pub fn contains(&self, id: MemberId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Members paired with their stored action, in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&Member, MemberAction)> {
        self.entries.values().map(|e| (&e.member, e.action))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn effective(member: &Member, stored: MemberAction, destination: &DestinationType) -> MemberAction {
    // Interfaces cannot hold method bodies. Static methods have no abstract
    // form and keep their stored action; validation rejects them instead.
    if destination.is_interface && stored == MemberAction::PullUp && member.is_method() && !member.is_static {
        MemberAction::DeclareAbstract
    } else {
        stored
    }
}
