use hoist_hierarchy::{Member, MemberKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens to a member when the refactoring is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberAction {
    /// Move the member as-is to the destination type
    PullUp,

    /// Declare an abstract signature in the destination; the body stays put
    DeclareAbstract,

    /// Leave the member untouched
    NoAction,
}

const ANY_ACTION: &[MemberAction] = &[
    MemberAction::PullUp,
    MemberAction::DeclareAbstract,
    MemberAction::NoAction,
];

const MOVE_OR_KEEP: &[MemberAction] = &[MemberAction::PullUp, MemberAction::NoAction];

/// Actions a member of the given kind admits.
///
/// Only instance methods can be declared abstract.
pub fn permitted_actions(kind: MemberKind, is_static: bool) -> &'static [MemberAction] {
    match kind {
        MemberKind::Method if !is_static => ANY_ACTION,
        _ => MOVE_OR_KEEP,
    }
}

impl MemberAction {
    pub fn is_permitted_for(self, member: &Member) -> bool {
        permitted_actions(member.kind, member.is_static).contains(&self)
    }

    /// True for anything other than `NoAction`
    pub fn is_active(self) -> bool {
        self != MemberAction::NoAction
    }

    pub fn label(self) -> &'static str {
        match self {
            MemberAction::PullUp => "pull up",
            MemberAction::DeclareAbstract => "declare abstract in destination",
            MemberAction::NoAction => "no action",
        }
    }
}

impl fmt::Display for MemberAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_instance_methods_can_be_abstract() {
        assert!(permitted_actions(MemberKind::Method, false).contains(&MemberAction::DeclareAbstract));
        assert!(!permitted_actions(MemberKind::Method, true).contains(&MemberAction::DeclareAbstract));
        assert!(!permitted_actions(MemberKind::Field, false).contains(&MemberAction::DeclareAbstract));
        assert!(!permitted_actions(MemberKind::NestedType, false).contains(&MemberAction::DeclareAbstract));
    }

    #[test]
    fn test_every_kind_can_move_or_stay() {
        for kind in [MemberKind::Method, MemberKind::Field, MemberKind::NestedType] {
            for is_static in [false, true] {
                let permitted = permitted_actions(kind, is_static);
                assert!(permitted.contains(&MemberAction::PullUp));
                assert!(permitted.contains(&MemberAction::NoAction));
            }
        }
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&MemberAction::DeclareAbstract).unwrap();
        assert_eq!(json, "\"declare-abstract\"");
        let action: MemberAction = serde_json::from_str("\"pull-up\"").unwrap();
        assert_eq!(action, MemberAction::PullUp);
    }
}
