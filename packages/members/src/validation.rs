use crate::action::MemberAction;
use crate::assignment::{ActionAssignment, DestinationType};
use hoist_common::{RefactoringStatus, Severity, StatusEntry};
use hoist_hierarchy::{HierarchyProvider, MemberKind, TypeId};
use std::collections::{HashMap, HashSet};

/// Check an assignment against its destination before any change is built.
///
/// Fatal findings mean the destination itself is unusable; errors block the
/// refactoring but can be fixed by changing member actions; warnings are
/// informational.
pub fn check_final_conditions<P: HierarchyProvider + ?Sized>(
    provider: &P,
    declaring_type: TypeId,
    assignment: &ActionAssignment,
    destination: &DestinationType,
) -> RefactoringStatus {
    let mut status = RefactoringStatus::new();
    let destination_name = provider.type_name(destination.id);

    if destination.id == declaring_type {
        status.add_fatal(format!("{} cannot be its own destination", destination_name));
        return status;
    }

    for owner in assignment.owner_types() {
        if !provider.is_subtype_of(owner, destination.id) {
            status.add_entry(
                StatusEntry::new(
                    Severity::Fatal,
                    format!("{} is not a supertype of {}", destination_name, provider.type_name(owner)),
                )
                .with_context(provider.type_name(owner)),
            );
        }
    }
    if status.has_fatal_error() {
        return status;
    }

    if !assignment.is_complete(destination) {
        status.add_error("Select at least one member to pull up or declare abstract");
        return status;
    }

    let existing: HashSet<(&str, MemberKind)> = provider
        .members_of(destination.id)
        .into_iter()
        .map(|m| (m.name.as_str(), m.kind))
        .collect();
    let mut incoming: HashMap<(&str, MemberKind), TypeId> = HashMap::new();

    for action in [MemberAction::PullUp, MemberAction::DeclareAbstract] {
        for member in assignment.members_for(action, destination) {
            let key = (member.name.as_str(), member.kind);

            if existing.contains(&key) {
                status.add_entry(
                    StatusEntry::new(
                        Severity::Error,
                        format!("{} already declares {} {}", destination_name, member.kind, member.label()),
                    )
                    .with_context(member.label()),
                );
            }

            if let Some(other) = incoming.insert(key, member.declaring_type) {
                if other != member.declaring_type {
                    status.add_entry(
                        StatusEntry::new(
                            Severity::Error,
                            format!(
                                "{} {} is migrated from both {} and {}",
                                member.kind,
                                member.label(),
                                provider.type_name(other),
                                provider.type_name(member.declaring_type)
                            ),
                        )
                        .with_context(member.label()),
                    );
                }
            }

            if destination.is_interface && action == MemberAction::PullUp {
                match member.kind {
                    MemberKind::Method if member.is_static => {
                        status.add_entry(
                            StatusEntry::new(
                                Severity::Error,
                                format!("Static method {} cannot be pulled up into interface {}", member.label(), destination_name),
                            )
                            .with_context(member.label()),
                        );
                    }
                    MemberKind::Field if !member.is_static => {
                        status.add_entry(
                            StatusEntry::new(
                                Severity::Warning,
                                format!("Field {} becomes a constant in interface {}", member.label(), destination_name),
                            )
                            .with_context(member.label()),
                        );
                    }
                    _ => {}
                }
            }
        }
    }

    status
}
