use crate::action::MemberAction;
use crate::assignment::{ActionAssignment, DestinationType};
use hoist_hierarchy::MemberId;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Answers which members a member's body references.
///
/// Implementations typically scan method bodies, which is why the closure
/// is only computed on demand.
pub trait ReferenceResolver {
    fn referenced_members(&self, member: MemberId) -> Vec<MemberId>;
}

impl<F> ReferenceResolver for F
where
    F: Fn(MemberId) -> Vec<MemberId>,
{
    fn referenced_members(&self, member: MemberId) -> Vec<MemberId> {
        self(member)
    }
}

/// Precomputed reference edges: member -> members it references
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    references: HashMap<MemberId, Vec<MemberId>>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` references `to`
    pub fn add_reference(&mut self, from: MemberId, to: MemberId) {
        let targets = self.references.entry(from).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    pub fn references_of(&self, member: MemberId) -> &[MemberId] {
        self.references
            .get(&member)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

impl ReferenceResolver for ReferenceTable {
    fn referenced_members(&self, member: MemberId) -> Vec<MemberId> {
        self.references_of(member).to_vec()
    }
}

/// Dependency completion for a migration.
///
/// Starting from every member that is effectively moved or declared
/// abstract, follows references transitively and collects those members of
/// the assignment that are still `NoAction`. The result is a suggestion;
/// the caller decides whether to accept it.
pub struct RequiredMemberClosure<'a, R: ?Sized> {
    resolver: &'a R,
}

impl<'a, R: ReferenceResolver + ?Sized> RequiredMemberClosure<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Additional members required by the current selection, in discovery order
    pub fn close(&self, assignment: &ActionAssignment, destination: &DestinationType) -> Vec<MemberId> {
        let mut visited: HashSet<MemberId> = HashSet::new();
        let mut queue: VecDeque<MemberId> = VecDeque::new();

        for (member, _) in assignment.iter() {
            let active = assignment
                .effective_action(member.id, destination)
                .map_or(false, MemberAction::is_active);
            if active {
                visited.insert(member.id);
                queue.push_back(member.id);
            }
        }

        let mut required = Vec::new();
        while let Some(current) = queue.pop_front() {
            for referenced in self.resolver.referenced_members(current) {
                // References leaving the assignment are not ours to migrate
                if !assignment.contains(referenced) || !visited.insert(referenced) {
                    continue;
                }
                required.push(referenced);
                queue.push_back(referenced);
            }
        }

        debug!(required = required.len(), "Computed required members");
        required
    }
}
