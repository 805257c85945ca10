//! # Pull-up session
//!
//! Ties the member engine and the change engine together for one
//! refactoring: pick a destination, assign member actions, optionally
//! accept required members, validate, then build and apply the change.

use crate::edits::MemberEdit;
use crate::errors::RefactorError;
use crate::workspace::Workspace;
use hoist_changes::{
    ChangeExecutionTransaction, CompositeChange, ExecutionContext, RefactoringStatus, TransactionOutcome,
};
use hoist_hierarchy::{HierarchyProvider, Member, MemberId, TypeHierarchy, TypeId};
use hoist_members::{
    check_final_conditions, ActionAssignment, DestinationType, MemberAction, ReferenceResolver,
    RequiredMemberClosure, ShowableTypes, SubtypeVisibilityFilter,
};
use tracing::{debug, info};

pub struct PullUpRefactoring<'h> {
    hierarchy: &'h TypeHierarchy,
    declaring_type: TypeId,
    destination: DestinationType,
    assignment: ActionAssignment,
    filter: SubtypeVisibilityFilter,
}

impl<'h> PullUpRefactoring<'h> {
    /// Start a session for the members of `declaring_type`. The first
    /// candidate destination is selected.
    pub fn new(hierarchy: &'h TypeHierarchy, declaring_type: TypeId) -> Result<Self, RefactorError> {
        if hierarchy.type_decl(declaring_type).is_none() {
            return Err(RefactorError::UnknownType(declaring_type));
        }

        let destination = candidate_destinations(hierarchy, declaring_type)
            .first()
            .copied()
            .ok_or_else(|| RefactorError::NoDestination {
                declaring_type: hierarchy.type_name(declaring_type).to_string(),
            })?;
        let destination = DestinationType::of(hierarchy, destination);

        Ok(Self {
            hierarchy,
            declaring_type,
            destination,
            assignment: ActionAssignment::for_type(hierarchy, declaring_type),
            filter: SubtypeVisibilityFilter::new(destination.id),
        })
    }

    pub fn hierarchy(&self) -> &'h TypeHierarchy {
        self.hierarchy
    }

    pub fn declaring_type(&self) -> TypeId {
        self.declaring_type
    }

    pub fn destination(&self) -> DestinationType {
        self.destination
    }

    /// Proper supertypes of the declaring type, superclass chain first
    pub fn candidate_destinations(&self) -> Vec<TypeId> {
        candidate_destinations(self.hierarchy, self.declaring_type)
    }

    pub fn set_destination(&mut self, ty: TypeId) -> Result<(), RefactorError> {
        if !self.candidate_destinations().contains(&ty) {
            return Err(RefactorError::NotACandidate {
                declaring_type: self.hierarchy.type_name(self.declaring_type).to_string(),
                destination: self.hierarchy.type_name(ty).to_string(),
            });
        }
        self.destination = DestinationType::of(self.hierarchy, ty);
        self.filter.set_anchor(ty);
        debug!(destination = %self.hierarchy.type_name(ty), "Destination changed");
        Ok(())
    }

    pub fn assignment(&self) -> &ActionAssignment {
        &self.assignment
    }

    pub fn set_action(&mut self, member: MemberId, action: MemberAction) -> Result<(), RefactorError> {
        self.assignment.set_action(member, action)?;
        Ok(())
    }

    /// Members with the given effective action at the current destination
    pub fn members_for(&self, action: MemberAction) -> Vec<&Member> {
        self.assignment.members_for(action, &self.destination)
    }

    /// Types worth displaying below the destination
    pub fn showable_types(&mut self) -> &ShowableTypes {
        self.filter.showable(self.hierarchy, &self.assignment, &self.destination)
    }

    /// Members the current selection depends on but does not migrate yet
    pub fn required_members<R: ReferenceResolver + ?Sized>(&self, resolver: &R) -> Vec<MemberId> {
        RequiredMemberClosure::new(resolver).close(&self.assignment, &self.destination)
    }

    /// Mark every required member `PullUp`; returns the members added
    pub fn accept_required<R: ReferenceResolver + ?Sized>(&mut self, resolver: &R) -> Result<Vec<MemberId>, RefactorError> {
        let required = self.required_members(resolver);
        let accepted = self.assignment.accept_required(&required)?;
        debug!(accepted, "Accepted required members");
        Ok(required)
    }

    pub fn check_final_conditions(&self) -> RefactoringStatus {
        check_final_conditions(self.hierarchy, self.declaring_type, &self.assignment, &self.destination)
    }

    /// The edits the current assignment translates to, in application order:
    /// make the destination abstract if it receives abstract declarations,
    /// add the abstract declarations, then move members.
    pub fn planned_edits(&self) -> Result<Vec<MemberEdit>, RefactorError> {
        let status = self.check_final_conditions();
        if status.has_error() {
            return Err(RefactorError::Incomplete(status));
        }

        let destination = self.destination.id;
        let mut edits = Vec::new();

        let abstract_members = self.members_for(MemberAction::DeclareAbstract);
        let destination_is_abstract = self
            .hierarchy
            .type_decl(destination)
            .map_or(false, |decl| decl.is_abstract);
        if !abstract_members.is_empty() && !self.destination.is_interface && !destination_is_abstract {
            edits.push(MemberEdit::SetTypeAbstract {
                ty: destination,
                value: true,
            });
        }

        edits.extend(abstract_members.into_iter().map(|member| MemberEdit::AddAbstractDeclaration {
            member: member.id,
            from: member.declaring_type,
            to: destination,
        }));

        edits.extend(
            self.members_for(MemberAction::PullUp)
                .into_iter()
                .map(|member| MemberEdit::MoveMember {
                    member: member.id,
                    from: member.declaring_type,
                    to: destination,
                    index: None,
                }),
        );

        Ok(edits)
    }

    /// Build the composite change for the current assignment
    pub fn create_change(&self) -> Result<CompositeChange<Workspace>, RefactorError> {
        let destination_name = self.hierarchy.type_name(self.destination.id);
        let mut change = CompositeChange::new(format!("Pull up members to {}", destination_name));
        for edit in self.planned_edits()? {
            change.add(Box::new(edit));
        }

        debug!(edits = change.len(), destination = %destination_name, "Built pull-up change");
        Ok(change)
    }

    /// Validate, build and apply the change as one transaction
    pub fn perform<C: ExecutionContext>(
        &self,
        workspace: &mut Workspace,
        context: &mut C,
    ) -> Result<TransactionOutcome<Workspace>, RefactorError> {
        let change = self.create_change()?;
        let outcome = ChangeExecutionTransaction::new(change).execute(workspace, context)?;
        info!(
            declaring_type = %self.hierarchy.type_name(self.declaring_type),
            destination = %self.hierarchy.type_name(self.destination.id),
            "Pull up applied"
        );
        Ok(outcome)
    }
}

/// Proper supertypes of `ty` that can receive members. The universal root
/// is never editable.
pub fn candidate_destinations<P: HierarchyProvider + ?Sized>(provider: &P, ty: TypeId) -> Vec<TypeId> {
    let root = provider.universal_root();
    provider
        .all_supertypes_of(ty)
        .into_iter()
        .filter(|candidate| *candidate != root)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_changes::{BlockingContext, NullProgressMonitor};
    use hoist_hierarchy::{HierarchyBuilder, MemberKind};
    use hoist_members::ReferenceTable;

    struct Fixture {
        hierarchy: TypeHierarchy,
        shape: TypeId,
        drawable: TypeId,
        circle: TypeId,
        radius: MemberId,
        area: MemberId,
        scale: MemberId,
    }

    /// Object ← Shape ← Circle, Circle implements Drawable
    fn fixture() -> Fixture {
        let mut builder = HierarchyBuilder::new();
        let shape = builder.declare_class("Shape").unwrap();
        let drawable = builder.declare_interface("Drawable").unwrap();
        let circle = builder.declare_class("Circle").unwrap();
        builder.set_superclass(circle, "Shape");
        builder.add_interface(circle, "Drawable");
        let radius = builder.add_member(circle, "radius", MemberKind::Field, false).unwrap();
        let area = builder.add_member(circle, "area", MemberKind::Method, false).unwrap();
        let scale = builder.add_member(circle, "scale", MemberKind::Method, false).unwrap();

        Fixture {
            hierarchy: builder.build().unwrap(),
            shape,
            drawable,
            circle,
            radius,
            area,
            scale,
        }
    }

    fn ids(members: Vec<&Member>) -> Vec<MemberId> {
        members.into_iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_candidates_exclude_root() {
        let f = fixture();
        let session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        assert_eq!(session.candidate_destinations(), vec![f.shape, f.drawable]);
        assert_eq!(session.destination().id, f.shape);
    }

    #[test]
    fn test_type_without_supertypes() {
        let f = fixture();
        let err = PullUpRefactoring::new(&f.hierarchy, f.shape).err().unwrap();
        assert!(matches!(err, RefactorError::NoDestination { .. }));
    }

    #[test]
    fn test_destination_must_be_candidate() {
        let f = fixture();
        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        let root = f.hierarchy.universal_root();
        assert!(matches!(
            session.set_destination(root),
            Err(RefactorError::NotACandidate { .. })
        ));
    }

    #[test]
    fn test_shape_circle_scenario() {
        let f = fixture();
        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        session.set_action(f.radius, MemberAction::PullUp).unwrap();
        session.set_action(f.area, MemberAction::PullUp).unwrap();

        assert_eq!(ids(session.members_for(MemberAction::PullUp)), vec![f.radius, f.area]);
        assert!(session.members_for(MemberAction::DeclareAbstract).is_empty());

        let showable: Vec<TypeId> = session.showable_types().iter().collect();
        assert_eq!(showable, vec![f.shape, f.circle]);
    }

    #[test]
    fn test_switching_to_interface_reinterprets_methods() {
        let f = fixture();
        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        session.set_action(f.area, MemberAction::PullUp).unwrap();

        session.set_destination(f.drawable).unwrap();
        assert!(session.members_for(MemberAction::PullUp).is_empty());
        assert_eq!(ids(session.members_for(MemberAction::DeclareAbstract)), vec![f.area]);

        session.set_destination(f.shape).unwrap();
        assert_eq!(ids(session.members_for(MemberAction::PullUp)), vec![f.area]);
    }

    #[test]
    fn test_accept_required() {
        let f = fixture();
        let mut table = ReferenceTable::new();
        table.add_reference(f.area, f.radius);

        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        session.set_action(f.area, MemberAction::PullUp).unwrap();

        assert_eq!(session.required_members(&table), vec![f.radius]);
        assert_eq!(session.accept_required(&table).unwrap(), vec![f.radius]);
        assert_eq!(session.assignment().action(f.radius), Some(MemberAction::PullUp));
        assert!(session.required_members(&table).is_empty());
    }

    #[test]
    fn test_incomplete_assignment_builds_no_change() {
        let f = fixture();
        let session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        assert!(matches!(session.create_change(), Err(RefactorError::Incomplete(_))));
    }

    #[test]
    fn test_change_order() {
        let f = fixture();
        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        session.set_action(f.radius, MemberAction::PullUp).unwrap();
        session.set_action(f.scale, MemberAction::DeclareAbstract).unwrap();

        let change = session.create_change().unwrap();
        let names = change.child_names();
        assert_eq!(names.len(), 3);
        assert!(names[0].starts_with("Set"));
        assert!(names[1].starts_with("Declare"));
        assert!(names[2].starts_with("Move"));
    }

    #[test]
    fn test_perform_pull_up() {
        let f = fixture();
        let mut workspace = Workspace::from_hierarchy(&f.hierarchy);
        let mut session = PullUpRefactoring::new(&f.hierarchy, f.circle).unwrap();
        session.set_action(f.radius, MemberAction::PullUp).unwrap();
        session.set_action(f.area, MemberAction::DeclareAbstract).unwrap();

        let mut context = BlockingContext::new(NullProgressMonitor::new());
        let outcome = session.perform(&mut workspace, &mut context).unwrap();

        let shape = workspace.body(f.shape).unwrap();
        assert!(shape.is_abstract);
        let rendered: Vec<String> = shape.declarations.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["abstract method area()", "field radius"]);

        let circle = workspace.body(f.circle).unwrap();
        let rendered: Vec<String> = circle.declarations.iter().map(|d| d.to_string()).collect();
        assert_eq!(rendered, vec!["method area()", "method scale()"]);

        // Undo restores the original bodies
        ChangeExecutionTransaction::new(outcome.undo.unwrap())
            .execute(&mut workspace, &mut context)
            .unwrap();
        assert_eq!(workspace, Workspace::from_hierarchy(&f.hierarchy));
    }
}
