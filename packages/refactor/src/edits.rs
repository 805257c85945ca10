//! # Member edits
//!
//! Atomic operations on type bodies.
//!
//! ## Semantics
//!
//! ### MoveMember
//! - Relocates a declaration, body included, from one type to another
//! - Fails if the target already declares a member of the same name and kind
//! - Undone by moving it back to its original position
//!
//! ### AddAbstractDeclaration
//! - Copies the signature of a member into the target as an abstract
//!   declaration; the implementation stays where it is
//! - Undone by removing the copy
//!
//! ### SetTypeAbstract
//! - Changes the abstract flag of a class; undone by restoring the old flag
//!
//! Read-only types are only detected when an edit is performed, the way a
//! file turning read-only is only noticed on write.

use crate::workspace::{Declaration, Workspace};
use hoist_changes::{Change, ChangeError, ProgressMonitor, RefactoringStatus};
use hoist_hierarchy::{MemberId, TypeId};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "edit", rename_all = "kebab-case")]
pub enum MemberEdit {
    /// Move a declaration to `to`, at `index` or at the end
    MoveMember {
        member: MemberId,
        from: TypeId,
        to: TypeId,
        index: Option<usize>,
    },

    /// Declare `member` abstractly in `to`
    AddAbstractDeclaration {
        member: MemberId,
        from: TypeId,
        to: TypeId,
    },

    RemoveDeclaration {
        member: MemberId,
        ty: TypeId,
    },

    InsertDeclaration {
        ty: TypeId,
        index: usize,
        declaration: Declaration,
    },

    SetTypeAbstract {
        ty: TypeId,
        value: bool,
    },
}

impl MemberEdit {
    /// Check that the edit can be applied, without applying it
    pub fn validate(&self, ws: &Workspace) -> Result<(), ChangeError> {
        match self {
            MemberEdit::MoveMember { member, from, to, .. }
            | MemberEdit::AddAbstractDeclaration { member, from, to } => {
                let declaration = ws
                    .declaration(*from, *member)
                    .ok_or_else(|| ChangeError::MissingElement(format!("{} in {}", member, ws.type_name(*from))))?;
                let target = ws
                    .body(*to)
                    .ok_or_else(|| ChangeError::MissingElement(to.to_string()))?;
                if target.declares(&declaration.name, declaration.kind) {
                    return Err(ChangeError::Conflict(format!(
                        "{} already declares {}",
                        target.name,
                        declaration.label()
                    )));
                }
                Ok(())
            }

            MemberEdit::RemoveDeclaration { member, ty } => {
                ws.declaration(*ty, *member)
                    .ok_or_else(|| ChangeError::MissingElement(format!("{} in {}", member, ws.type_name(*ty))))?;
                Ok(())
            }

            MemberEdit::InsertDeclaration { ty, declaration, .. } => {
                let target = ws
                    .body(*ty)
                    .ok_or_else(|| ChangeError::MissingElement(ty.to_string()))?;
                if target.declares(&declaration.name, declaration.kind) {
                    return Err(ChangeError::Conflict(format!(
                        "{} already declares {}",
                        target.name,
                        declaration.label()
                    )));
                }
                Ok(())
            }

            MemberEdit::SetTypeAbstract { ty, .. } => {
                let body = ws
                    .body(*ty)
                    .ok_or_else(|| ChangeError::MissingElement(ty.to_string()))?;
                if body.is_interface {
                    return Err(ChangeError::Conflict(format!("{} is an interface", body.name)));
                }
                Ok(())
            }
        }
    }

    /// Apply the edit and return its inverse
    pub fn apply(&self, ws: &mut Workspace) -> Result<MemberEdit, ChangeError> {
        self.validate(ws)?;

        match self {
            MemberEdit::MoveMember {
                member,
                from,
                to,
                index,
            } => Self::apply_move(ws, *member, *from, *to, *index),

            MemberEdit::AddAbstractDeclaration { member, from, to } => {
                Self::apply_add_abstract(ws, *member, *from, *to)
            }

            MemberEdit::RemoveDeclaration { member, ty } => Self::apply_remove(ws, *member, *ty),

            MemberEdit::InsertDeclaration {
                ty,
                index,
                declaration,
            } => Self::apply_insert(ws, *ty, *index, declaration),

            MemberEdit::SetTypeAbstract { ty, value } => {
                let body = ws.body_mut(*ty)?;
                let previous = body.is_abstract;
                body.is_abstract = *value;
                Ok(MemberEdit::SetTypeAbstract {
                    ty: *ty,
                    value: previous,
                })
            }
        }
    }

    fn apply_move(
        ws: &mut Workspace,
        member: MemberId,
        from: TypeId,
        to: TypeId,
        index: Option<usize>,
    ) -> Result<MemberEdit, ChangeError> {
        // Both ends must be writable before anything is touched
        ws.body_mut(to)?;
        let source = ws.body_mut(from)?;
        let position = source
            .position(member)
            .ok_or_else(|| ChangeError::MissingElement(member.to_string()))?;
        let declaration = source.declarations.remove(position);

        let target = ws.body_mut(to)?;
        let insert_index = index.map_or(target.declarations.len(), |i| i.min(target.declarations.len()));
        target.declarations.insert(insert_index, declaration);

        Ok(MemberEdit::MoveMember {
            member,
            from: to,
            to: from,
            index: Some(position),
        })
    }

    fn apply_add_abstract(
        ws: &mut Workspace,
        member: MemberId,
        from: TypeId,
        to: TypeId,
    ) -> Result<MemberEdit, ChangeError> {
        let mut declaration = ws
            .declaration(from, member)
            .cloned()
            .ok_or_else(|| ChangeError::MissingElement(member.to_string()))?;
        declaration.is_abstract = true;

        ws.body_mut(to)?.declarations.push(declaration);
        Ok(MemberEdit::RemoveDeclaration { member, ty: to })
    }

    fn apply_remove(ws: &mut Workspace, member: MemberId, ty: TypeId) -> Result<MemberEdit, ChangeError> {
        let body = ws.body_mut(ty)?;
        let index = body
            .position(member)
            .ok_or_else(|| ChangeError::MissingElement(member.to_string()))?;
        let declaration = body.declarations.remove(index);
        Ok(MemberEdit::InsertDeclaration {
            ty,
            index,
            declaration,
        })
    }

    fn apply_insert(
        ws: &mut Workspace,
        ty: TypeId,
        index: usize,
        declaration: &Declaration,
    ) -> Result<MemberEdit, ChangeError> {
        let body = ws.body_mut(ty)?;
        let insert_index = index.min(body.declarations.len());
        body.declarations.insert(insert_index, declaration.clone());
        Ok(MemberEdit::RemoveDeclaration {
            member: declaration.member,
            ty,
        })
    }

    /// Human-readable form with type and member names resolved
    pub fn describe(&self, ws: &Workspace) -> String {
        match self {
            MemberEdit::MoveMember { member, from, to, .. } => format!(
                "Move {} from {} to {}",
                ws.member_label(*member),
                ws.type_name(*from),
                ws.type_name(*to)
            ),
            MemberEdit::AddAbstractDeclaration { member, to, .. } => {
                format!("Declare {} abstract in {}", ws.member_label(*member), ws.type_name(*to))
            }
            MemberEdit::RemoveDeclaration { member, ty } => {
                format!("Remove {} from {}", ws.member_label(*member), ws.type_name(*ty))
            }
            MemberEdit::InsertDeclaration { ty, declaration, .. } => {
                format!("Insert {} into {}", declaration.label(), ws.type_name(*ty))
            }
            MemberEdit::SetTypeAbstract { ty, value: true } => format!("Make {} abstract", ws.type_name(*ty)),
            MemberEdit::SetTypeAbstract { ty, value: false } => format!("Make {} concrete", ws.type_name(*ty)),
        }
    }

    /// The type whose body this edit writes to
    pub fn target(&self) -> TypeId {
        match self {
            MemberEdit::MoveMember { to, .. } | MemberEdit::AddAbstractDeclaration { to, .. } => *to,
            MemberEdit::RemoveDeclaration { ty, .. }
            | MemberEdit::InsertDeclaration { ty, .. }
            | MemberEdit::SetTypeAbstract { ty, .. } => *ty,
        }
    }
}

impl Change<Workspace> for MemberEdit {
    fn name(&self) -> String {
        match self {
            MemberEdit::MoveMember { member, from, to, .. } => format!("Move {} from {} to {}", member, from, to),
            MemberEdit::AddAbstractDeclaration { member, to, .. } => {
                format!("Declare {} abstract in {}", member, to)
            }
            MemberEdit::RemoveDeclaration { member, ty } => format!("Remove {} from {}", member, ty),
            MemberEdit::InsertDeclaration { ty, declaration, .. } => {
                format!("Insert {} into {}", declaration.label(), ty)
            }
            MemberEdit::SetTypeAbstract { ty, value } => format!("Set {} abstract = {}", ty, value),
        }
    }

    fn modified_element(&self) -> Option<String> {
        Some(self.target().to_string())
    }

    fn is_valid(&self, ws: &Workspace, _monitor: &mut dyn ProgressMonitor) -> RefactoringStatus {
        match self.validate(ws) {
            Ok(()) => RefactoringStatus::new(),
            Err(err) => RefactoringStatus::fatal(err.to_string()),
        }
    }

    fn perform(
        &mut self,
        ws: &mut Workspace,
        _monitor: &mut dyn ProgressMonitor,
    ) -> Result<Option<Box<dyn Change<Workspace>>>, ChangeError> {
        let inverse = self.apply(ws)?;
        debug!(edit = %self.name(), "Applied member edit");
        Ok(Some(Box::new(inverse)))
    }
}
