//! # In-memory workspace
//!
//! Type bodies as ordered lists of declarations. This is the mutable state
//! that [`crate::MemberEdit`]s operate on; the [`TypeHierarchy`] it was
//! created from stays untouched.

use hoist_changes::ChangeError;
use hoist_hierarchy::{HierarchyProvider, MemberId, MemberKind, TypeHierarchy, TypeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A member as written in a type body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub member: MemberId,
    pub name: String,
    pub kind: MemberKind,
    pub is_static: bool,

    /// Signature only, no body
    pub is_abstract: bool,
}

impl Declaration {
    pub fn label(&self) -> String {
        match self.kind {
            MemberKind::Method => format!("{}()", self.name),
            _ => self.name.clone(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_abstract {
            f.write_str("abstract ")?;
        }
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{} {}", self.kind, self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBody {
    pub name: String,
    pub is_interface: bool,
    pub is_abstract: bool,
    pub declarations: Vec<Declaration>,
}

impl TypeBody {
    pub fn position(&self, member: MemberId) -> Option<usize> {
        self.declarations.iter().position(|d| d.member == member)
    }

    pub fn declares(&self, name: &str, kind: MemberKind) -> bool {
        self.declarations.iter().any(|d| d.name == name && d.kind == kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    bodies: BTreeMap<TypeId, TypeBody>,
    read_only: BTreeSet<TypeId>,
}

impl Workspace {
    /// One body per type, declarations in hierarchy order. The universal
    /// root is read-only.
    pub fn from_hierarchy(hierarchy: &TypeHierarchy) -> Self {
        let bodies = hierarchy
            .types()
            .map(|decl| {
                let declarations = hierarchy
                    .members_of(decl.id)
                    .into_iter()
                    .map(|m| Declaration {
                        member: m.id,
                        name: m.name.clone(),
                        kind: m.kind,
                        is_static: m.is_static,
                        is_abstract: false,
                    })
                    .collect();
                (
                    decl.id,
                    TypeBody {
                        name: decl.name.clone(),
                        is_interface: decl.is_interface,
                        is_abstract: decl.is_abstract,
                        declarations,
                    },
                )
            })
            .collect();

        let mut read_only = BTreeSet::new();
        read_only.insert(hierarchy.universal_root());

        Self { bodies, read_only }
    }

    pub fn body(&self, ty: TypeId) -> Option<&TypeBody> {
        self.bodies.get(&ty)
    }

    /// Mutable access for an edit; fails on missing or read-only types
    pub(crate) fn body_mut(&mut self, ty: TypeId) -> Result<&mut TypeBody, ChangeError> {
        if self.read_only.contains(&ty) {
            return Err(ChangeError::ReadOnly(self.type_name(ty)));
        }
        self.bodies
            .get_mut(&ty)
            .ok_or_else(|| ChangeError::MissingElement(ty.to_string()))
    }

    pub fn set_read_only(&mut self, ty: TypeId, read_only: bool) {
        if read_only {
            self.read_only.insert(ty);
        } else {
            self.read_only.remove(&ty);
        }
    }

    pub fn is_read_only(&self, ty: TypeId) -> bool {
        self.read_only.contains(&ty)
    }

    pub fn type_name(&self, ty: TypeId) -> String {
        self.bodies
            .get(&ty)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| ty.to_string())
    }

    pub fn declaration(&self, ty: TypeId, member: MemberId) -> Option<&Declaration> {
        self.bodies
            .get(&ty)
            .and_then(|b| b.declarations.iter().find(|d| d.member == member))
    }

    /// Label of the declaration of `member` wherever it currently lives
    pub fn member_label(&self, member: MemberId) -> String {
        self.bodies
            .values()
            .flat_map(|b| b.declarations.iter())
            .find(|d| d.member == member)
            .map(Declaration::label)
            .unwrap_or_else(|| member.to_string())
    }

    pub fn bodies(&self) -> impl Iterator<Item = (TypeId, &TypeBody)> {
        self.bodies.iter().map(|(id, body)| (*id, body))
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for body in self.bodies.values() {
            let keyword = if body.is_interface {
                "interface"
            } else if body.is_abstract {
                "abstract class"
            } else {
                "class"
            };
            writeln!(f, "{} {}", keyword, body.name)?;
            for declaration in &body.declarations {
                writeln!(f, "    {}", declaration)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoist_hierarchy::HierarchyBuilder;

    fn workspace() -> (Workspace, TypeId, TypeId) {
        let mut builder = HierarchyBuilder::new();
        let shape = builder.declare_class("Shape").unwrap();
        let circle = builder.declare_class("Circle").unwrap();
        builder.set_superclass(circle, "Shape");
        builder.add_member(circle, "radius", MemberKind::Field, false).unwrap();
        builder.add_member(circle, "area", MemberKind::Method, false).unwrap();
        let hierarchy = builder.build().unwrap();
        (Workspace::from_hierarchy(&hierarchy), shape, circle)
    }

    #[test]
    fn test_bodies_mirror_hierarchy() {
        let (ws, shape, circle) = workspace();
        assert!(ws.body(shape).unwrap().declarations.is_empty());

        let body = ws.body(circle).unwrap();
        let labels: Vec<_> = body.declarations.iter().map(Declaration::label).collect();
        assert_eq!(labels, vec!["radius", "area()"]);
        assert!(body.declares("area", MemberKind::Method));
        assert!(!body.declares("area", MemberKind::Field));
    }

    #[test]
    fn test_read_only_blocks_mutation() {
        let (mut ws, shape, _) = workspace();
        ws.set_read_only(shape, true);
        assert_eq!(ws.body_mut(shape).unwrap_err(), ChangeError::ReadOnly("Shape".into()));

        ws.set_read_only(shape, false);
        assert!(ws.body_mut(shape).is_ok());
        assert!(matches!(ws.body_mut(TypeId(99)), Err(ChangeError::MissingElement(_))));
    }

    #[test]
    fn test_root_is_read_only() {
        let (ws, _, _) = workspace();
        assert!(ws.is_read_only(TypeId(0)));
    }

    #[test]
    fn test_display() {
        let (ws, _, _) = workspace();
        let text = ws.to_string();
        assert!(text.contains("class Circle\n    field radius\n    method area()\n"));
    }
}
