use crate::provider::HierarchyProvider;
use crate::types::{Member, MemberId, MemberKind, TypeDecl, TypeId};
use std::collections::HashMap;

/// Arena-backed, immutable type hierarchy.
///
/// Built once through [`crate::HierarchyBuilder`]; the reverse subtype index
/// is computed at build time so subtype queries are slice lookups.
#[derive(Debug, Clone)]
pub struct TypeHierarchy {
    pub(crate) types: Vec<TypeDecl>,
    pub(crate) members: Vec<Member>,

    /// Reverse lookup: type -> direct subtypes
    pub(crate) subtypes: Vec<Vec<TypeId>>,

    pub(crate) by_name: HashMap<String, TypeId>,
    pub(crate) root: TypeId,
}

impl TypeHierarchy {
    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Find a member of `ty` by name, optionally restricted to a kind
    pub fn member_named(&self, ty: TypeId, name: &str, kind: Option<MemberKind>) -> Option<MemberId> {
        self.types.get(ty.index())?.members.iter().copied().find(|id| {
            let member = &self.members[id.index()];
            member.name == name && kind.map_or(true, |k| member.kind == k)
        })
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.members.iter()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }
}

impl HierarchyProvider for TypeHierarchy {
    fn supertype_of(&self, ty: TypeId) -> Option<TypeId> {
        self.types.get(ty.index()).and_then(|t| t.superclass)
    }

    fn interfaces_of(&self, ty: TypeId) -> &[TypeId] {
        self.types
            .get(ty.index())
            .map(|t| t.interfaces.as_slice())
            .unwrap_or(&[])
    }

    fn subtypes_of(&self, ty: TypeId) -> &[TypeId] {
        self.subtypes
            .get(ty.index())
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }

    fn universal_root(&self) -> TypeId {
        self.root
    }

    fn type_decl(&self, ty: TypeId) -> Option<&TypeDecl> {
        self.types.get(ty.index())
    }

    fn member(&self, id: MemberId) -> Option<&Member> {
        self.members.get(id.index())
    }
}
