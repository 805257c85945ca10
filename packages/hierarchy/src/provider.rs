use crate::types::{Member, MemberId, TypeDecl, TypeId};
use std::collections::{HashSet, VecDeque};

/// Read-only queries over a type hierarchy.
///
/// Engines depend on this trait rather than on [`crate::TypeHierarchy`] so
/// they stay agnostic of where the hierarchy comes from. Only the required
/// methods need implementing; transitive queries are derived from them.
pub trait HierarchyProvider {
    /// Direct superclass, `None` for interfaces and the universal root
    fn supertype_of(&self, ty: TypeId) -> Option<TypeId>;

    /// Directly implemented (or extended) interfaces
    fn interfaces_of(&self, ty: TypeId) -> &[TypeId];

    /// Direct subtypes: classes extending `ty` and types implementing it
    fn subtypes_of(&self, ty: TypeId) -> &[TypeId];

    /// The type every class ultimately extends
    fn universal_root(&self) -> TypeId;

    fn type_decl(&self, ty: TypeId) -> Option<&TypeDecl>;

    fn member(&self, id: MemberId) -> Option<&Member>;

    fn is_interface(&self, ty: TypeId) -> bool {
        self.type_decl(ty).map(|t| t.is_interface).unwrap_or(false)
    }

    fn type_name(&self, ty: TypeId) -> &str {
        self.type_decl(ty).map(|t| t.name.as_str()).unwrap_or("<unknown>")
    }

    /// Members declared by `ty`, in declaration order
    fn members_of(&self, ty: TypeId) -> Vec<&Member> {
        self.type_decl(ty)
            .map(|t| t.members.iter().filter_map(|id| self.member(*id)).collect())
            .unwrap_or_default()
    }

    /// Superclass followed by interfaces
    fn direct_supertypes_of(&self, ty: TypeId) -> Vec<TypeId> {
        let mut result: Vec<TypeId> = self.supertype_of(ty).into_iter().collect();
        result.extend_from_slice(self.interfaces_of(ty));
        result
    }

    /// All transitive subtypes, breadth-first, each listed once
    fn all_subtypes_of(&self, ty: TypeId) -> Vec<TypeId> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        let mut queue: VecDeque<TypeId> = self.subtypes_of(ty).iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            queue.extend(self.subtypes_of(current).iter().copied());
        }

        result
    }

    /// All transitive supertypes: the superclass chain first, then the
    /// interfaces reachable from `ty` or any class on that chain.
    fn all_supertypes_of(&self, ty: TypeId) -> Vec<TypeId> {
        let mut result = Vec::new();
        let mut visited = HashSet::new();

        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(superclass) = self.supertype_of(current) {
            if !visited.insert(superclass) {
                break;
            }
            result.push(superclass);
            chain.push(superclass);
            current = superclass;
        }

        let mut queue: VecDeque<TypeId> = chain
            .iter()
            .flat_map(|t| self.interfaces_of(*t).iter().copied())
            .collect();
        while let Some(interface) = queue.pop_front() {
            if interface == ty || !visited.insert(interface) {
                continue;
            }
            result.push(interface);
            queue.extend(self.interfaces_of(interface).iter().copied());
        }

        result
    }

    /// True if `sup` is a proper supertype of `sub`. Interfaces count as
    /// subtypes of the universal root.
    fn is_subtype_of(&self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return false;
        }
        if sup == self.universal_root() {
            return true;
        }
        self.all_supertypes_of(sub).contains(&sup)
    }
}
