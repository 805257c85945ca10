use crate::errors::HierarchyError;
use crate::hierarchy::TypeHierarchy;
use crate::types::{Member, MemberId, MemberKind, TypeDecl, TypeId};
use crate::DEFAULT_ROOT_NAME;
use std::collections::HashMap;
use tracing::debug;

/// Type declared but not yet linked; supertypes are kept by name so
/// declarations may appear in any order.
#[derive(Debug)]
struct PendingType {
    name: String,
    is_interface: bool,
    is_abstract: bool,
    superclass: Option<String>,
    interfaces: Vec<String>,
    members: Vec<MemberId>,
}

/// Incrementally declares types and members, then links and validates them.
///
/// ```rust,ignore
/// let mut builder = HierarchyBuilder::new();
/// let shape = builder.declare_class("Shape")?;
/// let circle = builder.declare_class("Circle")?;
/// builder.set_superclass(circle, "Shape");
/// builder.add_member(circle, "radius", MemberKind::Field, false)?;
/// let hierarchy = builder.build()?;
/// ```
#[derive(Debug)]
pub struct HierarchyBuilder {
    types: Vec<PendingType>,
    members: Vec<Member>,
    by_name: HashMap<String, TypeId>,
}

impl HierarchyBuilder {
    /// Create a builder whose universal root is named `Object`
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_NAME)
    }

    pub fn with_root(root_name: &str) -> Self {
        let mut builder = Self {
            types: Vec::new(),
            members: Vec::new(),
            by_name: HashMap::new(),
        };
        builder.push_type(root_name, false);
        builder
    }

    pub fn root(&self) -> TypeId {
        TypeId(0)
    }

    pub fn declare_class(&mut self, name: &str) -> Result<TypeId, HierarchyError> {
        self.declare(name, false)
    }

    pub fn declare_interface(&mut self, name: &str) -> Result<TypeId, HierarchyError> {
        self.declare(name, true)
    }

    fn declare(&mut self, name: &str, is_interface: bool) -> Result<TypeId, HierarchyError> {
        if self.by_name.contains_key(name) {
            return Err(HierarchyError::DuplicateType(name.to_string()));
        }
        Ok(self.push_type(name, is_interface))
    }

    fn push_type(&mut self, name: &str, is_interface: bool) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(PendingType {
            name: name.to_string(),
            is_interface,
            is_abstract: is_interface,
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn type_named(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Record the superclass by name; resolved in [`Self::build`]
    pub fn set_superclass(&mut self, ty: TypeId, superclass: &str) {
        if let Some(pending) = self.types.get_mut(ty.index()) {
            pending.superclass = Some(superclass.to_string());
        }
    }

    /// Record an implemented (or extended, for interfaces) interface by name
    pub fn add_interface(&mut self, ty: TypeId, interface: &str) {
        if let Some(pending) = self.types.get_mut(ty.index()) {
            if !pending.interfaces.iter().any(|i| i == interface) {
                pending.interfaces.push(interface.to_string());
            }
        }
    }

    pub fn set_abstract(&mut self, ty: TypeId, is_abstract: bool) {
        if let Some(pending) = self.types.get_mut(ty.index()) {
            pending.is_abstract = is_abstract || pending.is_interface;
        }
    }

    /// Declare a member. Names are unique per kind within a type.
    pub fn add_member(
        &mut self,
        ty: TypeId,
        name: &str,
        kind: MemberKind,
        is_static: bool,
    ) -> Result<MemberId, HierarchyError> {
        let pending = self
            .types
            .get(ty.index())
            .ok_or_else(|| HierarchyError::UnknownType(ty.to_string()))?;

        let duplicate = pending.members.iter().any(|id| {
            let existing = &self.members[id.index()];
            existing.name == name && existing.kind == kind
        });
        if duplicate {
            return Err(HierarchyError::DuplicateMember {
                ty: pending.name.clone(),
                member: name.to_string(),
            });
        }

        let id = MemberId(self.members.len() as u32);
        self.members.push(Member {
            id,
            name: name.to_string(),
            declaring_type: ty,
            kind,
            is_static,
        });
        self.types[ty.index()].members.push(id);
        Ok(id)
    }

    /// Resolve supertype names, validate the graph, and build the subtype index
    pub fn build(self) -> Result<TypeHierarchy, HierarchyError> {
        let root = TypeId(0);
        let mut types = Vec::with_capacity(self.types.len());

        for (index, pending) in self.types.iter().enumerate() {
            let id = TypeId(index as u32);

            let superclass = match &pending.superclass {
                Some(_) if pending.is_interface => {
                    return Err(HierarchyError::InterfaceWithSuperclass(pending.name.clone()));
                }
                Some(name) => {
                    let superclass = self.resolve(name)?;
                    if self.types[superclass.index()].is_interface {
                        return Err(HierarchyError::SuperclassIsInterface {
                            ty: pending.name.clone(),
                            superclass: name.clone(),
                        });
                    }
                    Some(superclass)
                }
                None if pending.is_interface || id == root => None,
                None => Some(root),
            };

            let mut interfaces = Vec::with_capacity(pending.interfaces.len());
            for name in &pending.interfaces {
                let interface = self.resolve(name)?;
                if !self.types[interface.index()].is_interface {
                    return Err(HierarchyError::NotAnInterface {
                        ty: pending.name.clone(),
                        interface: name.clone(),
                    });
                }
                interfaces.push(interface);
            }

            types.push(TypeDecl {
                id,
                name: pending.name.clone(),
                is_interface: pending.is_interface,
                is_abstract: pending.is_abstract,
                superclass,
                interfaces,
                members: pending.members.clone(),
            });
        }

        detect_cycles(&types)?;

        let mut subtypes = vec![Vec::new(); types.len()];
        for decl in &types {
            for sup in decl.superclass.iter().chain(decl.interfaces.iter()) {
                subtypes[sup.index()].push(decl.id);
            }
        }

        debug!(types = types.len(), members = self.members.len(), "Built type hierarchy");

        Ok(TypeHierarchy {
            types,
            members: self.members,
            subtypes,
            by_name: self.by_name,
            root,
        })
    }

    fn resolve(&self, name: &str) -> Result<TypeId, HierarchyError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| HierarchyError::UnknownType(name.to_string()))
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Iterative DFS over supertype edges; a back edge means a cycle
fn detect_cycles(types: &[TypeDecl]) -> Result<(), HierarchyError> {
    let mut marks = vec![Mark::Unvisited; types.len()];

    for start in 0..types.len() {
        if marks[start] != Mark::Unvisited {
            continue;
        }

        let mut stack = vec![(start, false)];
        while let Some((index, expanded)) = stack.pop() {
            if expanded {
                marks[index] = Mark::Done;
                continue;
            }
            if marks[index] == Mark::Done {
                continue;
            }
            marks[index] = Mark::InProgress;
            stack.push((index, true));

            let decl = &types[index];
            for sup in decl.superclass.iter().chain(decl.interfaces.iter()) {
                match marks[sup.index()] {
                    Mark::InProgress => {
                        return Err(HierarchyError::CyclicInheritance(types[sup.index()].name.clone()));
                    }
                    Mark::Unvisited => stack.push((sup.index(), false)),
                    Mark::Done => {}
                }
            }
        }
    }

    Ok(())
}
