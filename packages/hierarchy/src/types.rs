use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of a type in a [`crate::TypeHierarchy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#t{}", self.0)
    }
}

/// Arena index of a member in a [`crate::TypeHierarchy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub u32);

impl MemberId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#m{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberKind {
    Method,
    Field,
    NestedType,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberKind::Method => "method",
            MemberKind::Field => "field",
            MemberKind::NestedType => "nested type",
        };
        f.write_str(label)
    }
}

/// A member declared by exactly one type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub declaring_type: TypeId,
    pub kind: MemberKind,
    pub is_static: bool,
}

impl Member {
    pub fn is_method(&self) -> bool {
        self.kind == MemberKind::Method
    }

    /// Display label: methods get a trailing `()`
    pub fn label(&self) -> String {
        match self.kind {
            MemberKind::Method => format!("{}()", self.name),
            _ => self.name.clone(),
        }
    }
}

/// A class or interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: TypeId,
    pub name: String,
    pub is_interface: bool,
    pub is_abstract: bool,

    /// Superclass; `None` for interfaces and for the universal root
    pub superclass: Option<TypeId>,

    /// Implemented (or, for interfaces, extended) interfaces in declaration order
    pub interfaces: Vec<TypeId>,

    /// Declared members in declaration order
    pub members: Vec<MemberId>,
}
