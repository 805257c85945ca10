//! Error types for hierarchy construction

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Duplicate member {member} in {ty}")]
    DuplicateMember { ty: String, member: String },

    #[error("{ty} cannot extend interface {superclass}")]
    SuperclassIsInterface { ty: String, superclass: String },

    #[error("{ty} cannot implement class {interface}")]
    NotAnInterface { ty: String, interface: String },

    #[error("Interface {0} cannot have a superclass")]
    InterfaceWithSuperclass(String),

    #[error("Cyclic inheritance involving {0}")]
    CyclicInheritance(String),
}
