//! Session description files: a small hierarchy plus the pull-up to run
//! against it.

use hoist_hierarchy::{HierarchyBuilder, HierarchyError, HierarchyProvider, MemberId, MemberKind, TypeHierarchy, TypeId};
use hoist_members::{MemberAction, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot read session file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("{ty} has no member named {name}")]
    UnknownMember { ty: String, name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub types: Vec<TypeSpec>,

    /// Type whose members are pulled up
    pub declaring_type: String,

    /// Defaults to the first candidate destination
    #[serde(default)]
    pub destination: Option<String>,

    /// Member name (`name()` for methods) to action
    #[serde(default)]
    pub actions: BTreeMap<String, MemberAction>,

    /// Types the workspace refuses to write
    #[serde(default)]
    pub read_only: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSpec {
    pub name: String,

    #[serde(default)]
    pub interface: bool,

    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[serde(default)]
    pub superclass: Option<String>,

    #[serde(default)]
    pub interfaces: Vec<String>,

    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpec {
    pub name: String,
    pub kind: MemberKind,

    #[serde(default, rename = "static")]
    pub is_static: bool,

    /// Members of the same type this member's body references
    #[serde(default)]
    pub references: Vec<String>,
}

/// A session file resolved against its own hierarchy
#[derive(Debug)]
pub struct Session {
    pub hierarchy: TypeHierarchy,
    pub declaring_type: TypeId,
    pub destination: Option<TypeId>,
    pub actions: Vec<(MemberId, MemberAction)>,
    pub references: ReferenceTable,
    pub read_only: Vec<TypeId>,
}

impl SessionFile {
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn resolve(&self) -> Result<Session, SessionError> {
        let mut builder = HierarchyBuilder::new();

        let mut ids = Vec::with_capacity(self.types.len());
        for spec in &self.types {
            let id = if spec.interface {
                builder.declare_interface(&spec.name)?
            } else {
                builder.declare_class(&spec.name)?
            };
            ids.push(id);
        }

        for (spec, &id) in self.types.iter().zip(&ids) {
            if let Some(superclass) = &spec.superclass {
                builder.set_superclass(id, superclass);
            }
            for interface in &spec.interfaces {
                builder.add_interface(id, interface);
            }
            if spec.is_abstract {
                builder.set_abstract(id, true);
            }
            for member in &spec.members {
                builder.add_member(id, &member.name, member.kind, member.is_static)?;
            }
        }

        let hierarchy = builder.build()?;
        let find_type = |name: &str| {
            hierarchy
                .type_named(name)
                .ok_or_else(|| SessionError::UnknownType(name.to_string()))
        };

        let declaring_type = find_type(&self.declaring_type)?;
        let destination = self.destination.as_deref().map(|name| find_type(name)).transpose()?;
        let read_only = self
            .read_only
            .iter()
            .map(|name| find_type(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut references = ReferenceTable::new();
        for (spec, &id) in self.types.iter().zip(&ids) {
            for member in &spec.members {
                let from = lookup(&hierarchy, id, &member.name, Some(member.kind))?;
                for target in &member.references {
                    references.add_reference(from, lookup_label(&hierarchy, id, target)?);
                }
            }
        }

        let actions = self
            .actions
            .iter()
            .map(|(label, action)| Ok((lookup_label(&hierarchy, declaring_type, label)?, *action)))
            .collect::<Result<Vec<_>, SessionError>>()?;

        Ok(Session {
            hierarchy,
            declaring_type,
            destination,
            actions,
            references,
            read_only,
        })
    }
}

/// `name()` selects a method, a bare name any member kind
fn lookup_label(hierarchy: &TypeHierarchy, ty: TypeId, label: &str) -> Result<MemberId, SessionError> {
    match label.strip_suffix("()") {
        Some(name) => lookup(hierarchy, ty, name, Some(MemberKind::Method)),
        None => lookup(hierarchy, ty, label, None),
    }
}

fn lookup(
    hierarchy: &TypeHierarchy,
    ty: TypeId,
    name: &str,
    kind: Option<MemberKind>,
) -> Result<MemberId, SessionError> {
    hierarchy
        .member_named(ty, name, kind)
        .ok_or_else(|| SessionError::UnknownMember {
            ty: hierarchy.type_name(ty).to_string(),
            name: name.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SHAPES: &str = r#"{
        "types": [
            { "name": "Shape" },
            { "name": "Drawable", "interface": true },
            {
                "name": "Circle",
                "superclass": "Shape",
                "interfaces": ["Drawable"],
                "members": [
                    { "name": "radius", "kind": "field" },
                    { "name": "area", "kind": "method", "references": ["radius"] },
                    { "name": "draw", "kind": "method" }
                ]
            }
        ],
        "declaringType": "Circle",
        "destination": "Shape",
        "actions": { "area()": "pull-up" }
    }"#;

    #[test]
    fn test_resolve_session() {
        let file: SessionFile = serde_json::from_str(SHAPES).unwrap();
        let session = file.resolve().unwrap();

        let circle = session.hierarchy.type_named("Circle").unwrap();
        let area = session.hierarchy.member_named(circle, "area", None).unwrap();
        let radius = session.hierarchy.member_named(circle, "radius", None).unwrap();

        assert_eq!(session.declaring_type, circle);
        assert_eq!(session.destination, session.hierarchy.type_named("Shape"));
        assert_eq!(session.actions, vec![(area, MemberAction::PullUp)]);
        assert_eq!(session.references.references_of(area), &[radius]);
    }

    #[test]
    fn test_unknown_member_in_actions() {
        let mut file: SessionFile = serde_json::from_str(SHAPES).unwrap();
        file.actions.insert("radius()".into(), MemberAction::PullUp);

        let err = file.resolve().unwrap_err();
        assert!(matches!(err, SessionError::UnknownMember { ref name, .. } if name == "radius"));
    }

    #[test]
    fn test_unknown_declaring_type() {
        let mut file: SessionFile = serde_json::from_str(SHAPES).unwrap();
        file.declaring_type = "Square".into();
        assert!(matches!(file.resolve(), Err(SessionError::UnknownType(_))));
    }
}
