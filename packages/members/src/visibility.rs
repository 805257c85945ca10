//! # Subtype visibility
//!
//! Large hierarchies are pruned to the types that matter for the current
//! migration: a type is showable if it owns an active member, or if any of
//! its (transitive) subtypes is showable. The anchor of the traversal is
//! always showable.
//!
//! The verdict is computed bottom-up with one memo entry per type, so
//! diamond-shaped interface inheritance is visited once per type and edge.

use crate::assignment::{ActionAssignment, DestinationType};
use hoist_hierarchy::{HierarchyProvider, TypeId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Verdict {
    InProgress,
    Showable,
    Hidden,
}

/// The set of types worth surfacing for one owner-type configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowableTypes {
    anchor: TypeId,
    types: BTreeSet<TypeId>,
}

impl ShowableTypes {
    /// Compute the showable subset of the subtree rooted at `anchor`.
    ///
    /// When both the destination and the anchor are interfaces, the
    /// universal root is added as a pseudo-supertype, since every interface
    /// implicitly extends it.
    pub fn compute<P: HierarchyProvider + ?Sized>(
        provider: &P,
        anchor: TypeId,
        owners: &BTreeSet<TypeId>,
        destination: &DestinationType,
    ) -> Self {
        let mut memo: HashMap<TypeId, Verdict> = HashMap::new();
        let mut stack = vec![(anchor, false)];

        // Post-order: a type is judged once all its subtypes are judged
        while let Some((ty, expanded)) = stack.pop() {
            if expanded {
                let showable = owners.contains(&ty)
                    || provider
                        .subtypes_of(ty)
                        .iter()
                        .any(|sub| memo.get(sub) == Some(&Verdict::Showable));
                let verdict = if showable { Verdict::Showable } else { Verdict::Hidden };
                memo.insert(ty, verdict);
                continue;
            }
            if memo.contains_key(&ty) {
                continue;
            }
            memo.insert(ty, Verdict::InProgress);
            stack.push((ty, true));
            for sub in provider.subtypes_of(ty) {
                if !memo.contains_key(sub) {
                    stack.push((*sub, false));
                }
            }
        }

        let mut types: BTreeSet<TypeId> = memo
            .into_iter()
            .filter(|(_, verdict)| *verdict == Verdict::Showable)
            .map(|(ty, _)| ty)
            .collect();
        types.insert(anchor);

        if destination.is_interface && provider.is_interface(anchor) {
            types.insert(provider.universal_root());
        }

        debug!(
            anchor = %provider.type_name(anchor),
            owners = owners.len(),
            showable = types.len(),
            "Computed showable types"
        );

        Self { anchor, types }
    }

    pub fn anchor(&self) -> TypeId {
        self.anchor
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.types.contains(&ty)
    }

    /// Direct subtypes of `ty` that are showable, in provider order
    pub fn showable_subtypes<P: HierarchyProvider + ?Sized>(&self, provider: &P, ty: TypeId) -> Vec<TypeId> {
        provider
            .subtypes_of(ty)
            .iter()
            .copied()
            .filter(|sub| self.contains(*sub))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.types.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    destination: DestinationType,
}

/// Caches [`ShowableTypes`] between display refreshes.
///
/// The cache is keyed on the assignment revision and the destination, so
/// it is recomputed only when the owner types can have changed. One filter
/// serves one assignment.
#[derive(Debug)]
pub struct SubtypeVisibilityFilter {
    anchor: TypeId,
    cached: Option<(CacheKey, ShowableTypes)>,
    computations: usize,
}

impl SubtypeVisibilityFilter {
    pub fn new(anchor: TypeId) -> Self {
        Self {
            anchor,
            cached: None,
            computations: 0,
        }
    }

    pub fn showable<P: HierarchyProvider + ?Sized>(
        &mut self,
        provider: &P,
        assignment: &ActionAssignment,
        destination: &DestinationType,
    ) -> &ShowableTypes {
        let key = CacheKey {
            revision: assignment.revision(),
            destination: *destination,
        };

        if !matches!(&self.cached, Some((cached_key, _)) if *cached_key == key) {
            self.cached = None;
        }

        let anchor = self.anchor;
        let computations = &mut self.computations;
        let (_, showable) = self.cached.get_or_insert_with(|| {
            *computations += 1;
            let owners = assignment.owner_types();
            (key, ShowableTypes::compute(provider, anchor, &owners, destination))
        });
        showable
    }

    /// Move the anchor; drops the cache
    pub fn set_anchor(&mut self, anchor: TypeId) {
        if anchor != self.anchor {
            self.anchor = anchor;
            self.cached = None;
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Number of recomputations performed so far
    pub fn computations(&self) -> usize {
        self.computations
    }
}
