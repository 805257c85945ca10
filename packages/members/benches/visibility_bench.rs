use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hoist_hierarchy::{HierarchyBuilder, MemberKind, TypeHierarchy, TypeId};
use hoist_members::{DestinationType, ShowableTypes};
use std::collections::BTreeSet;

/// Layers of interfaces where every type extends every type of the layer above
fn layered_diamonds(layers: usize, width: usize) -> (TypeHierarchy, TypeId, BTreeSet<TypeId>) {
    let mut builder = HierarchyBuilder::new();
    let top = builder.declare_interface("Top").unwrap();

    let mut previous = vec!["Top".to_string()];
    for layer in 0..layers {
        let mut current = Vec::with_capacity(width);
        for i in 0..width {
            let name = format!("L{}_{}", layer, i);
            let ty = builder.declare_interface(&name).unwrap();
            for parent in &previous {
                builder.add_interface(ty, parent);
            }
            current.push(name);
        }
        previous = current;
    }

    let leaf = builder.declare_class("Leaf").unwrap();
    for parent in &previous {
        builder.add_interface(leaf, parent);
    }
    builder.add_member(leaf, "value", MemberKind::Field, false).unwrap();

    let owners = [leaf].into_iter().collect();
    (builder.build().unwrap(), top, owners)
}

fn showable_on_diamonds(c: &mut Criterion) {
    let (hierarchy, top, owners) = layered_diamonds(20, 8);
    let destination = DestinationType::of(&hierarchy, top);

    c.bench_function("showable_layered_diamonds", |b| {
        b.iter(|| ShowableTypes::compute(black_box(&hierarchy), top, black_box(&owners), &destination))
    });
}

criterion_group!(benches, showable_on_diamonds);
criterion_main!(benches);
