// SPDX-License-Identifier: MIT OR Apache-2.0
//! Benchmarks for the ancestor walk at increasing branch depth, and for
//! the versioned lookup that rides on top of it.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use vgraph::{AttrMapping, GraphKind, StoreConfig, VGraph, Value};

/// Build a chain `master -> b1 -> b2 -> ... -> b{depth}`, each branch
/// forked one revision after its parent, with a single attribute write
/// on `master` that every descendant must walk past to resolve.
fn branch_chain(depth: usize) -> VGraph {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();
    {
        let mut g = db.create_graph("bench", GraphKind::Plain).unwrap();
        g.attrs().set("root", Value::Int(0)).unwrap();
    }
    for i in 1..=depth {
        db.switch_rev(db.rev() + 1).unwrap();
        db.switch_branch(&format!("b{i}")).unwrap();
    }
    db
}

fn bench_ancestor_walk_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestor_walk");

    for depth in [1usize, 8, 32, 128].iter() {
        let db = branch_chain(*depth);
        let branch = db.branch().to_string();
        let rev = db.rev();
        group.throughput(Throughput::Elements(*depth as u64));
        group.bench_with_input(BenchmarkId::new("resolve_root_attr", depth), depth, |b, _| {
            b.iter(|| {
                let chain = db
                    .store()
                    .cursor()
                    .ancestors(db.store().db(), &branch, rev)
                    .unwrap();
                black_box(chain)
            });
        });
    }

    group.finish();
}

fn bench_versioned_lookup_cold_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("ancestor_walk");

    for depth in [1usize, 8, 32, 128].iter() {
        group.bench_with_input(BenchmarkId::new("read_attr_through_chain", depth), depth, |b, &depth| {
            b.iter(|| {
                let mut db = branch_chain(depth);
                let mut g = db.graph("bench").unwrap();
                black_box(g.attrs().get("root").unwrap());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ancestor_walk_depth, bench_versioned_lookup_cold_cache);
criterion_main!(benches);
