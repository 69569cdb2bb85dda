// SPDX-License-Identifier: MIT OR Apache-2.0
//! The two diff operations: `compare`, which resolves a graph at two
//! independent `(branch, rev)` points and reports what differs, and
//! `window`, which reports every record a branch wrote within a
//! revision range, regardless of what the versioned-lookup algorithm
//! would currently resolve to.

use vgraph_store::{Lookup, Store, Value};

use crate::error::Result;

/// One difference found by [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    NodeCreated { node: String },
    NodeDeleted { node: String },
    EdgeCreated { source: String, target: String, idx: i64 },
    EdgeDeleted { source: String, target: String, idx: i64 },
    GraphAttrChanged { key: String, before: Option<Value>, after: Option<Value> },
    NodeAttrChanged { node: String, key: String, before: Option<Value>, after: Option<Value> },
    EdgeAttrChanged {
        source: String,
        target: String,
        idx: i64,
        key: String,
        before: Option<Value>,
        after: Option<Value>,
    },
}

/// Resolve `graph` at `(b1, r1)` and at `(b2, r2)` and report every node,
/// edge, and attribute whose resolved value differs between the two
/// points. The two points may be on unrelated branches; each is
/// resolved independently via its own ancestor walk.
pub fn compare(
    store: &Store,
    graph: &str,
    b1: &str,
    r1: i64,
    b2: &str,
    r2: i64,
) -> Result<Vec<Change>> {
    let mut changes = Vec::new();

    for node in store.all_known_nodes(graph)? {
        let before = store.node_exists_at(graph, &node, b1, r1)?;
        let after = store.node_exists_at(graph, &node, b2, r2)?;
        match (before, after) {
            (false, true) => changes.push(Change::NodeCreated { node: node.clone() }),
            (true, false) => changes.push(Change::NodeDeleted { node: node.clone() }),
            _ => {}
        }
        if after {
            for key in store.all_known_node_keys(graph, &node)? {
                let before_v = lookup_at(store.node_val_get_at(graph, &node, &key, b1, r1)?);
                let after_v = lookup_at(store.node_val_get_at(graph, &node, &key, b2, r2)?);
                if before_v != after_v {
                    changes.push(Change::NodeAttrChanged {
                        node: node.clone(),
                        key,
                        before: before_v,
                        after: after_v,
                    });
                }
            }
        }
    }

    for (source, target, idx) in store.all_known_edges(graph)? {
        let before = store.edge_exists_at(graph, &source, &target, idx, b1, r1)?;
        let after = store.edge_exists_at(graph, &source, &target, idx, b2, r2)?;
        match (before, after) {
            (false, true) => changes.push(Change::EdgeCreated {
                source: source.clone(),
                target: target.clone(),
                idx,
            }),
            (true, false) => changes.push(Change::EdgeDeleted {
                source: source.clone(),
                target: target.clone(),
                idx,
            }),
            _ => {}
        }
        if after {
            for key in store.all_known_edge_keys(graph, &source, &target, idx)? {
                let before_v = lookup_at(store.edge_val_get_at(graph, &source, &target, idx, &key, b1, r1)?);
                let after_v = lookup_at(store.edge_val_get_at(graph, &source, &target, idx, &key, b2, r2)?);
                if before_v != after_v {
                    changes.push(Change::EdgeAttrChanged {
                        source: source.clone(),
                        target: target.clone(),
                        idx,
                        key,
                        before: before_v,
                        after: after_v,
                    });
                }
            }
        }
    }

    for key in store.all_known_graph_keys(graph)? {
        let before_v = lookup_at(store.graph_val_get_at(graph, &key, b1, r1)?);
        let after_v = lookup_at(store.graph_val_get_at(graph, &key, b2, r2)?);
        if before_v != after_v {
            changes.push(Change::GraphAttrChanged { key, before: before_v, after: after_v });
        }
    }

    Ok(changes)
}

fn lookup_at(l: Lookup<Value>) -> Option<Value> {
    l.into_option()
}

/// `compare` against the implicit "previous revision" point (SPEC_FULL.md
/// §4.7): normally `(current branch, current rev - 1)`, but if the
/// current rev is exactly where this branch forked off its parent, the
/// previous point is the parent branch at its `parent_rev` instead —
/// there is no earlier record in the current branch to compare against.
pub fn compare_from_previous(store: &Store, graph: &str) -> Result<Vec<Change>> {
    let branch = store.cursor().branch().to_string();
    let rev = store.cursor().rev();

    let (before_branch, before_rev) = match store.branch_parent(&branch)? {
        Some((parent, parent_rev)) if rev == parent_rev => (parent, parent_rev),
        _ => (branch.clone(), rev - 1),
    };

    compare(store, graph, &before_branch, before_rev, &branch, rev)
}

/// One row directly written to `branch` within `[rev_from, rev_to]`,
/// independent of what the versioned-lookup algorithm would resolve —
/// unlike [`compare`], `window` does not consult the ancestor chain, so
/// it also surfaces writes later shadowed by the same branch's own
/// history.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowRecord {
    Node { node: String, rev: i64, extant: bool },
    Edge { source: String, target: String, idx: i64, rev: i64, extant: bool },
    GraphAttr { key: String, rev: i64, value: Option<Value> },
    NodeAttr { node: String, key: String, rev: i64, value: Option<Value> },
    EdgeAttr { source: String, target: String, idx: i64, key: String, rev: i64, value: Option<Value> },
}

/// Every record any table in `graph` has for `branch` with
/// `rev_from <= rev <= rev_to`.
pub fn window(store: &Store, graph: &str, branch: &str, rev_from: i64, rev_to: i64) -> Result<Vec<WindowRecord>> {
    let mut out = Vec::new();

    for (g, node, b, rev, extant) in store.dump_nodes()? {
        if g == graph && b == branch && rev_from <= rev && rev <= rev_to {
            out.push(WindowRecord::Node { node, rev, extant });
        }
    }

    for (g, source, target, idx, b, rev, extant) in store.dump_edges()? {
        if g == graph && b == branch && rev_from <= rev && rev <= rev_to {
            out.push(WindowRecord::Edge { source, target, idx, rev, extant });
        }
    }

    for (g, key, b, rev, value) in store.dump_graph_val()? {
        if g == graph && b == branch && rev_from <= rev && rev <= rev_to {
            out.push(WindowRecord::GraphAttr { key, rev, value });
        }
    }

    for (g, node, key, b, rev, value) in store.dump_node_val()? {
        if g == graph && b == branch && rev_from <= rev && rev <= rev_to {
            out.push(WindowRecord::NodeAttr { node, key, rev, value });
        }
    }

    for (g, source, target, idx, key, b, rev, value) in store.dump_edge_val()? {
        if g == graph && b == branch && rev_from <= rev && rev <= rev_to {
            out.push(WindowRecord::EdgeAttr { source, target, idx, key, rev, value });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::AttrMapping;
    use crate::graph::Graph;
    use vgraph_store::{GraphKind, StoreConfig};

    #[test]
    fn compare_reports_attribute_change_across_revisions() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        {
            let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
            g.attrs().set("title", Value::text("v0")).unwrap();
        }
        store.cursor_mut().set_rev(store.db(), 1).unwrap();
        {
            let mut g = Graph::open(&mut store, "g").unwrap();
            g.attrs().set("title", Value::text("v1")).unwrap();
        }

        let changes = compare(&store, "g", "master", 0, "master", 1).unwrap();
        assert!(changes.contains(&Change::GraphAttrChanged {
            key: "title".to_string(),
            before: Some(Value::text("v0")),
            after: Some(Value::text("v1")),
        }));
    }

    #[test]
    fn compare_reports_node_creation() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        store.cursor_mut().set_rev(store.db(), 1).unwrap();
        {
            let mut g = Graph::open(&mut store, "g").unwrap();
            g.add_node("alice").unwrap();
        }

        let changes = compare(&store, "g", "master", 0, "master", 1).unwrap();
        assert!(changes.contains(&Change::NodeCreated { node: "alice".to_string() }));
    }

    #[test]
    fn window_reports_raw_writes_in_range() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        {
            let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
            g.add_node("alice").unwrap();
        }
        store.cursor_mut().set_rev(store.db(), 1).unwrap();
        {
            let mut g = Graph::open(&mut store, "g").unwrap();
            g.add_node("bob").unwrap();
        }

        let records = window(&store, "g", "master", 0, 0).unwrap();
        assert_eq!(
            records,
            vec![WindowRecord::Node { node: "alice".to_string(), rev: 0, extant: true }]
        );
    }

    #[test]
    fn compare_from_previous_uses_prior_rev_within_a_branch() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        {
            let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
            g.attrs().set("title", Value::text("v0")).unwrap();
        }
        store.cursor_mut().set_rev(store.db(), 1).unwrap();
        {
            let mut g = Graph::open(&mut store, "g").unwrap();
            g.attrs().set("title", Value::text("v1")).unwrap();
        }

        let changes = compare_from_previous(&store, "g").unwrap();
        assert!(changes.contains(&Change::GraphAttrChanged {
            key: "title".to_string(),
            before: Some(Value::text("v0")),
            after: Some(Value::text("v1")),
        }));
    }

    #[test]
    fn compare_from_previous_uses_parent_branch_at_the_fork_point() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        {
            let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
            g.attrs().set("title", Value::text("trunk")).unwrap();
        }
        store.cursor_mut().set_rev(store.db(), 3).unwrap();
        store.cursor_mut().set_branch(store.db(), "dev").unwrap();
        {
            let mut g = Graph::open(&mut store, "g").unwrap();
            g.attrs().set("title", Value::text("dev-edit")).unwrap();
        }

        // `dev`'s cursor is still at rev 3 (its parent_rev) right after
        // the branch switch: the previous point is `master` at rev 3,
        // not `dev` at rev 2 (which doesn't exist).
        let changes = compare_from_previous(&store, "g").unwrap();
        assert!(changes.contains(&Change::GraphAttrChanged {
            key: "title".to_string(),
            before: Some(Value::text("trunk")),
            after: Some(Value::text("dev-edit")),
        }));
    }
}
