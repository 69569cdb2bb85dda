// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end scenarios exercising the seven named behaviors a
//! branch-and-revision versioned graph store is expected to get right:
//! a fresh store's starting position, basic attribute read/write,
//! branch isolation, tombstone-then-restore, undirected reciprocity,
//! multi-edge index allocation, and two-point comparison.

use vgraph::{AttrMapping, GraphError, GraphKind, StoreConfig, VGraph, Value};

#[test]
fn fresh_init_then_probe() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    assert_eq!(db.branch(), "master");
    assert_eq!(db.rev(), 0);
    assert!(!db.have_graph("g").unwrap());
}

#[test]
fn create_set_read() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    {
        let mut g = db.create_graph("g", GraphKind::Plain).unwrap();
        g.attrs().set("title", Value::text("hello")).unwrap();
    }

    let mut g = db.graph("g").unwrap();
    assert_eq!(g.attrs().get("title").unwrap(), Some(Value::text("hello")));
    assert_eq!(g.attrs().keys().unwrap(), vec!["title".to_string()]);
}

#[test]
fn branch_off_isolates_writes() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    {
        let mut g = db.create_graph("g", GraphKind::Plain).unwrap();
        g.attrs().set("title", Value::text("v0")).unwrap();
    }
    db.switch_rev(1).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.attrs().set("title", Value::text("v1")).unwrap();
    }
    db.switch_rev(2).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.attrs().set("title", Value::text("v2")).unwrap();
    }

    db.switch_rev(3).unwrap();
    db.switch_branch("dev").unwrap();

    let (_, parent, parent_rev) = db
        .all_branches()
        .unwrap()
        .into_iter()
        .find(|(name, _, _)| name == "dev")
        .unwrap();
    assert_eq!(parent, "master");
    assert_eq!(parent_rev, 3);

    {
        let mut g = db.graph("g").unwrap();
        g.attrs().set("title", Value::text("dev-v4")).unwrap();
    }

    db.switch_branch("master").unwrap();
    db.switch_rev(3).unwrap();
    let mut g = db.graph("g").unwrap();
    assert_eq!(g.attrs().get("title").unwrap(), Some(Value::text("v2")));
}

#[test]
fn tombstone_then_restore() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    {
        let mut g = db.create_graph("g", GraphKind::Plain).unwrap();
        g.add_node("n").unwrap();
    }
    db.switch_rev(1).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").set("hp", Value::Int(10)).unwrap();
    }
    db.switch_rev(2).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").del("hp").unwrap();
    }
    db.switch_rev(3).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").set("hp", Value::Int(7)).unwrap();
    }

    db.switch_rev(0).unwrap();
    assert_eq!(db.graph("g").unwrap().node_attrs("n").keys().unwrap(), Vec::<String>::new());
    db.switch_rev(1).unwrap();
    assert_eq!(db.graph("g").unwrap().node_attrs("n").keys().unwrap(), vec!["hp".to_string()]);
    db.switch_rev(2).unwrap();
    assert_eq!(db.graph("g").unwrap().node_attrs("n").keys().unwrap(), Vec::<String>::new());
    db.switch_rev(3).unwrap();
    assert_eq!(db.graph("g").unwrap().node_attrs("n").keys().unwrap(), vec!["hp".to_string()]);
    assert_eq!(
        db.graph("g").unwrap().node_attrs("n").get("hp").unwrap(),
        Some(Value::Int(7))
    );

    db.switch_rev(2).unwrap();
    let mut g = db.graph("g").unwrap();
    match g.node_attrs("n").get_checked("hp") {
        Err(GraphError::KeyNotSet { key }) => assert_eq!(key, "hp"),
        other => panic!("expected KeyNotSet, got {other:?}"),
    }
}

#[test]
fn undirected_reciprocity() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    let mut g = db.create_graph("g", GraphKind::Plain).unwrap();
    g.add_node("1").unwrap();
    g.add_node("2").unwrap();
    g.add_edge("1", "2").unwrap();

    assert!(g.has_edge("2", "1", 0).unwrap());
    g.edge_attrs("1", "2", 0).set("weight", Value::Int(5)).unwrap();
    assert_eq!(
        g.edge_attrs("2", "1", 0).get("weight").unwrap(),
        g.edge_attrs("1", "2", 0).get("weight").unwrap()
    );
}

#[test]
fn multi_edge_index_allocation() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    let mut g = db.create_graph("g", GraphKind::Multi).unwrap();
    g.add_node("u").unwrap();
    g.add_node("v").unwrap();

    let i0 = g.add_edge("u", "v").unwrap();
    let i1 = g.add_edge("u", "v").unwrap();
    let i2 = g.add_edge("u", "v").unwrap();
    assert_eq!([i0, i1, i2], [0, 1, 2]);

    g.del_edge("u", "v", 1).unwrap();
    assert_eq!(
        g.parallel_edges("u", "v").unwrap().keys().unwrap(),
        vec![0, 2]
    );

    let i3 = g.add_edge("u", "v").unwrap();
    assert_eq!(i3, 1);
}

#[test]
fn compare_reports_tombstone_then_restore() {
    let mut db = VGraph::open(StoreConfig::in_memory()).unwrap();
    db.initdb().unwrap();

    {
        let mut g = db.create_graph("g", GraphKind::Plain).unwrap();
        g.add_node("n").unwrap();
    }
    db.switch_rev(1).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").set("hp", Value::Int(10)).unwrap();
    }
    db.switch_rev(2).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").del("hp").unwrap();
    }
    db.switch_rev(3).unwrap();
    {
        let mut g = db.graph("g").unwrap();
        g.node_attrs("n").set("hp", Value::Int(7)).unwrap();
    }

    let changes = db.compare("g", "master", 1, "master", 3).unwrap();
    let hp_change = changes
        .into_iter()
        .find(|c| matches!(c, vgraph::Change::NodeAttrChanged { key, .. } if key == "hp"))
        .unwrap();
    match hp_change {
        vgraph::Change::NodeAttrChanged { before, after, .. } => {
            assert_eq!(before, Some(Value::Int(10)));
            assert_eq!(after, Some(Value::Int(7)));
        }
        _ => unreachable!(),
    }
}
