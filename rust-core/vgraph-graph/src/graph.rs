// SPDX-License-Identifier: MIT OR Apache-2.0
//! [`Graph`]: a typed handle bundling a graph's name and [`GraphKind`]
//! with the `Store` it lives in, so kind-specific operations (parallel
//! edges, predecessors) fail at the handle-construction boundary rather
//! than deep in a container call.

use tracing::trace;
use vgraph_store::{GraphKind, Store};

use crate::containers::{AttrMapping, EdgeAttrs, GraphAttrs, NodeAttrs, ParallelEdges, Predecessors, Successors};
use crate::error::{GraphError, Result};
use vgraph_codec::Value;

/// A named graph, bundled with the kind it was created as.
///
/// Borrows its `Store` mutably for its whole lifetime: only one `Graph`
/// handle (or other store borrow) can be live at a time, which is also
/// exactly the rule `redb`'s single-writer transactions already impose.
pub struct Graph<'s> {
    store: &'s mut Store,
    name: String,
    kind: GraphKind,
}

impl<'s> Graph<'s> {
    /// Create `name` as a new graph of `kind` and return a handle to it.
    pub fn create(store: &'s mut Store, name: &str, kind: GraphKind) -> Result<Graph<'s>> {
        store.new_graph(name, kind)?;
        Ok(Graph { store, name: name.to_string(), kind })
    }

    /// Open a handle to the already-existing graph `name`.
    pub fn open(store: &'s mut Store, name: &str) -> Result<Graph<'s>> {
        let kind = store.graph_type(name)?;
        Ok(Graph { store, name: name.to_string(), kind })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn delete(self) -> Result<()> {
        Ok(self.store.del_graph(&self.name)?)
    }

    // --- nodes -----------------------------------------------------------

    pub fn has_node(&self, node: &str) -> Result<bool> {
        Ok(self.store.node_exists(&self.name, node)?)
    }

    pub fn add_node(&mut self, node: &str) -> Result<()> {
        self.store.exist_node(&self.name, node, true)?;
        trace!(graph = %self.name, node, "added node");
        Ok(())
    }

    /// Mark `node` absent. Per SPEC_FULL.md §4.5 this writes a tombstone
    /// at the current `(branch, rev)` rather than erasing history: the
    /// node remains visible at revisions before this one.
    pub fn del_node(&mut self, node: &str) -> Result<()> {
        if !self.has_node(node)? {
            return Err(GraphError::NoSuchNode {
                graph: self.name.clone(),
                node: node.to_string(),
            });
        }
        self.store.exist_node(&self.name, node, false)?;
        trace!(graph = %self.name, node, "deleted node");
        Ok(())
    }

    pub fn nodes(&self) -> Result<Vec<String>> {
        Ok(self.store.nodes_extant(&self.name)?)
    }

    pub fn node_attrs(&mut self, node: &str) -> NodeAttrs<'_> {
        NodeAttrs {
            store: self.store,
            graph: self.name.clone(),
            node: node.to_string(),
        }
    }

    /// `nodes[node] = {attrs}` (SPEC_FULL.md §4.6): mark `node` extant,
    /// then replace its whole attribute container — tombstoning whatever
    /// was there and setting `attrs` — at the current `(branch, rev)`.
    /// Works whether or not `node` existed before the call.
    pub fn replace_node(
        &mut self,
        node: &str,
        attrs: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<()> {
        self.store.exist_node(&self.name, node, true)?;
        self.node_attrs(node).replace(attrs)?;
        trace!(graph = %self.name, node, "replaced node");
        Ok(())
    }

    pub fn attrs(&mut self) -> GraphAttrs<'_> {
        GraphAttrs {
            store: self.store,
            graph: self.name.clone(),
        }
    }

    // --- edges -------------------------------------------------------------

    pub fn has_edge(&self, source: &str, target: &str, idx: i64) -> Result<bool> {
        Ok(self.store.edge_exists(&self.name, source, target, idx)?)
    }

    /// Create an edge `source -> target`, allocating the smallest free
    /// parallel-edge index on a multi-edge graph (always `0` otherwise).
    /// On an undirected graph (`Plain`/`Multi`) also writes the
    /// reciprocal `target -> source` record at the same index, so
    /// [`Graph::successors`] and [`Graph::predecessors`] agree from
    /// either endpoint.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<i64> {
        let idx = if self.kind.is_multi() {
            self.store.next_free_edge_idx(&self.name, source, target)?
        } else {
            0
        };
        self.store.exist_edge(&self.name, source, target, idx, true)?;
        if !self.kind.is_directed() {
            self.store.exist_edge(&self.name, target, source, idx, true)?;
        }
        trace!(graph = %self.name, source, target, idx, "added edge");
        Ok(idx)
    }

    pub fn del_edge(&mut self, source: &str, target: &str, idx: i64) -> Result<()> {
        if !self.has_edge(source, target, idx)? {
            return Err(GraphError::NoSuchEdge {
                graph: self.name.clone(),
                source: source.to_string(),
                target: target.to_string(),
                idx,
            });
        }
        self.store.exist_edge(&self.name, source, target, idx, false)?;
        if !self.kind.is_directed() {
            self.store.exist_edge(&self.name, target, source, idx, false)?;
        }
        trace!(graph = %self.name, source, target, idx, "deleted edge");
        Ok(())
    }

    pub fn successors(&self, source: &str) -> Successors<'_> {
        Successors {
            store: self.store,
            graph: self.name.clone(),
            source: source.to_string(),
        }
    }

    /// The inbound adjacency view of `target`. Only defined on a
    /// directed graph (`Directed`/`MultiDirected`): on an undirected
    /// graph every edge is already written reciprocally, so
    /// [`Graph::successors`] already answers the same question.
    pub fn predecessors(&self, target: &str) -> Result<Predecessors<'_>> {
        if !self.kind.is_directed() {
            return Err(GraphError::WrongGraphKind {
                op: "predecessors",
                kind: self.kind.as_str(),
            });
        }
        Ok(Predecessors {
            store: self.store,
            graph: self.name.clone(),
            target: target.to_string(),
        })
    }

    /// The raw parallel-edge index set between `source` and `target`.
    /// Only defined on a multi-edge graph (`Multi`/`MultiDirected`); on
    /// other kinds the index is always `0` and [`Graph::add_edge`] /
    /// [`Graph::del_edge`] are the whole interface.
    pub fn parallel_edges(&mut self, source: &str, target: &str) -> Result<ParallelEdges<'_>> {
        if !self.kind.is_multi() {
            return Err(GraphError::WrongGraphKind {
                op: "parallel_edges",
                kind: self.kind.as_str(),
            });
        }
        Ok(ParallelEdges {
            store: self.store,
            graph: self.name.clone(),
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    pub fn edge_attrs(&mut self, source: &str, target: &str, idx: i64) -> EdgeAttrs<'_> {
        EdgeAttrs {
            store: self.store,
            graph: self.name.clone(),
            source: source.to_string(),
            target: target.to_string(),
            idx,
        }
    }

    /// `adjacency[source][target] = {attrs}` (SPEC_FULL.md §4.6): mark the
    /// edge at `idx` extant (writing the undirected reciprocal if this
    /// graph is undirected), then replace its whole attribute container.
    /// `idx` is always `0` on a non-multi graph.
    pub fn replace_edge(
        &mut self,
        source: &str,
        target: &str,
        idx: i64,
        attrs: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<()> {
        self.store.exist_edge(&self.name, source, target, idx, true)?;
        if !self.kind.is_directed() {
            self.store.exist_edge(&self.name, target, source, idx, true)?;
        }
        self.edge_attrs(source, target, idx).replace(attrs)?;
        trace!(graph = %self.name, source, target, idx, "replaced edge");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::AttrMapping;
    use vgraph_codec::Value;
    use vgraph_store::StoreConfig;

    fn opened() -> Store {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        store
    }

    #[test]
    fn plain_graph_rejects_predecessors_and_parallel_edges() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        assert!(matches!(
            g.predecessors("x").unwrap_err(),
            GraphError::WrongGraphKind { op: "predecessors", .. }
        ));
        assert!(matches!(
            g.parallel_edges("a", "b").unwrap_err(),
            GraphError::WrongGraphKind { op: "parallel_edges", .. }
        ));
    }

    #[test]
    fn undirected_edge_is_reciprocal() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        g.add_node("a").unwrap();
        g.add_node("b").unwrap();
        g.add_edge("a", "b").unwrap();
        assert!(g.successors("a").keys().unwrap().contains(&"b".to_string()));
        assert!(g.successors("b").keys().unwrap().contains(&"a".to_string()));
    }

    #[test]
    fn directed_graph_distinguishes_predecessors_from_successors() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Directed).unwrap();
        g.add_node("a").unwrap();
        g.add_node("b").unwrap();
        g.add_edge("a", "b").unwrap();
        assert_eq!(g.successors("a").keys().unwrap(), vec!["b".to_string()]);
        assert!(g.successors("b").keys().unwrap().is_empty());
        assert_eq!(g.predecessors("b").unwrap().keys().unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn node_attrs_roundtrip() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        g.add_node("a").unwrap();
        g.node_attrs("a").set("color", Value::text("red")).unwrap();
        assert_eq!(g.node_attrs("a").get("color").unwrap(), Some(Value::text("red")));
        assert_eq!(g.node_attrs("a").keys().unwrap(), vec!["color".to_string()]);
    }

    #[test]
    fn deleting_an_absent_node_is_an_error() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        assert!(matches!(
            g.del_node("ghost").unwrap_err(),
            GraphError::NoSuchNode { .. }
        ));
    }

    #[test]
    fn replace_node_creates_it_and_tombstones_stale_attrs() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        g.add_node("a").unwrap();
        g.node_attrs("a").set("hp", Value::Int(10)).unwrap();
        g.node_attrs("a").set("mana", Value::Int(5)).unwrap();

        g.replace_node("a", [("hp".to_string(), Value::Int(3))]).unwrap();

        assert!(g.has_node("a").unwrap());
        assert_eq!(g.node_attrs("a").get("hp").unwrap(), Some(Value::Int(3)));
        assert_eq!(g.node_attrs("a").get("mana").unwrap(), None);
        assert_eq!(g.node_attrs("a").keys().unwrap(), vec!["hp".to_string()]);
    }

    #[test]
    fn replace_edge_creates_it_with_reciprocal_write_on_undirected_graphs() {
        let mut store = opened();
        let mut g = Graph::create(&mut store, "g", GraphKind::Plain).unwrap();
        g.add_node("a").unwrap();
        g.add_node("b").unwrap();

        g.replace_edge("a", "b", 0, [("weight".to_string(), Value::Int(7))]).unwrap();

        assert!(g.has_edge("a", "b", 0).unwrap());
        assert!(g.has_edge("b", "a", 0).unwrap());
        assert_eq!(g.edge_attrs("b", "a", 0).get("weight").unwrap(), Some(Value::Int(7)));
    }
}
