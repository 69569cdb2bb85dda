// SPDX-License-Identifier: MIT OR Apache-2.0
//! The mapping-style capability surface over versioned storage: six
//! small handles, each borrowing the graph's [`vgraph_store::Store`]
//! mutably for the duration of a call and forwarding to the matching
//! `*_val`/`nodes`/`edges` primitives.

use vgraph_store::{Lookup, Store, Value};

use crate::error::{GraphError, Result};

/// Common shape of the three attribute containers (graph/node/edge
/// attrs): string keys mapping to codec [`Value`]s, with NULL-as-
/// tombstone semantics.
pub trait AttrMapping {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Like [`AttrMapping::get`], but distinguishes "never set"
    /// ([`GraphError::KeyNever`]) from "deleted"
    /// ([`GraphError::KeyNotSet`]) instead of collapsing both to `None`.
    fn get_checked(&self, key: &str) -> Result<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn del(&mut self, key: &str) -> Result<()>;
    fn keys(&self) -> Result<Vec<String>>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Replace the whole container: tombstone every key currently
    /// present, then set every `(key, value)` pair from `values`
    /// (SPEC_FULL.md §4.6, "Replacing a whole container"). A key present
    /// both before and after this call is tombstoned and then
    /// immediately re-set at the same `(branch, rev)` — the later write
    /// wins, matching the spec's "clear, then iterate new values" order.
    fn replace(&mut self, values: impl IntoIterator<Item = (String, Value)>) -> Result<()> {
        for key in self.keys()? {
            self.del(&key)?;
        }
        for (key, value) in values {
            self.set(&key, value)?;
        }
        Ok(())
    }
}

fn resolve(key: &str, lookup: Lookup<Value>) -> Result<Value> {
    match lookup {
        Lookup::Present(v) => Ok(v),
        Lookup::Tombstoned => Err(GraphError::KeyNotSet { key: key.to_string() }),
        Lookup::Never => Err(GraphError::KeyNever { key: key.to_string() }),
    }
}

/// Attributes of a whole graph (`graph_val`).
pub struct GraphAttrs<'g> {
    pub(crate) store: &'g mut Store,
    pub(crate) graph: String,
}

impl AttrMapping for GraphAttrs<'_> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.store.graph_val_get(&self.graph, key)?.into_option())
    }

    fn get_checked(&self, key: &str) -> Result<Value> {
        resolve(key, self.store.graph_val_get(&self.graph, key)?)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        Ok(self.store.graph_val_set(&self.graph, key, &value)?)
    }

    fn del(&mut self, key: &str) -> Result<()> {
        Ok(self.store.graph_val_del(&self.graph, key)?)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.graph_val_keys(&self.graph)?)
    }
}

/// Attributes of one node (`node_val`).
pub struct NodeAttrs<'g> {
    pub(crate) store: &'g mut Store,
    pub(crate) graph: String,
    pub(crate) node: String,
}

impl AttrMapping for NodeAttrs<'_> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.store.node_val_get(&self.graph, &self.node, key)?.into_option())
    }

    fn get_checked(&self, key: &str) -> Result<Value> {
        resolve(key, self.store.node_val_get(&self.graph, &self.node, key)?)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        Ok(self.store.node_val_set(&self.graph, &self.node, key, &value)?)
    }

    fn del(&mut self, key: &str) -> Result<()> {
        Ok(self.store.node_val_del(&self.graph, &self.node, key)?)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.node_val_keys(&self.graph, &self.node)?)
    }
}

/// Attributes of one edge (`edge_val`), identified by its endpoints and
/// parallel-edge index (always `0` on a non-multi graph).
pub struct EdgeAttrs<'g> {
    pub(crate) store: &'g mut Store,
    pub(crate) graph: String,
    pub(crate) source: String,
    pub(crate) target: String,
    pub(crate) idx: i64,
}

impl AttrMapping for EdgeAttrs<'_> {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .edge_val_get(&self.graph, &self.source, &self.target, self.idx, key)?
            .into_option())
    }

    fn get_checked(&self, key: &str) -> Result<Value> {
        resolve(
            key,
            self.store
                .edge_val_get(&self.graph, &self.source, &self.target, self.idx, key)?,
        )
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        Ok(self
            .store
            .edge_val_set(&self.graph, &self.source, &self.target, self.idx, key, &value)?)
    }

    fn del(&mut self, key: &str) -> Result<()> {
        Ok(self
            .store
            .edge_val_del(&self.graph, &self.source, &self.target, self.idx, key)?)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.edge_val_keys(&self.graph, &self.source, &self.target, self.idx)?)
    }
}

/// The adjacency view from one node outward: which targets it has an
/// extant edge to.
pub struct Successors<'g> {
    pub(crate) store: &'g Store,
    pub(crate) graph: String,
    pub(crate) source: String,
}

impl Successors<'_> {
    pub fn contains(&self, target: &str) -> Result<bool> {
        Ok(!self.store.multi_edges(&self.graph, &self.source, target)?.is_empty())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.targets_of(&self.graph, &self.source)?)
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }
}

/// The adjacency view from one node inward: which sources have an
/// extant edge into it. Only constructible on a directed graph — see
/// [`crate::Graph::predecessors`].
pub struct Predecessors<'g> {
    pub(crate) store: &'g Store,
    pub(crate) graph: String,
    pub(crate) target: String,
}

impl Predecessors<'_> {
    pub fn contains(&self, source: &str) -> Result<bool> {
        Ok(!self.store.multi_edges(&self.graph, source, &self.target)?.is_empty())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.store.sources_of(&self.graph, &self.target)?)
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }
}

/// The set of currently-extant parallel-edge indices between one
/// ordered `(source, target)` pair. Only constructible on a multi-edge
/// graph — see [`crate::Graph::parallel_edges`]; on other graph kinds
/// an edge's index is always `0` and [`crate::Graph::add_edge`] /
/// [`crate::Graph::del_edge`] handle it directly.
pub struct ParallelEdges<'g> {
    pub(crate) store: &'g mut Store,
    pub(crate) graph: String,
    pub(crate) source: String,
    pub(crate) target: String,
}

impl ParallelEdges<'_> {
    pub fn contains(&self, idx: i64) -> Result<bool> {
        Ok(self.store.edge_exists(&self.graph, &self.source, &self.target, idx)?)
    }

    pub fn keys(&self) -> Result<Vec<i64>> {
        Ok(self.store.multi_edges(&self.graph, &self.source, &self.target)?)
    }

    pub fn size(&self) -> Result<usize> {
        Ok(self.keys()?.len())
    }

    /// Allocate the smallest free index and mark it extant. Does not
    /// perform the undirected reciprocal write; use
    /// [`crate::Graph::add_edge`] unless you specifically want the raw,
    /// one-directional structural view.
    pub fn add(&mut self) -> Result<i64> {
        let idx = self.store.next_free_edge_idx(&self.graph, &self.source, &self.target)?;
        self.store.exist_edge(&self.graph, &self.source, &self.target, idx, true)?;
        Ok(idx)
    }

    pub fn del(&mut self, idx: i64) -> Result<()> {
        Ok(self.store.exist_edge(&self.graph, &self.source, &self.target, idx, false)?)
    }
}
