// SPDX-License-Identifier: MIT OR Apache-2.0
//! `vgraph`: a persistent, branch-and-revision versioned graph store.
//!
//! This crate is the public entry point. It re-exports the pieces built
//! in [`vgraph_codec`] (the atomic value codec), [`vgraph_store`] (the
//! versioned key/value layer and its `(branch, rev)` cursor), and
//! [`vgraph_graph`] (the typed graph handle, its six mapping containers,
//! and the `compare`/`window` diff operations), and adds the single
//! [`VGraph`] struct most callers actually construct.
//!
//! ```no_run
//! use vgraph::{GraphKind, StoreConfig, VGraph, Value};
//!
//! # fn main() -> vgraph::Result<()> {
//! let mut db = VGraph::open(StoreConfig::at_path("world.vgraph"))?;
//! db.initdb()?;
//!
//! let mut g = db.create_graph("social", GraphKind::Directed)?;
//! g.add_node("alice")?;
//! g.add_node("bob")?;
//! g.add_edge("alice", "bob")?;
//! g.node_attrs("alice").set("name", Value::text("Alice"))?;
//! # Ok(())
//! # }
//! ```

use thiserror::Error;
use tracing::debug;

pub use vgraph_codec::{EncodingError, Value};
pub use vgraph_graph::{
    compare, compare_from_previous, window, AttrMapping, Change, EdgeAttrs, Graph, GraphAttrs,
    GraphError, NodeAttrs, ParallelEdges, Predecessors, Successors, WindowRecord,
};
pub use vgraph_store::{GraphKind, Location, Lookup, Store, StoreConfig, StoreError};

/// The union of every error kind raised anywhere in `vgraph`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A handle to one versioned graph database.
///
/// Thin wrapper around [`Store`]: owns it, forwards schema and branch
/// administration, and hands out [`Graph`] handles scoped to its
/// lifetime. Most applications only ever touch this type and the
/// [`Graph`]/container types it returns.
pub struct VGraph {
    store: Store,
}

impl VGraph {
    /// Open (creating if absent) the database named by `config`.
    pub fn open(config: StoreConfig) -> Result<VGraph> {
        let store = Store::open(config)?;
        Ok(VGraph { store })
    }

    /// Seed the schema if this is a fresh database. Safe to call
    /// unconditionally; a no-op on an already-initialized one.
    pub fn initdb(&mut self) -> Result<()> {
        self.store.initdb()?;
        debug!("vgraph initialized");
        Ok(())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn have_graph(&self, name: &str) -> Result<bool> {
        Ok(self.store.have_graph(name)?)
    }

    pub fn create_graph(&mut self, name: &str, kind: GraphKind) -> Result<Graph<'_>> {
        Ok(Graph::create(&mut self.store, name, kind)?)
    }

    pub fn graph(&mut self, name: &str) -> Result<Graph<'_>> {
        Ok(Graph::open(&mut self.store, name)?)
    }

    pub fn branch(&self) -> &str {
        self.store.cursor().branch()
    }

    pub fn rev(&self) -> i64 {
        self.store.cursor().rev()
    }

    pub fn switch_branch(&mut self, branch: &str) -> Result<()> {
        Ok(self.store.switch_branch(branch)?)
    }

    pub fn switch_rev(&mut self, rev: i64) -> Result<()> {
        Ok(self.store.switch_rev(rev)?)
    }

    pub fn all_branches(&self) -> Result<Vec<(String, String, i64)>> {
        Ok(self.store.all_branches()?)
    }

    /// Resolve `graph` at two `(branch, rev)` points and report what
    /// differs. See [`vgraph_graph::compare`].
    pub fn compare(&self, graph: &str, b1: &str, r1: i64, b2: &str, r2: i64) -> Result<Vec<Change>> {
        Ok(compare(&self.store, graph, b1, r1, b2, r2)?)
    }

    /// `compare` against the implicit previous-revision point: the
    /// current cursor position versus one rev earlier in the same
    /// branch, or the parent branch's fork point if the cursor sits
    /// exactly at the start of its branch. See
    /// [`vgraph_graph::compare_from_previous`].
    pub fn compare_from_previous(&self, graph: &str) -> Result<Vec<Change>> {
        Ok(compare_from_previous(&self.store, graph)?)
    }

    /// Every record `branch` wrote to `graph` within `[rev_from,
    /// rev_to]`. See [`vgraph_graph::window`].
    pub fn window(&self, graph: &str, branch: &str, rev_from: i64, rev_to: i64) -> Result<Vec<WindowRecord>> {
        Ok(window(&self.store, graph, branch, rev_from, rev_to)?)
    }
}
