// SPDX-License-Identifier: MIT OR Apache-2.0
//! The versioned key/value store: owns the `redb::Database` and the
//! [`Cursor`], and exposes the primitive read/write operations every
//! container in `vgraph-graph` is built from.

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, trace};

use crate::config::{Location, StoreConfig};
use crate::cursor::Cursor;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::lookup::{self, Lookup};
use crate::tables::{
    self, BRANCHES, EDGES, EDGES_BY_TARGET, EDGE_VAL, GLOBAL, GRAPHS, GRAPH_VAL, NODES, NODE_VAL,
};
use crate::types::GraphKind;
use vgraph_codec::Value;

/// A branch-and-revision versioned key/value store, backed by a single
/// `redb` file (or a transient in-memory database).
pub struct Store {
    db: Database,
    cursor: Cursor,
}

impl Store {
    /// Open (creating if absent) the database named by `config.location`,
    /// and bootstrap the cursor from whatever `(branch, rev)` is
    /// persisted in `global` — or `("master", 0)` if `initdb` hasn't run
    /// yet.
    pub fn open(config: StoreConfig) -> Result<Store> {
        let db = match &config.location {
            Location::Path(path) => Database::create(path)?,
            Location::InMemory => Database::builder()
                .create_with_backend(redb::backends::InMemoryBackend::new())?,
        };
        let cursor = Cursor::bootstrap(&db, &config)?;
        Ok(Store { db, cursor })
    }

    /// Idempotently seed the schema: an empty store gets `global.branch =
    /// "master"`, `global.rev = 0`, and a `master` row in `branches`
    /// (parented at itself, so a caller asking `parent_rev("master")`
    /// gets a well-defined answer). Safe to call on an already-initialized
    /// store.
    pub fn initdb(&mut self) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let _ = txn.open_table(GLOBAL)?;
            let _ = txn.open_table(BRANCHES)?;
            let _ = txn.open_table(GRAPHS)?;
            let _ = txn.open_table(GRAPH_VAL)?;
            let _ = txn.open_table(NODES)?;
            let _ = txn.open_table(NODE_VAL)?;
            let _ = txn.open_table(EDGES)?;
            let _ = txn.open_table(EDGES_BY_TARGET)?;
            let _ = txn.open_table(EDGE_VAL)?;
        }
        {
            let mut branches = txn.open_table(BRANCHES)?;
            if branches.get(keys::key_branches("master").as_slice())?.is_none() {
                branches.insert(
                    keys::key_branches("master").as_slice(),
                    tables::encode_branch_row("master", 0).as_slice(),
                )?;
            }
        }
        let have_branch = crate::cursor::read_global_text(&self.db.begin_read()?, "branch")?.is_some();
        if !have_branch {
            crate::cursor::write_global_text(&txn, "branch", "master")?;
            crate::cursor::write_global_int(&txn, "rev", 0)?;
        }
        txn.commit()?;
        debug!("store initialized");
        Ok(())
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// `redb` commits every write transaction as it completes, so there is
    /// no separate pending state to flush; this exists so callers that
    /// think in terms of "commit the current unit of work" have something
    /// to call.
    pub fn commit(&self) -> Result<()> {
        Ok(())
    }

    /// Compact the database file and drop the handle.
    pub fn close(mut self) -> Result<()> {
        let _ = self.db.compact();
        Ok(())
    }

    // --- graphs --------------------------------------------------------

    pub fn have_graph(&self, graph: &str) -> Result<bool> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(GRAPHS) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        Ok(table.get(keys::key_graphs(graph).as_slice())?.is_some())
    }

    pub fn new_graph(&mut self, graph: &str, kind: GraphKind) -> Result<()> {
        if self.have_graph(graph)? {
            return Err(StoreError::DuplicateGraph(graph.to_string()));
        }
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(GRAPHS)?;
            table.insert(keys::key_graphs(graph).as_slice(), [kind.to_byte()].as_slice())?;
        }
        txn.commit()?;
        debug!(graph, kind = kind.as_str(), "created graph");
        Ok(())
    }

    pub fn del_graph(&mut self, graph: &str) -> Result<()> {
        if !self.have_graph(graph)? {
            return Err(StoreError::NoSuchGraph(graph.to_string()));
        }
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(GRAPHS)?;
            table.remove(keys::key_graphs(graph).as_slice())?;
        }
        txn.commit()?;
        debug!(graph, "deleted graph");
        Ok(())
    }

    pub fn graph_type(&self, graph: &str) -> Result<GraphKind> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(GRAPHS) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => {
                return Err(StoreError::NoSuchGraph(graph.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let row = table
            .get(keys::key_graphs(graph).as_slice())?
            .ok_or_else(|| StoreError::NoSuchGraph(graph.to_string()))?;
        let byte = row.value().first().copied().unwrap_or(0);
        GraphKind::from_byte(byte)
            .ok_or_else(|| StoreError::Schema(format!("unrecognized graph kind byte {byte}")))
    }

    // --- global ----------------------------------------------------------

    pub fn global_get(&self, key: &str) -> Result<Option<Value>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(GLOBAL) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match table.get(keys::key_global(key).as_slice())? {
            Some(v) => Ok(Some(vgraph_codec::decode(&String::from_utf8_lossy(v.value()))?)),
            None => Ok(None),
        }
    }

    pub fn global_set(&mut self, key: &str, value: &Value) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(GLOBAL)?;
            let encoded = vgraph_codec::encode(value);
            table.insert(keys::key_global(key).as_slice(), encoded.as_bytes())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn global_del(&mut self, key: &str) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(GLOBAL)?;
            table.remove(keys::key_global(key).as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn global_items(&self) -> Result<Vec<(String, Value)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(GLOBAL) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let mut pos = 0;
            let key = keys::read_str(k.value(), &mut pos);
            let value = vgraph_codec::decode(&String::from_utf8_lossy(v.value()))?;
            out.push((key, value));
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    // --- branches ----------------------------------------------------------

    pub fn have_branch(&self, branch: &str) -> Result<bool> {
        self.cursor.have_branch(&self.db, branch)
    }

    pub fn all_branches(&self) -> Result<Vec<(String, String, i64)>> {
        self.cursor.all_branches(&self.db)
    }

    /// Move the cursor to `branch`, creating it (parented at the current
    /// position) if it doesn't exist yet.
    pub fn switch_branch(&mut self, branch: &str) -> Result<()> {
        self.cursor.set_branch(&self.db, branch)
    }

    /// Move the cursor to `rev` within its current branch.
    pub fn switch_rev(&mut self, rev: i64) -> Result<()> {
        self.cursor.set_rev(&self.db, rev)
    }

    /// Explicitly register `name` as a branch parented at `(parent,
    /// parent_rev)`, without moving the cursor. Used when an application
    /// wants to record a branch point ahead of switching to it. A no-op
    /// if the branch already exists.
    pub fn new_branch(&mut self, name: &str, parent: &str, parent_rev: i64) -> Result<()> {
        if self.have_branch(name)? {
            return Ok(());
        }
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(BRANCHES)?;
            table.insert(
                keys::key_branches(name).as_slice(),
                tables::encode_branch_row(parent, parent_rev).as_slice(),
            )?;
        }
        txn.commit()?;
        debug!(branch = name, parent, parent_rev, "registered branch");
        Ok(())
    }

    pub fn parent_rev(&self, branch: &str) -> Result<Option<i64>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(BRANCHES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(table
            .get(keys::key_branches(branch).as_slice())?
            .map(|v| tables::decode_branch_row(v.value()).1))
    }

    /// `(parent, parent_rev)` for `branch`, or `None` if `branch` has no
    /// row yet. Used by `compare`'s changes-from-previous-revision
    /// default (SPEC_FULL.md §4.7).
    pub fn branch_parent(&self, branch: &str) -> Result<Option<(String, i64)>> {
        self.cursor.branch_parent(&self.db, branch)
    }

    // --- nodes ---------------------------------------------------------

    pub fn exist_node(&mut self, graph: &str, node: &str, extant: bool) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let key = keys::key_nodes(graph, node, &branch, rev);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(NODES)?;
            table.insert(key.as_slice(), tables::encode_bool(extant).as_slice())?;
        }
        txn.commit()?;
        trace!(graph, node, extant, "wrote node existence");
        Ok(())
    }

    pub fn node_exists(&self, graph: &str, node: &str) -> Result<bool> {
        lookup::versioned_extant(&self.db, &self.cursor, NODES, |branch| {
            keys::prefix_nodes_branch(graph, node, branch)
        })
    }

    /// All nodes in `graph` currently extant as of the cursor's position.
    /// Correctness-oriented, not index-accelerated: every node name ever
    /// recorded for this graph is a candidate, and each is resolved with
    /// the standard versioned lookup.
    pub fn nodes_extant(&self, graph: &str) -> Result<Vec<String>> {
        let candidates = self.distinct_column(NODES, &keys::prefix_nodes_graph(graph), |buf| {
            keys::parse_nodes_key(buf).1
        })?;
        let mut out = Vec::new();
        for node in candidates {
            if self.node_exists(graph, &node)? {
                out.push(node);
            }
        }
        out.sort();
        Ok(out)
    }

    // --- node_val --------------------------------------------------------

    pub fn node_val_get(&self, graph: &str, node: &str, key: &str) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup(NODE_VAL, |branch| {
            keys::prefix_node_val_branch(graph, node, key, branch)
        })
    }

    pub fn node_val_set(&mut self, graph: &str, node: &str, key: &str, value: &Value) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let encoded = vgraph_codec::encode(value);
        let k = keys::key_node_val(graph, node, key, &branch, rev);
        self.write_tagged(NODE_VAL, &k, Some(encoded.as_str()))
    }

    pub fn node_val_del(&mut self, graph: &str, node: &str, key: &str) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let k = keys::key_node_val(graph, node, key, &branch, rev);
        self.write_tagged(NODE_VAL, &k, None)
    }

    pub fn node_val_keys(&self, graph: &str, node: &str) -> Result<Vec<String>> {
        let candidates = self.distinct_column(NODE_VAL, &keys::prefix_node_val_node(graph, node), |buf| {
            keys::parse_node_val_key(buf).2
        })?;
        let mut out = Vec::new();
        for key in candidates {
            if self.node_val_get(graph, node, &key)?.is_present() {
                out.push(key);
            }
        }
        out.sort();
        Ok(out)
    }

    // --- edges -----------------------------------------------------------

    pub fn exist_edge(&mut self, graph: &str, source: &str, target: &str, idx: i64, extant: bool) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let primary = keys::key_edges(graph, source, target, idx, &branch, rev);
        let secondary = keys::key_edges_by_target(graph, source, target, idx, &branch, rev);
        let value = tables::encode_bool(extant);
        let txn = self.db.begin_write()?;
        {
            let mut edges = txn.open_table(EDGES)?;
            edges.insert(primary.as_slice(), value.as_slice())?;
            let mut by_target = txn.open_table(EDGES_BY_TARGET)?;
            by_target.insert(secondary.as_slice(), value.as_slice())?;
        }
        txn.commit()?;
        trace!(graph, source, target, idx, extant, "wrote edge existence");
        Ok(())
    }

    pub fn edge_exists(&self, graph: &str, source: &str, target: &str, idx: i64) -> Result<bool> {
        lookup::versioned_extant(&self.db, &self.cursor, EDGES, |branch| {
            keys::prefix_edges_branch(graph, source, target, idx, branch)
        })
    }

    /// Successors of `source`: targets reachable via an extant edge.
    pub fn targets_of(&self, graph: &str, source: &str) -> Result<Vec<String>> {
        let candidates = self.distinct_column(EDGES, &keys::prefix_edges_source(graph, source), |buf| {
            keys::parse_edges_key(buf).2
        })?;
        let mut out = Vec::new();
        for target in candidates {
            if !self.multi_edges(graph, source, &target)?.is_empty() {
                out.push(target);
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }

    /// Predecessors of `target`: sources of an extant edge into it, read
    /// from the secondary index so this doesn't need a full table scan.
    pub fn sources_of(&self, graph: &str, target: &str) -> Result<Vec<String>> {
        let candidates =
            self.distinct_column(EDGES_BY_TARGET, &keys::prefix_edges_by_target(graph, target), |buf| {
                keys::parse_edges_by_target_key(buf).2
            })?;
        let mut out = Vec::new();
        for source in candidates {
            if !self.multi_edges(graph, &source, target)?.is_empty() {
                out.push(source);
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }

    /// Every currently-extant parallel-edge index between `source` and
    /// `target`, ascending. For a non-multi graph this is `[]` or `[0]`.
    pub fn multi_edges(&self, graph: &str, source: &str, target: &str) -> Result<Vec<i64>> {
        let candidates = self.distinct_column(EDGES, &keys::prefix_edges_pair(graph, source, target), |buf| {
            keys::parse_edges_key(buf).3
        })?;
        let mut out = Vec::new();
        for idx in candidates {
            if self.edge_exists(graph, source, target, idx as i64)? {
                out.push(idx as i64);
            }
        }
        out.sort_unstable();
        Ok(out)
    }

    /// The smallest non-negative integer not already in use as a parallel
    /// edge index between `source` and `target`.
    pub fn next_free_edge_idx(&self, graph: &str, source: &str, target: &str) -> Result<i64> {
        let taken = self.multi_edges(graph, source, target)?;
        let mut candidate = 0i64;
        for idx in taken {
            if idx == candidate {
                candidate += 1;
            } else if idx > candidate {
                break;
            }
        }
        Ok(candidate)
    }

    // --- edge_val --------------------------------------------------------

    pub fn edge_val_get(&self, graph: &str, source: &str, target: &str, idx: i64, key: &str) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup(EDGE_VAL, |branch| {
            keys::prefix_edge_val_branch(graph, source, target, idx, key, branch)
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn edge_val_set(
        &mut self,
        graph: &str,
        source: &str,
        target: &str,
        idx: i64,
        key: &str,
        value: &Value,
    ) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let encoded = vgraph_codec::encode(value);
        let k = keys::key_edge_val(graph, source, target, idx, key, &branch, rev);
        self.write_tagged(EDGE_VAL, &k, Some(encoded.as_str()))
    }

    pub fn edge_val_del(&mut self, graph: &str, source: &str, target: &str, idx: i64, key: &str) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let k = keys::key_edge_val(graph, source, target, idx, key, &branch, rev);
        self.write_tagged(EDGE_VAL, &k, None)
    }

    pub fn edge_val_keys(&self, graph: &str, source: &str, target: &str, idx: i64) -> Result<Vec<String>> {
        let candidates = self.distinct_column(
            EDGE_VAL,
            &keys::prefix_edge_val_idx(graph, source, target, idx),
            |buf| keys::parse_edge_val_key(buf).4,
        )?;
        let mut out = Vec::new();
        for key in candidates {
            if self.edge_val_get(graph, source, target, idx, &key)?.is_present() {
                out.push(key);
            }
        }
        out.sort();
        Ok(out)
    }

    // --- graph_val -------------------------------------------------------

    pub fn graph_val_get(&self, graph: &str, key: &str) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup(GRAPH_VAL, |branch| keys::prefix_graph_val_branch(graph, key, branch))
    }

    pub fn graph_val_set(&mut self, graph: &str, key: &str, value: &Value) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let encoded = vgraph_codec::encode(value);
        let k = keys::key_graph_val(graph, key, &branch, rev);
        self.write_tagged(GRAPH_VAL, &k, Some(encoded.as_str()))
    }

    pub fn graph_val_del(&mut self, graph: &str, key: &str) -> Result<()> {
        let (branch, rev) = (self.cursor.branch().to_string(), self.cursor.rev());
        let k = keys::key_graph_val(graph, key, &branch, rev);
        self.write_tagged(GRAPH_VAL, &k, None)
    }

    pub fn graph_val_keys(&self, graph: &str) -> Result<Vec<String>> {
        let candidates = self.distinct_column(GRAPH_VAL, &keys::prefix_graph_val_graph(graph), |buf| {
            keys::parse_graph_val_key(buf).1
        })?;
        let mut out = Vec::new();
        for key in candidates {
            if self.graph_val_get(graph, &key)?.is_present() {
                out.push(key);
            }
        }
        out.sort();
        Ok(out)
    }

    // --- point lookups at an arbitrary (branch, rev), used by `compare` ---

    pub fn graph_val_get_at(&self, graph: &str, key: &str, branch: &str, rev: i64) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup_at(GRAPH_VAL, branch, rev, |b| keys::prefix_graph_val_branch(graph, key, b))
    }

    pub fn node_val_get_at(&self, graph: &str, node: &str, key: &str, branch: &str, rev: i64) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup_at(NODE_VAL, branch, rev, |b| keys::prefix_node_val_branch(graph, node, key, b))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn edge_val_get_at(
        &self,
        graph: &str,
        source: &str,
        target: &str,
        idx: i64,
        key: &str,
        branch: &str,
        rev: i64,
    ) -> Result<Lookup<Value>> {
        self.decode_tagged_lookup_at(EDGE_VAL, branch, rev, |b| {
            keys::prefix_edge_val_branch(graph, source, target, idx, key, b)
        })
    }

    pub fn node_exists_at(&self, graph: &str, node: &str, branch: &str, rev: i64) -> Result<bool> {
        lookup::versioned_extant_at(&self.db, &self.cursor, branch, rev, NODES, |b| {
            keys::prefix_nodes_branch(graph, node, b)
        })
    }

    pub fn edge_exists_at(&self, graph: &str, source: &str, target: &str, idx: i64, branch: &str, rev: i64) -> Result<bool> {
        lookup::versioned_extant_at(&self.db, &self.cursor, branch, rev, EDGES, |b| {
            keys::prefix_edges_branch(graph, source, target, idx, b)
        })
    }

    /// Every node name ever recorded for `graph`, regardless of branch —
    /// the candidate set `compare` resolves at each of its two points.
    pub fn all_known_nodes(&self, graph: &str) -> Result<Vec<String>> {
        self.distinct_column(NODES, &keys::prefix_nodes_graph(graph), |buf| keys::parse_nodes_key(buf).1)
    }

    /// Every `(source, target, idx)` edge triple ever recorded for
    /// `graph`.
    pub fn all_known_edges(&self, graph: &str) -> Result<Vec<(String, String, i64)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(EDGES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        // `prefix_nodes_graph` just length-prefixes `graph`, which is
        // exactly the leading column of `edges` too.
        let prefix = crate::keys::prefix_nodes_graph(graph);
        let mut seen = std::collections::BTreeSet::new();
        for entry in table.range(prefix.as_slice()..)? {
            let (k, _) = entry?;
            if !k.value().starts_with(prefix.as_slice()) {
                break;
            }
            let (_, source, target, idx, _, _) = keys::parse_edges_key(k.value());
            seen.insert((source, target, idx as i64));
        }
        Ok(seen.into_iter().collect())
    }

    pub fn all_known_graph_keys(&self, graph: &str) -> Result<Vec<String>> {
        self.distinct_column(GRAPH_VAL, &keys::prefix_graph_val_graph(graph), |buf| {
            keys::parse_graph_val_key(buf).1
        })
    }

    pub fn all_known_node_keys(&self, graph: &str, node: &str) -> Result<Vec<String>> {
        self.distinct_column(NODE_VAL, &keys::prefix_node_val_node(graph, node), |buf| {
            keys::parse_node_val_key(buf).2
        })
    }

    pub fn all_known_edge_keys(&self, graph: &str, source: &str, target: &str, idx: i64) -> Result<Vec<String>> {
        self.distinct_column(EDGE_VAL, &keys::prefix_edge_val_idx(graph, source, target, idx), |buf| {
            keys::parse_edge_val_key(buf).4
        })
    }

    // --- raw dumps, used by vgraph-graph's compare/window -----------------

    /// Every `(graph, key, branch, rev, decoded value-or-tombstone)` row
    /// ever written to `graph_val`, unfiltered by cursor position. The
    /// diff/window operations in the layer above select out of this by
    /// branch and rev range themselves.
    pub fn dump_graph_val(&self) -> Result<Vec<(String, String, String, i64, Option<Value>)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(GRAPH_VAL) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let (graph, key, branch, rev) = keys::parse_graph_val_key(k.value());
            let value = match tables::decode_tagged(v.value()) {
                Some(text) => Some(vgraph_codec::decode(&text)?),
                None => None,
            };
            out.push((graph, key, branch, rev as i64, value));
        }
        Ok(out)
    }

    pub fn dump_node_val(&self) -> Result<Vec<(String, String, String, String, i64, Option<Value>)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(NODE_VAL) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let (graph, node, key, branch, rev) = keys::parse_node_val_key(k.value());
            let value = match tables::decode_tagged(v.value()) {
                Some(text) => Some(vgraph_codec::decode(&text)?),
                None => None,
            };
            out.push((graph, node, key, branch, rev as i64, value));
        }
        Ok(out)
    }

    pub fn dump_edge_val(&self) -> Result<Vec<(String, String, String, i64, String, String, i64, Option<Value>)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(EDGE_VAL) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let (graph, source, target, idx, key, branch, rev) = keys::parse_edge_val_key(k.value());
            let value = match tables::decode_tagged(v.value()) {
                Some(text) => Some(vgraph_codec::decode(&text)?),
                None => None,
            };
            out.push((graph, source, target, idx as i64, key, branch, rev as i64, value));
        }
        Ok(out)
    }

    /// Every `(graph, node, branch, rev, extant)` row ever written to
    /// `nodes`, unfiltered by cursor position.
    pub fn dump_nodes(&self) -> Result<Vec<(String, String, String, i64, bool)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(NODES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let (graph, node, branch, rev) = keys::parse_nodes_key(k.value());
            out.push((graph, node, branch, rev as i64, tables::decode_bool(v.value())));
        }
        Ok(out)
    }

    /// Every `(graph, source, target, idx, branch, rev, extant)` row ever
    /// written to `edges`, unfiltered by cursor position. Reads the
    /// primary table, not the `edges_by_target` index, so each edge
    /// appears once regardless of direction.
    pub fn dump_edges(&self) -> Result<Vec<(String, String, String, i64, String, i64, bool)>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(EDGES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let (graph, source, target, idx, branch, rev) = keys::parse_edges_key(k.value());
            out.push((graph, source, target, idx as i64, branch, rev as i64, tables::decode_bool(v.value())));
        }
        Ok(out)
    }

    // --- internal helpers --------------------------------------------------

    fn decode_tagged_lookup(
        &self,
        table: redb::TableDefinition<&[u8], &[u8]>,
        prefix_for_branch: impl Fn(&str) -> Vec<u8>,
    ) -> Result<Lookup<Value>> {
        match lookup::versioned_tagged(&self.db, &self.cursor, table, prefix_for_branch)? {
            Lookup::Never => Ok(Lookup::Never),
            Lookup::Tombstoned => Ok(Lookup::Tombstoned),
            Lookup::Present(text) => Ok(Lookup::Present(vgraph_codec::decode(&text)?)),
        }
    }

    fn decode_tagged_lookup_at(
        &self,
        table: redb::TableDefinition<&[u8], &[u8]>,
        branch: &str,
        rev: i64,
        prefix_for_branch: impl Fn(&str) -> Vec<u8>,
    ) -> Result<Lookup<Value>> {
        match lookup::versioned_tagged_at(&self.db, &self.cursor, branch, rev, table, prefix_for_branch)? {
            Lookup::Never => Ok(Lookup::Never),
            Lookup::Tombstoned => Ok(Lookup::Tombstoned),
            Lookup::Present(text) => Ok(Lookup::Present(vgraph_codec::decode(&text)?)),
        }
    }

    fn write_tagged(&mut self, table: redb::TableDefinition<&[u8], &[u8]>, key: &[u8], value: Option<&str>) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            let mut t = txn.open_table(table)?;
            t.insert(key, tables::encode_tagged(value).as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Distinct values of one parsed key column within `prefix`, found by
    /// scanning every row sharing that prefix. Used to build candidate
    /// sets for keyset-style operations (`*_keys`, `nodes_extant`,
    /// `sources_of`, `targets_of`, `multi_edges`), each of which then
    /// resolves every candidate through the versioned lookup to decide
    /// whether it's actually present as of the cursor.
    fn distinct_column(
        &self,
        table: redb::TableDefinition<&[u8], &[u8]>,
        prefix: &[u8],
        extract: fn(&[u8]) -> String,
    ) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let t = match txn.open_table(table) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut seen = std::collections::BTreeSet::new();
        for entry in t.range(prefix..)? {
            let (k, _) = entry?;
            if !k.value().starts_with(prefix) {
                break;
            }
            seen.insert(extract(k.value()));
        }
        Ok(seen.into_iter().collect())
    }

}
