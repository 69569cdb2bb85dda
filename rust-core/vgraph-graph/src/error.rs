// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by the graph-shaped surface over `vgraph-store`.

use thiserror::Error;

/// Failures raised by [`crate::Graph`] and its six mapping containers.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The underlying versioned store reported a failure.
    #[error(transparent)]
    Store(#[from] vgraph_store::StoreError),

    /// An operation named a node absent from the graph as of the cursor.
    #[error("no such node {node:?} in graph {graph:?}")]
    NoSuchNode { graph: String, node: String },

    /// An operation named an edge absent from the graph as of the cursor.
    #[error("no such edge {source:?} -> {target:?} (idx {idx}) in graph {graph:?}")]
    NoSuchEdge {
        graph: String,
        source: String,
        target: String,
        idx: i64,
    },

    /// A key was explicitly deleted (tombstoned): distinct from
    /// [`GraphError::KeyNever`], which this key was never set at all.
    #[error("key {key:?} was deleted as of this revision")]
    KeyNotSet { key: String },

    /// A key has no record anywhere in the ancestor chain: it was never
    /// set, as opposed to having been set and later deleted.
    #[error("key {key:?} was never set")]
    KeyNever { key: String },

    /// A container operation that only makes sense on one graph shape
    /// (e.g. `predecessors` on a `plain` graph, or parallel-edge indexing
    /// on a non-multi graph) was invoked on a graph of a different kind.
    #[error("operation {op:?} is not defined on a {kind:?} graph")]
    WrongGraphKind { op: &'static str, kind: &'static str },
}

pub type Result<T> = std::result::Result<T, GraphError>;
