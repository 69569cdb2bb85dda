// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph-shaped surface over [`vgraph_store`]: a typed [`Graph`] handle,
//! the six mapping-style containers built on it, and the `compare`/
//! `window` diff operations.

pub mod containers;
pub mod diff;
pub mod error;
pub mod graph;

pub use containers::{AttrMapping, EdgeAttrs, GraphAttrs, NodeAttrs, ParallelEdges, Predecessors, Successors};
pub use diff::{compare, compare_from_previous, window, Change, WindowRecord};
pub use error::{GraphError, Result};
pub use graph::Graph;

pub use vgraph_store::{GraphKind, Store, StoreConfig};
pub use vgraph_codec::Value;
