// SPDX-License-Identifier: MIT OR Apache-2.0
//! Branch-and-revision versioned key/value storage.
//!
//! This crate owns the physical layout: the `redb` tables, the byte-key
//! encoding that lets "latest record at or before a revision" be answered
//! with a range scan, the `(branch, rev)` cursor and its ancestor walk,
//! and the [`Store`] primitives everything else is built from. It knows
//! nothing about graphs, nodes, or edges as domain concepts — that's
//! `vgraph-graph`'s job — only about versioned columns of bytes.

pub mod config;
pub mod cursor;
pub mod error;
pub mod keys;
pub mod lookup;
pub mod store;
pub mod tables;
pub mod types;

pub use config::{Location, StoreConfig};
pub use cursor::Cursor;
pub use error::{Result, StoreError};
pub use lookup::Lookup;
pub use store::Store;
pub use types::GraphKind;

pub use vgraph_codec::Value;
