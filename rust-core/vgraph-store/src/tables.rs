// SPDX-License-Identifier: MIT OR Apache-2.0
//! `redb` table definitions for the eight logical tables of SPEC_FULL.md
//! §3, plus the one secondary index (`EDGES_BY_TARGET`) predecessor
//! lookups need.
//!
//! All tables are keyed and valued by raw bytes; [`crate::keys`] builds
//! the keys, and value encoding is documented per table below.

use redb::TableDefinition;

/// `key -> encoded Value text` (UTF-8 bytes of `vgraph_codec::encode`).
/// Always present once `initdb` has run; never tombstoned.
pub const GLOBAL: TableDefinition<&[u8], &[u8]> = TableDefinition::new("global");

/// `branch -> encode_branch_row(parent, parent_rev)`.
pub const BRANCHES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("branches");

/// `graph -> kind byte` (see [`crate::GraphKind::to_byte`]).
pub const GRAPHS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("graphs");

/// `(graph, key, branch, rev) -> tagged value`: first byte `0` is a
/// tombstone (NULL), first byte `1` is followed by the encoded value text.
pub const GRAPH_VAL: TableDefinition<&[u8], &[u8]> = TableDefinition::new("graph_val");

/// `(graph, node, branch, rev) -> single extant byte (0/1)`.
pub const NODES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("nodes");

/// `(graph, node, key, branch, rev) -> tagged value`, same tagging as
/// `GRAPH_VAL`.
pub const NODE_VAL: TableDefinition<&[u8], &[u8]> = TableDefinition::new("node_val");

/// `(graph, source, target, idx, branch, rev) -> single extant byte (0/1)`.
pub const EDGES: TableDefinition<&[u8], &[u8]> = TableDefinition::new("edges");

/// Secondary index mirroring `EDGES` with `(graph, target, source, idx,
/// branch, rev)` ordering, maintained by every `EDGES` writer so
/// predecessor lookups don't need a full-table scan. Value is the same
/// extant byte as the primary record.
pub const EDGES_BY_TARGET: TableDefinition<&[u8], &[u8]> = TableDefinition::new("edges_by_target");

/// `(graph, source, target, idx, key, branch, rev) -> tagged value`, same
/// tagging as `GRAPH_VAL`.
pub const EDGE_VAL: TableDefinition<&[u8], &[u8]> = TableDefinition::new("edge_val");

/// Tag byte marking a tombstone (unset) record in a `*_val` table.
pub const TOMBSTONE: u8 = 0;
/// Tag byte marking a present-value record in a `*_val` table.
pub const PRESENT: u8 = 1;

/// Encode a tombstone-or-present value column.
pub fn encode_tagged(value: Option<&str>) -> Vec<u8> {
    match value {
        None => vec![TOMBSTONE],
        Some(text) => {
            let mut v = Vec::with_capacity(1 + text.len());
            v.push(PRESENT);
            v.extend_from_slice(text.as_bytes());
            v
        }
    }
}

/// Decode a tombstone-or-present value column. Returns `None` for a
/// tombstone, `Some(text)` for a present encoded value.
pub fn decode_tagged(bytes: &[u8]) -> Option<String> {
    match bytes.first() {
        Some(&TOMBSTONE) | None => None,
        Some(&PRESENT) => Some(String::from_utf8_lossy(&bytes[1..]).into_owned()),
        Some(_) => None,
    }
}

pub fn encode_bool(b: bool) -> Vec<u8> {
    vec![b as u8]
}

pub fn decode_bool(bytes: &[u8]) -> bool {
    bytes.first().copied().unwrap_or(0) != 0
}

/// Encode a `branches` row value: `parent` name plus `parent_rev`.
pub fn encode_branch_row(parent: &str, parent_rev: i64) -> Vec<u8> {
    let mut v = Vec::new();
    crate::keys::push_str(&mut v, parent);
    crate::keys::push_u64(&mut v, crate::keys::rev_to_u64(parent_rev));
    v
}

/// Decode a `branches` row value back into `(parent, parent_rev)`.
pub fn decode_branch_row(bytes: &[u8]) -> (String, i64) {
    let mut pos = 0;
    let parent = crate::keys::read_str(bytes, &mut pos);
    let parent_rev = crate::keys::read_u64(bytes, &mut pos) as i64;
    (parent, parent_rev)
}
