// SPDX-License-Identifier: MIT OR Apache-2.0
//! Byte-key encoding for the versioned tables.
//!
//! This is the replacement for the original's named SQL statements (see
//! SPEC_FULL.md §4.2): each logical table is a `redb` table keyed by its
//! primary-key columns packed into an ordered byte string, so that
//! "latest record with `rev <= target` in this branch" becomes a bounded
//! range scan instead of a `MAX(rev) GROUP BY` join.
//!
//! Every variable-length column (graph/node/key names, branch names) is
//! length-prefixed with a 4-byte big-endian length so that no encoded
//! column is ever a byte-prefix of a different column's encoding — two
//! keys can only share a byte prefix when they share the same columns up
//! to that point. Fixed-width integer columns (`rev`, edge `idx`) are
//! encoded as 8-byte big-endian `u64`, which makes byte order equal
//! numeric order.

/// Append a length-prefixed string to `buf`.
pub fn push_str(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

/// Append a fixed-width big-endian `u64` to `buf`.
pub fn push_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Read a length-prefixed string starting at `*pos`, advancing `*pos`.
pub fn read_str(buf: &[u8], pos: &mut usize) -> String {
    let len = u32::from_be_bytes(buf[*pos..*pos + 4].try_into().unwrap()) as usize;
    *pos += 4;
    let s = String::from_utf8_lossy(&buf[*pos..*pos + len]).into_owned();
    *pos += len;
    s
}

/// Read a fixed-width big-endian `u64` starting at `*pos`, advancing `*pos`.
pub fn read_u64(buf: &[u8], pos: &mut usize) -> u64 {
    let v = u64::from_be_bytes(buf[*pos..*pos + 8].try_into().unwrap());
    *pos += 8;
    v
}

/// `rev` is non-negative by construction (the cursor rejects negative
/// writes); this module only ever encodes `u64`.
pub fn rev_to_u64(rev: i64) -> u64 {
    debug_assert!(rev >= 0, "revisions are non-negative");
    rev as u64
}

// --- graphs --------------------------------------------------------------

pub fn key_graphs(graph: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    k
}

// --- branches --------------------------------------------------------------

pub fn key_branches(branch: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, branch);
    k
}

// --- global ----------------------------------------------------------------

pub fn key_global(key: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, key);
    k
}

// --- graph_val: (graph, key, branch, rev) -----------------------------------

pub fn prefix_graph_val_graph(graph: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    k
}

pub fn prefix_graph_val_key(graph: &str, key: &str) -> Vec<u8> {
    let mut k = prefix_graph_val_graph(graph);
    push_str(&mut k, key);
    k
}

pub fn prefix_graph_val_branch(graph: &str, key: &str, branch: &str) -> Vec<u8> {
    let mut k = prefix_graph_val_key(graph, key);
    push_str(&mut k, branch);
    k
}

pub fn key_graph_val(graph: &str, key: &str, branch: &str, rev: i64) -> Vec<u8> {
    let mut k = prefix_graph_val_branch(graph, key, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_graph_val_key(buf: &[u8]) -> (String, String, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let key = read_str(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, key, branch, rev)
}

// --- nodes: (graph, node, branch, rev) --------------------------------------

pub fn prefix_nodes_graph(graph: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    k
}

pub fn prefix_nodes_node(graph: &str, node: &str) -> Vec<u8> {
    let mut k = prefix_nodes_graph(graph);
    push_str(&mut k, node);
    k
}

pub fn prefix_nodes_branch(graph: &str, node: &str, branch: &str) -> Vec<u8> {
    let mut k = prefix_nodes_node(graph, node);
    push_str(&mut k, branch);
    k
}

pub fn key_nodes(graph: &str, node: &str, branch: &str, rev: i64) -> Vec<u8> {
    let mut k = prefix_nodes_branch(graph, node, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_nodes_key(buf: &[u8]) -> (String, String, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let node = read_str(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, node, branch, rev)
}

// --- node_val: (graph, node, key, branch, rev) ------------------------------

pub fn prefix_node_val_node(graph: &str, node: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    push_str(&mut k, node);
    k
}

pub fn prefix_node_val_key(graph: &str, node: &str, key: &str) -> Vec<u8> {
    let mut k = prefix_node_val_node(graph, node);
    push_str(&mut k, key);
    k
}

pub fn prefix_node_val_branch(graph: &str, node: &str, key: &str, branch: &str) -> Vec<u8> {
    let mut k = prefix_node_val_key(graph, node, key);
    push_str(&mut k, branch);
    k
}

pub fn key_node_val(graph: &str, node: &str, key: &str, branch: &str, rev: i64) -> Vec<u8> {
    let mut k = prefix_node_val_branch(graph, node, key, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_node_val_key(buf: &[u8]) -> (String, String, String, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let node = read_str(buf, &mut pos);
    let key = read_str(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, node, key, branch, rev)
}

// --- edges: (graph, source, target, idx, branch, rev) -----------------------

pub fn prefix_edges_source(graph: &str, source: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    push_str(&mut k, source);
    k
}

pub fn prefix_edges_pair(graph: &str, source: &str, target: &str) -> Vec<u8> {
    let mut k = prefix_edges_source(graph, source);
    push_str(&mut k, target);
    k
}

pub fn prefix_edges_idx(graph: &str, source: &str, target: &str, idx: i64) -> Vec<u8> {
    let mut k = prefix_edges_pair(graph, source, target);
    push_u64(&mut k, rev_to_u64(idx));
    k
}

pub fn prefix_edges_branch(graph: &str, source: &str, target: &str, idx: i64, branch: &str) -> Vec<u8> {
    let mut k = prefix_edges_idx(graph, source, target, idx);
    push_str(&mut k, branch);
    k
}

pub fn key_edges(graph: &str, source: &str, target: &str, idx: i64, branch: &str, rev: i64) -> Vec<u8> {
    let mut k = prefix_edges_branch(graph, source, target, idx, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_edges_key(buf: &[u8]) -> (String, String, String, u64, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let source = read_str(buf, &mut pos);
    let target = read_str(buf, &mut pos);
    let idx = read_u64(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, source, target, idx, branch, rev)
}

// --- edges_by_target (secondary index for predecessor lookups) -------------
// Key shape: (graph, target, source, idx, branch, rev) -> empty value.
// Kept in lockstep with `edges` by every writer in store.rs.

pub fn prefix_edges_by_target(graph: &str, target: &str) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    push_str(&mut k, target);
    k
}

pub fn key_edges_by_target(graph: &str, source: &str, target: &str, idx: i64, branch: &str, rev: i64) -> Vec<u8> {
    let mut k = prefix_edges_by_target(graph, target);
    push_str(&mut k, source);
    push_u64(&mut k, rev_to_u64(idx));
    push_str(&mut k, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_edges_by_target_key(buf: &[u8]) -> (String, String, String, u64, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let target = read_str(buf, &mut pos);
    let source = read_str(buf, &mut pos);
    let idx = read_u64(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, target, source, idx, branch, rev)
}

// --- edge_val: (graph, source, target, idx, key, branch, rev) --------------

pub fn prefix_edge_val_idx(graph: &str, source: &str, target: &str, idx: i64) -> Vec<u8> {
    let mut k = Vec::new();
    push_str(&mut k, graph);
    push_str(&mut k, source);
    push_str(&mut k, target);
    push_u64(&mut k, rev_to_u64(idx));
    k
}

pub fn prefix_edge_val_key(graph: &str, source: &str, target: &str, idx: i64, key: &str) -> Vec<u8> {
    let mut k = prefix_edge_val_idx(graph, source, target, idx);
    push_str(&mut k, key);
    k
}

pub fn prefix_edge_val_branch(
    graph: &str,
    source: &str,
    target: &str,
    idx: i64,
    key: &str,
    branch: &str,
) -> Vec<u8> {
    let mut k = prefix_edge_val_key(graph, source, target, idx, key);
    push_str(&mut k, branch);
    k
}

#[allow(clippy::too_many_arguments)]
pub fn key_edge_val(
    graph: &str,
    source: &str,
    target: &str,
    idx: i64,
    key: &str,
    branch: &str,
    rev: i64,
) -> Vec<u8> {
    let mut k = prefix_edge_val_branch(graph, source, target, idx, key, branch);
    push_u64(&mut k, rev_to_u64(rev));
    k
}

pub fn parse_edge_val_key(buf: &[u8]) -> (String, String, String, u64, String, String, u64) {
    let mut pos = 0;
    let graph = read_str(buf, &mut pos);
    let source = read_str(buf, &mut pos);
    let target = read_str(buf, &mut pos);
    let idx = read_u64(buf, &mut pos);
    let key = read_str(buf, &mut pos);
    let branch = read_str(buf, &mut pos);
    let rev = read_u64(buf, &mut pos);
    (graph, source, target, idx, key, branch, rev)
}

/// Build the inclusive range `[prefix, prefix ++ rev(target)]` used by
/// every "latest-within-branch" scan: the lower bound is the exact column
/// prefix with no rev suffix (sorts before any real key sharing that
/// prefix), the upper bound is the prefix with the target revision
/// appended.
pub fn latest_within_branch_range(prefix_no_rev: &[u8], target_rev: i64) -> (Vec<u8>, Vec<u8>) {
    let start = prefix_no_rev.to_vec();
    let mut end = prefix_no_rev.to_vec();
    push_u64(&mut end, rev_to_u64(target_rev));
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_val_key_roundtrips_through_parse() {
        let k = key_graph_val("g", "title", "master", 3);
        assert_eq!(
            parse_graph_val_key(&k),
            ("g".to_string(), "title".to_string(), "master".to_string(), 3)
        );
    }

    #[test]
    fn rev_ordering_matches_byte_ordering() {
        let low = key_graph_val("g", "k", "master", 1);
        let high = key_graph_val("g", "k", "master", 200);
        assert!(low < high);
    }

    #[test]
    fn different_branches_do_not_share_a_key_prefix_boundary() {
        // "ab" and "a","b" must not collide despite concatenation.
        let a = key_graph_val("ab", "k", "master", 0);
        let b = {
            let mut buf = Vec::new();
            push_str(&mut buf, "a");
            push_str(&mut buf, "bk"); // would collide under naive concatenation
            push_str(&mut buf, "master");
            push_u64(&mut buf, 0);
            buf
        };
        assert_ne!(a, b);
    }

    #[test]
    fn latest_within_branch_range_excludes_other_branches() {
        let (start, end) = latest_within_branch_range(&prefix_graph_val_branch("g", "k", "master"), 5);
        let hit = key_graph_val("g", "k", "master", 3);
        let miss_branch = key_graph_val("g", "k", "dev", 3);
        let miss_rev = key_graph_val("g", "k", "master", 9);
        assert!(hit.as_slice() >= start.as_slice() && hit.as_slice() <= end.as_slice());
        assert!(!(miss_branch.as_slice() >= start.as_slice() && miss_branch.as_slice() <= end.as_slice()));
        assert!(!(miss_rev.as_slice() <= end.as_slice()));
    }
}
