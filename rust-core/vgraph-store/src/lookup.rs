// SPDX-License-Identifier: MIT OR Apache-2.0
//! The versioned-lookup algorithm (SPEC_FULL.md §4.5): the read path
//! shared by every attribute and existence query.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::cursor::Cursor;
use crate::error::Result;
use crate::keys;

/// The three states a single-key lookup can resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// No ancestor holds any record for this key: it has never been set.
    Never,
    /// The closest ancestor record is a tombstone (NULL): the key was set
    /// once but is unset as of this point.
    Tombstoned,
    /// The closest ancestor record holds a value.
    Present(T),
}

impl<T> Lookup<T> {
    /// NULL-as-tombstone and never-set both read as "not present" to a
    /// caller that just wants `Option<T>` (SPEC_FULL.md §4.5).
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Present(v) => Some(v),
            Lookup::Never | Lookup::Tombstoned => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Lookup::Present(_))
    }
}

/// Find the single record in `table` reachable from `(branch, rev)`
/// through the ancestor walk: for each ancestor in order, the latest
/// record with `rev <= ancestor_rev` sharing `prefix_for_branch(branch)`;
/// the first ancestor with any match wins.
pub fn versioned_raw(
    db: &Database,
    cursor: &Cursor,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<Option<Vec<u8>>> {
    versioned_raw_at(db, cursor, cursor.branch(), cursor.rev(), table, prefix_for_branch)
}

/// Like [`versioned_raw`], but resolves at an arbitrary `(branch, rev)`
/// point instead of the cursor's own position. Used by `compare`, which
/// needs to resolve two independent points without disturbing the
/// cursor.
pub fn versioned_raw_at(
    db: &Database,
    cursor: &Cursor,
    branch: &str,
    rev: i64,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<Option<Vec<u8>>> {
    for (branch, rev) in cursor.ancestors(db, branch, rev)? {
        let prefix = prefix_for_branch(&branch);
        if let Some(raw) = latest_in_branch(db, table, &prefix, rev)? {
            return Ok(Some(raw));
        }
    }
    Ok(None)
}

/// Like [`versioned_raw`] but decodes the tagged tombstone/present column
/// used by `graph_val`, `node_val`, and `edge_val`.
pub fn versioned_tagged(
    db: &Database,
    cursor: &Cursor,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<Lookup<String>> {
    versioned_tagged_at(db, cursor, cursor.branch(), cursor.rev(), table, prefix_for_branch)
}

/// Like [`versioned_tagged`], resolved at an arbitrary `(branch, rev)`.
pub fn versioned_tagged_at(
    db: &Database,
    cursor: &Cursor,
    branch: &str,
    rev: i64,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<Lookup<String>> {
    match versioned_raw_at(db, cursor, branch, rev, table, prefix_for_branch)? {
        None => Ok(Lookup::Never),
        Some(raw) => match crate::tables::decode_tagged(&raw) {
            None => Ok(Lookup::Tombstoned),
            Some(text) => Ok(Lookup::Present(text)),
        },
    }
}

/// Like [`versioned_raw`] but decodes the single extant byte used by
/// `nodes` and `edges`. Returns `false` (never an error) when no ancestor
/// holds a record, per SPEC_FULL.md §4.5.
pub fn versioned_extant(
    db: &Database,
    cursor: &Cursor,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<bool> {
    versioned_extant_at(db, cursor, cursor.branch(), cursor.rev(), table, prefix_for_branch)
}

/// Like [`versioned_extant`], resolved at an arbitrary `(branch, rev)`.
pub fn versioned_extant_at(
    db: &Database,
    cursor: &Cursor,
    branch: &str,
    rev: i64,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_for_branch: impl Fn(&str) -> Vec<u8>,
) -> Result<bool> {
    Ok(versioned_raw_at(db, cursor, branch, rev, table, prefix_for_branch)?
        .map(|raw| crate::tables::decode_bool(&raw))
        .unwrap_or(false))
}

/// The latest record in `table` whose key has `prefix_no_rev` as an exact
/// prefix and whose rev suffix is `<= target_rev`.
fn latest_in_branch(
    db: &Database,
    table: TableDefinition<&[u8], &[u8]>,
    prefix_no_rev: &[u8],
    target_rev: i64,
) -> Result<Option<Vec<u8>>> {
    let txn = db.begin_read()?;
    let t = match txn.open_table(table) {
        Ok(t) => t,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let (start, end) = keys::latest_within_branch_range(prefix_no_rev, target_rev);
    let mut result = None;
    for entry in t.range(start.as_slice()..=end.as_slice())? {
        let (_, v) = entry?;
        result = Some(v.value().to_vec());
    }
    Ok(result)
}
