// SPDX-License-Identifier: MIT OR Apache-2.0
//! The process-visible `(branch, rev)` cursor and the ancestor walk.
//!
//! Consolidates the recursive ancestor walk in one place, per the design
//! note in SPEC_FULL.md §9: the original performed this walk in both its
//! query layer and its caching layer with the cached form sometimes
//! pre-decoded and sometimes post-decoded. Here there is exactly one walk
//! ([`Cursor::ancestors`]) and exactly one cached, already-decoded form
//! (`ancestry_cache`), invalidated only when a new branch is created.

use std::cell::RefCell;
use std::collections::HashMap;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::keys;
use crate::tables::{self, BRANCHES, GLOBAL};

const BRANCH_KEY: &str = "branch";
const REV_KEY: &str = "rev";
const MASTER: &str = "master";

/// Holds the current `(branch, rev)` pair and the in-memory ancestry
/// cache for the life of a [`crate::store::Store`].
pub struct Cursor {
    branch: String,
    rev: i64,
    branch_override: Option<String>,
    rev_override: Option<i64>,
    cache_enabled: bool,
    ancestry_cache: RefCell<HashMap<String, (String, i64)>>,
}

impl Cursor {
    /// Read the persisted `(branch, rev)` out of `global` (assumes
    /// `initdb` has already run) and apply any construction-time
    /// overrides.
    pub(crate) fn bootstrap(db: &Database, config: &StoreConfig) -> Result<Cursor> {
        let txn = db.begin_read()?;
        let branch = read_global_text(&txn, BRANCH_KEY)?.unwrap_or_else(|| MASTER.to_string());
        let rev = read_global_int(&txn, REV_KEY)?.unwrap_or(0);
        Ok(Cursor {
            branch,
            rev,
            branch_override: config.branch_override.clone(),
            rev_override: config.rev_override,
            cache_enabled: config.cache_branch_ancestry,
            ancestry_cache: RefCell::new(HashMap::new()),
        })
    }

    /// The current branch name, honoring a construction-time override.
    pub fn branch(&self) -> &str {
        self.branch_override.as_deref().unwrap_or(&self.branch)
    }

    /// The current revision, honoring a construction-time override.
    pub fn rev(&self) -> i64 {
        self.rev_override.unwrap_or(self.rev)
    }

    /// Switch to branch `name`. Creates the branch (parented at the
    /// current position) if it doesn't exist yet. Fails with
    /// [`StoreError::InvalidBranchSwitch`] if `name` already exists and
    /// its `parent_rev` is after the current revision.
    pub fn set_branch(&mut self, db: &Database, name: &str) -> Result<()> {
        if self.branch_override.is_some() {
            return Err(StoreError::Storage(
                "branch is fixed by a construction-time override".to_string(),
            ));
        }
        let current_branch = self.branch.clone();
        let current_rev = self.rev;

        let existing = self.parent_of(db, name)?;
        let (_parent, parent_rev) = match existing {
            Some(row) => row,
            None => {
                let txn = db.begin_write()?;
                {
                    let mut table = txn.open_table(BRANCHES)?;
                    table.insert(
                        keys::key_branches(name).as_slice(),
                        tables::encode_branch_row(&current_branch, current_rev).as_slice(),
                    )?;
                }
                txn.commit()?;
                debug!(branch = name, parent = %current_branch, parent_rev = current_rev, "created branch");
                self.invalidate(name);
                (current_branch.clone(), current_rev)
            }
        };

        if name != MASTER && current_rev < parent_rev {
            return Err(StoreError::InvalidBranchSwitch {
                branch: name.to_string(),
                parent_rev: parent_rev as u64,
                current_rev: current_rev as u64,
            });
        }

        let txn = db.begin_write()?;
        write_global_text(&txn, BRANCH_KEY, name)?;
        txn.commit()?;
        self.branch = name.to_string();
        trace!(branch = name, "cursor branch set");
        Ok(())
    }

    /// Move the revision to `rev`. Fails with
    /// [`StoreError::RevisionBeforeBranchStart`] if the current branch
    /// isn't `master` and `rev` precedes the branch's `parent_rev`.
    pub fn set_rev(&mut self, db: &Database, rev: i64) -> Result<()> {
        if self.rev_override.is_some() {
            return Err(StoreError::Storage(
                "rev is fixed by a construction-time override".to_string(),
            ));
        }
        if self.branch != MASTER {
            if let Some((_, parent_rev)) = self.parent_of(db, &self.branch.clone())? {
                if rev < parent_rev {
                    return Err(StoreError::RevisionBeforeBranchStart {
                        branch: self.branch.clone(),
                        parent_rev: parent_rev as u64,
                        requested: rev as u64,
                    });
                }
            }
        }
        let txn = db.begin_write()?;
        write_global_int(&txn, REV_KEY, rev)?;
        txn.commit()?;
        self.rev = rev;
        trace!(rev, "cursor rev set");
        Ok(())
    }

    /// The sequence of `(branch, rev)` points to walk when resolving a
    /// read at `(branch, rev)`: the point itself, then its branch's
    /// `(parent, parent_rev)`, then that branch's parent, and so on,
    /// terminating once `master` has been yielded. Finite by
    /// construction: the branch tree is rooted at `master`, and
    /// `master`'s own parent is the `master` sentinel, so the walk always
    /// halts after at most `depth(branch)` steps.
    pub fn ancestors(&self, db: &Database, branch: &str, rev: i64) -> Result<Vec<(String, i64)>> {
        let mut out = Vec::new();
        let mut current = branch.to_string();
        let mut current_rev = rev;
        loop {
            out.push((current.clone(), current_rev));
            if current == MASTER {
                break;
            }
            match self.parent_of(db, &current)? {
                Some((parent, parent_rev)) => {
                    current_rev = parent_rev;
                    current = parent;
                }
                None => break,
            }
        }
        Ok(out)
    }

    /// `(parent, parent_rev)` for `branch`, consulting and populating the
    /// ancestry cache. Public so callers (e.g. `compare`'s
    /// changes-from-previous-revision default) can ask for one branch's
    /// parent point without walking the whole ancestor chain.
    pub fn branch_parent(&self, db: &Database, branch: &str) -> Result<Option<(String, i64)>> {
        self.parent_of(db, branch)
    }

    fn parent_of(&self, db: &Database, branch: &str) -> Result<Option<(String, i64)>> {
        if self.cache_enabled {
            if let Some(hit) = self.ancestry_cache.borrow().get(branch).cloned() {
                return Ok(Some(hit));
            }
        }
        let txn = db.begin_read()?;
        let table = match txn.open_table(BRANCHES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let row = table.get(keys::key_branches(branch).as_slice())?;
        let parsed = row.map(|r| tables::decode_branch_row(r.value()));
        if let Some(ref p) = parsed {
            if self.cache_enabled {
                self.ancestry_cache
                    .borrow_mut()
                    .insert(branch.to_string(), p.clone());
            }
        }
        Ok(parsed)
    }

    /// Invalidate the cache entry for `branch` (called right after
    /// creating it, so a later read picks up the freshly written row
    /// rather than a stale miss).
    fn invalidate(&self, branch: &str) {
        self.ancestry_cache.borrow_mut().remove(branch);
    }

    /// Whether `branch` already has a row in `branches`.
    pub fn have_branch(&self, db: &Database, branch: &str) -> Result<bool> {
        Ok(self.parent_of(db, branch)?.is_some())
    }

    /// All known branches, as `(name, parent, parent_rev)` triples.
    pub fn all_branches(&self, db: &Database) -> Result<Vec<(String, String, i64)>> {
        let txn = db.begin_read()?;
        let table = match txn.open_table(BRANCHES) {
            Ok(t) => t,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (k, v) = entry?;
            let mut pos = 0;
            let name = keys::read_str(k.value(), &mut pos);
            let (parent, parent_rev) = tables::decode_branch_row(v.value());
            out.push((name, parent, parent_rev));
        }
        Ok(out)
    }
}

pub(crate) fn read_global_text(
    txn: &redb::ReadTransaction,
    key: &str,
) -> Result<Option<String>> {
    let table = match txn.open_table(GLOBAL) {
        Ok(t) => t,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match table.get(keys::key_global(key).as_slice())? {
        Some(v) => match vgraph_codec::decode(&String::from_utf8_lossy(v.value()))? {
            vgraph_codec::Value::Text(s) => Ok(Some(s)),
            other => Ok(Some(format!("{other}"))),
        },
        None => Ok(None),
    }
}

pub(crate) fn read_global_int(txn: &redb::ReadTransaction, key: &str) -> Result<Option<i64>> {
    let table = match txn.open_table(GLOBAL) {
        Ok(t) => t,
        Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match table.get(keys::key_global(key).as_slice())? {
        Some(v) => match vgraph_codec::decode(&String::from_utf8_lossy(v.value()))? {
            vgraph_codec::Value::Int(i) => Ok(Some(i)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}

pub(crate) fn write_global_text(
    txn: &redb::WriteTransaction,
    key: &str,
    value: &str,
) -> Result<()> {
    let encoded = vgraph_codec::encode(&vgraph_codec::Value::Text(value.to_string()));
    let mut table = txn.open_table(GLOBAL)?;
    table.insert(keys::key_global(key).as_slice(), encoded.as_bytes())?;
    Ok(())
}

pub(crate) fn write_global_int(txn: &redb::WriteTransaction, key: &str, value: i64) -> Result<()> {
    let encoded = vgraph_codec::encode(&vgraph_codec::Value::Int(value));
    let mut table = txn.open_table(GLOBAL)?;
    table.insert(keys::key_global(key).as_slice(), encoded.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn ancestors_terminate_at_master() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        store.cursor_mut().set_rev(store.db(), 3).unwrap();
        store.cursor_mut().set_branch(store.db(), "dev").unwrap();
        store.cursor_mut().set_rev(store.db(), 4).unwrap();

        let chain = store.cursor().ancestors(store.db(), "dev", 4).unwrap();
        assert_eq!(chain, vec![("dev".to_string(), 4), ("master".to_string(), 3)]);
    }

    #[test]
    fn branch_switch_before_parent_rev_is_rejected() {
        let mut store = Store::open(StoreConfig::in_memory()).unwrap();
        store.initdb().unwrap();
        store.cursor_mut().set_rev(store.db(), 3).unwrap();
        store.cursor_mut().set_branch(store.db(), "dev").unwrap();
        store.cursor_mut().set_branch(store.db(), "master").unwrap();
        store.cursor_mut().set_rev(store.db(), 1).unwrap();

        let err = store.cursor_mut().set_branch(store.db(), "dev").unwrap_err();
        assert!(matches!(err, StoreError::InvalidBranchSwitch { .. }));
    }
}
