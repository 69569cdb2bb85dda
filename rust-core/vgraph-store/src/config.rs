// SPDX-License-Identifier: MIT OR Apache-2.0
//! Construction-time configuration for [`crate::store::Store`].
//!
//! This is not a CLI surface — SPEC_FULL.md §6 keeps the command-line
//! shell out of the core — it is the plain struct a caller (an
//! embedding application, a test) fills in before opening a Store.

use std::path::PathBuf;

/// Where a [`crate::store::Store`] keeps its data.
#[derive(Debug, Clone)]
pub enum Location {
    /// A single-file, on-disk `redb` database at this path. Created if
    /// absent.
    Path(PathBuf),
    /// A transient in-memory database that disappears when the Store is
    /// dropped. Used by tests and short-lived embeddings.
    InMemory,
}

/// Construction-time overrides and tuning knobs for a [`crate::store::Store`].
///
/// SPEC_FULL.md §4.4 allows the cursor's branch/rev reads to be overridden
/// at construction; `branch_override`/`rev_override` realize that here.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where the database lives.
    pub location: Location,
    /// If set, `Cursor::branch` always returns this name instead of the
    /// value persisted in `global`, and branch writes are rejected.
    pub branch_override: Option<String>,
    /// If set, `Cursor::rev` always returns this value instead of the
    /// value persisted in `global`, and rev writes are rejected.
    pub rev_override: Option<i64>,
    /// Whether the Cursor keeps an in-memory `branch -> (parent,
    /// parent_rev)` cache for the life of the Store. Defaults to `true`;
    /// tests that want to exercise the cold lookup path set this `false`.
    pub cache_branch_ancestry: bool,
}

impl StoreConfig {
    /// A config pointing at an on-disk database.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            location: Location::Path(path.into()),
            ..Default::default()
        }
    }

    /// A config for a transient in-memory database.
    pub fn in_memory() -> Self {
        StoreConfig {
            location: Location::InMemory,
            ..Default::default()
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            location: Location::InMemory,
            branch_override: None,
            rev_override: None,
            cache_branch_ancestry: true,
        }
    }
}
