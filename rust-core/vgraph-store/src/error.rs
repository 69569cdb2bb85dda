// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the versioned storage layer.

use thiserror::Error;

/// Failures raised by [`crate::Store`] and [`crate::Cursor`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying embedded database reported a failure: I/O, a
    /// corrupted file, or a transaction conflict. This is the sole kind
    /// the Store does not attempt to interpret further.
    #[error("storage engine error: {0}")]
    Storage(String),

    /// `decode` saw a malformed value while reading a record back out.
    #[error("encoding error: {0}")]
    Encoding(#[from] vgraph_codec::EncodingError),

    /// `new_graph` was asked to create a graph that already has a row in
    /// `graphs`.
    #[error("graph already exists: {0}")]
    DuplicateGraph(String),

    /// An operation named a graph absent from `graphs`.
    #[error("no such graph: {0}")]
    NoSuchGraph(String),

    /// `initdb` ran against a database whose tables exist but do not
    /// match the expected schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// A branch switch targeted a branch whose `parent_rev` is after the
    /// current revision.
    #[error("cannot switch to branch {branch:?}: it starts at rev {parent_rev}, current rev is {current_rev}")]
    InvalidBranchSwitch {
        branch: String,
        parent_rev: u64,
        current_rev: u64,
    },

    /// A rev write targeted a value before the current branch's
    /// `parent_rev`.
    #[error("rev {requested} precedes branch {branch:?}'s start at rev {parent_rev}")]
    RevisionBeforeBranchStart {
        branch: String,
        parent_rev: u64,
        requested: u64,
    },
}

impl From<redb::Error> for StoreError {
    fn from(e: redb::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(e: redb::DatabaseError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(e: redb::TransactionError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(e: redb::TableError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(e: redb::StorageError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(e: redb::CommitError) -> Self {
        StoreError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
