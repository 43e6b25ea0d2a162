//! Error types for the Keel version-control core.

use crate::types::{to_hex, Digest};
use thiserror::Error;

/// Object-store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Blob not found: {}", to_hex(.0))]
    BlobNotFound(Digest),

    #[error("Commit not found: {}", to_hex(.0))]
    CommitNotFound(Digest),

    #[error("Digest mismatch: expected {}, got {}", to_hex(expected), to_hex(actual))]
    DigestMismatch { expected: Digest, actual: Digest },

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Operation-level errors
///
/// Every repository operation returns these as values; rendering them into
/// user-facing messages and exit codes is the CLI layer's job alone.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not inside a Keel repository")]
    NotARepository,

    #[error("A repository already exists here")]
    AlreadyInitialized,

    #[error("File not found in working directory: {0}")]
    FileNotFound(String),

    #[error("File not present in that commit: {0}")]
    FileNotInCommit(String),

    #[error("No commit with that id: {0}")]
    CommitNotFound(String),

    #[error("Commit id is ambiguous: {0}")]
    AmbiguousId(String),

    #[error("No commit found with message: {0}")]
    NoMatchingCommit(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Branch already exists: {0}")]
    BranchExists(String),

    #[error("Already on branch: {0}")]
    CurrentBranch(String),

    #[error("Cannot remove the current branch: {0}")]
    CannotRemoveCurrent(String),

    #[error("Stage is empty; nothing to commit")]
    NothingToCommit,

    #[error("Neither staged nor tracked; nothing to remove: {0}")]
    NothingToRemove(String),

    #[error("Uncommitted changes in the stage")]
    UncommittedChanges,

    #[error("Untracked working file would be overwritten: {0}")]
    UntrackedFileConflict(String),

    #[error("Cannot merge a branch with itself: {0}")]
    SelfMerge(String),

    #[error("Commits share no common ancestor")]
    NoCommonAncestor,

    #[error("Remote not found: {0}")]
    RemoteNotFound(String),

    #[error("Remote already exists: {0}")]
    RemoteExists(String),

    #[error("Remote branch not found: {0}")]
    RemoteBranchNotFound(String),

    #[error("Remote history has diverged; pull before pushing")]
    HistoryDiverged,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
