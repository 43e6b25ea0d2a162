//! Keel: Miniature Content-Addressed Version Control
//!
//! A small version-control engine: a content-addressed object store holding
//! blobs and commits, a commit history graph with three-way merge, a staging
//! area, branch references, and filesystem-based remote synchronization.

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod merge;
pub mod refs;
pub mod remote;
pub mod repo;
pub mod stage;
pub mod store;
pub mod types;

pub use commit::Commit;
pub use error::{RepoError, StoreError};
pub use merge::MergeOutcome;
pub use repo::Repository;
pub use types::Digest;
