//! Commit objects
//!
//! A commit is an immutable history node: a message, a timestamp, up to two
//! parent digests, and a full snapshot mapping working paths to blob digests.
//! Identity is the blake3 digest of the commit's fields, so equal content
//! always lands at the same storage key.

use crate::types::Digest;
use blake3::Hasher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default message of the root commit.
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// An immutable commit record.
///
/// The snapshot is a sorted map so bincode serialization (and therefore the
/// stored bytes) are deterministic. Snapshots are never mutated after a
/// commit is built: derived commits construct a fresh map via [`Commit::child`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub message: String,
    /// Unix seconds. The root commit is pinned to the epoch.
    pub timestamp: i64,
    pub parent: Option<Digest>,
    pub second_parent: Option<Digest>,
    /// path -> blob digest for every file tracked by this commit.
    pub snapshot: BTreeMap<String, Digest>,
}

impl Commit {
    /// The root commit: no parents, empty snapshot, epoch timestamp.
    pub fn initial() -> Self {
        Commit {
            message: INITIAL_COMMIT_MESSAGE.to_string(),
            timestamp: 0,
            parent: None,
            second_parent: None,
            snapshot: BTreeMap::new(),
        }
    }

    /// Build a child commit from a parent snapshot plus staged changes.
    ///
    /// Copy-on-write: the parent's snapshot is cloned and the overlay applied
    /// to the clone, leaving the parent commit untouched.
    pub fn child(
        message: &str,
        parent_id: Digest,
        parent_snapshot: &BTreeMap<String, Digest>,
        staged: &BTreeMap<String, Digest>,
        removed: &BTreeSet<String>,
        timestamp: i64,
    ) -> Self {
        let mut snapshot = parent_snapshot.clone();
        for (path, digest) in staged {
            snapshot.insert(path.clone(), *digest);
        }
        for path in removed {
            snapshot.remove(path);
        }
        Commit {
            message: message.to_string(),
            timestamp,
            parent: Some(parent_id),
            second_parent: None,
            snapshot,
        }
    }

    pub fn tracks(&self, path: &str) -> bool {
        self.snapshot.contains_key(path)
    }

    pub fn blob(&self, path: &str) -> Option<&Digest> {
        self.snapshot.get(path)
    }

    /// True if this commit tracks `path` with exactly this blob digest.
    pub fn tracks_same(&self, path: &str, digest: &Digest) -> bool {
        self.snapshot.get(path) == Some(digest)
    }

    pub fn is_merge(&self) -> bool {
        self.second_parent.is_some()
    }

    /// Commit date formatted for `log` output.
    pub fn date(&self) -> String {
        let time = DateTime::<Utc>::from_timestamp(self.timestamp, 0)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        time.format("%a %b %-d %H:%M:%S %Y %z").to_string()
    }
}

/// Compute the identity digest of a commit.
///
/// Fields are fed to the hasher behind domain prefixes so that, for example,
/// a message byte can never collide with a snapshot path byte. Snapshot
/// entries arrive in sorted order from the BTreeMap, keeping the digest
/// deterministic across runs.
pub fn compute_commit_id(commit: &Commit) -> Digest {
    let mut hasher = Hasher::new();

    hasher.update(b"message:");
    hasher.update(commit.message.as_bytes());

    hasher.update(b"time:");
    hasher.update(&commit.timestamp.to_le_bytes());

    hasher.update(b"parent:");
    match &commit.parent {
        Some(parent) => hasher.update(parent),
        None => hasher.update(b"-"),
    };

    hasher.update(b"parent2:");
    match &commit.second_parent {
        Some(parent) => hasher.update(parent),
        None => hasher.update(b"-"),
    };

    for (path, digest) in &commit.snapshot {
        hasher.update(b"entry:");
        hasher.update(path.as_bytes());
        hasher.update(&[0]);
        hasher.update(digest);
    }

    *hasher.finalize().as_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(content: &[u8]) -> Digest {
        *blake3::hash(content).as_bytes()
    }

    #[test]
    fn test_commit_id_deterministic() {
        let mut snapshot = BTreeMap::new();
        snapshot.insert("a.txt".to_string(), blob(b"a"));
        let commit = Commit {
            message: "m".to_string(),
            timestamp: 42,
            parent: Some(blob(b"parent")),
            second_parent: None,
            snapshot,
        };
        assert_eq!(compute_commit_id(&commit), compute_commit_id(&commit));
    }

    #[test]
    fn test_commit_id_sensitive_to_snapshot() {
        let base = Commit::initial();
        let mut changed = base.clone();
        changed.snapshot.insert("f".to_string(), blob(b"x"));
        assert_ne!(compute_commit_id(&base), compute_commit_id(&changed));
    }

    #[test]
    fn test_child_does_not_touch_parent_snapshot() {
        let mut parent_snapshot = BTreeMap::new();
        parent_snapshot.insert("keep".to_string(), blob(b"keep"));
        parent_snapshot.insert("drop".to_string(), blob(b"drop"));
        let before = parent_snapshot.clone();

        let mut staged = BTreeMap::new();
        staged.insert("new".to_string(), blob(b"new"));
        let mut removed = BTreeSet::new();
        removed.insert("drop".to_string());

        let child = Commit::child("c", blob(b"pid"), &parent_snapshot, &staged, &removed, 1);

        assert_eq!(parent_snapshot, before);
        assert!(child.tracks("keep"));
        assert!(child.tracks("new"));
        assert!(!child.tracks("drop"));
    }

    #[test]
    fn test_initial_commit_is_rooted_at_epoch() {
        let root = Commit::initial();
        assert_eq!(root.timestamp, 0);
        assert!(root.parent.is_none());
        assert!(root.snapshot.is_empty());
        assert!(root.date().contains("1970"));
    }
}
