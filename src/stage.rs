//! Staging area
//!
//! The stage records pending additions (path -> blob digest) and pending
//! removals between commits. It is a single bincode file under the state
//! root, fully replaced on every save. A path is never in both halves at
//! once; the mutators maintain that invariant.

use crate::error::RepoError;
use crate::store::write_atomic;
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Stage {
    staged: BTreeMap<String, Digest>,
    removed: BTreeSet<String>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, RepoError> {
        let bytes = fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), RepoError> {
        let bytes = bincode::serialize(self)?;
        write_atomic(path, &bytes)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.staged.clear();
        self.removed.clear();
    }

    /// Record a pending addition, clearing any pending removal of the path.
    pub fn stage(&mut self, path: &str, digest: Digest) {
        self.removed.remove(path);
        self.staged.insert(path.to_string(), digest);
    }

    /// Drop a pending addition, if any.
    pub fn unstage(&mut self, path: &str) {
        self.staged.remove(path);
    }

    /// Record a pending removal, clearing any pending addition of the path.
    pub fn mark_removed(&mut self, path: &str) {
        self.staged.remove(path);
        self.removed.insert(path.to_string());
    }

    /// Drop a pending removal, if any.
    pub fn unmark_removed(&mut self, path: &str) {
        self.removed.remove(path);
    }

    pub fn is_staged(&self, path: &str) -> bool {
        self.staged.contains_key(path)
    }

    pub fn staged_digest(&self, path: &str) -> Option<&Digest> {
        self.staged.get(path)
    }

    pub fn is_removed(&self, path: &str) -> bool {
        self.removed.contains(path)
    }

    pub fn staged(&self) -> &BTreeMap<String, Digest> {
        &self.staged
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }
}
