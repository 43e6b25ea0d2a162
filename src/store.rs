//! Content-addressed object store
//!
//! Stores blobs and commits on the filesystem keyed by their blake3 digest:
//! `{root}/objects/blobs/{hex[0..2]}/{hex[2..4]}/{hex}.blob` and likewise for
//! commits. The fan-out structure keeps directories small, and because keys
//! are content-derived every write is write-once: re-storing identical
//! content is a no-op.

use crate::commit::{compute_commit_id, Commit};
use crate::error::StoreError;
use crate::types::{to_hex, Digest};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const BLOB_EXT: &str = "blob";
const COMMIT_EXT: &str = "commit";

/// Filesystem-backed store for blobs and commit objects.
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Open (creating if needed) the object store under the given state root.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("objects").join("blobs"))?;
        fs::create_dir_all(root.join("objects").join("commits"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, area: &str, digest: &Digest, ext: &str) -> PathBuf {
        let hex = to_hex(digest);
        self.root
            .join("objects")
            .join(area)
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(format!("{}.{}", hex, ext))
    }

    fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.object_path("blobs", digest, BLOB_EXT)
    }

    fn commit_path(&self, digest: &Digest) -> PathBuf {
        self.object_path("commits", digest, COMMIT_EXT)
    }

    /// Store raw file content, returning its digest.
    ///
    /// Idempotent: content already present is left alone. Writes go to a
    /// `.tmp` sibling first and are renamed into place so a key never holds
    /// a partial object.
    pub fn put_blob(&self, bytes: &[u8]) -> Result<Digest, StoreError> {
        let digest = *blake3::hash(bytes).as_bytes();
        let path = self.blob_path(&digest);
        if path.exists() {
            return Ok(digest);
        }
        write_atomic(&path, bytes)?;
        debug!(digest = %to_hex(&digest), size = bytes.len(), "stored blob");
        Ok(digest)
    }

    pub fn blob_exists(&self, digest: &Digest) -> bool {
        self.blob_path(digest).exists()
    }

    pub fn get_blob(&self, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        let path = self.blob_path(digest);
        if !path.exists() {
            return Err(StoreError::BlobNotFound(*digest));
        }
        Ok(fs::read(path)?)
    }

    /// Serialize and store a commit, returning its identity digest.
    ///
    /// Every blob the snapshot references must already be present; a commit
    /// must never point at content the store cannot produce.
    pub fn put_commit(&self, commit: &Commit) -> Result<Digest, StoreError> {
        for digest in commit.snapshot.values() {
            if !self.blob_exists(digest) {
                return Err(StoreError::BlobNotFound(*digest));
            }
        }

        let digest = compute_commit_id(commit);
        let path = self.commit_path(&digest);
        if path.exists() {
            return Ok(digest);
        }
        let bytes = bincode::serialize(commit)?;
        write_atomic(&path, &bytes)?;
        debug!(digest = %to_hex(&digest), message = %commit.message, "stored commit");
        Ok(digest)
    }

    pub fn commit_exists(&self, digest: &Digest) -> bool {
        self.commit_path(digest).exists()
    }

    /// Load a commit, verifying the stored bytes still hash to their key.
    pub fn get_commit(&self, digest: &Digest) -> Result<Commit, StoreError> {
        let path = self.commit_path(digest);
        if !path.exists() {
            return Err(StoreError::CommitNotFound(*digest));
        }
        let bytes = fs::read(path)?;
        let commit: Commit = bincode::deserialize(&bytes)?;

        let actual = compute_commit_id(&commit);
        if actual != *digest {
            return Err(StoreError::DigestMismatch {
                expected: *digest,
                actual,
            });
        }
        Ok(commit)
    }

    /// Enumerate every commit id in the store, in no particular order.
    pub fn list_commit_ids(&self) -> Result<Vec<Digest>, StoreError> {
        let mut ids = Vec::new();
        let commits_dir = self.root.join("objects").join("commits");
        for entry in WalkDir::new(&commits_dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(COMMIT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if let Some(digest) = crate::types::from_hex(stem) {
                    ids.push(digest);
                }
            }
        }
        Ok(ids)
    }

    /// Find every commit whose hex id starts with the given prefix.
    ///
    /// The caller decides what zero or multiple matches mean; the store only
    /// reports them.
    pub fn find_commits_with_prefix(&self, prefix: &str) -> Result<Vec<Digest>, StoreError> {
        let mut matches = Vec::new();
        for digest in self.list_commit_ids()? {
            if to_hex(&digest).starts_with(prefix) {
                matches.push(digest);
            }
        }
        Ok(matches)
    }
}

/// Write bytes to `path` via a temporary sibling plus rename.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
