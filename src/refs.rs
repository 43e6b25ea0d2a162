//! Branch references and HEAD
//!
//! Branch pointers are one-line files under `{root}/heads/` holding the hex
//! digest of the branch tip. Branch names may contain `/` (used for the
//! `remote/branch` namespace after a fetch), which maps onto nested
//! directories. Two singleton files track the active branch name (`current`)
//! and the current commit digest (`HEAD`).

use crate::error::RepoError;
use crate::store::write_atomic;
use crate::types::{from_hex, to_hex, Digest};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const HEADS_DIR: &str = "heads";
const HEAD_FILE: &str = "HEAD";
const CURRENT_FILE: &str = "current";

/// Filesystem-backed reference set for one repository.
pub struct RefStore {
    root: PathBuf,
}

impl RefStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, RepoError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(HEADS_DIR))?;
        Ok(Self { root })
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        let mut path = self.root.join(HEADS_DIR);
        for part in name.split('/') {
            path = path.join(part);
        }
        path
    }

    pub fn head(&self) -> Result<Digest, RepoError> {
        read_digest(&self.root.join(HEAD_FILE))
    }

    pub fn set_head(&self, digest: &Digest) -> Result<(), RepoError> {
        write_atomic(&self.root.join(HEAD_FILE), to_hex(digest).as_bytes())?;
        Ok(())
    }

    pub fn current_branch(&self) -> Result<String, RepoError> {
        let name = fs::read_to_string(self.root.join(CURRENT_FILE))?;
        Ok(name.trim().to_string())
    }

    pub fn set_current_branch(&self, name: &str) -> Result<(), RepoError> {
        write_atomic(&self.root.join(CURRENT_FILE), name.as_bytes())?;
        Ok(())
    }

    pub fn branch_exists(&self, name: &str) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn branch_tip(&self, name: &str) -> Result<Digest, RepoError> {
        let path = self.branch_path(name);
        if !path.is_file() {
            return Err(RepoError::BranchNotFound(name.to_string()));
        }
        read_digest(&path)
    }

    pub fn set_branch(&self, name: &str, digest: &Digest) -> Result<(), RepoError> {
        write_atomic(&self.branch_path(name), to_hex(digest).as_bytes())?;
        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> Result<(), RepoError> {
        let path = self.branch_path(name);
        if !path.is_file() {
            return Err(RepoError::BranchNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Move a branch tip and HEAD together.
    pub fn advance(&self, branch: &str, digest: &Digest) -> Result<(), RepoError> {
        self.set_branch(branch, digest)?;
        self.set_head(digest)?;
        Ok(())
    }

    /// All branch names, sorted, with nested names rendered as `a/b`.
    pub fn list_branches(&self) -> Result<Vec<String>, RepoError> {
        let heads = self.root.join(HEADS_DIR);
        let mut names = Vec::new();
        for entry in WalkDir::new(&heads).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&heads)
                .map_err(|e| RepoError::Config(e.to_string()))?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Remove an entire branch namespace (the `heads/{name}/` directory a
    /// fetch created for a remote). Missing namespace is fine.
    pub fn delete_namespace(&self, name: &str) -> Result<(), RepoError> {
        let path = self.branch_path(name);
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }
}

fn read_digest(path: &Path) -> Result<Digest, RepoError> {
    let text = fs::read_to_string(path)?;
    from_hex(text.trim())
        .ok_or_else(|| RepoError::Config(format!("corrupt reference file {:?}", path)))
}
