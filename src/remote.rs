//! Remote synchronization
//!
//! A remote is another repository's state root reachable through the
//! filesystem, recorded in a name -> path table. Push and fetch copy
//! reachable commits and their blobs between the two object stores in one
//! direction; pull composes fetch with a local merge. The shared filesystem
//! is trusted as-is: there is no transport or authentication layer, so this
//! must stay confined to one trusted machine.

use crate::error::RepoError;
use crate::graph::CommitGraph;
use crate::merge::{self, MergeOutcome};
use crate::refs::RefStore;
use crate::repo::Repository;
use crate::store::{write_atomic, ObjectStore};
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REMOTES_FILE: &str = "remotes";

/// Persisted remote-name -> state-root table.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RemoteTable {
    remotes: BTreeMap<String, PathBuf>,
}

impl RemoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(state_root: &Path) -> Result<Self, RepoError> {
        let bytes = std::fs::read(state_root.join(REMOTES_FILE))?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn save(&self, state_root: &Path) -> Result<(), RepoError> {
        let bytes = bincode::serialize(self)?;
        write_atomic(&state_root.join(REMOTES_FILE), &bytes)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PathBuf> {
        self.remotes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.remotes.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.remotes.keys()
    }
}

/// Register a remote under a symbolic name.
pub fn add_remote(repo: &Repository, name: &str, location: &Path) -> Result<(), RepoError> {
    let mut table = RemoteTable::load(repo.state_root())?;
    if table.contains(name) {
        return Err(RepoError::RemoteExists(name.to_string()));
    }
    table.remotes.insert(name.to_string(), location.to_path_buf());
    table.save(repo.state_root())?;
    info!(remote = name, location = %location.display(), "added remote");
    Ok(())
}

/// Forget a remote, along with the `remote/...` branch namespace a fetch
/// may have created.
pub fn rm_remote(repo: &Repository, name: &str) -> Result<(), RepoError> {
    let mut table = RemoteTable::load(repo.state_root())?;
    if !table.contains(name) {
        return Err(RepoError::RemoteNotFound(name.to_string()));
    }
    table.remotes.remove(name);
    table.save(repo.state_root())?;
    repo.refs.delete_namespace(name)?;
    Ok(())
}

/// The store and references of one repository end of a synchronization.
struct Instance {
    store: ObjectStore,
    refs: RefStore,
}

impl Instance {
    fn open(state_root: &Path) -> Result<Self, RepoError> {
        Ok(Self {
            store: ObjectStore::open(state_root)?,
            refs: RefStore::open(state_root)?,
        })
    }
}

fn open_remote(repo: &Repository, name: &str) -> Result<Instance, RepoError> {
    let table = RemoteTable::load(repo.state_root())?;
    let location = table
        .get(name)
        .ok_or_else(|| RepoError::RemoteNotFound(name.to_string()))?;
    if !location.is_dir() {
        return Err(RepoError::RemoteNotFound(name.to_string()));
    }
    Instance::open(location)
}

/// Copy every commit reachable from `tip` that `to` is missing, blobs
/// first so a commit is never persisted ahead of its content. Commits
/// already present on the destination stop the walk on that line.
fn copy_reachable(from: &ObjectStore, to: &ObjectStore, tip: Digest) -> Result<usize, RepoError> {
    let mut copied = 0;
    let mut frontier: VecDeque<Digest> = VecDeque::from([tip]);
    let mut seen: HashSet<Digest> = HashSet::new();

    while let Some(id) = frontier.pop_front() {
        if !seen.insert(id) || to.commit_exists(&id) {
            continue;
        }
        let commit = from.get_commit(&id)?;
        for blob in commit.snapshot.values() {
            if !to.blob_exists(blob) {
                to.put_blob(&from.get_blob(blob)?)?;
            }
        }
        to.put_commit(&commit)?;
        copied += 1;

        if let Some(parent) = commit.parent {
            frontier.push_back(parent);
        }
        if let Some(parent) = commit.second_parent {
            frontier.push_back(parent);
        }
    }
    Ok(copied)
}

/// Root commit of the history ending at `tip`, by first-parent walk.
fn root_of(store: &ObjectStore, tip: Digest) -> Result<Digest, RepoError> {
    let mut cursor = tip;
    loop {
        let commit = store.get_commit(&cursor)?;
        match commit.parent {
            Some(parent) => cursor = parent,
            None => return Ok(cursor),
        }
    }
}

/// Push the current branch's history onto a remote branch.
///
/// The remote branch tip must be an ancestor of the local tip; otherwise the
/// histories have diverged and nothing is transferred. A remote branch that
/// does not exist yet starts at the remote's own root commit.
pub fn push(repo: &Repository, remote_name: &str, branch: &str) -> Result<(), RepoError> {
    let remote = open_remote(repo, remote_name)?;

    let remote_tip = if remote.refs.branch_exists(branch) {
        remote.refs.branch_tip(branch)?
    } else {
        let head = remote.refs.head()?;
        let root = root_of(&remote.store, head)?;
        remote.refs.set_branch(branch, &root)?;
        root
    };

    let local_branch = repo.refs.current_branch()?;
    let local_tip = repo.refs.branch_tip(&local_branch)?;

    let graph = CommitGraph::new(&repo.store);
    if !graph.is_ancestor(&remote_tip, &local_tip)? {
        return Err(RepoError::HistoryDiverged);
    }

    let copied = copy_reachable(&repo.store, &remote.store, local_tip)?;
    remote.refs.set_branch(branch, &local_tip)?;
    remote.refs.set_head(&local_tip)?;

    info!(
        remote = remote_name,
        branch,
        commits = copied,
        "pushed"
    );
    Ok(())
}

/// Fetch a remote branch into the local `remote/branch` namespace.
///
/// Local branches are never touched; only objects are copied and the
/// remote-scoped pointer updated. Returns the tracking branch name.
pub fn fetch(repo: &Repository, remote_name: &str, branch: &str) -> Result<String, RepoError> {
    let remote = open_remote(repo, remote_name)?;

    if !remote.refs.branch_exists(branch) {
        return Err(RepoError::RemoteBranchNotFound(format!(
            "{}/{}",
            remote_name, branch
        )));
    }
    let remote_tip = remote.refs.branch_tip(branch)?;

    let copied = copy_reachable(&remote.store, &repo.store, remote_tip)?;
    let tracking = format!("{}/{}", remote_name, branch);
    repo.refs.set_branch(&tracking, &remote_tip)?;

    debug!(remote = remote_name, branch, commits = copied, "fetched");
    Ok(tracking)
}

/// Fetch then merge the tracking branch into the current branch.
pub fn pull(
    repo: &Repository,
    remote_name: &str,
    branch: &str,
) -> Result<MergeOutcome, RepoError> {
    let tracking = fetch(repo, remote_name, branch)?;
    merge::merge(repo, &tracking)
}
