//! Repository operations
//!
//! The `Repository` handle owns the paths for one working directory and its
//! `.keel` state root, and exposes every user-level operation as a method
//! returning structured results. Nothing here prints; rendering belongs to
//! the CLI layer.
//!
//! Tracked paths are plain file names at the top of the working directory.
//! The working directory, object store, references, and stage are owned by
//! one process at a time; no internal locking is attempted.

use crate::commit::Commit;
use crate::config::KeelConfig;
use crate::error::RepoError;
use crate::graph::CommitGraph;
use crate::refs::RefStore;
use crate::remote::RemoteTable;
use crate::stage::Stage;
use crate::store::ObjectStore;
use crate::types::Digest;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the state directory under the working directory root.
pub const STATE_DIR: &str = ".keel";

const STAGE_FILE: &str = "stage";

/// One entry of `log` / `global-log` output.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: Digest,
    pub message: String,
    pub date: String,
    /// Present on merge commits: (first parent, second parent).
    pub merge_parents: Option<(Digest, Digest)>,
}

/// How a working file differs from what the stage/commit expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChange {
    Modified,
    Deleted,
}

/// Structured `status` result.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub branches: Vec<String>,
    pub current_branch: String,
    pub staged: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<(String, FileChange)>,
    pub untracked: Vec<String>,
}

/// Handle on one repository instance.
pub struct Repository {
    work_dir: PathBuf,
    state_root: PathBuf,
    pub store: ObjectStore,
    pub refs: RefStore,
    pub config: KeelConfig,
}

impl Repository {
    /// Create a fresh repository in `work_dir`.
    ///
    /// Lays down the state directory, the root commit, the default branch
    /// pointing at it, an empty stage, and an empty remote table.
    pub fn init<P: AsRef<Path>>(work_dir: P) -> Result<Self, RepoError> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let state_root = work_dir.join(STATE_DIR);
        if state_root.exists() {
            return Err(RepoError::AlreadyInitialized);
        }
        fs::create_dir_all(&state_root)?;

        let config = KeelConfig::load(&state_root)?;
        let store = ObjectStore::open(&state_root)?;
        let refs = RefStore::open(&state_root)?;

        let root_id = store.put_commit(&Commit::initial())?;
        refs.set_branch(&config.default_branch, &root_id)?;
        refs.set_current_branch(&config.default_branch)?;
        refs.set_head(&root_id)?;

        let repo = Self {
            work_dir,
            state_root,
            store,
            refs,
            config,
        };
        Stage::new().save(&repo.stage_path())?;
        RemoteTable::new().save(&repo.state_root)?;

        info!(branch = %repo.config.default_branch, "initialized repository");
        Ok(repo)
    }

    /// Open an existing repository rooted at `work_dir`.
    pub fn open<P: AsRef<Path>>(work_dir: P) -> Result<Self, RepoError> {
        let work_dir = work_dir.as_ref().to_path_buf();
        let state_root = work_dir.join(STATE_DIR);
        if !state_root.is_dir() {
            return Err(RepoError::NotARepository);
        }
        let config = KeelConfig::load(&state_root)?;
        Ok(Self {
            store: ObjectStore::open(&state_root)?,
            refs: RefStore::open(&state_root)?,
            work_dir,
            state_root,
            config,
        })
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn state_root(&self) -> &Path {
        &self.state_root
    }

    pub fn graph(&self) -> CommitGraph<'_> {
        CommitGraph::new(&self.store)
    }

    fn stage_path(&self) -> PathBuf {
        self.state_root.join(STAGE_FILE)
    }

    pub fn load_stage(&self) -> Result<Stage, RepoError> {
        Stage::load(&self.stage_path())
    }

    pub(crate) fn save_stage(&self, stage: &Stage) -> Result<(), RepoError> {
        stage.save(&self.stage_path())
    }

    /// Current commit digest and its loaded object.
    pub fn head_commit(&self) -> Result<(Digest, Commit), RepoError> {
        let head = self.refs.head()?;
        Ok((head, self.store.get_commit(&head)?))
    }

    pub(crate) fn working_path(&self, name: &str) -> PathBuf {
        self.work_dir.join(name)
    }

    /// Plain files at the top of the working directory, sorted. The state
    /// directory (and any other directory) is not a working file.
    pub(crate) fn working_files(&self) -> Result<Vec<String>, RepoError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.work_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    // ------------------------------------------------------------------
    // Staging
    // ------------------------------------------------------------------

    /// Stage a working file for the next commit.
    ///
    /// If the current commit already tracks the file with identical content,
    /// any pending stage entry or removal is dropped instead, restoring the
    /// "nothing pending" state for that path.
    pub fn add(&self, path: &str) -> Result<(), RepoError> {
        let file = self.working_path(path);
        if !file.is_file() {
            return Err(RepoError::FileNotFound(path.to_string()));
        }
        let content = fs::read(&file)?;
        let digest = *blake3::hash(&content).as_bytes();

        let (_, current) = self.head_commit()?;
        let mut stage = self.load_stage()?;

        if current.tracks_same(path, &digest) {
            stage.unstage(path);
            stage.unmark_removed(path);
        } else {
            self.store.put_blob(&content)?;
            stage.stage(path, digest);
        }
        self.save_stage(&stage)?;
        debug!(path, "staged");
        Ok(())
    }

    /// Unstage a file, or mark a tracked file for removal and delete its
    /// working copy.
    pub fn rm(&self, path: &str) -> Result<(), RepoError> {
        let (_, current) = self.head_commit()?;
        let mut stage = self.load_stage()?;

        if !stage.is_staged(path) && !current.tracks(path) {
            return Err(RepoError::NothingToRemove(path.to_string()));
        }

        if stage.is_staged(path) {
            stage.unstage(path);
        }
        if current.tracks(path) {
            stage.mark_removed(path);
            let file = self.working_path(path);
            if file.is_file() {
                fs::remove_file(file)?;
            }
        }
        self.save_stage(&stage)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Commits
    // ------------------------------------------------------------------

    /// Commit the staged changes on the current branch.
    pub fn commit(&self, message: &str) -> Result<Digest, RepoError> {
        let stage = self.load_stage()?;
        if stage.is_empty() {
            return Err(RepoError::NothingToCommit);
        }

        let (head, current) = self.head_commit()?;
        let commit = Commit::child(
            message,
            head,
            &current.snapshot,
            stage.staged(),
            stage.removed(),
            Self::now(),
        );
        self.finish_commit(commit)
    }

    /// Persist a fully built commit, advance the current branch and HEAD to
    /// it, and clear the stage. Shared by `commit` and the merge engine.
    pub(crate) fn finish_commit(&self, commit: Commit) -> Result<Digest, RepoError> {
        let id = self.store.put_commit(&commit)?;
        let branch = self.refs.current_branch()?;
        self.refs.advance(&branch, &id)?;

        let mut stage = self.load_stage()?;
        stage.clear();
        self.save_stage(&stage)?;

        info!(branch = %branch, id = %crate::types::short_hex(&id), "created commit");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // History inspection
    // ------------------------------------------------------------------

    fn log_entry(&self, id: Digest, commit: &Commit) -> LogEntry {
        LogEntry {
            id,
            message: commit.message.clone(),
            date: commit.date(),
            merge_parents: match (commit.parent, commit.second_parent) {
                (Some(first), Some(second)) => Some((first, second)),
                _ => None,
            },
        }
    }

    /// History of the current commit following first-parent links.
    pub fn log(&self) -> Result<Vec<LogEntry>, RepoError> {
        let mut entries = Vec::new();
        let mut cursor = Some(self.refs.head()?);
        while let Some(id) = cursor {
            let commit = self.store.get_commit(&id)?;
            entries.push(self.log_entry(id, &commit));
            cursor = commit.parent;
        }
        Ok(entries)
    }

    /// Every commit in the store, in no defined order.
    pub fn global_log(&self) -> Result<Vec<LogEntry>, RepoError> {
        let mut entries = Vec::new();
        for id in self.store.list_commit_ids()? {
            let commit = self.store.get_commit(&id)?;
            entries.push(self.log_entry(id, &commit));
        }
        Ok(entries)
    }

    /// Ids of every commit whose message matches exactly.
    pub fn find(&self, message: &str) -> Result<Vec<Digest>, RepoError> {
        let mut matches = Vec::new();
        for id in self.store.list_commit_ids()? {
            if self.store.get_commit(&id)?.message == message {
                matches.push(id);
            }
        }
        if matches.is_empty() {
            return Err(RepoError::NoMatchingCommit(message.to_string()));
        }
        Ok(matches)
    }

    /// Resolve a user-supplied hex prefix to exactly one commit id.
    pub fn resolve_commit(&self, prefix: &str) -> Result<Digest, RepoError> {
        let matches = self.store.find_commits_with_prefix(prefix)?;
        match matches.len() {
            0 => Err(RepoError::CommitNotFound(prefix.to_string())),
            1 => Ok(matches[0]),
            _ => Err(RepoError::AmbiguousId(prefix.to_string())),
        }
    }

    /// Classify every path for `status` output.
    pub fn status(&self) -> Result<StatusReport, RepoError> {
        let (_, current) = self.head_commit()?;
        let stage = self.load_stage()?;
        let working = self.working_files()?;

        let mut staged = Vec::new();
        let mut modified = Vec::new();

        for (path, staged_digest) in stage.staged() {
            let file = self.working_path(path);
            if !file.is_file() {
                modified.push((path.clone(), FileChange::Deleted));
            } else {
                let on_disk = *blake3::hash(&fs::read(&file)?).as_bytes();
                if on_disk == *staged_digest {
                    staged.push(path.clone());
                } else {
                    modified.push((path.clone(), FileChange::Modified));
                }
            }
        }

        for (path, tracked_digest) in &current.snapshot {
            let file = self.working_path(path);
            if !file.is_file() {
                if !stage.is_removed(path) && !stage.is_staged(path) {
                    modified.push((path.clone(), FileChange::Deleted));
                }
            } else {
                let on_disk = *blake3::hash(&fs::read(&file)?).as_bytes();
                if on_disk != *tracked_digest
                    && !stage.is_staged(path)
                    && !stage.is_removed(path)
                {
                    modified.push((path.clone(), FileChange::Modified));
                }
            }
        }
        modified.sort_by(|a, b| a.0.cmp(&b.0));
        modified.dedup_by(|a, b| a.0 == b.0);

        let removed = stage
            .removed()
            .iter()
            .filter(|path| !self.working_path(path).is_file())
            .cloned()
            .collect();

        let untracked = working
            .iter()
            .filter(|name| {
                (!current.tracks(name) && !stage.is_staged(name)) || stage.is_removed(name)
            })
            .cloned()
            .collect();

        Ok(StatusReport {
            branches: self.refs.list_branches()?,
            current_branch: self.refs.current_branch()?,
            staged,
            removed,
            modified,
            untracked,
        })
    }

    // ------------------------------------------------------------------
    // Checkout / branch / reset
    // ------------------------------------------------------------------

    /// Restore one file from the current commit.
    pub fn checkout_file(&self, path: &str) -> Result<(), RepoError> {
        let head = self.refs.head()?;
        self.materialize_file(&head, path)
    }

    /// Restore one file from the commit named by an id prefix.
    pub fn checkout_file_at(&self, id_prefix: &str, path: &str) -> Result<(), RepoError> {
        let id = self.resolve_commit(id_prefix)?;
        self.materialize_file(&id, path)
    }

    fn materialize_file(&self, commit_id: &Digest, path: &str) -> Result<(), RepoError> {
        let commit = self.store.get_commit(commit_id)?;
        let blob = commit
            .blob(path)
            .ok_or_else(|| RepoError::FileNotInCommit(path.to_string()))?;
        let content = self.store.get_blob(blob)?;
        fs::write(self.working_path(path), content)?;
        Ok(())
    }

    /// Switch the working directory to another branch.
    pub fn checkout_branch(&self, name: &str) -> Result<(), RepoError> {
        if !self.refs.branch_exists(name) {
            return Err(RepoError::BranchNotFound(name.to_string()));
        }
        if name == self.refs.current_branch()? {
            return Err(RepoError::CurrentBranch(name.to_string()));
        }
        let target = self.refs.branch_tip(name)?;
        self.checkout_commit(&target)?;
        self.refs.set_current_branch(name)?;
        self.refs.set_head(&target)?;
        info!(branch = name, "checked out branch");
        Ok(())
    }

    /// Move the current branch (and HEAD) to an arbitrary commit and check
    /// it out. The branch name itself does not change.
    pub fn reset(&self, id_prefix: &str) -> Result<(), RepoError> {
        let target = self.resolve_commit(id_prefix)?;
        self.checkout_commit(&target)?;
        let branch = self.refs.current_branch()?;
        self.refs.advance(&branch, &target)?;
        Ok(())
    }

    /// Replace the working directory contents with a commit's snapshot.
    ///
    /// The untracked-file scan runs to completion over every working file
    /// before the first deletion or write: either the whole checkout is
    /// admissible or nothing is touched.
    pub(crate) fn checkout_commit(&self, target: &Digest) -> Result<(), RepoError> {
        let (_, current) = self.head_commit()?;
        let target_commit = self.store.get_commit(target)?;
        let mut stage = self.load_stage()?;
        let working = self.working_files()?;

        for name in &working {
            let untracked = !current.tracks(name) && !stage.is_staged(name);
            if untracked || stage.is_removed(name) {
                return Err(RepoError::UntrackedFileConflict(name.clone()));
            }
        }

        for name in &working {
            fs::remove_file(self.working_path(name))?;
        }
        for (path, blob) in &target_commit.snapshot {
            let content = self.store.get_blob(blob)?;
            fs::write(self.working_path(path), content)?;
        }

        stage.clear();
        self.save_stage(&stage)?;
        Ok(())
    }

    /// Create a branch pointing at the current commit.
    pub fn branch(&self, name: &str) -> Result<(), RepoError> {
        if self.refs.branch_exists(name) {
            return Err(RepoError::BranchExists(name.to_string()));
        }
        let head = self.refs.head()?;
        self.refs.set_branch(name, &head)
    }

    /// Delete a branch pointer (never the branch the repository is on).
    pub fn rm_branch(&self, name: &str) -> Result<(), RepoError> {
        if !self.refs.branch_exists(name) {
            return Err(RepoError::BranchNotFound(name.to_string()));
        }
        if name == self.refs.current_branch()? {
            return Err(RepoError::CannotRemoveCurrent(name.to_string()));
        }
        self.refs.delete_branch(name)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::INITIAL_COMMIT_MESSAGE;
    use tempfile::TempDir;

    fn repo() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        (dir, repo)
    }

    fn write_file(repo: &Repository, name: &str, content: &str) {
        fs::write(repo.working_path(name), content).unwrap();
    }

    #[test]
    fn test_init_creates_root_commit_on_master() {
        let (_dir, repo) = repo();
        let (head, commit) = repo.head_commit().unwrap();
        assert_eq!(commit.message, INITIAL_COMMIT_MESSAGE);
        assert!(commit.parent.is_none());
        assert_eq!(repo.refs.branch_tip("master").unwrap(), head);
        assert_eq!(repo.refs.current_branch().unwrap(), "master");
    }

    #[test]
    fn test_init_twice_fails() {
        let (dir, _repo) = repo();
        assert!(matches!(
            Repository::init(dir.path()),
            Err(RepoError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_open_outside_repository_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::NotARepository)
        ));
    }

    #[test]
    fn test_add_commit_advances_head_and_clears_stage() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        assert!(repo.load_stage().unwrap().is_staged("f"));

        let id = repo.commit("m1").unwrap();
        assert!(repo.load_stage().unwrap().is_empty());
        assert_eq!(repo.refs.head().unwrap(), id);

        let log = repo.log().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].message, "m1");
        assert_eq!(log[1].message, INITIAL_COMMIT_MESSAGE);
    }

    #[test]
    fn test_add_missing_file_fails() {
        let (_dir, repo) = repo();
        assert!(matches!(
            repo.add("ghost"),
            Err(RepoError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_add_unchanged_tracked_file_restores_clean_stage() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        repo.commit("m1").unwrap();

        // rm stages a removal and deletes the file; re-adding the identical
        // content must cancel the removal and leave nothing pending.
        repo.rm("f").unwrap();
        assert!(repo.load_stage().unwrap().is_removed("f"));
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        assert!(repo.load_stage().unwrap().is_empty());
    }

    #[test]
    fn test_commit_with_empty_stage_fails() {
        let (_dir, repo) = repo();
        assert!(matches!(
            repo.commit("nothing"),
            Err(RepoError::NothingToCommit)
        ));
    }

    #[test]
    fn test_rm_untracked_unstaged_fails() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        assert!(matches!(
            repo.rm("f"),
            Err(RepoError::NothingToRemove(_))
        ));
    }

    #[test]
    fn test_rm_tracked_file_deletes_and_marks() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        repo.commit("m1").unwrap();

        repo.rm("f").unwrap();
        assert!(!repo.working_path("f").exists());
        assert!(repo.load_stage().unwrap().is_removed("f"));

        let id = repo.commit("drop f").unwrap();
        assert!(!repo.store.get_commit(&id).unwrap().tracks("f"));
    }

    #[test]
    fn test_commit_snapshot_is_independent_of_parent() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        let first = repo.commit("m1").unwrap();

        write_file(&repo, "f", "y");
        repo.add("f").unwrap();
        let second = repo.commit("m2").unwrap();

        let old = repo.store.get_commit(&first).unwrap();
        let new = repo.store.get_commit(&second).unwrap();
        assert_ne!(old.snapshot.get("f"), new.snapshot.get("f"));
    }

    #[test]
    fn test_branch_and_rm_branch() {
        let (_dir, repo) = repo();
        repo.branch("side").unwrap();
        assert!(matches!(
            repo.branch("side"),
            Err(RepoError::BranchExists(_))
        ));
        assert!(matches!(
            repo.rm_branch("master"),
            Err(RepoError::CannotRemoveCurrent(_))
        ));
        repo.rm_branch("side").unwrap();
        assert!(matches!(
            repo.rm_branch("side"),
            Err(RepoError::BranchNotFound(_))
        ));
    }

    #[test]
    fn test_checkout_branch_swaps_working_files() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "master content");
        repo.add("f").unwrap();
        repo.commit("on master").unwrap();

        repo.branch("side").unwrap();
        repo.checkout_branch("side").unwrap();
        write_file(&repo, "f", "side content");
        repo.add("f").unwrap();
        repo.commit("on side").unwrap();

        repo.checkout_branch("master").unwrap();
        assert_eq!(
            fs::read_to_string(repo.working_path("f")).unwrap(),
            "master content"
        );
    }

    #[test]
    fn test_checkout_current_branch_fails() {
        let (_dir, repo) = repo();
        assert!(matches!(
            repo.checkout_branch("master"),
            Err(RepoError::CurrentBranch(_))
        ));
    }

    #[test]
    fn test_checkout_blocks_on_untracked_file() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        repo.commit("m1").unwrap();
        repo.branch("side").unwrap();

        write_file(&repo, "loose", "untracked");
        let err = repo.checkout_branch("side").unwrap_err();
        assert!(matches!(err, RepoError::UntrackedFileConflict(_)));
        // Pre-flight gate: nothing may have been touched.
        assert_eq!(
            fs::read_to_string(repo.working_path("loose")).unwrap(),
            "untracked"
        );
        assert_eq!(repo.refs.current_branch().unwrap(), "master");
    }

    #[test]
    fn test_reset_moves_branch_pointer_only() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        let first = repo.commit("m1").unwrap();
        write_file(&repo, "f", "y");
        repo.add("f").unwrap();
        repo.commit("m2").unwrap();

        repo.reset(&crate::types::to_hex(&first)).unwrap();
        assert_eq!(repo.refs.head().unwrap(), first);
        assert_eq!(repo.refs.branch_tip("master").unwrap(), first);
        assert_eq!(repo.refs.current_branch().unwrap(), "master");
        assert_eq!(fs::read_to_string(repo.working_path("f")).unwrap(), "x");
    }

    #[test]
    fn test_checkout_file_from_older_commit_by_prefix() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "old");
        repo.add("f").unwrap();
        let first = repo.commit("m1").unwrap();
        write_file(&repo, "f", "new");
        repo.add("f").unwrap();
        repo.commit("m2").unwrap();

        let prefix = &crate::types::to_hex(&first)[0..8];
        repo.checkout_file_at(prefix, "f").unwrap();
        assert_eq!(fs::read_to_string(repo.working_path("f")).unwrap(), "old");
    }

    #[test]
    fn test_resolve_prefix_errors() {
        let (_dir, repo) = repo();
        assert!(matches!(
            repo.resolve_commit("deadbeef"),
            Err(RepoError::CommitNotFound(_))
        ));
        // Every id shares the empty prefix with the root commit plus any
        // other commit, so two commits make "" ambiguous.
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        repo.commit("m1").unwrap();
        assert!(matches!(
            repo.resolve_commit(""),
            Err(RepoError::AmbiguousId(_))
        ));
    }

    #[test]
    fn test_find_matches_exact_message() {
        let (_dir, repo) = repo();
        write_file(&repo, "f", "x");
        repo.add("f").unwrap();
        let id = repo.commit("needle").unwrap();

        assert_eq!(repo.find("needle").unwrap(), vec![id]);
        assert!(matches!(
            repo.find("needl"),
            Err(RepoError::NoMatchingCommit(_))
        ));
    }

    #[test]
    fn test_status_classification() {
        let (_dir, repo) = repo();
        write_file(&repo, "committed", "1");
        repo.add("committed").unwrap();
        repo.commit("base").unwrap();

        write_file(&repo, "staged", "2");
        repo.add("staged").unwrap();
        write_file(&repo, "untracked", "3");
        write_file(&repo, "committed", "changed behind the stage's back");
        repo.rm("committed").ok();

        let status = repo.status().unwrap();
        assert_eq!(status.current_branch, "master");
        assert!(status.staged.contains(&"staged".to_string()));
        assert!(status.untracked.contains(&"untracked".to_string()));
    }

    #[test]
    fn test_status_reports_modified_and_deleted() {
        let (_dir, repo) = repo();
        write_file(&repo, "a", "1");
        write_file(&repo, "b", "1");
        repo.add("a").unwrap();
        repo.add("b").unwrap();
        repo.commit("base").unwrap();

        write_file(&repo, "a", "2");
        fs::remove_file(repo.working_path("b")).unwrap();

        let status = repo.status().unwrap();
        assert!(status
            .modified
            .contains(&("a".to_string(), FileChange::Modified)));
        assert!(status
            .modified
            .contains(&("b".to_string(), FileChange::Deleted)));
    }
}
