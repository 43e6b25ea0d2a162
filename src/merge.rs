//! Three-way merge engine
//!
//! Merging is a pure classification over three snapshots (split point, our
//! tip, their tip) followed by one apply pass. Every path in the union of
//! the snapshots is classified independently from its three optional blob
//! digests; the full plan is computed and validated before the working
//! directory or any persisted state is touched.

use crate::error::RepoError;
use crate::repo::Repository;
use crate::types::Digest;
use chrono::Utc;
use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, info};

/// Result of a `merge` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The target tip is already an ancestor of the current tip.
    AlreadyUpToDate,
    /// Our tip was an ancestor of the target tip; the branch was checked
    /// out instead of creating a merge commit.
    FastForward,
    /// A merge commit was created; `conflict` is true when at least one
    /// path needed conflict markers.
    Merged { commit: Digest, conflict: bool },
}

/// Per-path merge decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Our side's state (present or absent) wins; nothing to do.
    KeepOurs,
    /// Their content replaces ours in the working directory and snapshot.
    TakeTheirs,
    /// The path is removed from the working directory and snapshot.
    Delete,
    /// Both sides changed the path in different ways since the split.
    Conflict,
}

/// Classify one path from its blob digests at the split point, our tip, and
/// their tip (`None` = absent from that snapshot).
///
/// The rules reduce to three questions, asked in order: did both sides end
/// up identical, did only their side change, did only our side change.
/// Anything left changed on both sides in different ways.
pub fn classify(
    split: Option<&Digest>,
    ours: Option<&Digest>,
    theirs: Option<&Digest>,
) -> Resolution {
    if ours == theirs {
        // Unchanged, changed identically, or deleted on both sides.
        return Resolution::KeepOurs;
    }
    if split == ours {
        // Our side untouched since the split; their change wins.
        return match theirs {
            Some(_) => Resolution::TakeTheirs,
            None => Resolution::Delete,
        };
    }
    if split == theirs {
        // Their side untouched since the split; our change wins.
        return Resolution::KeepOurs;
    }
    Resolution::Conflict
}

/// Conflict file body embedding both divergent versions.
pub fn conflict_bytes(ours: &[u8], theirs: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ours.len() + theirs.len() + 32);
    bytes.extend_from_slice(b"<<<<<<< HEAD\n");
    bytes.extend_from_slice(ours);
    bytes.extend_from_slice(b"\n=======\n");
    bytes.extend_from_slice(theirs);
    bytes.extend_from_slice(b"\n>>>>>>>\n");
    bytes
}

/// Merge the named branch into the current branch.
pub fn merge(repo: &Repository, branch: &str) -> Result<MergeOutcome, RepoError> {
    // Preconditions, each its own failure, in this order.
    if !repo.load_stage()?.is_empty() {
        return Err(RepoError::UncommittedChanges);
    }
    if !repo.refs.branch_exists(branch) {
        return Err(RepoError::BranchNotFound(branch.to_string()));
    }
    let current_branch = repo.refs.current_branch()?;
    if branch == current_branch {
        return Err(RepoError::SelfMerge(branch.to_string()));
    }

    let head = repo.refs.head()?;
    let target_tip = repo.refs.branch_tip(branch)?;
    let split = repo
        .graph()
        .lowest_common_ancestor(head, target_tip)
        .map_err(RepoError::from)?
        .ok_or(RepoError::NoCommonAncestor)?;

    if split == target_tip {
        return Ok(MergeOutcome::AlreadyUpToDate);
    }
    if split == head {
        repo.checkout_branch(branch)?;
        return Ok(MergeOutcome::FastForward);
    }

    let ours = repo.store.get_commit(&head)?;
    let theirs = repo.store.get_commit(&target_tip)?;
    let base = repo.store.get_commit(&split)?;

    // Phase 1: classify every path in the union of the three snapshots.
    let mut paths: BTreeSet<&String> = BTreeSet::new();
    paths.extend(base.snapshot.keys());
    paths.extend(ours.snapshot.keys());
    paths.extend(theirs.snapshot.keys());

    let plan: Vec<(String, Resolution)> = paths
        .into_iter()
        .map(|path| {
            let resolution = classify(
                base.snapshot.get(path),
                ours.snapshot.get(path),
                theirs.snapshot.get(path),
            );
            (path.clone(), resolution)
        })
        .collect();

    // Phase 2: admissibility gate. Any path this merge would write that our
    // commit does not track is an untracked working file if it exists on
    // disk. The whole scan finishes before anything is mutated.
    for (path, resolution) in &plan {
        let writes = matches!(resolution, Resolution::TakeTheirs | Resolution::Conflict);
        if writes && !ours.tracks(path) && repo.work_dir().join(path).is_file() {
            return Err(RepoError::UntrackedFileConflict(path.clone()));
        }
    }

    // Phase 3: apply. The merged snapshot starts as a copy of ours; the
    // parent commits' snapshots are never touched.
    let mut snapshot = ours.snapshot.clone();
    let mut conflict = false;

    for (path, resolution) in &plan {
        match resolution {
            Resolution::KeepOurs => {}
            Resolution::TakeTheirs => {
                // TakeTheirs is only produced when their snapshot has the path.
                if let Some(&blob) = theirs.snapshot.get(path) {
                    let content = repo.store.get_blob(&blob)?;
                    fs::write(repo.work_dir().join(path), content)?;
                    snapshot.insert(path.clone(), blob);
                }
            }
            Resolution::Delete => {
                let file = repo.work_dir().join(path);
                if file.is_file() {
                    fs::remove_file(file)?;
                }
                snapshot.remove(path);
            }
            Resolution::Conflict => {
                debug!(path, "merge conflict");
                let our_content = match ours.snapshot.get(path) {
                    Some(blob) => repo.store.get_blob(blob)?,
                    None => Vec::new(),
                };
                let their_content = match theirs.snapshot.get(path) {
                    Some(blob) => repo.store.get_blob(blob)?,
                    None => Vec::new(),
                };
                let merged = conflict_bytes(&our_content, &their_content);
                fs::write(repo.work_dir().join(path), &merged)?;
                let blob = repo.store.put_blob(&merged)?;
                snapshot.insert(path.clone(), blob);
                conflict = true;
            }
        }
    }

    let commit = crate::commit::Commit {
        message: format!("Merged {} into {}.", branch, current_branch),
        timestamp: Utc::now().timestamp(),
        parent: Some(head),
        second_parent: Some(target_tip),
        snapshot,
    };
    let id = repo.finish_commit(commit)?;

    info!(
        from = branch,
        into = %current_branch,
        conflict,
        "merge commit created"
    );
    Ok(MergeOutcome::Merged {
        commit: id,
        conflict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(content: &[u8]) -> Digest {
        *blake3::hash(content).as_bytes()
    }

    #[test]
    fn test_classify_unchanged_everywhere() {
        let x = digest(b"x");
        assert_eq!(
            classify(Some(&x), Some(&x), Some(&x)),
            Resolution::KeepOurs
        );
    }

    #[test]
    fn test_classify_changed_only_on_theirs() {
        let x = digest(b"x");
        let y = digest(b"y");
        assert_eq!(
            classify(Some(&x), Some(&x), Some(&y)),
            Resolution::TakeTheirs
        );
    }

    #[test]
    fn test_classify_changed_only_on_ours() {
        let x = digest(b"x");
        let y = digest(b"y");
        assert_eq!(
            classify(Some(&x), Some(&y), Some(&x)),
            Resolution::KeepOurs
        );
    }

    #[test]
    fn test_classify_changed_identically_on_both() {
        let x = digest(b"x");
        let y = digest(b"y");
        assert_eq!(
            classify(Some(&x), Some(&y), Some(&y)),
            Resolution::KeepOurs
        );
    }

    #[test]
    fn test_classify_changed_differently_on_both() {
        let x = digest(b"x");
        let y = digest(b"y");
        let z = digest(b"z");
        assert_eq!(
            classify(Some(&x), Some(&y), Some(&z)),
            Resolution::Conflict
        );
    }

    #[test]
    fn test_classify_added_only_on_theirs() {
        let y = digest(b"y");
        assert_eq!(classify(None, None, Some(&y)), Resolution::TakeTheirs);
    }

    #[test]
    fn test_classify_added_only_on_ours() {
        let y = digest(b"y");
        assert_eq!(classify(None, Some(&y), None), Resolution::KeepOurs);
    }

    #[test]
    fn test_classify_added_differently_on_both() {
        let y = digest(b"y");
        let z = digest(b"z");
        assert_eq!(classify(None, Some(&y), Some(&z)), Resolution::Conflict);
    }

    #[test]
    fn test_classify_deleted_on_theirs_unchanged_on_ours() {
        let x = digest(b"x");
        assert_eq!(classify(Some(&x), Some(&x), None), Resolution::Delete);
    }

    #[test]
    fn test_classify_deleted_on_theirs_changed_on_ours() {
        let x = digest(b"x");
        let y = digest(b"y");
        assert_eq!(classify(Some(&x), Some(&y), None), Resolution::Conflict);
    }

    #[test]
    fn test_classify_deleted_on_ours_changed_on_theirs() {
        let x = digest(b"x");
        let z = digest(b"z");
        assert_eq!(classify(Some(&x), None, Some(&z)), Resolution::Conflict);
    }

    #[test]
    fn test_classify_deleted_on_both() {
        let x = digest(b"x");
        assert_eq!(classify(Some(&x), None, None), Resolution::KeepOurs);
    }

    #[test]
    fn test_classify_deleted_on_ours_unchanged_on_theirs() {
        let x = digest(b"x");
        assert_eq!(classify(Some(&x), None, Some(&x)), Resolution::KeepOurs);
    }

    #[test]
    fn test_conflict_bytes_has_single_marker_set() {
        let merged = conflict_bytes(b"ours", b"theirs");
        let text = String::from_utf8(merged).unwrap();
        assert_eq!(text.matches("<<<<<<<").count(), 1);
        assert_eq!(text.matches("=======").count(), 1);
        assert_eq!(text.matches(">>>>>>>").count(), 1);
        assert!(text.contains("ours"));
        assert!(text.contains("theirs"));
        let head_pos = text.find("<<<<<<< HEAD").unwrap();
        let sep_pos = text.find("=======").unwrap();
        let end_pos = text.find(">>>>>>>").unwrap();
        assert!(head_pos < sep_pos && sep_pos < end_pos);
    }
}
