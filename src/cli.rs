//! CLI domain: parse, route, and presentation only.
//!
//! The core returns structured results and errors; this module owns every
//! user-facing string and exit decision. One route table dispatches to the
//! repository, merge, and remote services.

use crate::error::RepoError;
use crate::merge::{self, MergeOutcome};
use crate::remote;
use crate::repo::{FileChange, LogEntry, Repository, StatusReport};
use crate::types::{short_hex, to_hex};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "keel", version, about = "Miniature content-addressed version control")]
pub struct Cli {
    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, default_value = ".", global = true)]
    pub workdir: PathBuf,

    /// Log level override: trace, debug, info, warn, error, off
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format override: text, json
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Silence logging entirely
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty repository in the working directory
    Init,
    /// Stage a file's current content for the next commit
    Add { path: String },
    /// Record the staged changes as a new commit
    Commit { message: String },
    /// Unstage a file, or mark a tracked file for removal
    Rm { path: String },
    /// Show the current branch's history, first parents only
    Log,
    /// Show every commit in the repository
    GlobalLog,
    /// List ids of commits whose message matches exactly
    Find { message: String },
    /// Summarize branches, staged and pending changes, untracked files
    Status,
    /// Switch branch, or restore a file from HEAD or a given commit
    ///
    /// Forms: `checkout <branch>`, `checkout -- <path>`,
    /// `checkout <commit> -- <path>`.
    Checkout {
        /// Branch name or commit id prefix
        target: Option<String>,
        /// File path, after `--`
        #[arg(last = true)]
        path: Vec<String>,
    },
    /// Create a branch pointing at the current commit
    Branch { name: String },
    /// Delete a branch pointer
    RmBranch { name: String },
    /// Move the current branch and working directory to a commit
    Reset { commit: String },
    /// Merge a branch into the current branch
    Merge { branch: String },
    /// Register a remote repository location
    AddRemote { name: String, location: PathBuf },
    /// Forget a remote and its fetched branch namespace
    RmRemote { name: String },
    /// Push the current branch to a remote branch
    Push { remote: String, branch: String },
    /// Fetch a remote branch into the remote/branch namespace
    Fetch { remote: String, branch: String },
    /// Fetch a remote branch and merge it
    Pull { remote: String, branch: String },
}

/// Execution context: the resolved repository root.
pub struct RunContext {
    workdir: PathBuf,
}

impl RunContext {
    pub fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    /// Run one command, returning the text to print on stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, RepoError> {
        if let Commands::Init = command {
            Repository::init(&self.workdir)?;
            return Ok(String::new());
        }

        let repo = Repository::open(&self.workdir)?;
        match command {
            Commands::Init => unreachable!("handled above"),
            Commands::Add { path } => {
                repo.add(path)?;
                Ok(String::new())
            }
            Commands::Commit { message } => {
                repo.commit(message)?;
                Ok(String::new())
            }
            Commands::Rm { path } => {
                repo.rm(path)?;
                Ok(String::new())
            }
            Commands::Log => Ok(format_log(&repo.log()?)),
            Commands::GlobalLog => Ok(format_log(&repo.global_log()?)),
            Commands::Find { message } => {
                let ids = repo.find(message)?;
                Ok(ids
                    .iter()
                    .map(to_hex)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Commands::Status => Ok(format_status(&repo.status()?)),
            Commands::Checkout { target, path } => match (target, path.as_slice()) {
                (Some(branch), []) => {
                    repo.checkout_branch(branch)?;
                    Ok(String::new())
                }
                (None, [file]) => {
                    repo.checkout_file(file)?;
                    Ok(String::new())
                }
                (Some(commit), [file]) => {
                    repo.checkout_file_at(commit, file)?;
                    Ok(String::new())
                }
                _ => Err(RepoError::Config(
                    "usage: checkout <branch> | checkout [<commit>] -- <path>".to_string(),
                )),
            },
            Commands::Branch { name } => {
                repo.branch(name)?;
                Ok(String::new())
            }
            Commands::RmBranch { name } => {
                repo.rm_branch(name)?;
                Ok(String::new())
            }
            Commands::Reset { commit } => {
                repo.reset(commit)?;
                Ok(String::new())
            }
            Commands::Merge { branch } => {
                let outcome = merge::merge(&repo, branch)?;
                Ok(format_merge_outcome(&outcome))
            }
            Commands::AddRemote { name, location } => {
                remote::add_remote(&repo, name, location)?;
                Ok(String::new())
            }
            Commands::RmRemote { name } => {
                remote::rm_remote(&repo, name)?;
                Ok(String::new())
            }
            Commands::Push { remote: name, branch } => {
                remote::push(&repo, name, branch)?;
                Ok(String::new())
            }
            Commands::Fetch { remote: name, branch } => {
                remote::fetch(&repo, name, branch)?;
                Ok(String::new())
            }
            Commands::Pull { remote: name, branch } => {
                let outcome = remote::pull(&repo, name, branch)?;
                Ok(format_merge_outcome(&outcome))
            }
        }
    }
}

fn format_log(entries: &[LogEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "===");
        let _ = writeln!(out, "commit {}", to_hex(&entry.id));
        if let Some((first, second)) = &entry.merge_parents {
            let _ = writeln!(out, "Merge: {} {}", short_hex(first), short_hex(second));
        }
        let _ = writeln!(out, "Date: {}", entry.date);
        let _ = writeln!(out, "{}", entry.message);
        let _ = writeln!(out);
    }
    out
}

fn format_status(status: &StatusReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Branches ===");
    for branch in &status.branches {
        if *branch == status.current_branch {
            let _ = writeln!(out, "*{}", branch);
        } else {
            let _ = writeln!(out, "{}", branch);
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Staged Files ===");
    for path in &status.staged {
        let _ = writeln!(out, "{}", path);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Removed Files ===");
    for path in &status.removed {
        let _ = writeln!(out, "{}", path);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Modifications Not Staged For Commit ===");
    for (path, change) in &status.modified {
        match change {
            FileChange::Modified => {
                let _ = writeln!(out, "{} (modified)", path);
            }
            FileChange::Deleted => {
                let _ = writeln!(out, "{} (deleted)", path);
            }
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "=== Untracked Files ===");
    for path in &status.untracked {
        let _ = writeln!(out, "{}", path);
    }
    out
}

fn format_merge_outcome(outcome: &MergeOutcome) -> String {
    match outcome {
        MergeOutcome::AlreadyUpToDate => {
            "Given branch is an ancestor of the current branch.".to_string()
        }
        MergeOutcome::FastForward => "Current branch fast-forwarded.".to_string(),
        MergeOutcome::Merged { conflict: true, .. } => {
            "Encountered a merge conflict.".to_string()
        }
        MergeOutcome::Merged { conflict: false, .. } => String::new(),
    }
}

/// Map a core error onto its user-facing message.
pub fn map_error(err: &RepoError) -> String {
    match err {
        RepoError::NotARepository => "Not in an initialized Keel directory.".to_string(),
        RepoError::AlreadyInitialized => {
            "A Keel version-control system already exists in the current directory.".to_string()
        }
        RepoError::FileNotFound(_) => "File does not exist.".to_string(),
        RepoError::FileNotInCommit(_) => "File does not exist in that commit.".to_string(),
        RepoError::CommitNotFound(_) => "No commit with that id exists.".to_string(),
        RepoError::AmbiguousId(_) => "Commit id is ambiguous.".to_string(),
        RepoError::NoMatchingCommit(_) => "Found no commit with that message.".to_string(),
        RepoError::BranchNotFound(_) => "A branch with that name does not exist.".to_string(),
        RepoError::BranchExists(_) => "A branch with that name already exists.".to_string(),
        RepoError::CurrentBranch(_) => "No need to checkout the current branch.".to_string(),
        RepoError::CannotRemoveCurrent(_) => "Cannot remove the current branch.".to_string(),
        RepoError::NothingToCommit => "No changes added to the commit.".to_string(),
        RepoError::NothingToRemove(_) => "No reason to remove the file.".to_string(),
        RepoError::UncommittedChanges => "You have uncommitted changes.".to_string(),
        RepoError::UntrackedFileConflict(_) => {
            "There is an untracked file in the way; delete it, or add and commit it first."
                .to_string()
        }
        RepoError::SelfMerge(_) => "Cannot merge a branch with itself.".to_string(),
        RepoError::NoCommonAncestor => "Given branches share no history.".to_string(),
        RepoError::RemoteNotFound(_) => "Remote directory not found.".to_string(),
        RepoError::RemoteExists(_) => "A remote with that name already exists.".to_string(),
        RepoError::RemoteBranchNotFound(_) => {
            "That remote does not have that branch.".to_string()
        }
        RepoError::HistoryDiverged => "Please pull down remote changes before pushing.".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Digest;

    fn digest(content: &[u8]) -> Digest {
        *blake3::hash(content).as_bytes()
    }

    #[test]
    fn test_format_log_merge_line_uses_short_ids() {
        let first = digest(b"p1");
        let second = digest(b"p2");
        let entry = LogEntry {
            id: digest(b"merge"),
            message: "Merged side into master.".to_string(),
            date: "Thu Jan 1 00:00:00 1970 +0000".to_string(),
            merge_parents: Some((first, second)),
        };
        let text = format_log(&[entry]);
        assert!(text.contains(&format!("Merge: {} {}", short_hex(&first), short_hex(&second))));
        assert!(text.starts_with("===\n"));
    }

    #[test]
    fn test_format_status_marks_current_branch() {
        let status = StatusReport {
            branches: vec!["master".to_string(), "side".to_string()],
            current_branch: "master".to_string(),
            staged: vec!["a.txt".to_string()],
            removed: vec![],
            modified: vec![("b.txt".to_string(), FileChange::Deleted)],
            untracked: vec!["c.txt".to_string()],
        };
        let text = format_status(&status);
        assert!(text.contains("*master\n"));
        assert!(text.contains("side\n"));
        assert!(text.contains("b.txt (deleted)"));
    }

    #[test]
    fn test_map_error_messages() {
        assert_eq!(
            map_error(&RepoError::NothingToCommit),
            "No changes added to the commit."
        );
        assert_eq!(
            map_error(&RepoError::HistoryDiverged),
            "Please pull down remote changes before pushing."
        );
    }
}
