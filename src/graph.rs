//! Commit graph traversal
//!
//! Commits form a DAG: each node links to at most two strictly earlier
//! parents (a commit can only reference already-persisted commits, so cycles
//! cannot be constructed). Traversals here are iterative breadth-first walks
//! with explicit frontiers and visited sets, which keeps memory bounded on
//! long histories.

use crate::error::StoreError;
use crate::store::ObjectStore;
use crate::types::Digest;
use std::collections::{HashSet, VecDeque};

/// Read-only traversal handle over the commits in one store.
pub struct CommitGraph<'a> {
    store: &'a ObjectStore,
}

impl<'a> CommitGraph<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Lazy breadth-first walk of `start` and everything reachable from it,
    /// following both parent links. `start` itself is yielded first.
    pub fn ancestors(&self, start: Digest) -> Ancestors<'a> {
        let mut frontier = VecDeque::new();
        frontier.push_back(start);
        Ancestors {
            store: self.store,
            frontier,
            seen: HashSet::new(),
        }
    }

    /// True iff `ancestor` is reachable from `descendant` (every commit is
    /// an ancestor of itself).
    pub fn is_ancestor(&self, ancestor: &Digest, descendant: &Digest) -> Result<bool, StoreError> {
        for visited in self.ancestors(*descendant) {
            if visited? == *ancestor {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Nearest common ancestor of two commits (the three-way-merge split
    /// point).
    ///
    /// Two frontiers expand both histories in lockstep, one BFS step per
    /// side per round; the first digest seen by both sides is the nearest
    /// common commit. Returns `None` only for histories that share no root,
    /// which cannot happen between commits of a single repository.
    pub fn lowest_common_ancestor(
        &self,
        a: Digest,
        b: Digest,
    ) -> Result<Option<Digest>, StoreError> {
        let mut seen_a: HashSet<Digest> = HashSet::new();
        let mut seen_b: HashSet<Digest> = HashSet::new();
        let mut frontier_a: VecDeque<Digest> = VecDeque::from([a]);
        let mut frontier_b: VecDeque<Digest> = VecDeque::from([b]);

        while !frontier_a.is_empty() || !frontier_b.is_empty() {
            if let Some(found) =
                self.step(&mut frontier_a, &mut seen_a, &seen_b)?
            {
                return Ok(Some(found));
            }
            if let Some(found) =
                self.step(&mut frontier_b, &mut seen_b, &seen_a)?
            {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }

    /// Advance one BFS step on one side; report a digest the other side has
    /// already visited.
    fn step(
        &self,
        frontier: &mut VecDeque<Digest>,
        seen: &mut HashSet<Digest>,
        other_seen: &HashSet<Digest>,
    ) -> Result<Option<Digest>, StoreError> {
        let current = match frontier.pop_front() {
            Some(digest) => digest,
            None => return Ok(None),
        };
        if !seen.insert(current) {
            return Ok(None);
        }
        if other_seen.contains(&current) {
            return Ok(Some(current));
        }

        let commit = self.store.get_commit(&current)?;
        if let Some(parent) = commit.parent {
            frontier.push_back(parent);
        }
        if let Some(parent) = commit.second_parent {
            frontier.push_back(parent);
        }
        Ok(None)
    }
}

/// Iterator state for [`CommitGraph::ancestors`].
pub struct Ancestors<'a> {
    store: &'a ObjectStore,
    frontier: VecDeque<Digest>,
    seen: HashSet<Digest>,
}

impl Iterator for Ancestors<'_> {
    type Item = Result<Digest, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current) = self.frontier.pop_front() {
            if !self.seen.insert(current) {
                continue;
            }
            let commit = match self.store.get_commit(&current) {
                Ok(commit) => commit,
                Err(err) => return Some(Err(err)),
            };
            if let Some(parent) = commit.parent {
                self.frontier.push_back(parent);
            }
            if let Some(parent) = commit.second_parent {
                self.frontier.push_back(parent);
            }
            return Some(Ok(current));
        }
        None
    }
}
