// src/search/context.rs
// =============================================================================
// Per-search state: which repository, which branch answered, how far along
// indexing is.
//
// One SearchContext is created per search and passed by &mut through
// submit -> poll -> query. Two searches never share one, so they can't
// overwrite each other's branch.
// =============================================================================

use serde::Serialize;
use std::fmt;

use crate::github::{Branch, RepositoryRef};

/// What we know about the remote index for this search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexState {
    Unknown,
    Indexing,
    Ready,
}

impl fmt::Display for IndexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexState::Unknown => "unknown",
            IndexState::Indexing => "indexing",
            IndexState::Ready => "ready",
        })
    }
}

#[derive(Debug, Clone)]
pub struct SearchContext {
    repo: RepositoryRef,
    branch: Option<Branch>,
    state: IndexState,
}

impl SearchContext {
    pub fn new(repo: RepositoryRef) -> Self {
        Self {
            repo,
            branch: None,
            state: IndexState::Unknown,
        }
    }

    pub fn repo(&self) -> &RepositoryRef {
        &self.repo
    }

    /// The branch the service most recently confirmed for this search
    pub fn branch(&self) -> Option<Branch> {
        self.branch
    }

    /// Branch to scope queries to; `main` until something else is confirmed
    pub fn query_branch(&self) -> Branch {
        self.branch.unwrap_or(Branch::Main)
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == IndexState::Ready
    }

    pub(crate) fn mark_ready(&mut self, branch: Branch) {
        self.branch = Some(branch);
        self.state = IndexState::Ready;
    }

    pub(crate) fn mark_indexing(&mut self, branch: Branch) {
        self.branch = Some(branch);
        self.state = IndexState::Indexing;
    }
}
