// src/github/mod.rs
// =============================================================================
// GitHub-specific vocabulary: repository references and branch names.
//
// The indexing service addresses a repository as remote + owner/name +
// branch. We never ask GitHub which branch is the default one; instead we
// try a fixed list of conventional names in order (main, then master).
// =============================================================================

mod reference;

pub use reference::RepositoryRef;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remote name the indexing service uses for GitHub
pub const REMOTE: &str = "github";

/// A conventional default-branch name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    Main,
    Master,
}

/// Branches we try, in order. Nothing else is ever discovered.
pub const CANDIDATE_BRANCHES: [Branch; 2] = [Branch::Main, Branch::Master];

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Main => "main",
            Branch::Master => "master",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
