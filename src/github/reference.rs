// src/github/reference.rs
// =============================================================================
// Turns whatever the user typed into a validated repository reference.
//
// Accepted input:
//   - owner/repo
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - github.com/owner/repo/
//
// Validation happens here, before anything touches the network. A reference
// is valid only if it has exactly two non-empty segments: owner and name.
//
// Rust concepts:
// - Newtype-ish structs: RepositoryRef can only be built through parse()
// - impl Display: lets us write format!("{}", repo) -> "owner/repo"
// - FromStr: lets callers write "owner/repo".parse::<RepositoryRef>()
// =============================================================================

use crate::error::SearchError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::Branch;

/// A validated `owner/name` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    owner: String,
    name: String,
}

impl RepositoryRef {
    /// Normalizes and validates user input.
    ///
    /// Full GitHub URLs are reduced to their `owner/name` path first.
    pub fn parse(input: &str) -> Result<Self, SearchError> {
        let normalized = normalize(input)?;
        validate(&normalized).ok_or_else(|| SearchError::InvalidRepository {
            input: input.trim().to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key the indexing service uses to identify this repository on a branch
    ///
    /// Example: github:main:rust-lang/rust
    pub fn index_key(&self, branch: Branch) -> String {
        format!("github:{}:{}/{}", branch, self.owner, self.name)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Strips URL decoration so only "owner/name" (or garbage) is left
fn normalize(input: &str) -> Result<String, SearchError> {
    let trimmed = input.trim();

    let has_scheme = trimmed.starts_with("http://") || trimmed.starts_with("https://");
    let github_prefixed =
        trimmed.starts_with("github.com/") || trimmed.starts_with("www.github.com/");
    let segments = trimmed.trim_end_matches('/').split('/').count();

    // "github.com/foo" is an owner called github.com, not a URL
    if !has_scheme && !(github_prefixed && segments >= 3) {
        return Ok(strip_git_suffix(trimmed).to_string());
    }

    // Give scheme-less input a scheme so the url crate can parse it
    let with_scheme = if has_scheme {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme).map_err(|_| SearchError::InvalidRepository {
        input: trimmed.to_string(),
    })?;

    match url.host_str() {
        Some("github.com") | Some("www.github.com") => {}
        _ => {
            return Err(SearchError::NotGithub {
                input: trimmed.to_string(),
            })
        }
    }

    let path = url.path().trim_start_matches('/').trim_end_matches('/');
    Ok(strip_git_suffix(path).to_string())
}

// Removes one ".git" from the name, unless that would leave no name
fn strip_git_suffix(path: &str) -> &str {
    match path.strip_suffix(".git") {
        Some(rest) if !rest.is_empty() && !rest.ends_with('/') => rest,
        _ => path,
    }
}

fn validate(candidate: &str) -> Option<RepositoryRef> {
    let parts: Vec<&str> = candidate.split('/').map(str::trim).collect();

    match parts.as_slice() {
        [owner, name] if !owner.is_empty() && !name.is_empty() => Some(RepositoryRef {
            owner: owner.to_string(),
            name: name.to_string(),
        }),
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why are the fields private?
//    - Nobody outside this module can build a RepositoryRef by hand
//    - So every RepositoryRef in the program has passed validation
//    - Accessor methods (owner(), name()) give read-only access
//
// 2. What is match on a slice?
//    - parts.as_slice() turns the Vec into a &[&str]
//    - [owner, name] only matches a slice of exactly two elements
//    - The `if` guard adds the "non-empty" requirement
//
// 3. What does ok_or_else do?
//    - Converts Option<T> into Result<T, E>
//    - Some(v) -> Ok(v), None -> Err(closure())
//    - The closure only runs on the error path
// -----------------------------------------------------------------------------
