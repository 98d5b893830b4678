// src/greptile/types.rs
// =============================================================================
// Request and response bodies exchanged with the indexing service.
//
//   POST /repositories        IndexRequest      -> SubmitResponse
//   GET  /repositories/{key}                    -> RepositoryStatus
//   POST /query               QueryRequest      -> SearchResult
//
// The service is a black box, so the response types are lenient: unknown
// fields are ignored and optional fields default to None / empty.
// =============================================================================

use serde::{Deserialize, Deserializer, Serialize};

use crate::github::{Branch, RepositoryRef, REMOTE};

/// Body of `POST /repositories`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexRequest {
    pub remote: String,
    pub repository: String,
    pub branch: Branch,
}

impl IndexRequest {
    pub fn new(repo: &RepositoryRef, branch: Branch) -> Self {
        Self {
            remote: REMOTE.to_string(),
            repository: repo.to_string(),
            branch,
        }
    }
}

/// Whatever the service says after accepting a submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, rename = "statusEndpoint")]
    pub status_endpoint: Option<String>,
}

/// Body of `GET /repositories/{key}`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "filesProcessed")]
    pub files_processed: Option<u64>,
    #[serde(default, rename = "numFiles")]
    pub num_files: Option<u64>,
}

impl RepositoryStatus {
    /// Only these two statuses mean the index can be queried
    pub fn is_done(&self) -> bool {
        matches!(self.status.as_deref(), Some("COMPLETED") | Some("READY"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// One repository the query is scoped to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryScope {
    pub remote: String,
    pub repository: String,
    pub branch: Branch,
}

/// Body of `POST /query`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub messages: Vec<Message>,
    pub repositories: Vec<RepositoryScope>,
    pub genius: bool,
}

impl QueryRequest {
    /// A single-turn user question scoped to one repository on one branch
    pub fn single(prompt: &str, repo: &RepositoryRef, branch: Branch) -> Self {
        Self {
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            repositories: vec![RepositoryScope {
                remote: REMOTE.to_string(),
                repository: repo.to_string(),
                branch,
            }],
            genius: true,
        }
    }
}

/// A source file the service used to build its answer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceEntry {
    #[serde(alias = "filepath")]
    pub file: String,
    #[serde(default, alias = "summary")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Response of `POST /query`, handed to the discovery parser and renderer
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SearchResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<SourceEntry>,
}

// The service sends `"sources": null` as often as it omits the field
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SourceEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SourceEntry>>::deserialize(deserializer)?.unwrap_or_default())
}
