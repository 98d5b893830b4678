// src/greptile/mod.rs
// =============================================================================
// The remote indexing/query service, seen from our side.
//
// Submodules:
// - types: JSON request/response bodies
// - client: the real HTTP implementation (reqwest)
// - fake: a scripted in-memory implementation used by tests
//
// Everything above this module talks to the service through the IndexApi
// trait, never through reqwest directly. That keeps the search pipeline
// testable without a network.
//
// Rust concepts:
// - Traits: a shared interface that several types can implement
// - BoxFuture: a heap-allocated future, so async methods fit in a trait
//   that can also be used as `dyn IndexApi`
// =============================================================================

mod client;
mod types;

#[cfg(test)]
pub mod fake;

pub use client::GreptileClient;
pub use types::{
    IndexRequest, QueryRequest, RepositoryStatus, SearchResult, SourceEntry, SubmitResponse,
};

use crate::error::ApiError;
use futures::future::BoxFuture;

/// Operations the indexing service offers.
///
/// Every method resolves to `Err(ApiError::Status { .. })` for a non-2xx
/// response, so callers never have to inspect raw status codes.
pub trait IndexApi: Send + Sync {
    /// `GET /repositories/{key}` where key is `github:{branch}:{owner}/{name}`
    fn repository_status<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<RepositoryStatus, ApiError>>;

    /// `POST /repositories`
    fn submit_repository<'a>(
        &'a self,
        request: &'a IndexRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>>;

    /// `POST /query`
    fn query<'a>(&'a self, request: &'a QueryRequest)
        -> BoxFuture<'a, Result<SearchResult, ApiError>>;
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not `async fn` in the trait?
//    - A trait with plain async fns can't be turned into a trait object
//    - BoxFuture<'a, T> is Pin<Box<dyn Future<Output = T> + Send + 'a>>
//    - Implementations just write Box::pin(async move { ... })
//
// 2. What does the 'a lifetime mean here?
//    - The returned future borrows `self` and the request
//    - 'a ties them together: the future can't outlive what it borrows
//
// 3. Why Send + Sync?
//    - tokio may move futures between threads
//    - The client is shared by reference across the whole search
// -----------------------------------------------------------------------------
