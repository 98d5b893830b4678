// src/greptile/fake.rs
// =============================================================================
// Scripted, in-memory IndexApi for tests.
//
// Each branch gets a list of status replies that are handed out one per
// status check; the last reply repeats forever. Every call is recorded so
// tests can assert on exactly what would have gone over the wire.
// =============================================================================

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Mutex;

use super::types::{IndexRequest, QueryRequest, RepositoryStatus, SearchResult, SubmitResponse};
use super::IndexApi;
use crate::error::ApiError;
use crate::github::Branch;

/// What a single status check returns
#[derive(Debug, Clone)]
pub enum StatusReply {
    /// 2xx with this `status` field
    Status(&'static str),
    /// Non-2xx response
    Fail(u16),
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Status(String),
    Submit(IndexRequest),
    Query(QueryRequest),
}

#[derive(Default)]
struct State {
    statuses: HashMap<Branch, Vec<StatusReply>>,
    status_calls: HashMap<Branch, usize>,
    submit_failures: HashMap<Branch, (u16, String)>,
    query_replies: Vec<Result<SearchResult, u16>>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the status replies for one branch (unscripted branches 404)
    pub fn with_statuses(self, branch: Branch, replies: Vec<StatusReply>) -> Self {
        self.state.lock().unwrap().statuses.insert(branch, replies);
        self
    }

    /// Make submissions for one branch fail (unscripted branches are accepted)
    pub fn with_submit_failure(self, branch: Branch, status: u16, body: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .submit_failures
            .insert(branch, (status, body.to_string()));
        self
    }

    /// Queue a query reply; replies are consumed in order, the last repeats
    pub fn with_query_reply(self, reply: Result<SearchResult, u16>) -> Self {
        self.state.lock().unwrap().query_replies.push(reply);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn status_checks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Status(_)))
            .count()
    }

    pub fn submissions(&self) -> Vec<IndexRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Submit(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn queries(&self) -> Vec<QueryRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(request) => Some(request),
                _ => None,
            })
            .collect()
    }
}

// "github:master:owner/name" -> Branch::Master
fn branch_of(key: &str) -> Option<Branch> {
    match key.split(':').nth(1) {
        Some("main") => Some(Branch::Main),
        Some("master") => Some(Branch::Master),
        _ => None,
    }
}

impl IndexApi for FakeApi {
    fn repository_status<'a>(
        &'a self,
        key: &'a str,
    ) -> BoxFuture<'a, Result<RepositoryStatus, ApiError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Status(key.to_string()));

            let branch = branch_of(key).expect("malformed repository key");
            let seen = state.status_calls.entry(branch).or_insert(0);
            let index = *seen;
            *seen += 1;

            let reply = state
                .statuses
                .get(&branch)
                .and_then(|replies| replies.get(index).or_else(|| replies.last()))
                .cloned()
                .unwrap_or(StatusReply::Fail(404));

            match reply {
                StatusReply::Status(status) => Ok(RepositoryStatus {
                    status: Some(status.to_string()),
                    files_processed: None,
                    num_files: None,
                }),
                StatusReply::Fail(status) => Err(ApiError::Status {
                    status,
                    body: "not found".to_string(),
                }),
            }
        })
    }

    fn submit_repository<'a>(
        &'a self,
        request: &'a IndexRequest,
    ) -> BoxFuture<'a, Result<SubmitResponse, ApiError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Submit(request.clone()));

            match state.submit_failures.get(&request.branch) {
                Some((status, body)) => Err(ApiError::Status {
                    status: *status,
                    body: body.clone(),
                }),
                None => Ok(SubmitResponse {
                    response: Some("started repo processing".to_string()),
                    status_endpoint: None,
                }),
            }
        })
    }

    fn query<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<SearchResult, ApiError>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Query(request.clone()));

            let reply = if state.query_replies.len() > 1 {
                state.query_replies.remove(0)
            } else {
                state.query_replies.first().cloned().unwrap_or(Ok(SearchResult::default()))
            };

            reply.map_err(|status| ApiError::Status {
                status,
                body: String::new(),
            })
        })
    }
}
