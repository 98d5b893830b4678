// src/search/index.rs
// =============================================================================
// Branch probing and index submission.
//
// probe():  is the repository already indexed on main or master?
// submit(): if not, ask the service to start indexing (main, then master)
//
// Neither function retries on its own. Waiting for an index to finish is
// the poller's job (see poll.rs).
// =============================================================================

use serde::Serialize;

use super::context::SearchContext;
use crate::error::{ApiError, SearchError};
use crate::github::{Branch, CANDIDATE_BRANCHES};
use crate::greptile::{IndexApi, IndexRequest, SubmitResponse};

/// What one probe saw across all branch candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// Branch that reported COMPLETED/READY, if any
    pub ready_on: Option<Branch>,
    /// How many candidates errored instead of answering
    pub failed: usize,
}

impl ProbeReport {
    /// Every candidate we asked errored, so we learned nothing this time
    pub fn all_failed(&self) -> bool {
        self.ready_on.is_none() && self.failed == CANDIDATE_BRANCHES.len()
    }
}

/// Outcome of a successful submit()
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexSubmission {
    /// The probe found a finished index; nothing was submitted
    AlreadyIndexed { branch: Branch },
    /// The service accepted a new indexing job for this branch
    Queued {
        branch: Branch,
        #[serde(skip_serializing_if = "Option::is_none")]
        response: Option<String>,
    },
}

/// Checks main, then master. Returns true as soon as one reports done.
///
/// Errors on a candidate are logged and skipped; they never fail the probe.
pub async fn probe<A>(api: &A, ctx: &mut SearchContext) -> bool
where
    A: IndexApi + ?Sized,
{
    probe_candidates(api, ctx).await.ready_on.is_some()
}

/// probe(), but also reports how many candidates failed
pub async fn probe_candidates<A>(api: &A, ctx: &mut SearchContext) -> ProbeReport
where
    A: IndexApi + ?Sized,
{
    let mut failed = 0;

    for branch in CANDIDATE_BRANCHES {
        let key = ctx.repo().index_key(branch);

        match api.repository_status(&key).await {
            Ok(status) if status.is_done() => {
                tracing::debug!(%key, "repository index is ready");
                ctx.mark_ready(branch);
                return ProbeReport {
                    ready_on: Some(branch),
                    failed,
                };
            }
            Ok(status) => {
                tracing::debug!(
                    %key,
                    status = status.status.as_deref().unwrap_or("unknown"),
                    files_processed = status.files_processed,
                    num_files = status.num_files,
                    "repository not ready yet"
                );
            }
            Err(e) => {
                tracing::debug!(%key, error = %e, "status check failed");
                failed += 1;
            }
        }
    }

    ProbeReport {
        ready_on: None,
        failed,
    }
}

/// Makes sure the repository is indexed or being indexed.
///
/// If neither branch is accepted, the error carries the status and body of
/// the `main` attempt; the `master` failure is only logged.
pub async fn submit<A>(api: &A, ctx: &mut SearchContext) -> Result<IndexSubmission, SearchError>
where
    A: IndexApi + ?Sized,
{
    if probe(api, ctx).await {
        let branch = ctx.query_branch();
        tracing::info!(repo = %ctx.repo(), %branch, "repository already indexed");
        return Ok(IndexSubmission::AlreadyIndexed { branch });
    }

    tracing::info!(repo = %ctx.repo(), "repository not indexed, starting indexing");

    let mut first_error: Option<ApiError> = None;

    for branch in CANDIDATE_BRANCHES {
        let request = IndexRequest::new(ctx.repo(), branch);

        match api.submit_repository(&request).await {
            Ok(SubmitResponse { response, .. }) => {
                ctx.mark_indexing(branch);
                return Ok(IndexSubmission::Queued { branch, response });
            }
            Err(e) => {
                tracing::warn!(%branch, error = %e, "indexing request rejected");
                first_error.get_or_insert(e);
            }
        }
    }

    Err(match first_error {
        Some(ApiError::Status { status, body }) => SearchError::Submission { status, body },
        Some(other) => SearchError::Api(other),
        // CANDIDATE_BRANCHES is never empty
        None => SearchError::Submission {
            status: 0,
            body: String::new(),
        },
    })
}
