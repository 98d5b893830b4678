// src/search/pipeline.rs
// =============================================================================
// One full search, start to finish:
//
//   submit  ->  poll until ready  ->  query  ->  (sources query)  ->  parse
//
// Each phase is reported through a callback so the caller can show status
// text. Transient status-check errors are absorbed by the poller; anything
// else aborts the search with a SearchError.
// =============================================================================

use std::fmt;

use super::context::SearchContext;
use super::index::{submit, IndexSubmission};
use super::poll::{poll_until_ready, PollEvent, PollSettings, StopSignal};
use super::query::{query, query_sources, DISCOVERY_PROMPT};
use crate::discovery::{parse_discoveries, Discovery};
use crate::error::SearchError;
use crate::github::RepositoryRef;
use crate::greptile::{IndexApi, SearchResult};

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub poll: PollSettings,
    pub prompt: String,
    /// Ask a second question for the files behind the discoveries
    pub follow_up_sources: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            poll: PollSettings::default(),
            prompt: DISCOVERY_PROMPT.to_string(),
            follow_up_sources: false,
        }
    }
}

/// Where a running search is
#[derive(Debug, Clone)]
pub enum Phase {
    Submitting,
    Submitted(IndexSubmission),
    Polling(PollEvent),
    Querying,
    FetchingSources,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Submitting => write!(f, "Starting indexing process..."),
            Phase::Submitted(IndexSubmission::AlreadyIndexed { branch }) => {
                write!(f, "Repository already indexed on '{}'.", branch)
            }
            Phase::Submitted(IndexSubmission::Queued { branch, .. }) => write!(
                f,
                "Repository submitted for indexing on '{}'. Checking status...",
                branch
            ),
            Phase::Polling(PollEvent::StillIndexing {
                attempt,
                max_attempts,
            }) => write!(f, "Still indexing... (progress {}/{})", attempt, max_attempts),
            Phase::Polling(PollEvent::ProbeFailed { attempt }) => {
                write!(f, "Status check attempt {} failed, retrying...", attempt)
            }
            Phase::Polling(PollEvent::Ready { branch, .. }) => {
                write!(f, "Indexing complete on '{}'.", branch)
            }
            Phase::Querying => write!(f, "Searching for wacky stuff..."),
            Phase::FetchingSources => write!(f, "Looking up the source files..."),
        }
    }
}

/// Everything a finished search produced
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub context: SearchContext,
    pub submission: IndexSubmission,
    pub result: SearchResult,
    pub discoveries: Vec<Discovery>,
}

/// Runs a complete search for `repo`.
///
/// `stop` only covers the wait for indexing; it is dropped as soon as
/// polling is over, so its StopHandle can tell nothing is listening anymore.
pub async fn run_search<A, F>(
    api: &A,
    repo: RepositoryRef,
    options: &SearchOptions,
    mut stop: StopSignal,
    mut on_phase: F,
) -> Result<SearchOutcome, SearchError>
where
    A: IndexApi + ?Sized,
    F: FnMut(Phase),
{
    let mut ctx = SearchContext::new(repo);

    on_phase(Phase::Submitting);
    let submission = submit(api, &mut ctx).await?;
    on_phase(Phase::Submitted(submission.clone()));

    if !ctx.is_ready() {
        poll_until_ready(api, &mut ctx, options.poll, &mut stop, |event| {
            on_phase(Phase::Polling(event))
        })
        .await?;
    }
    drop(stop);

    on_phase(Phase::Querying);
    let mut result = query(api, &ctx, &options.prompt).await?;

    if options.follow_up_sources && result.sources.is_empty() {
        if let Some(message) = result.message.as_deref().filter(|m| !m.trim().is_empty()) {
            on_phase(Phase::FetchingSources);
            let follow_up = query_sources(api, &ctx, message).await?;
            result.sources = follow_up.sources;
        }
    }

    let discoveries = result
        .message
        .as_deref()
        .map(parse_discoveries)
        .unwrap_or_default();

    Ok(SearchOutcome {
        context: ctx,
        submission,
        result,
        discoveries,
    })
}
