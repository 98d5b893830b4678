// src/search/query.rs
// =============================================================================
// Sends the discovery question to the query endpoint.
//
// The question is scoped to the repository and to the branch this search's
// context confirmed. There's exactly one request per call: no paging, no
// streaming, no conversation.
//
// query_sources() is a separate, independent request that asks which files
// the discoveries from an earlier answer came from.
// =============================================================================

use super::context::SearchContext;
use crate::error::{ApiError, SearchError};
use crate::greptile::{IndexApi, QueryRequest, SearchResult};

/// The default question. The response is expected to contain one
/// triple-backtick block per discovery.
pub const DISCOVERY_PROMPT: &str = "Give me some interesting comments from the codebase. \
These could be about unusual naming conventions, frustrations of the programmer, \
reasons for certain design choices or other funny idiosyncrasies of the programmer. \
Do NOT make things up: only output parts of the codebase that actually exist. \
Don't categorize or number the findings and don't offer explanations; just present \
the relevant snippets from the codebase as individual discoveries. \
If a discovery comes from a code file, include a few lines of code near the comment. \
Wrap each individual discovery in triple backticks so it can be rendered as markdown.";

const SOURCES_PROMPT: &str = "List the source files in this repository that contain \
each of the following snippets. For every file give its path and the matching snippet.";

/// Sends `prompt` scoped to the context's repository and confirmed branch
pub async fn query<A>(api: &A, ctx: &SearchContext, prompt: &str) -> Result<SearchResult, SearchError>
where
    A: IndexApi + ?Sized,
{
    let request = QueryRequest::single(prompt, ctx.repo(), ctx.query_branch());
    tracing::info!(repo = %ctx.repo(), branch = %ctx.query_branch(), "querying repository");

    api.query(&request).await.map_err(into_query_error)
}

/// Follow-up request: which files do these discoveries come from?
pub async fn query_sources<A>(
    api: &A,
    ctx: &SearchContext,
    discoveries: &str,
) -> Result<SearchResult, SearchError>
where
    A: IndexApi + ?Sized,
{
    let prompt = format!("{}\n\n{}", SOURCES_PROMPT, discoveries);
    query(api, ctx, &prompt).await
}

fn into_query_error(error: ApiError) -> SearchError {
    match error {
        ApiError::Status { status, .. } => SearchError::Query { status },
        other => SearchError::Api(other),
    }
}
