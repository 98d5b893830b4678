// src/search/mod.rs
// =============================================================================
// Orchestration of a search against the indexing service.
//
// Submodules:
// - context: per-search state (repository, confirmed branch, index state)
// - index: branch probing and index submission
// - poll: bounded, cancellable wait for indexing to finish
// - query: the discovery question and the sources follow-up
// - pipeline: all of the above in order
// =============================================================================

mod context;
mod index;
mod poll;
mod query;
mod pipeline;

pub use context::{IndexState, SearchContext};
pub use index::{probe, submit, IndexSubmission};
pub use pipeline::{run_search, Phase, SearchOptions, SearchOutcome};
pub use poll::{poll_until_ready, PollSettings, StopSignal};
pub use query::DISCOVERY_PROMPT;
