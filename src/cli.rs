// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
//   here-be-dragons search diegocr/netcat
//   here-be-dragons search https://github.com/diegocr/netcat.git --json
//   here-be-dragons status diegocr/netcat
//   here-be-dragons index diegocr/netcat --wait
//
// Connection settings (API URL, key, GitHub token) come from the
// environment, see config.rs. Polling can be tuned per run with flags.
// =============================================================================

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "here-be-dragons",
    version,
    about = "Discover the quirks that make code human",
    long_about = "here-be-dragons asks a semantic code-search service to index a GitHub repository, \
                  waits for the index to be ready and then digs up its most interesting comments: \
                  odd naming, frustrated programmers, explained (and unexplained) design choices."
)]
pub struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Index a repository (if needed) and search it for interesting comments
    ///
    /// Example: here-be-dragons search diegocr/netcat
    Search {
        /// Repository as owner/repo or a full GitHub URL
        repository: String,

        /// Output results in JSON format instead of text
        #[arg(long)]
        json: bool,

        /// Ask this instead of the built-in discovery question
        #[arg(long)]
        prompt: Option<String>,

        /// Send a follow-up question for the files behind the discoveries
        #[arg(long)]
        sources: bool,

        #[command(flatten)]
        polling: PollingArgs,
    },

    /// Check whether a repository is already indexed (main or master)
    Status {
        /// Repository as owner/repo or a full GitHub URL
        repository: String,

        /// Output the result in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Submit a repository for indexing without searching it
    Index {
        /// Repository as owner/repo or a full GitHub URL
        repository: String,

        /// Keep polling until the index is ready
        #[arg(long)]
        wait: bool,

        #[command(flatten)]
        polling: PollingArgs,
    },
}

/// Overrides for DRAGONS_POLL_INTERVAL_MS / DRAGONS_MAX_POLL_ATTEMPTS
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct PollingArgs {
    /// Milliseconds between status checks
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Number of status checks before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

impl Commands {
    /// The raw repository argument, whatever the subcommand
    pub fn repository(&self) -> &str {
        match self {
            Commands::Search { repository, .. }
            | Commands::Status { repository, .. }
            | Commands::Index { repository, .. } => repository,
        }
    }

    pub fn polling(&self) -> PollingArgs {
        match self {
            Commands::Search { polling, .. } | Commands::Index { polling, .. } => *polling,
            Commands::Status { .. } => PollingArgs::default(),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls the fields of PollingArgs into the subcommand
//    - So both `search` and `index` get --interval-ms and --max-attempts
//      without repeating the definitions
//
// 2. Why Option<u64> for the polling flags?
//    - None means "not given on the command line"
//    - Then the environment value (or the default) is used instead
//
// 3. Why can `repository` be matched in one arm with `|`?
//    - All three variants have a field with the same name and type
//    - An or-pattern may bind a variable as long as every alternative binds it
// -----------------------------------------------------------------------------
