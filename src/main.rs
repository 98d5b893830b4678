// src/main.rs
// =============================================================================
// Entry point of the here-be-dragons CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Validate the repository argument (before any network call)
// 3. Load configuration from the environment and apply flag overrides
// 4. Dispatch to the subcommand handler
// 5. Exit with a proper code:
//      0 = success
//      1 = the search failed (bad repository, indexing/query error, timeout,
//          cancelled) or, for `status`, the repository isn't indexed
//      2 = configuration or unexpected error
// =============================================================================

mod cli;
mod config;
mod discovery;
mod error;
mod github;
mod greptile;
mod render;
mod search;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, PollingArgs};
use config::Config;
use error::SearchError;
use github::RepositoryRef;
use greptile::GreptileClient;
use search::{
    poll_until_ready, probe, run_search, submit, IndexSubmission, Phase, PollSettings,
    SearchContext, SearchOptions, StopSignal, DISCOVERY_PROMPT,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("here_be_dragons=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let repo = match RepositoryRef::parse(cli.command.repository()) {
        Ok(repo) => repo,
        Err(e) => return Ok(fail(e)),
    };

    let mut config = Config::from_env().context("Invalid configuration")?;
    apply_polling_overrides(&mut config, cli.command.polling());
    config.validate().context("Invalid configuration")?;
    tracing::debug!(
        api_url = %config.api_url,
        max_wait = ?config.max_wait(),
        "configuration loaded"
    );

    let client = GreptileClient::new(&config).context("Failed to create HTTP client")?;
    let poll = PollSettings {
        interval: config.poll_interval,
        max_attempts: config.max_poll_attempts,
    };

    match cli.command {
        Commands::Search {
            json,
            prompt,
            sources,
            ..
        } => {
            let options = SearchOptions {
                poll,
                prompt: prompt.unwrap_or_else(|| DISCOVERY_PROMPT.to_string()),
                follow_up_sources: sources,
            };
            handle_search(&client, repo, &options, json).await
        }
        Commands::Status { json, .. } => handle_status(&client, repo, json).await,
        Commands::Index { wait, .. } => handle_index(&client, repo, poll, wait).await,
    }
}

fn apply_polling_overrides(config: &mut Config, polling: PollingArgs) {
    if let Some(ms) = polling.interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(attempts) = polling.max_attempts {
        config.max_poll_attempts = attempts;
    }
}

// Prints a search-level failure and returns its exit code
fn fail(error: SearchError) -> i32 {
    eprintln!("❌ {}", error);
    1
}

// Status text goes to stderr, next to the logs, away from the results
fn show_phase(phase: Phase) {
    eprintln!("   {}", phase);
}

/// While polling, the first Ctrl-C stops the wait and a second one exits.
/// Once polling is over (the signal was dropped) Ctrl-C exits right away.
fn stop_on_ctrl_c() -> StopSignal {
    let (handle, signal) = StopSignal::new();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        if !handle.has_listeners() {
            eprintln!("\n⏹️  Interrupted");
            std::process::exit(130);
        }

        eprintln!("\n⏹️  Stopping... (press Ctrl-C again to quit now)");
        handle.stop();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    signal
}

// Handles the 'search' subcommand
async fn handle_search(
    client: &GreptileClient,
    repo: RepositoryRef,
    options: &SearchOptions,
    json: bool,
) -> Result<i32> {
    eprintln!("🔍 Searching repository: {}", repo);

    let outcome = match run_search(client, repo, options, stop_on_ctrl_c(), show_phase).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(fail(e)),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        render::write_json(&mut out, &render::Report::from_outcome(&outcome))?;
    } else {
        writeln!(out)?;
        render::write_report(&mut out, &outcome)?;
    }

    Ok(0)
}

// Handles the 'status' subcommand
async fn handle_status(client: &GreptileClient, repo: RepositoryRef, json: bool) -> Result<i32> {
    let mut ctx = SearchContext::new(repo);
    let ready = probe(client, &mut ctx).await;

    if json {
        let report = serde_json::json!({
            "repository": ctx.repo().to_string(),
            "ready": ready,
            "branch": ctx.branch(),
        });
        render::write_json(&mut io::stdout().lock(), &report)?;
    } else if let Some(branch) = ctx.branch() {
        println!("✅ {} is indexed on '{}'", ctx.repo(), branch);
    } else {
        println!("⏳ {} is not indexed yet", ctx.repo());
    }

    Ok(if ready { 0 } else { 1 })
}

// Handles the 'index' subcommand
async fn handle_index(
    client: &GreptileClient,
    repo: RepositoryRef,
    poll: PollSettings,
    wait: bool,
) -> Result<i32> {
    eprintln!("📦 Indexing repository: {}", repo);

    let mut ctx = SearchContext::new(repo);
    let submission = match submit(client, &mut ctx).await {
        Ok(submission) => submission,
        Err(e) => return Ok(fail(e)),
    };
    if let IndexSubmission::Queued {
        response: Some(message),
        ..
    } = &submission
    {
        tracing::info!(%message, "indexing service response");
    }
    show_phase(Phase::Submitted(submission));

    if wait && !ctx.is_ready() {
        let mut stop = stop_on_ctrl_c();
        let polled = poll_until_ready(client, &mut ctx, poll, &mut stop, |event| {
            show_phase(Phase::Polling(event))
        })
        .await;
        drop(stop);
        if let Err(e) = polled {
            return Ok(fail(e));
        }
    }

    println!("✅ {} is {} on branch '{}'", ctx.repo(), ctx.state(), ctx.query_branch());
    Ok(0)
}
