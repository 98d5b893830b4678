// src/search/poll.rs
// =============================================================================
// Waits for a submitted repository to finish indexing.
//
// The service has no webhook, so we ask: wait one interval, probe, repeat,
// up to max_attempts times. With the defaults (5s x 48) that is a 4 minute
// ceiling.
//
// A probe where every branch candidate errored is treated as a transient
// failure: it is reported and the loop keeps going.
//
// The loop can be stopped from outside with a StopHandle. The stop signal
// is checked at the top of every attempt and raced against the wait.
//
// Rust concepts:
// - tokio::select!: wait on whichever of several futures finishes first
// - tokio::sync::watch: a single value many tasks can observe
// =============================================================================

use std::time::Duration;
use tokio::sync::watch;

use super::context::SearchContext;
use super::index::probe_candidates;
use crate::error::SearchError;
use crate::github::Branch;
use crate::greptile::IndexApi;

/// How often and how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollSettings {
    pub fn total_wait(&self) -> Duration {
        self.interval.saturating_mul(self.max_attempts)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::config::DEFAULT_POLL_INTERVAL_MS),
            max_attempts: crate::config::DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

/// Progress reported after each attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollEvent {
    StillIndexing { attempt: u32, max_attempts: u32 },
    ProbeFailed { attempt: u32 },
    Ready { attempt: u32, branch: Branch },
}

/// Sender half: call stop() to end polling early
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// False once every StopSignal is gone, i.e. there is nothing left to stop
    pub fn has_listeners(&self) -> bool {
        !self.tx.is_closed()
    }
}

/// Receiver half, handed to the poller
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    pub fn new() -> (StopHandle, StopSignal) {
        let (tx, rx) = watch::channel(false);
        (StopHandle { tx }, StopSignal { rx })
    }

    /// A signal that never fires
    #[cfg(test)]
    pub fn never() -> StopSignal {
        let (_, signal) = Self::new();
        signal
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once stop() has been called; pends forever if the handle
    /// was dropped without stopping.
    pub async fn stopped(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Polls until the repository reports ready.
///
/// Returns the attempt number that saw the finished index.
pub async fn poll_until_ready<A, F>(
    api: &A,
    ctx: &mut SearchContext,
    settings: PollSettings,
    stop: &mut StopSignal,
    mut on_event: F,
) -> Result<u32, SearchError>
where
    A: IndexApi + ?Sized,
    F: FnMut(PollEvent),
{
    for attempt in 1..=settings.max_attempts {
        if stop.is_stopped() {
            return Err(SearchError::Cancelled);
        }

        tokio::select! {
            _ = tokio::time::sleep(settings.interval) => {}
            _ = stop.stopped() => return Err(SearchError::Cancelled),
        }

        let report = probe_candidates(api, ctx).await;

        if let Some(branch) = report.ready_on {
            tracing::info!(attempt, %branch, "indexing complete");
            on_event(PollEvent::Ready { attempt, branch });
            return Ok(attempt);
        }

        if report.all_failed() {
            tracing::warn!(attempt, "status check failed, retrying");
            on_event(PollEvent::ProbeFailed { attempt });
        } else {
            tracing::debug!(attempt, max_attempts = settings.max_attempts, "still indexing");
            on_event(PollEvent::StillIndexing {
                attempt,
                max_attempts: settings.max_attempts,
            });
        }
    }

    Err(SearchError::Timeout {
        attempts: settings.max_attempts,
        waited: settings.total_wait(),
    })
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why tokio::time::sleep and not std::thread::sleep?
//    - std::thread::sleep blocks the whole thread
//    - tokio's sleep only suspends this task; the runtime keeps running
//    - It also lets tests pause and fast-forward the clock
//
// 2. How does select! cancel the sleep?
//    - Both futures are polled together
//    - The first to finish wins; the other one is dropped
//    - Dropping a tokio sleep simply cancels it
//
// 3. Why FnMut for on_event?
//    - The callback may need to mutate state (e.g. update a status line)
//    - FnMut allows that; Fn would not
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::RepositoryRef;
    use crate::greptile::fake::{FakeApi, StatusReply};
    use tokio::time::Instant;

    fn context() -> SearchContext {
        SearchContext::new(RepositoryRef::parse("owner/name").unwrap())
    }

    fn settings(max_attempts: u32) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(5),
            max_attempts,
        }
    }

    #[test]
    fn test_total_wait_saturates() {
        assert_eq!(settings(48).total_wait(), Duration::from_secs(240));

        let huge = PollSettings {
            interval: Duration::from_millis(u64::MAX),
            max_attempts: 2000,
        };
        assert_eq!(huge.total_wait(), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_after_max_attempts() {
        let api = FakeApi::new()
            .with_statuses(Branch::Main, vec![StatusReply::Status("PROCESSING")])
            .with_statuses(Branch::Master, vec![StatusReply::Fail(404)]);
        let mut ctx = context();
        let mut events = Vec::new();
        let started = Instant::now();

        let result = poll_until_ready(
            &api,
            &mut ctx,
            PollSettings::default(),
            &mut StopSignal::never(),
            |e| events.push(e),
        )
        .await;

        match result {
            Err(SearchError::Timeout { attempts, waited }) => {
                assert_eq!(attempts, 48);
                assert_eq!(waited, Duration::from_secs(240));
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(started.elapsed(), Duration::from_secs(240));
        assert_eq!(events.len(), 48);
        // two candidates per attempt
        assert_eq!(api.status_checks(), 96);
        assert_eq!(
            events.last(),
            Some(&PollEvent::StillIndexing {
                attempt: 48,
                max_attempts: 48
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_third_attempt() {
        let api = FakeApi::new().with_statuses(
            Branch::Main,
            vec![
                StatusReply::Status("PROCESSING"),
                StatusReply::Status("PROCESSING"),
                StatusReply::Status("COMPLETED"),
            ],
        );
        let mut ctx = context();
        let started = Instant::now();

        let attempt = poll_until_ready(&api, &mut ctx, settings(48), &mut StopSignal::never(), |_| {})
            .await
            .unwrap();

        assert_eq!(attempt, 3);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
        assert!(ctx.is_ready());
        assert_eq!(ctx.branch(), Some(Branch::Main));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_keep_polling() {
        let api = FakeApi::new()
            .with_statuses(
                Branch::Main,
                vec![StatusReply::Fail(503), StatusReply::Status("READY")],
            )
            .with_statuses(Branch::Master, vec![StatusReply::Fail(503)]);
        let mut ctx = context();
        let mut events = Vec::new();

        let attempt = poll_until_ready(&api, &mut ctx, settings(5), &mut StopSignal::never(), |e| {
            events.push(e)
        })
        .await
        .unwrap();

        assert_eq!(attempt, 2);
        assert_eq!(
            events,
            vec![
                PollEvent::ProbeFailed { attempt: 1 },
                PollEvent::Ready {
                    attempt: 2,
                    branch: Branch::Main
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_on_master_updates_context() {
        let api = FakeApi::new()
            .with_statuses(Branch::Main, vec![StatusReply::Fail(500)])
            .with_statuses(Branch::Master, vec![StatusReply::Status("COMPLETED")]);
        let mut ctx = context();

        poll_until_ready(&api, &mut ctx, settings(3), &mut StopSignal::never(), |_| {})
            .await
            .unwrap();

        assert_eq!(ctx.query_branch(), Branch::Master);
    }

    #[test]
    fn test_handle_notices_dropped_signal() {
        let (handle, signal) = StopSignal::new();
        let copy = signal.clone();
        assert!(handle.has_listeners());

        drop(signal);
        assert!(handle.has_listeners());
        drop(copy);
        assert!(!handle.has_listeners());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_start() {
        let api = FakeApi::new();
        let mut ctx = context();
        let (handle, mut signal) = StopSignal::new();
        handle.stop();

        let result = poll_until_ready(&api, &mut ctx, settings(48), &mut signal, |_| {}).await;

        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert_eq!(api.status_checks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_wait() {
        let api = FakeApi::new()
            .with_statuses(Branch::Main, vec![StatusReply::Status("PROCESSING")]);
        let mut ctx = context();
        let (handle, mut signal) = StopSignal::new();
        let started = Instant::now();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(12)).await;
            handle.stop();
        });

        let result = poll_until_ready(&api, &mut ctx, settings(48), &mut signal, |_| {}).await;

        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert_eq!(started.elapsed(), Duration::from_secs(12));
        // attempts 1 and 2 probed both candidates before the stop
        assert_eq!(api.status_checks(), 4);
    }
}
