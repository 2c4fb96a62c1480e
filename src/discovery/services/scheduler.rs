//! Single-flight background refresh scheduling.

use super::{RefreshError, RefreshReport, RefreshRunner, refresh::stop_requested};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// How a background refresh ended.
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The refresh finished and the catalog was replaced.
    Completed(RefreshReport),
    /// The refresh aborted; the catalog is unchanged.
    Failed(RefreshError),
    /// The scheduler shut down before the refresh began replacing the
    /// catalog; the catalog is unchanged.
    ///
    /// A shutdown that arrives once the replacement has begun does not
    /// cancel it, and the refresh ends as [`Self::Completed`] or
    /// [`Self::Failed`].
    Cancelled,
}

/// Handle to a refresh running in the background.
#[derive(Debug)]
pub struct RefreshTask {
    handle: JoinHandle<RefreshOutcome>,
}

impl RefreshTask {
    /// Waits for the refresh to end.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] when the refresh task panicked or was aborted.
    pub async fn wait(self) -> Result<RefreshOutcome, JoinError> {
        self.handle.await
    }

    /// Returns whether the refresh has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Result of asking the scheduler for a refresh.
#[derive(Debug)]
pub enum RefreshTrigger {
    /// A refresh was started in the background.
    Accepted(RefreshTask),
    /// A refresh is already in flight; no new one was started.
    AlreadyRunning,
    /// The scheduler is shutting down.
    ShuttingDown,
}

/// Starts refreshes in the background, at most one at a time.
pub struct RefreshScheduler<R>
where
    R: RefreshRunner,
{
    runner: Arc<R>,
    in_flight: Arc<Mutex<()>>,
    shutdown: watch::Sender<bool>,
}

impl<R> RefreshScheduler<R>
where
    R: RefreshRunner,
{
    /// Creates a scheduler for `runner`.
    #[must_use]
    pub fn new(runner: Arc<R>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            runner,
            in_flight: Arc::new(Mutex::new(())),
            shutdown,
        }
    }

    /// Starts a refresh unless one is already running.
    ///
    /// The refresh runs on its own task; callers may drop the returned
    /// handle without affecting it.
    #[must_use]
    pub fn trigger(&self) -> RefreshTrigger {
        if *self.shutdown.borrow() {
            return RefreshTrigger::ShuttingDown;
        }
        let Ok(guard) = Arc::clone(&self.in_flight).try_lock_owned() else {
            return RefreshTrigger::AlreadyRunning;
        };

        let runner = Arc::clone(&self.runner);
        let stop = self.shutdown.subscribe();
        let handle = tokio::spawn(async move {
            let _in_flight = guard;
            match runner.run_refresh(stop).await {
                Ok(report) => RefreshOutcome::Completed(report),
                Err(RefreshError::Cancelled) => {
                    info!("refresh cancelled by shutdown");
                    RefreshOutcome::Cancelled
                }
                Err(err) => RefreshOutcome::Failed(err),
            }
        });
        RefreshTrigger::Accepted(RefreshTask { handle })
    }

    /// Returns whether a refresh is in flight.
    ///
    /// Reads the slot's holder count without locking it, so a concurrent
    /// [`Self::trigger`] is never refused because of this call.
    #[must_use]
    pub fn is_running(&self) -> bool {
        Arc::strong_count(&self.in_flight) > 1
    }

    /// Triggers a refresh every `period` until shutdown.
    ///
    /// The first refresh starts immediately. Ticks that find a refresh in
    /// flight are skipped.
    pub async fn run_periodic(&self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stop = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = ticker.tick() => match self.trigger() {
                    RefreshTrigger::Accepted(_) => debug!("periodic refresh started"),
                    RefreshTrigger::AlreadyRunning => {
                        info!("previous refresh still running; skipping tick");
                    }
                    RefreshTrigger::ShuttingDown => break,
                },
                () = stop_requested(&mut stop) => break,
            }
        }
    }

    /// Cancels any running refresh and refuses new ones.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }
}

