//! Periodic background maintenance
//!
//! A [`BackgroundSweeper`] runs one [`Sweepable`] on a fixed interval until
//! its [`SweepHandle`] is stopped. A tick that arrives while the previous
//! sweep is still running is skipped, never queued.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Something with periodic cleanup
#[async_trait]
pub trait Sweepable: Send + Sync + 'static {
    /// Label used in logs
    fn name(&self) -> &'static str;

    /// Remove expired state. Returns the number of entries removed.
    async fn sweep(&self) -> usize;
}

/// Resets the running flag when a sweep finishes, even on panic
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs a [`Sweepable`] on an interval
pub struct BackgroundSweeper {
    target: Arc<dyn Sweepable>,
    interval: Duration,
    running: Arc<AtomicBool>,
}

/// Floor for the sweep period; a zero period cannot be scheduled
const MIN_INTERVAL: Duration = Duration::from_secs(1);

impl BackgroundSweeper {
    pub fn new(target: Arc<dyn Sweepable>, interval: Duration) -> Self {
        let interval = if interval.is_zero() {
            warn!(
                target_name = target.name(),
                "Zero sweep interval requested; using {}s",
                MIN_INTERVAL.as_secs()
            );
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            target,
            interval,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run a single sweep now
    ///
    /// # Returns
    /// * `Some(removed)` - The sweep ran
    /// * `None` - Skipped because a sweep was already in progress
    pub async fn run_once(&self) -> Option<usize> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(target_name = self.target.name(), "Previous sweep still running; skipping");
            return None;
        }
        let _guard = RunningGuard(&self.running);

        let removed = self.target.sweep().await;
        debug!(target_name = self.target.name(), removed, "Sweep finished");
        Some(removed)
    }

    /// Start the sweep loop as a background task
    ///
    /// The first sweep happens one interval after start.
    pub fn spawn(self) -> SweepHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let name = self.target.name();
        let interval = self.interval;

        let join = tokio::spawn(async move {
            info!(
                "{} sweeper started - will run every {} seconds",
                name,
                interval.as_secs()
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("{} sweeper stopped", name);
        });

        SweepHandle {
            name,
            stop_tx,
            join,
        }
    }
}

/// Handle to a running sweeper
pub struct SweepHandle {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SweepHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signal the loop to stop and wait for it. An in-flight sweep is allowed
    /// to finish first.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.join.await {
            error!("{} sweeper task ended abnormally: {}", self.name, e);
        }
    }
}
