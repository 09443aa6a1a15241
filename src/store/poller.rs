//! Periodic status refresh while installs or uninstalls are running.
//!
//! Each tick fetches only the apps whose status is `installing` or
//! `uninstalling`, and does nothing when there are none. At most one fetch is
//! in flight: a tick that finds one running is skipped.

use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use super::app_store::AppStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is installing or uninstalling
    Idle,
    /// A previous fetch is still running
    Skipped,
    Fetched,
    Failed,
}

/// Clears the in-flight flag when the tick ends, even if it is cancelled
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Clone)]
pub struct ReconcileLoop {
    store: Arc<AppStore>,
    period: Duration,
    in_flight: Arc<AtomicBool>,
}

impl ReconcileLoop {
    pub fn new(store: Arc<AppStore>, period: Duration) -> Self {
        Self {
            store,
            period,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn tick(&self) -> TickOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("poll tick skipped, fetch still in flight");
            return TickOutcome::Skipped;
        }
        let _guard = InFlight(&self.in_flight);

        let ids = self.store.pending_ids();
        if ids.is_empty() {
            return TickOutcome::Idle;
        }

        debug!("polling status of {} app(s)", ids.len());
        match self.store.fetch_snapshot(true, Some(&ids)).await {
            Ok(()) => TickOutcome::Fetched,
            Err(e) => {
                debug!("poll fetch failed: {}", e);
                TickOutcome::Failed
            }
        }
    }

    /// Run ticks every `period` until the returned handle is stopped or dropped.
    ///
    /// Ticks run as separate tasks so a slow fetch never delays the timer;
    /// overlapping ticks are skipped by [`ReconcileLoop::tick`].
    pub fn spawn(self) -> PollerHandle {
        info!("Starting status polling every {:?}", self.period);
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut ticks = JoinSet::new();

            loop {
                ticker.tick().await;
                while ticks.try_join_next().is_some() {}
                let poller = self.clone();
                ticks.spawn(async move { poller.tick().await });
            }
        });
        PollerHandle { task }
    }
}

/// Owns the polling task; dropping it stops polling
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("status polling stopped");
    }
}
