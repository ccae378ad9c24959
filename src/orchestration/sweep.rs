//! `SweepScheduler` - Background expiry sweeping.
//!
//! Lazy removal only reclaims entries that get looked up again; entries that
//! expire and are never touched would otherwise occupy budget forever. The
//! scheduler runs `sweep_expired` on a fixed interval in a tokio task and
//! shuts down cleanly through a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::constants::SWEEP_INTERVAL_MS_MIN;
use crate::orchestration::unified::MultiTierCache;

/// Handle to a running sweep task.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl SweepHandle {
    /// Signal shutdown and wait for the task to finish its current sweep.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Abort the task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// Spawns periodic expiry sweeps over a shared cache.
#[derive(Debug)]
pub struct SweepScheduler;

impl SweepScheduler {
    /// Spawn a sweep task ticking every `interval_ms`.
    ///
    /// Missed ticks are skipped, not bunched: a slow sweep under a short
    /// interval degrades to back-to-back sweeps, never a burst.
    ///
    /// # Preconditions
    /// - `interval_ms >= SWEEP_INTERVAL_MS_MIN`
    /// - must be called from within a tokio runtime
    pub fn spawn<V>(cache: Arc<Mutex<MultiTierCache<V>>>, interval_ms: u64) -> SweepHandle
    where
        V: Clone + Send + 'static,
    {
        // Preconditions
        assert!(
            interval_ms >= SWEEP_INTERVAL_MS_MIN,
            "interval {interval_ms}ms below minimum {SWEEP_INTERVAL_MS_MIN}ms"
        );

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut cache = cache.lock().await;
                        let swept = cache.sweep_expired();
                        let pruned = cache.prune_access_records();
                        drop(cache);
                        if swept > 0 || pruned > 0 {
                            tracing::debug!(swept, pruned, "scheduled sweep completed");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        tracing::debug!("sweep scheduler shutting down");
                        break;
                    }
                }
            }
        });

        SweepHandle { shutdown_tx, task }
    }
}
