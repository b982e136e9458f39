//! Expiry Sweep Task
//!
//! Background task that periodically purges expired cache entries. The
//! task is owned by a [`SweepHandle`]: stopping it is explicit, and
//! dropping the handle aborts it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::cacher::Cacher;

/// Handle to a running expiry sweep.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the sweep to stop and waits for it to finish. A pass in
    /// progress completes first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task calling [`Cacher::purge_expired`] every `period`.
///
/// The first pass runs one full period after spawning. A zero period is
/// raised to one millisecond.
///
/// # Example
/// ```ignore
/// let cache: Arc<dyn Cacher> = Arc::new(MemoryCache::new("app", ""));
/// let sweep = spawn_expiry_sweep(cache.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// sweep.stop().await;
/// ```
pub fn spawn_expiry_sweep(cache: Arc<dyn Cacher>, period: Duration) -> SweepHandle {
    let period = period.max(Duration::from_millis(1));
    let (shutdown, mut stopped) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!(
            "Starting expiry sweep for cache '{}' every {:?}",
            cache.name(),
            period
        );

        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately, skip that tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticker.tick() => {
                    let removed = cache.purge_expired();
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry sweep: no expired entries found");
                    }
                }
            }
        }

        debug!("Expiry sweep for cache '{}' stopped", cache.name());
    });

    SweepHandle {
        shutdown: Some(shutdown),
        task,
    }
}
