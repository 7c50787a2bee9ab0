use crate::services::ClipboardService;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

/// Background task that physically removes expired items.
///
/// The read path already filters by age, so the sweeper is a backstop: it
/// keeps the store from growing without bound, and nothing user-visible
/// depends on when it last ran. A failed cycle is logged and retried on the
/// next tick; it never takes the process down.
pub struct Sweeper {
    service: ClipboardService,
    interval: Duration,
}

impl Sweeper {
    pub fn new(service: ClipboardService, interval_secs: u64) -> Self {
        Self {
            service,
            interval: Duration::from_secs(interval_secs),
        }
    }

    /// Run the sweep loop for the lifetime of the process.
    pub async fn run(self) {
        let mut ticker = time::interval(self.interval);
        tracing::info!("Starting sweep task (runs every {:?})", self.interval);

        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// One sweep cycle. Errors are logged, never propagated. Returns the
    /// number of items removed so tests can drive a cycle directly.
    pub async fn sweep_once(&self) -> u64 {
        match self.service.purge_expired().await {
            Ok(count) => {
                if count > 0 {
                    tracing::info!("Cleaned up {} expired items", count);
                }
                count
            }
            Err(e) => {
                tracing::error!("Sweep cycle failed: {}", e);
                0
            }
        }
    }

    /// Spawn the sweeper as a background task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
