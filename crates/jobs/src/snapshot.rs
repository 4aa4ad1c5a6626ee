use sinkhole_application::use_cases::SaveSnapshotUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Periodically persists the telemetry store, plus once more on shutdown.
pub struct SnapshotJob {
    save: Arc<SaveSnapshotUseCase>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl SnapshotJob {
    pub fn new(save: Arc<SaveSnapshotUseCase>) -> Self {
        Self {
            save,
            interval_secs: 60,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting snapshot job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("SnapshotJob: writing final snapshot before shutdown");
                        self.save_once().await;
                        break;
                    }
                    _ = interval.tick() => {
                        self.save_once().await;
                    }
                }
            }
        });
    }

    async fn save_once(&self) {
        match self.save.execute().await {
            Ok(queries) => debug!(queries, "SnapshotJob: snapshot saved"),
            Err(e) => error!(error = %e, "SnapshotJob: snapshot failed"),
        }
    }
}
