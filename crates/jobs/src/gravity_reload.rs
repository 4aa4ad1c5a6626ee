use sinkhole_application::ports::ClassificationPort;
use sinkhole_application::services::TelemetryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Reloads the gravity lists on a fixed cadence and, on a shorter cadence,
/// retries categories that failed to load.
///
/// The compiled gravity size is published to the telemetry store after every
/// successful reload.
pub struct GravityReloadJob {
    engine: Arc<dyn ClassificationPort>,
    store: Arc<TelemetryStore>,
    reload_interval_secs: u64,
    retry_interval_secs: u64,
    shutdown: CancellationToken,
}

impl GravityReloadJob {
    pub fn new(engine: Arc<dyn ClassificationPort>, store: Arc<TelemetryStore>) -> Self {
        Self {
            engine,
            store,
            reload_interval_secs: 3600,
            retry_interval_secs: 10,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_intervals(mut self, reload_secs: u64, retry_secs: u64) -> Self {
        self.reload_interval_secs = reload_secs.max(1);
        self.retry_interval_secs = retry_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            reload_interval_secs = self.reload_interval_secs,
            retry_interval_secs = self.retry_interval_secs,
            "Starting gravity reload job"
        );
        self.publish_size();

        tokio::spawn(async move {
            let mut reload = tokio::time::interval(Duration::from_secs(self.reload_interval_secs));
            let mut retry = tokio::time::interval(Duration::from_secs(self.retry_interval_secs));
            reload.tick().await;
            retry.tick().await;

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("GravityReloadJob: shutting down");
                        break;
                    }
                    _ = reload.tick() => {
                        match self.engine.reload().await {
                            Ok(()) => self.publish_size(),
                            Err(e) => error!(error = %e, "GravityReloadJob: reload failed"),
                        }
                    }
                    _ = retry.tick() => {
                        match self.engine.retry_degraded().await {
                            Ok(true) => self.publish_size(),
                            Ok(false) => {}
                            Err(e) => error!(error = %e, "GravityReloadJob: retry failed"),
                        }
                    }
                }
            }
        });
    }

    fn publish_size(&self) {
        self.store.set_gravity_size(self.engine.gravity_size());
    }
}
