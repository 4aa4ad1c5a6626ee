use chrono::Utc;
use sinkhole_application::use_cases::CollectGarbageUseCase;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runs garbage collection on interval boundaries shifted by `delay_secs`.
///
/// With the defaults (3600, -60) a pass lands one minute before every full
/// hour.
pub struct GarbageCollectionJob {
    collect: Arc<CollectGarbageUseCase>,
    interval_secs: u64,
    delay_secs: i64,
    shutdown: CancellationToken,
}

impl GarbageCollectionJob {
    pub fn new(collect: Arc<CollectGarbageUseCase>) -> Self {
        Self {
            collect,
            interval_secs: 3600,
            delay_secs: -60,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_schedule(mut self, interval_secs: u64, delay_secs: i64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self.delay_secs = delay_secs;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) {
        info!(
            interval_secs = self.interval_secs,
            delay_secs = self.delay_secs,
            "Starting garbage collection job"
        );

        tokio::spawn(async move {
            loop {
                let wait = next_run_delay(Utc::now().timestamp(), self.interval_secs, self.delay_secs);
                debug!(wait_secs = wait, "GarbageCollectionJob: next pass scheduled");

                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("GarbageCollectionJob: shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(Duration::from_secs(wait)) => {
                        self.collect.execute();
                    }
                }
            }
        });
    }
}

/// Seconds from `now` until the next `k * interval + delay` strictly after it.
pub fn next_run_delay(now: i64, interval_secs: u64, delay_secs: i64) -> u64 {
    let interval = interval_secs.max(1) as i64;
    let phase = delay_secs.rem_euclid(interval);
    let next = (now - phase).div_euclid(interval) * interval + interval + phase;
    (next - now) as u64
}
