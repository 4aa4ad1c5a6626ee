use crate::{GarbageCollectionJob, GravityReloadJob, SnapshotJob};
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Register jobs with the builder methods, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// JobRunner::new()
///     .with_garbage_collection(GarbageCollectionJob::new(collect).with_cancellation(token.clone()))
///     .with_snapshot(SnapshotJob::new(save).with_cancellation(token.clone()))
///     .with_gravity_reload(GravityReloadJob::new(engine, store).with_cancellation(token))
///     .start()
///     .await;
/// ```
pub struct JobRunner {
    garbage_collection: Option<GarbageCollectionJob>,
    snapshot: Option<SnapshotJob>,
    gravity_reload: Option<GravityReloadJob>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            garbage_collection: None,
            snapshot: None,
            gravity_reload: None,
        }
    }

    pub fn with_garbage_collection(mut self, job: GarbageCollectionJob) -> Self {
        self.garbage_collection = Some(job);
        self
    }

    pub fn with_snapshot(mut self, job: SnapshotJob) -> Self {
        self.snapshot = Some(job);
        self
    }

    pub fn with_gravity_reload(mut self, job: GravityReloadJob) -> Self {
        self.gravity_reload = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.garbage_collection {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.snapshot {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.gravity_reload {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
