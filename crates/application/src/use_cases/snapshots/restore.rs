use crate::ports::SnapshotRepository;
use crate::services::TelemetryStore;
use chrono::Utc;
use sinkhole_domain::DomainError;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Startup bulk load of the last persisted snapshot.
pub struct RestoreSnapshotUseCase {
    store: Arc<TelemetryStore>,
    repository: Arc<dyn SnapshotRepository>,
}

impl RestoreSnapshotUseCase {
    pub fn new(store: Arc<TelemetryStore>, repository: Arc<dyn SnapshotRepository>) -> Self {
        Self { store, repository }
    }

    /// Returns `Ok(false)` when no snapshot exists. A rejected snapshot is an
    /// error and leaves the store empty.
    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<bool, DomainError> {
        self.execute_at(Utc::now().timestamp()).await
    }

    pub async fn execute_at(&self, now: i64) -> Result<bool, DomainError> {
        let Some(snapshot) = self.repository.load().await? else {
            info!("No snapshot found, starting with an empty store");
            return Ok(false);
        };

        let taken_at = snapshot.taken_at;
        let queries = snapshot.queries.len();
        if let Err(e) = self.store.load_snapshot(snapshot, now) {
            warn!(error = %e, "Discarding snapshot");
            return Err(e);
        }

        info!(queries, taken_at, "Snapshot restored");
        Ok(true)
    }
}
