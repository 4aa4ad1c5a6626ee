use crate::ports::SnapshotRepository;
use crate::services::TelemetryStore;
use chrono::Utc;
use sinkhole_domain::DomainError;
use std::sync::Arc;
use tracing::{debug, instrument};

pub struct SaveSnapshotUseCase {
    store: Arc<TelemetryStore>,
    repository: Arc<dyn SnapshotRepository>,
}

impl SaveSnapshotUseCase {
    pub fn new(store: Arc<TelemetryStore>, repository: Arc<dyn SnapshotRepository>) -> Self {
        Self { store, repository }
    }

    /// Copies the store under a read lock, then writes it out with no lock held.
    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<usize, DomainError> {
        let snapshot = self.store.snapshot(Utc::now().timestamp());
        let queries = snapshot.queries.len();
        self.repository.save(&snapshot).await?;
        debug!(queries, "Snapshot saved");
        Ok(queries)
    }
}
