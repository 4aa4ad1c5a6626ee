use async_trait::async_trait;
use sinkhole_domain::{DomainError, StoreSnapshot};

/// Durable storage for store snapshots.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), DomainError>;

    /// `Ok(None)` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<StoreSnapshot>, DomainError>;
}
