use async_trait::async_trait;
use sinkhole_domain::{ClientEntry, DomainError, GroupEntry, ListEntry, ListKind};
use std::sync::Arc;

/// Read-only view of the persistent domain list database.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn load_groups(&self) -> Result<Vec<GroupEntry>, DomainError>;

    async fn load_clients(&self) -> Result<Vec<ClientEntry>, DomainError>;

    /// Enabled entries of one category with their group memberships.
    async fn load_list(&self, kind: ListKind) -> Result<Vec<ListEntry>, DomainError>;

    async fn load_audit_list(&self) -> Result<Vec<Arc<str>>, DomainError>;
}
