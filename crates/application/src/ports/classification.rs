use async_trait::async_trait;
use sinkhole_domain::{DomainError, ListKind, QueryStatus};
use std::net::IpAddr;
use std::sync::Arc;

/// Application-layer port for the gravity classification engine.
///
/// Hot-path methods are synchronous; all list data is held in memory by the
/// implementation. Only `reload` and `retry_degraded` touch the list store.
#[async_trait]
pub trait ClassificationPort: Send + Sync {
    /// Classify a query name and its CNAME chain for one client.
    ///
    /// Returns the blocking status, or `None` when no local list blocks the
    /// query and the resolver outcome stands.
    fn classify(&self, domain: &str, cname_chain: &[Arc<str>], client: IpAddr) -> Option<QueryStatus>;

    /// True when `domain` alone (no CNAME chain) would be blocked for `client`.
    fn is_blocked(&self, domain: &str, client: IpAddr) -> bool {
        self.classify(domain, &[], client).is_some()
    }

    fn in_gravity(&self, domain: &str, client: IpAddr) -> bool;

    /// Exact blacklist membership.
    fn in_blacklist(&self, domain: &str, client: IpAddr) -> bool;

    /// Exact whitelist membership.
    fn in_whitelist(&self, domain: &str, client: IpAddr) -> bool;

    /// Id of the first regex of `kind` that applies to `client` and matches.
    fn match_regex(&self, domain: &str, client: IpAddr, kind: ListKind) -> Option<i64>;

    /// Reporting-only exemption; never affects blocking.
    fn in_audit_list(&self, domain: &str) -> bool;

    /// Number of distinct gravity domains currently compiled.
    fn gravity_size(&self) -> usize;

    /// Reload every list category from the list store and swap it in.
    async fn reload(&self) -> Result<(), DomainError>;

    /// Reload only if a category is degraded. Returns true if a reload ran.
    async fn retry_degraded(&self) -> Result<bool, DomainError>;
}
