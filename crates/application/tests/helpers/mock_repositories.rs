#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::RwLock;
use sinkhole_application::ports::{ClassificationPort, SnapshotRepository};
use sinkhole_domain::{
    DomainError, ListKind, QueryStatus, ResolvedQuery, ResolverOutcome, StoreSnapshot,
    TelemetryConfig,
};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const NOW: i64 = 1_700_000_000;

// ============================================================================
// Mock ClassificationPort
// ============================================================================

/// Blocks by exact name, ignoring client scope. A CNAME hit reports the
/// matching `*Cname` status.
#[derive(Clone, Default)]
pub struct MockClassifier {
    blocked: Arc<RwLock<HashMap<String, QueryStatus>>>,
    audited: Arc<RwLock<HashSet<String>>>,
    reloads: Arc<AtomicUsize>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self, domain: &str, status: QueryStatus) {
        self.blocked.write().insert(domain.to_string(), status);
    }

    pub fn audit(&self, domain: &str) {
        self.audited.write().insert(domain.to_string());
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::Relaxed)
    }
}

fn cname_variant(status: QueryStatus) -> QueryStatus {
    match status {
        QueryStatus::Gravity => QueryStatus::GravityCname,
        QueryStatus::Blacklist => QueryStatus::BlacklistCname,
        QueryStatus::Regex => QueryStatus::RegexCname,
        other => other,
    }
}

#[async_trait]
impl ClassificationPort for MockClassifier {
    fn classify(&self, domain: &str, cname_chain: &[Arc<str>], _client: IpAddr) -> Option<QueryStatus> {
        let blocked = self.blocked.read();
        if let Some(status) = blocked.get(domain) {
            return Some(*status);
        }
        cname_chain
            .iter()
            .find_map(|hop| blocked.get(hop.as_ref()))
            .map(|s| cname_variant(*s))
    }

    fn in_gravity(&self, domain: &str, _client: IpAddr) -> bool {
        self.blocked.read().get(domain) == Some(&QueryStatus::Gravity)
    }

    fn in_blacklist(&self, domain: &str, _client: IpAddr) -> bool {
        self.blocked.read().get(domain) == Some(&QueryStatus::Blacklist)
    }

    fn in_whitelist(&self, _domain: &str, _client: IpAddr) -> bool {
        false
    }

    fn match_regex(&self, domain: &str, _client: IpAddr, kind: ListKind) -> Option<i64> {
        let hit = kind == ListKind::RegexBlacklist
            && self.blocked.read().get(domain) == Some(&QueryStatus::Regex);
        hit.then_some(1)
    }

    fn in_audit_list(&self, domain: &str) -> bool {
        self.audited.read().contains(domain)
    }

    fn gravity_size(&self) -> usize {
        self.blocked
            .read()
            .values()
            .filter(|s| **s == QueryStatus::Gravity)
            .count()
    }

    async fn reload(&self) -> Result<(), DomainError> {
        self.reloads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn retry_degraded(&self) -> Result<bool, DomainError> {
        Ok(false)
    }
}

// ============================================================================
// Mock SnapshotRepository
// ============================================================================

#[derive(Clone, Default)]
pub struct MockSnapshotRepository {
    stored: Arc<tokio::sync::RwLock<Option<StoreSnapshot>>>,
    saves: Arc<AtomicUsize>,
}

impl MockSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stored(&self) -> Option<StoreSnapshot> {
        self.stored.read().await.clone()
    }

    pub async fn put(&self, snapshot: StoreSnapshot) {
        *self.stored.write().await = Some(snapshot);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SnapshotRepository for MockSnapshotRepository {
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), DomainError> {
        self.saves.fetch_add(1, Ordering::Relaxed);
        *self.stored.write().await = Some(snapshot.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<StoreSnapshot>, DomainError> {
        Ok(self.stored.read().await.clone())
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn client_ip(last: u8) -> IpAddr {
    IpAddr::from([192, 168, 1, last])
}

pub fn forwarded(ts: i64, domain: &str, client: IpAddr) -> ResolvedQuery {
    ResolvedQuery::new(
        ts,
        domain,
        client,
        ResolverOutcome::Forwarded {
            upstream_ip: "1.1.1.1".parse().unwrap(),
            upstream_name: Some(Arc::from("one.one.one.one")),
        },
    )
}

pub fn cached(ts: i64, domain: &str, client: IpAddr) -> ResolvedQuery {
    ResolvedQuery::new(ts, domain, client, ResolverOutcome::Cached)
}

/// Two-hour retention with 10-minute slots keeps the windows in tests small.
pub fn short_config() -> TelemetryConfig {
    TelemetryConfig {
        max_log_age_hours: 2,
        ..TelemetryConfig::default()
    }
}
