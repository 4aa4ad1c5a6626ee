#![allow(dead_code)]

use async_trait::async_trait;
use sinkhole_application::ports::ListStore;
use sinkhole_domain::{ClientEntry, DomainError, GravityConfig, GroupEntry, ListEntry, ListKind};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

// ============================================================================
// Mock ListStore
// ============================================================================

/// In-memory list database. Starts with the enabled default group 0.
#[derive(Clone)]
pub struct MockListStore {
    groups: Arc<RwLock<Vec<GroupEntry>>>,
    clients: Arc<RwLock<Vec<ClientEntry>>>,
    lists: Arc<RwLock<HashMap<ListKind, Vec<ListEntry>>>>,
    audit: Arc<RwLock<Vec<Arc<str>>>>,
    failing: Arc<RwLock<HashSet<ListKind>>>,
    groups_failing: Arc<AtomicBool>,
    next_id: Arc<AtomicUsize>,
    list_loads: Arc<AtomicUsize>,
}

impl MockListStore {
    pub fn new() -> Self {
        Self {
            groups: Arc::new(RwLock::new(vec![group(0, true)])),
            clients: Arc::new(RwLock::new(Vec::new())),
            lists: Arc::new(RwLock::new(HashMap::new())),
            audit: Arc::new(RwLock::new(Vec::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            groups_failing: Arc::new(AtomicBool::new(false)),
            next_id: Arc::new(AtomicUsize::new(1)),
            list_loads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn add_group(&self, id: i64, enabled: bool) {
        self.groups.write().await.push(group(id, enabled));
    }

    pub async fn add_client(&self, ip: &str, group_ids: &[i64]) {
        let mut clients = self.clients.write().await;
        let id = clients.len() as i64 + 1;
        clients.push(ClientEntry {
            id,
            ip: Arc::from(ip),
            group_ids: group_ids.to_vec(),
        });
    }

    /// Adds an entry to the default group and returns its id.
    pub async fn add(&self, kind: ListKind, value: &str) -> i64 {
        self.add_to_groups(kind, value, &[0]).await
    }

    pub async fn add_to_groups(&self, kind: ListKind, value: &str, group_ids: &[i64]) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        self.lists
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(ListEntry::new(id, value, group_ids.to_vec()));
        id
    }

    pub async fn remove(&self, kind: ListKind, value: &str) {
        if let Some(entries) = self.lists.write().await.get_mut(&kind) {
            entries.retain(|e| e.value.as_ref() != value);
        }
    }

    pub async fn add_audit(&self, domain: &str) {
        self.audit.write().await.push(Arc::from(domain));
    }

    pub async fn set_failing(&self, kind: ListKind, failing: bool) {
        let mut set = self.failing.write().await;
        if failing {
            set.insert(kind);
        } else {
            set.remove(&kind);
        }
    }

    pub fn set_groups_failing(&self, failing: bool) {
        self.groups_failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `load_list` calls made so far, across all categories.
    pub fn list_loads(&self) -> usize {
        self.list_loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListStore for MockListStore {
    async fn load_groups(&self) -> Result<Vec<GroupEntry>, DomainError> {
        if self.groups_failing.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("database is locked".to_string()));
        }
        Ok(self.groups.read().await.clone())
    }

    async fn load_clients(&self) -> Result<Vec<ClientEntry>, DomainError> {
        Ok(self.clients.read().await.clone())
    }

    async fn load_list(&self, kind: ListKind) -> Result<Vec<ListEntry>, DomainError> {
        self.list_loads.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().await.contains(&kind) {
            return Err(DomainError::ListUnavailable {
                list: kind,
                reason: "no such table".to_string(),
            });
        }
        Ok(self.lists.read().await.get(&kind).cloned().unwrap_or_default())
    }

    async fn load_audit_list(&self) -> Result<Vec<Arc<str>>, DomainError> {
        Ok(self.audit.read().await.clone())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn group(id: i64, enabled: bool) -> GroupEntry {
    GroupEntry {
        id,
        enabled,
        name: Arc::from(format!("group-{}", id).as_str()),
    }
}

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

pub fn gravity_config() -> GravityConfig {
    GravityConfig::default()
}
