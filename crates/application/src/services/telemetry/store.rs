use super::overtime::{shift_counts, OverTime};
use super::string_pool::StringPool;
use super::table::Table;
use chrono::Utc;
use compact_str::CompactString;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use sinkhole_domain::{
    Client, ClientId, Counters, Domain, DomainError, DomainId, PrivacyLevel, Query, QueryId,
    QueryStatus, ResolvedQuery, ResolverOutcome, StoreSnapshot, TelemetryConfig, Upstream,
    UpstreamId, HIDDEN_CLIENT, HIDDEN_DOMAIN, MAGIC_BYTE,
};
use tracing::debug;

/// Shared telemetry store.
///
/// Readers take a shared guard through [`TelemetryStore::read`] and see a
/// consistent view of every table and counter. Mutation happens only through
/// the use cases in this crate, each under one exclusive guard.
pub struct TelemetryStore {
    inner: RwLock<StoreInner>,
    config: TelemetryConfig,
}

/// Everything guarded by the store lock.
pub struct StoreInner {
    pub(super) strings: StringPool,
    pub(super) queries: Table<Query>,
    pub(super) clients: Table<Client>,
    pub(super) domains: Table<Domain>,
    pub(super) upstreams: Table<Upstream>,
    pub(super) overtime: OverTime,
    pub(super) counters: Counters,
    pub(super) client_index: FxHashMap<CompactString, ClientId>,
    pub(super) domain_index: FxHashMap<CompactString, DomainId>,
    pub(super) upstream_index: FxHashMap<CompactString, UpstreamId>,
    pub(super) retention_secs: i64,
}

/// Result of one eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    pub evicted: usize,
    pub evicted_blocked: usize,
    pub slots_shifted: usize,
}

impl TelemetryStore {
    pub fn new(config: TelemetryConfig) -> Self {
        Self::new_at(config, Utc::now().timestamp())
    }

    /// Creates an empty store whose OverTime window is anchored at `now`.
    pub fn new_at(config: TelemetryConfig, now: i64) -> Self {
        let inner = StoreInner::empty(&config, now);
        Self {
            inner: RwLock::new(inner),
            config,
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Shared guard. Hold it only for the duration of one read.
    pub fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write()
    }

    /// Consistent copy of the whole store.
    pub fn snapshot(&self, now: i64) -> StoreSnapshot {
        self.read().to_snapshot(now)
    }

    /// Validates `snapshot` and atomically replaces the current contents.
    ///
    /// On rejection the store is left untouched.
    pub fn load_snapshot(&self, snapshot: StoreSnapshot, now: i64) -> Result<(), DomainError> {
        let restored = StoreInner::from_snapshot(snapshot, &self.config, now)?;
        *self.write() = restored;
        Ok(())
    }

    pub fn verify_integrity(&self) -> Result<(), DomainError> {
        self.read().verify_integrity()
    }

    /// Publishes the compiled gravity size into the counters.
    pub fn set_gravity_size(&self, size: usize) {
        self.write().counters.gravity = size as u64;
    }
}

impl StoreInner {
    pub(super) fn empty(config: &TelemetryConfig, now: i64) -> Self {
        Self {
            strings: StringPool::new(),
            queries: Table::new(),
            clients: Table::new(),
            domains: Table::new(),
            upstreams: Table::new(),
            overtime: OverTime::new(
                now,
                config.retention_secs(),
                i64::from(config.overtime_interval_secs),
                config.overtime_slots(),
            ),
            counters: Counters::default(),
            client_index: FxHashMap::default(),
            domain_index: FxHashMap::default(),
            upstream_index: FxHashMap::default(),
            retention_secs: config.retention_secs(),
        }
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    pub fn queries(&self) -> &Table<Query> {
        &self.queries
    }

    pub fn clients(&self) -> &Table<Client> {
        &self.clients
    }

    pub fn domains(&self) -> &Table<Domain> {
        &self.domains
    }

    pub fn upstreams(&self) -> &Table<Upstream> {
        &self.upstreams
    }

    pub fn overtime(&self) -> &OverTime {
        &self.overtime
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn resolve(&self, handle: sinkhole_domain::StringHandle) -> &str {
        self.strings.resolve(handle)
    }

    pub fn find_domain(&self, name: &str) -> Option<DomainId> {
        self.domain_index.get(name).copied()
    }

    /// Looks a client up by its textual address (`HIDDEN_CLIENT` included).
    pub fn find_client(&self, ip: &str) -> Option<ClientId> {
        self.client_index.get(ip).copied()
    }

    pub fn find_upstream(&self, ip: &str) -> Option<UpstreamId> {
        self.upstream_index.get(ip).copied()
    }

    /// Appends one query and updates every aggregate it touches.
    ///
    /// Every allocation that can fail happens in [`StoreInner::reserve_for`]
    /// before the first row or counter moves, so an error leaves the store
    /// unchanged.
    pub(crate) fn record(
        &mut self,
        resolved: &ResolvedQuery,
        status: QueryStatus,
        privacy: PrivacyLevel,
    ) -> Result<QueryId, DomainError> {
        let domain_name: &str = if privacy.hides_domains() {
            HIDDEN_DOMAIN
        } else {
            &resolved.domain
        };

        let client_ip;
        let (client_key, client_name) = if privacy.hides_clients() {
            (HIDDEN_CLIENT, None)
        } else {
            client_ip = resolved.client_ip.to_string();
            (client_ip.as_str(), resolved.client_name.as_deref())
        };

        let upstream = match (&resolved.outcome, status) {
            (
                ResolverOutcome::Forwarded {
                    upstream_ip,
                    upstream_name,
                },
                QueryStatus::Forwarded,
            ) => Some((upstream_ip.to_string(), upstream_name.as_deref())),
            _ => None,
        };
        let upstream = upstream.as_ref().map(|(ip, name)| (ip.as_str(), *name));

        self.reserve_for(domain_name, (client_key, client_name), upstream)?;

        let domain_id = self.domain_or_insert(domain_name)?;
        let client_id = self.client_or_insert(client_key, client_name)?;
        let upstream_id = match upstream {
            Some((ip, name)) => Some(self.upstream_or_insert(ip, name)?),
            None => None,
        };

        let timestamp = self.clamp_timestamp(resolved.timestamp);
        let slot = self.overtime.slot_for(timestamp);
        if slot.is_none() {
            debug!(
                timestamp,
                window_start = self.overtime.first_timestamp(),
                "Query predates OverTime window, not counted in history"
            );
        }

        let query = Query {
            magic: MAGIC_BYTE,
            timestamp,
            query_type: resolved.query_type,
            status,
            domain: domain_id,
            client: client_id,
            upstream: upstream_id,
            dnssec: resolved.dnssec,
            reply: resolved.reply,
            response_time_us: resolved.response_time_us,
            privacy_level: privacy,
            overtime_slot: slot
                .and_then(|i| self.overtime.slots().get(i))
                .map(|s| s.timestamp),
        };
        let blocked = status.is_blocked();

        if let Some(domain) = self.domains.get_mut(domain_id, true) {
            domain.count += 1;
            if blocked {
                domain.blocked_count += 1;
            }
        }

        if let Some(client) = self.clients.get_mut(client_id, true) {
            client.count += 1;
            if blocked {
                client.blocked_count += 1;
            }
            if let Some(count) = slot.and_then(|i| client.overtime.get_mut(i)) {
                *count += 1;
            }
        }

        if let Some(id) = upstream_id {
            if let Some(upstream) = self.upstreams.get_mut(id, true) {
                upstream.count += 1;
                if resolved.response_time_us > 0 {
                    upstream.record_response(resolved.response_time_us);
                }
            }
        }

        if let Some(entry) = slot.and_then(|i| self.overtime.slot_mut(i)) {
            entry.total += 1;
            if blocked {
                entry.blocked += 1;
            }
        }

        self.counters.count_query(&query);
        self.queries.append(query)
    }

    /// Removes every query older than `cutoff` from the front of the table
    /// and slides the OverTime window to `now`.
    pub(crate) fn evict_before(&mut self, cutoff: i64, now: i64) -> EvictionReport {
        let mut report = EvictionReport::default();

        while self.queries.front().is_some_and(|q| q.timestamp < cutoff) {
            let Some(query) = self.queries.pop_front() else {
                break;
            };
            if query.status.is_blocked() {
                report.evicted_blocked += 1;
            }
            self.forget(&query);
            report.evicted += 1;
        }

        report.slots_shifted = self.advance_overtime(now);
        report
    }

    /// Undoes the aggregate contributions of an evicted query.
    fn forget(&mut self, query: &Query) {
        let blocked = query.status.is_blocked();
        let slot = query.overtime_slot.and_then(|ts| self.overtime.index_of(ts));

        if let Some(domain) = self.domains.get_mut(query.domain, true) {
            domain.count = domain.count.saturating_sub(1);
            if blocked {
                domain.blocked_count = domain.blocked_count.saturating_sub(1);
            }
        }

        if let Some(client) = self.clients.get_mut(query.client, true) {
            client.count = client.count.saturating_sub(1);
            if blocked {
                client.blocked_count = client.blocked_count.saturating_sub(1);
            }
            if let Some(count) = slot.and_then(|i| client.overtime.get_mut(i)) {
                *count = count.saturating_sub(1);
            }
        }

        if let Some(upstream) = query
            .upstream
            .and_then(|id| self.upstreams.get_mut(id, true))
        {
            upstream.count = upstream.count.saturating_sub(1);
        }

        if let Some(entry) = slot.and_then(|i| self.overtime.slot_mut(i)) {
            entry.total = entry.total.saturating_sub(1);
            if blocked {
                entry.blocked = entry.blocked.saturating_sub(1);
            }
        }

        self.counters.uncount_query(query);
    }

    pub(super) fn advance_overtime(&mut self, now: i64) -> usize {
        let shift = self.overtime.advance(now, self.retention_secs);
        if shift > 0 {
            for client in self.clients.iter_mut() {
                shift_counts(&mut client.overtime, shift);
            }
        }
        shift
    }

    /// Reserves everything `record` may allocate for one query: the query
    /// row, plus a row, an index slot and pool space for each new entity.
    fn reserve_for(
        &mut self,
        domain: &str,
        client: (&str, Option<&str>),
        upstream: Option<(&str, Option<&str>)>,
    ) -> Result<(), DomainError> {
        self.queries.reserve(1)?;

        let mut pending: [Option<&str>; 5] = [None; 5];
        if !self.domain_index.contains_key(domain) {
            self.domains.reserve(1)?;
            reserve_index(&mut self.domain_index, "domain")?;
            pending[0] = Some(domain);
        }
        if !self.client_index.contains_key(client.0) {
            self.clients.reserve(1)?;
            reserve_index(&mut self.client_index, "client")?;
            pending[1] = Some(client.0);
            pending[2] = client.1;
        }
        if let Some((ip, name)) = upstream {
            if !self.upstream_index.contains_key(ip) {
                self.upstreams.reserve(1)?;
                reserve_index(&mut self.upstream_index, "upstream")?;
                pending[3] = Some(ip);
                pending[4] = name;
            }
        }

        self.strings.reserve_for(pending.into_iter().flatten())
    }

    /// Timestamps past the OverTime window are pulled back to its last
    /// second, so one bogus clock reading cannot hold the query table open.
    fn clamp_timestamp(&self, timestamp: i64) -> i64 {
        let end = self.overtime.end_timestamp();
        if timestamp < end {
            return timestamp;
        }
        debug!(timestamp, window_end = end, "Query from the future clamped into the OverTime window");
        end - 1
    }

    fn domain_or_insert(&mut self, name: &str) -> Result<DomainId, DomainError> {
        if let Some(id) = self.domain_index.get(name) {
            return Ok(*id);
        }
        let handle = self.strings.intern(name)?;
        let id = self.domains.append(Domain::new(handle))?;
        self.domain_index.insert(CompactString::from(name), id);
        self.counters.domains += 1;
        Ok(id)
    }

    fn client_or_insert(&mut self, ip: &str, name: Option<&str>) -> Result<ClientId, DomainError> {
        if let Some(id) = self.client_index.get(ip) {
            return Ok(*id);
        }
        let ip_handle = self.strings.intern(ip)?;
        let name_handle = match name {
            Some(name) if !name.is_empty() => Some(self.strings.intern(name)?),
            _ => None,
        };
        let slots = self.overtime.len();
        let id = self.clients.append(Client::new(ip_handle, name_handle, slots))?;
        self.client_index.insert(CompactString::from(ip), id);
        self.counters.clients += 1;
        Ok(id)
    }

    fn upstream_or_insert(&mut self, ip: &str, name: Option<&str>) -> Result<UpstreamId, DomainError> {
        if let Some(id) = self.upstream_index.get(ip) {
            return Ok(*id);
        }
        let ip_handle = self.strings.intern(ip)?;
        let name_handle = match name {
            Some(name) if !name.is_empty() => Some(self.strings.intern(name)?),
            _ => None,
        };
        let id = self.upstreams.append(Upstream::new(ip_handle, name_handle))?;
        self.upstream_index.insert(CompactString::from(ip), id);
        self.counters.upstreams += 1;
        Ok(id)
    }
}

fn reserve_index<V>(index: &mut FxHashMap<CompactString, V>, table: &str) -> Result<(), DomainError> {
    index
        .try_reserve(1)
        .map_err(|e| DomainError::ResourceExhausted(format!("{} index: {}", table, e)))
}
