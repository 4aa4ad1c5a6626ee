use super::overtime::OverTime;
use super::store::StoreInner;
use super::string_pool::StringPool;
use super::table::Table;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use sinkhole_domain::{
    ClientId, DomainError, DomainId, Record, StoreSnapshot, StringHandle, TelemetryConfig,
    UpstreamId, MAGIC_BYTE, SNAPSHOT_VERSION,
};
use tracing::{debug, warn};

impl StoreInner {
    pub(super) fn to_snapshot(&self, now: i64) -> StoreSnapshot {
        StoreSnapshot {
            version: SNAPSHOT_VERSION,
            taken_at: now,
            first_query_id: self.queries.first_id(),
            strings: self.strings.contents().to_string(),
            queries: self.queries.to_vec(),
            clients: self.clients.to_vec(),
            domains: self.domains.to_vec(),
            upstreams: self.upstreams.to_vec(),
            overtime: self.overtime.slots().to_vec(),
            counters: self.counters.clone(),
        }
    }

    /// Rebuilds a store from a snapshot.
    ///
    /// Tags, references and counters are validated before anything is
    /// returned. The OverTime window is re-derived from the restored queries
    /// at `now`, so a snapshot taken under a different window layout still
    /// loads consistently.
    pub(super) fn from_snapshot(
        snapshot: StoreSnapshot,
        config: &TelemetryConfig,
        now: i64,
    ) -> Result<Self, DomainError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DomainError::SnapshotRejected(format!(
                "unsupported version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        let strings = StringPool::from_contents(snapshot.strings)?;
        reject_bad_tags(&snapshot.queries)?;
        reject_bad_tags(&snapshot.clients)?;
        reject_bad_tags(&snapshot.domains)?;
        reject_bad_tags(&snapshot.upstreams)?;

        let handle_ok = |h: StringHandle| h.offset() < strings.len();
        let mut domain_index: FxHashMap<CompactString, DomainId> = FxHashMap::default();
        for (id, domain) in snapshot.domains.iter().enumerate() {
            if !handle_ok(domain.name) {
                return Err(rejected(format!("domain {} has a dangling name", id)));
            }
            let name = CompactString::from(strings.resolve(domain.name));
            if domain_index.insert(name, DomainId(id)).is_some() {
                return Err(rejected(format!("duplicate domain {}", strings.resolve(domain.name))));
            }
        }
        let mut client_index: FxHashMap<CompactString, ClientId> = FxHashMap::default();
        for (id, client) in snapshot.clients.iter().enumerate() {
            if !handle_ok(client.ip) || client.name.is_some_and(|n| !handle_ok(n)) {
                return Err(rejected(format!("client {} has a dangling string", id)));
            }
            let ip = CompactString::from(strings.resolve(client.ip));
            if client_index.insert(ip, ClientId(id)).is_some() {
                return Err(rejected(format!("duplicate client {}", strings.resolve(client.ip))));
            }
        }
        let mut upstream_index: FxHashMap<CompactString, UpstreamId> = FxHashMap::default();
        for (id, upstream) in snapshot.upstreams.iter().enumerate() {
            if !handle_ok(upstream.ip) || upstream.name.is_some_and(|n| !handle_ok(n)) {
                return Err(rejected(format!("upstream {} has a dangling string", id)));
            }
            let ip = CompactString::from(strings.resolve(upstream.ip));
            if upstream_index.insert(ip, UpstreamId(id)).is_some() {
                return Err(rejected(format!("duplicate upstream {}", strings.resolve(upstream.ip))));
            }
        }

        for (offset, query) in snapshot.queries.iter().enumerate() {
            let id = snapshot.first_query_id + offset;
            let dangling = query.domain.0 >= snapshot.domains.len()
                || query.client.0 >= snapshot.clients.len()
                || query.upstream.is_some_and(|u| u.0 >= snapshot.upstreams.len());
            if dangling {
                return Err(rejected(format!("query {} has a dangling reference", id)));
            }
        }

        let retention_secs = config.retention_secs();
        let mut overtime = OverTime::new(
            now,
            retention_secs,
            i64::from(config.overtime_interval_secs),
            config.overtime_slots(),
        );

        let mut clients = snapshot.clients;
        for client in &mut clients {
            client.overtime.clear();
            client.overtime.resize(overtime.len(), 0);
        }

        let mut queries = snapshot.queries;
        let window_end = overtime.end_timestamp();
        for query in &mut queries {
            query.timestamp = query.timestamp.min(window_end - 1);
            let slot = overtime.slot_for(query.timestamp);
            query.overtime_slot = slot.and_then(|i| overtime.slots().get(i)).map(|s| s.timestamp);
            let Some(i) = slot else { continue };
            if let Some(entry) = overtime.slot_mut(i) {
                entry.total += 1;
                if query.status.is_blocked() {
                    entry.blocked += 1;
                }
            }
            if let Some(count) = clients.get_mut(query.client.0).and_then(|c| c.overtime.get_mut(i)) {
                *count += 1;
            }
        }

        let restored = Self {
            strings,
            queries: Table::from_rows(snapshot.first_query_id, queries),
            clients: Table::from_rows(0, clients),
            domains: Table::from_rows(0, snapshot.domains),
            upstreams: Table::from_rows(0, snapshot.upstreams),
            overtime,
            counters: snapshot.counters,
            client_index,
            domain_index,
            upstream_index,
            retention_secs,
        };

        if let Err(e) = restored.verify_integrity() {
            warn!(error = %e, "Snapshot failed integrity check");
            return Err(rejected(e.to_string()));
        }

        debug!(
            queries = restored.queries.count(),
            first_query_id = restored.queries.first_id(),
            taken_at = snapshot.taken_at,
            "Snapshot validated"
        );
        Ok(restored)
    }
}

fn reject_bad_tags<R: Record>(records: &[R]) -> Result<(), DomainError> {
    match records.iter().position(|r| r.magic() != MAGIC_BYTE) {
        Some(id) => Err(rejected(format!("bad integrity tag in {} record {}", R::TABLE, id))),
        None => Ok(()),
    }
}

fn rejected(reason: String) -> DomainError {
    DomainError::SnapshotRejected(reason)
}
