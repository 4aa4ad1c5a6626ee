use crate::services::TelemetryStore;
use sinkhole_domain::{
    DnssecStatus, DomainError, PrivacyLevel, QueryFilter, QueryId, QueryStatus, QueryType,
    ReplyType,
};
use std::sync::Arc;

/// One history row with every string resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView {
    pub id: QueryId,
    pub timestamp: i64,
    pub query_type: QueryType,
    pub status: QueryStatus,
    pub domain: String,
    pub client: String,
    pub client_name: Option<String>,
    pub upstream: Option<String>,
    pub reply: ReplyType,
    pub dnssec: DnssecStatus,
    pub response_time_us: u64,
}

pub struct GetRecentQueriesUseCase {
    store: Arc<TelemetryStore>,
}

impl GetRecentQueriesUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    /// Newest-first query history. Queries recorded under maximum privacy
    /// are never listed.
    pub fn execute(&self, filter: &QueryFilter) -> Result<Vec<QueryView>, DomainError> {
        filter.validate()?;

        let inner = self.store.read();
        let mut rows = Vec::with_capacity(filter.limit.min(inner.queries().count()));
        for (id, query) in inner.queries().iter().rev() {
            if rows.len() >= filter.limit {
                break;
            }
            if filter.before_id.is_some_and(|before| id.0 >= before) {
                continue;
            }
            if query.privacy_level >= PrivacyLevel::Maximum || !filter.matches_time(query.timestamp) {
                continue;
            }
            if filter.status.is_some_and(|s| s != query.status) {
                continue;
            }

            let Some(domain) = inner.domains().get(query.domain, true) else {
                continue;
            };
            let domain = inner.resolve(domain.name);
            if filter.domain.as_deref().is_some_and(|d| d != domain) {
                continue;
            }

            let Some(client) = inner.clients().get(query.client, true) else {
                continue;
            };
            let client_ip = inner.resolve(client.ip);
            let client_name = client.name.map(|h| inner.resolve(h));
            if let Some(wanted) = filter.client.as_deref() {
                if wanted != client_ip && Some(wanted) != client_name {
                    continue;
                }
            }

            let upstream = query
                .upstream
                .and_then(|u| inner.upstreams().get(u, true))
                .map(|u| inner.resolve(u.ip).to_string());

            rows.push(QueryView {
                id,
                timestamp: query.timestamp,
                query_type: query.query_type,
                status: query.status,
                domain: domain.to_string(),
                client: client_ip.to_string(),
                client_name: client_name.map(str::to_string),
                upstream,
                reply: query.reply,
                dnssec: query.dnssec,
                response_time_us: query.response_time_us,
            });
        }
        Ok(rows)
    }
}
