use crate::ports::ClassificationPort;
use crate::services::TelemetryStore;
use chrono::Utc;
use sinkhole_domain::{
    DomainError, PrivacyLevel, QueryId, QueryStatus, QueryType, ResolvedQuery, TelemetryConfig,
};
use std::sync::Arc;
use tracing::{debug, error};

/// What happened to one resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Final status: the local blocking verdict, else the resolver outcome.
    pub status: QueryStatus,
    /// `None` when the query was filtered out of the statistics.
    pub query_id: Option<QueryId>,
}

/// Hot-path ingestion: classify, then record under the store's write lock.
///
/// Classification runs before the lock is taken so regex evaluation never
/// blocks readers.
pub struct RecordQueryUseCase {
    store: Arc<TelemetryStore>,
    classifier: Arc<dyn ClassificationPort>,
}

impl RecordQueryUseCase {
    pub fn new(store: Arc<TelemetryStore>, classifier: Arc<dyn ClassificationPort>) -> Self {
        Self { store, classifier }
    }

    pub fn execute(&self, query: &ResolvedQuery) -> Result<RecordOutcome, DomainError> {
        let status = self
            .classifier
            .classify(&query.domain, &query.cname_chain, query.client_ip)
            .unwrap_or_else(|| query.outcome.status());

        let config = self.store.config();
        let privacy = config.privacy();
        if let Some(reason) = skip_reason(config, query, privacy) {
            debug!(domain = %query.domain, client = %query.client_ip, reason, "Query not recorded");
            return Ok(RecordOutcome {
                status,
                query_id: None,
            });
        }

        let id = self
            .store
            .write()
            .record(query, status, privacy)
            .inspect_err(|e| {
                if e.is_fatal() {
                    error!(error = %e, domain = %query.domain, "Failed to record query");
                }
            })?;

        Ok(RecordOutcome {
            status,
            query_id: Some(id),
        })
    }

    /// Records a query that arrived now.
    pub fn execute_now(&self, mut query: ResolvedQuery) -> Result<RecordOutcome, DomainError> {
        query.timestamp = Utc::now().timestamp();
        self.execute(&query)
    }
}

fn skip_reason(
    config: &TelemetryConfig,
    query: &ResolvedQuery,
    privacy: PrivacyLevel,
) -> Option<&'static str> {
    if privacy == PrivacyLevel::NoStats {
        return Some("privacy level disables statistics");
    }
    if config.ignore_localhost && query.client_ip.is_loopback() {
        return Some("localhost ignored");
    }
    let is_address = matches!(query.query_type, QueryType::A | QueryType::Aaaa);
    if config.analyze_only_a_aaaa && !is_address {
        return Some("only A and AAAA analyzed");
    }
    if !config.analyze_aaaa && query.query_type == QueryType::Aaaa {
        return Some("AAAA not analyzed");
    }
    None
}
