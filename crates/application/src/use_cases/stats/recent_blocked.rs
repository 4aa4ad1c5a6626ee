use crate::services::TelemetryStore;
use sinkhole_domain::validators::validate_limit;
use sinkhole_domain::{DomainError, PrivacyLevel};
use std::sync::Arc;

pub struct GetRecentBlockedUseCase {
    store: Arc<TelemetryStore>,
}

impl GetRecentBlockedUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    /// Domains of the `count` most recent blocked queries, newest first,
    /// whatever blocking status they got.
    ///
    /// Domains recorded under a hiding privacy level come back as `hidden`;
    /// queries recorded under maximum privacy are skipped.
    pub fn execute(&self, count: usize) -> Result<Vec<String>, DomainError> {
        validate_limit(count).map_err(DomainError::InvalidInput)?;

        let inner = self.store.read();
        let domains = inner
            .queries()
            .iter()
            .rev()
            .filter(|(_, q)| q.status.is_blocked() && q.privacy_level < PrivacyLevel::Maximum)
            .filter_map(|(_, q)| inner.domains().get(q.domain, true))
            .map(|d| inner.resolve(d.name).to_string())
            .take(count)
            .collect();
        Ok(domains)
    }
}
