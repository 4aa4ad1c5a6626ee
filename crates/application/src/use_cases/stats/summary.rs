use crate::services::TelemetryStore;
use sinkhole_domain::{Counters, PrivacyLevel};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub counters: Counters,
    pub percent_blocked: f64,
    /// Clients with at least one query inside the retention window.
    pub active_clients: usize,
    /// Clients ever seen since start (or since the restored snapshot).
    pub total_clients: usize,
    pub unique_domains: usize,
    pub privacy_level: PrivacyLevel,
}

pub struct GetSummaryUseCase {
    store: Arc<TelemetryStore>,
}

impl GetSummaryUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self) -> Summary {
        let inner = self.store.read();
        let counters = inner.counters().clone();
        Summary {
            percent_blocked: counters.percent_blocked(),
            active_clients: inner.clients().iter().filter(|(_, c)| c.count > 0).count(),
            total_clients: inner.clients().count(),
            unique_domains: inner.domains().count(),
            privacy_level: self.store.config().privacy(),
            counters,
        }
    }
}
