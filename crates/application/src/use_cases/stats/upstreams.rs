use crate::services::TelemetryStore;
use std::sync::Arc;

/// Upstream rows shown in the forward-destination table.
const MAX_UPSTREAM_ROWS: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamStat {
    pub ip: String,
    pub name: Option<String>,
    pub count: u64,
    pub average_ms: f64,
    pub uncertainty_ms: f64,
}

pub struct GetUpstreamsUseCase {
    store: Arc<TelemetryStore>,
}

impl GetUpstreamsUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    /// Returns the `blocklist` and `cache` pseudo-rows followed by the busiest
    /// upstreams.
    pub fn execute(&self) -> Vec<UpstreamStat> {
        let inner = self.store.read();
        let counters = inner.counters();

        let mut upstreams: Vec<UpstreamStat> = inner
            .upstreams()
            .iter()
            .filter(|(_, u)| u.count > 0)
            .map(|(_, u)| UpstreamStat {
                ip: inner.resolve(u.ip).to_string(),
                name: u.name.map(|h| inner.resolve(h).to_string()),
                count: u.count,
                average_ms: u.average_response_ms(),
                uncertainty_ms: u.response_uncertainty_ms(),
            })
            .collect();
        upstreams.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ip.cmp(&b.ip)));
        upstreams.truncate(MAX_UPSTREAM_ROWS);

        let mut rows = Vec::with_capacity(upstreams.len() + 2);
        rows.push(pseudo_row("blocklist", counters.blocked));
        rows.push(pseudo_row("cache", counters.cached));
        rows.extend(upstreams);
        rows
    }
}

fn pseudo_row(name: &str, count: u64) -> UpstreamStat {
    UpstreamStat {
        ip: name.to_string(),
        name: Some(name.to_string()),
        count,
        average_ms: 0.0,
        uncertainty_ms: 0.0,
    }
}
