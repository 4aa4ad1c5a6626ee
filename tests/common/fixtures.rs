use sinkhole_application::ports::ClassificationPort;
use sinkhole_application::services::TelemetryStore;
use sinkhole_application::use_cases::RecordQueryUseCase;
use sinkhole_domain::{ReplyType, ResolvedQuery, ResolverOutcome, TelemetryConfig};
use std::net::IpAddr;
use std::sync::Arc;

pub const NOW: i64 = 1_700_000_000;
pub const HOUR: i64 = 3600;

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

pub fn forwarded(timestamp: i64, domain: &str, client: &str) -> ResolvedQuery {
    ResolvedQuery::new(
        timestamp,
        domain,
        ip(client),
        ResolverOutcome::Forwarded {
            upstream_ip: ip("9.9.9.9"),
            upstream_name: Some(Arc::from("dns.quad9.net")),
        },
    )
    .with_reply(ReplyType::Ip, 12_000)
}

pub fn cached(timestamp: i64, domain: &str, client: &str) -> ResolvedQuery {
    ResolvedQuery::new(timestamp, domain, ip(client), ResolverOutcome::Cached)
        .with_reply(ReplyType::Ip, 0)
}

/// A store whose window is anchored at `now`, plus an ingestion use case.
pub fn telemetry(
    config: TelemetryConfig,
    now: i64,
    classifier: Arc<dyn ClassificationPort>,
) -> (Arc<TelemetryStore>, RecordQueryUseCase) {
    let store = Arc::new(TelemetryStore::new_at(config, now));
    let record = RecordQueryUseCase::new(Arc::clone(&store), classifier);
    (store, record)
}
