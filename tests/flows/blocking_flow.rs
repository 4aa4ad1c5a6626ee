//! Resolved queries classified against a real gravity database and recorded
//! into the telemetry store.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use sinkhole_application::ports::ClassificationPort;
use sinkhole_application::use_cases::{GetRecentQueriesUseCase, GetTopDomainsUseCase};
use sinkhole_domain::{GravityConfig, ListKind, QueryFilter, QueryStatus, TelemetryConfig};

const ADS: &str = "ads.example.com";
const CLIENT: &str = "10.0.0.5";

async fn kids_db() -> GravityDb {
    let db = GravityDb::new().await;
    db.add_group(1, "Kids").await;
    db.add_client(CLIENT, &[1]).await;
    db
}

#[tokio::test]
async fn test_blacklisted_domain_for_client_group() {
    let db = kids_db().await;
    db.add(ListKind::ExactBlacklist, ADS, &[1]).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine);

    for i in 0..3 {
        let outcome = record.execute(&forwarded(NOW + i, ADS, CLIENT)).unwrap();
        assert_eq!(outcome.status, QueryStatus::Blacklist);
    }

    let inner = store.read();
    let domain_id = inner.find_domain(ADS).unwrap();
    let domain = inner.domains().get(domain_id, true).unwrap();
    assert_eq!(domain.count, 3);
    assert_eq!(domain.blocked_count, 3);
    assert_eq!(inner.counters().blocked, 3);
    assert_eq!(inner.counters().forwarded, 0);
    assert_eq!(inner.upstreams().count(), 0);
    drop(inner);
    store.verify_integrity().unwrap();
}

#[tokio::test]
async fn test_whitelisting_after_reload_restores_resolution() {
    let db = kids_db().await;
    db.add(ListKind::ExactBlacklist, ADS, &[1]).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine.clone());

    assert_eq!(
        record.execute(&forwarded(NOW, ADS, CLIENT)).unwrap().status,
        QueryStatus::Blacklist
    );

    db.add(ListKind::ExactWhitelist, ADS, &[1]).await;
    engine.reload().await.unwrap();

    assert_eq!(
        record.execute(&forwarded(NOW + 1, ADS, CLIENT)).unwrap().status,
        QueryStatus::Forwarded
    );
    assert_eq!(
        record.execute(&cached(NOW + 2, ADS, CLIENT)).unwrap().status,
        QueryStatus::Cached
    );

    let inner = store.read();
    assert_eq!(inner.counters().blocked, 1);
    assert_eq!(inner.counters().forwarded, 1);
    assert_eq!(inner.counters().cached, 1);
    let upstream = inner.find_upstream("9.9.9.9").unwrap();
    assert_eq!(inner.upstreams().get(upstream, true).unwrap().count, 1);
    drop(inner);
    store.verify_integrity().unwrap();
}

#[tokio::test]
async fn test_whitelist_beats_blacklist_in_every_combination() {
    let combinations = [
        (ListKind::ExactBlacklist, ADS, ListKind::ExactWhitelist, ADS),
        (ListKind::ExactBlacklist, ADS, ListKind::RegexWhitelist, r"^ads\."),
        (ListKind::RegexBlacklist, r"example\.com$", ListKind::ExactWhitelist, ADS),
        (ListKind::RegexBlacklist, r"example\.com$", ListKind::RegexWhitelist, r"^ads\."),
    ];

    for (black, black_value, white, white_value) in combinations {
        let db = GravityDb::new().await;
        db.add(black, black_value, &[0]).await;
        db.add(white, white_value, &[0]).await;
        let engine = db.engine(&GravityConfig::default()).await;

        assert!(
            !engine.is_blocked(ADS, ip(CLIENT)),
            "{} should override {}",
            white,
            black
        );
        // The blacklist entry itself is live for other names
        if black.is_regex() {
            assert!(engine.is_blocked("cdn.example.com", ip(CLIENT)));
        }
    }
}

#[tokio::test]
async fn test_gravity_via_cname_chain() {
    let db = GravityDb::new().await;
    db.add(ListKind::Gravity, "tracker.cdn.example", &[0]).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine);

    let query = forwarded(NOW, "www.shop.example", CLIENT).with_cname_chain(&["tracker.cdn.example"]);
    assert_eq!(record.execute(&query).unwrap().status, QueryStatus::GravityCname);

    let recent = GetRecentQueriesUseCase::new(store.clone())
        .execute(&QueryFilter::default())
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].domain, "www.shop.example");
    assert_eq!(recent[0].status, QueryStatus::GravityCname);
}

#[tokio::test]
async fn test_audit_list_only_affects_reporting() {
    let db = GravityDb::new().await;
    db.add(ListKind::Gravity, ADS, &[0]).await;
    db.add(ListKind::Gravity, "tracker.example", &[0]).await;
    db.add_audit(ADS).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine.clone());

    for (i, domain) in [ADS, ADS, "tracker.example"].into_iter().enumerate() {
        let outcome = record.execute(&forwarded(NOW + i as i64, domain, CLIENT)).unwrap();
        assert_eq!(outcome.status, QueryStatus::Gravity);
    }

    let top = GetTopDomainsUseCase::new(store.clone(), engine);
    let all = top.execute(true, 10, false);
    assert_eq!(all[0].domain, ADS);
    assert_eq!(all[0].count, 2);

    let audited = top.execute(true, 10, true);
    assert_eq!(audited.len(), 1);
    assert_eq!(audited[0].domain, "tracker.example");
}
