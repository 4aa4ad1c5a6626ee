//! A day and a bit of traffic under a 24 hour retention window.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use sinkhole_application::use_cases::{CollectGarbageUseCase, GetOverTimeHistoryUseCase};
use sinkhole_domain::{GravityConfig, ListKind, TelemetryConfig};
use sinkhole_jobs::garbage_collection::next_run_delay;

const SPAN: i64 = 26 * HOUR;
const QUERIES: i64 = 200;

#[tokio::test]
async fn test_twenty_six_hours_of_queries_with_hourly_collection() {
    let db = GravityDb::new().await;
    db.add(ListKind::Gravity, "ads.example.com", &[0]).await;
    let engine = db.engine(&GravityConfig::default()).await;

    let config = TelemetryConfig::default();
    let retention = config.retention_secs();
    let interval = config.overtime_interval_secs as i64;
    let start = NOW - SPAN;
    let (store, record) = telemetry(config, start, engine);
    let gc = CollectGarbageUseCase::new(store.clone());

    let step = SPAN / QUERIES;
    let mut next_gc = start - start.rem_euclid(HOUR) + HOUR;
    let mut timestamps = Vec::new();
    for i in 0..QUERIES {
        let ts = start + i * step;
        while ts >= next_gc {
            gc.execute_at(next_gc);
            store.verify_integrity().unwrap();
            next_gc += HOUR;
        }
        let domain = if i % 4 == 0 { "ads.example.com" } else { "example.com" };
        let client = if i % 2 == 0 { "10.0.0.5" } else { "10.0.0.6" };
        record.execute(&forwarded(ts, domain, client)).unwrap();
        timestamps.push(ts);
    }

    let report = gc.execute_at(NOW);
    assert!(report.evicted > 0);

    let cutoff = NOW - retention;
    let survivors = timestamps.iter().filter(|&&ts| ts >= cutoff).count();
    let inner = store.read();
    assert_eq!(inner.queries().count(), survivors);
    assert!(inner.queries().iter().all(|(_, q)| q.timestamp >= cutoff));

    let oldest_slot = inner.overtime().first_timestamp();
    assert!(oldest_slot <= cutoff);
    assert!(cutoff - oldest_slot < interval);

    // Every surviving query is still counted in exactly one slot
    let slot_total: u64 = inner.overtime().slots().iter().map(|s| s.total).sum();
    assert_eq!(slot_total, survivors as u64);
    let domain_total: u64 = inner.domains().iter().map(|(_, d)| d.count).sum();
    assert_eq!(domain_total, survivors as u64);
    drop(inner);
    store.verify_integrity().unwrap();

    let history = GetOverTimeHistoryUseCase::new(store.clone()).execute_at(NOW);
    assert!(!history.is_empty());
    assert!(history.iter().all(|s| s.timestamp <= NOW));
    assert_eq!(history.iter().map(|s| s.total).sum::<u64>(), survivors as u64);
}

#[tokio::test]
async fn test_collection_before_the_hour_keeps_queries_in_their_own_slot() {
    let db = GravityDb::new().await;
    let engine = db.engine(&GravityConfig::default()).await;

    // Default phase: the collector runs a minute before each hour
    let config = TelemetryConfig::default();
    let width = config.overtime_interval_secs as i64;
    let gc_interval = config.gc_interval_secs;
    let gc_delay = config.gc_delay_secs;
    let start = NOW - 30 * HOUR;
    let (store, record) = telemetry(config, start, engine);
    let gc = CollectGarbageUseCase::new(store.clone());

    let mut next_gc = start + next_run_delay(start, gc_interval, gc_delay) as i64;
    let mut ts = start;
    let mut recorded = 0;
    while ts < NOW {
        while ts >= next_gc {
            gc.execute_at(next_gc);
            next_gc += gc_interval as i64;
        }
        let id = record
            .execute(&forwarded(ts, "example.com", "10.0.0.5"))
            .unwrap()
            .query_id
            .unwrap();

        let inner = store.read();
        let query = inner.queries().get(id, true).unwrap();
        assert_eq!(
            query.overtime_slot,
            Some(ts - ts.rem_euclid(width)),
            "query at {} counted in the wrong slot (collector last ran at {})",
            ts,
            next_gc - gc_interval as i64
        );
        drop(inner);

        recorded += 1;
        ts += 7 * 60 + 13;
    }
    assert!(recorded > 200);
    store.verify_integrity().unwrap();
}

#[tokio::test]
async fn test_eviction_touches_only_the_evicted_slot() {
    let db = GravityDb::new().await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine);
    let gc = CollectGarbageUseCase::new(store.clone());

    let old = NOW - 24 * HOUR + 60;
    record.execute(&forwarded(old, "old.example", "10.0.0.5")).unwrap();
    record.execute(&forwarded(NOW - HOUR, "new.example", "10.0.0.5")).unwrap();

    let before: Vec<_> = store.read().overtime().slots().to_vec();
    // Cutoff moves just past the old query without sliding the window
    gc.execute_at(old + 24 * HOUR + 1);
    let after: Vec<_> = store.read().overtime().slots().to_vec();

    let inner = store.read();
    assert_eq!(inner.queries().count(), 1);
    assert_eq!(inner.find_domain("old.example").map(|id| inner.domains().get(id, true).unwrap().count), Some(0));

    let changed: Vec<usize> = before
        .iter()
        .zip(after.iter())
        .enumerate()
        .filter(|(_, (b, a))| b != a)
        .map(|(i, _)| i)
        .collect();
    if before[0].timestamp == after[0].timestamp {
        assert_eq!(changed.len(), 1);
        assert_eq!(after[changed[0]].total + 1, before[changed[0]].total);
    }
    drop(inner);
    store.verify_integrity().unwrap();
}
