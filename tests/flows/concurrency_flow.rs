//! Writers, readers and the collector sharing one store.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use sinkhole_application::use_cases::{
    CollectGarbageUseCase, GetRecentQueriesUseCase, GetSummaryUseCase, GetTopClientsUseCase,
};
use sinkhole_domain::{GravityConfig, ListKind, QueryFilter, TelemetryConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const WRITERS: i64 = 4;
const PER_WRITER: i64 = 500;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_partial_updates() {
    let db = GravityDb::new().await;
    db.add(ListKind::Gravity, "ads.example.com", &[0]).await;
    db.add(ListKind::RegexBlacklist, r"^track[0-9]+\.", &[0]).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine);
    let record = Arc::new(record);
    let done = Arc::new(AtomicBool::new(false));

    let mut writers = Vec::new();
    for w in 0..WRITERS {
        let record = Arc::clone(&record);
        writers.push(tokio::spawn(async move {
            for i in 0..PER_WRITER {
                // Older traffic first so the collector has something to evict
                let ts = NOW - 26 * HOUR + (i * 26 * HOUR) / PER_WRITER;
                let domain = match i % 3 {
                    0 => "ads.example.com".to_string(),
                    1 => format!("track{}.example", i % 7),
                    _ => format!("site{}.example", i % 11),
                };
                let client = format!("10.0.{}.{}", w, i % 5);
                record.execute(&forwarded(ts, &domain, &client)).unwrap();
                if i % 50 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }

    let mut readers = Vec::new();
    for _ in 0..2 {
        let store = store.clone();
        let done = Arc::clone(&done);
        readers.push(tokio::spawn(async move {
            let summary = GetSummaryUseCase::new(store.clone());
            let recent = GetRecentQueriesUseCase::new(store.clone());
            let clients = GetTopClientsUseCase::new(store.clone());
            let mut checks = 0;
            loop {
                let finished = done.load(Ordering::SeqCst);
                store.verify_integrity().unwrap();
                let s = summary.execute();
                assert!(s.counters.blocked <= s.counters.queries);
                let page = recent.execute(&QueryFilter::default()).unwrap();
                assert!(page.windows(2).all(|p| p[0].id > p[1].id));
                let _ = clients.execute(false, 10, false);
                checks += 1;
                if finished {
                    break;
                }
                tokio::task::yield_now().await;
            }
            checks
        }));
    }

    let collector = {
        let gc = CollectGarbageUseCase::new(store.clone());
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            while !done.load(Ordering::SeqCst) {
                gc.execute_at(NOW);
                tokio::task::yield_now().await;
            }
        })
    };

    for writer in writers {
        writer.await.unwrap();
    }
    done.store(true, Ordering::SeqCst);
    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }
    collector.await.unwrap();

    CollectGarbageUseCase::new(store.clone()).execute_at(NOW);
    store.verify_integrity().unwrap();

    let inner = store.read();
    let live = inner.queries().count() as u64;
    assert_eq!(inner.counters().queries, live);
    assert!(live < (WRITERS * PER_WRITER) as u64);
    let domain_total: u64 = inner.domains().iter().map(|(_, d)| d.count).sum();
    assert_eq!(domain_total, live);
}
