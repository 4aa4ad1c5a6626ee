//! Store snapshots written to disk and bulk-loaded into a fresh process.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use sinkhole_application::services::TelemetryStore;
use sinkhole_application::use_cases::{
    GetRecentQueriesUseCase, GetSummaryUseCase, RestoreSnapshotUseCase, SaveSnapshotUseCase,
};
use sinkhole_domain::{GravityConfig, ListKind, QueryFilter, QueryStatus, TelemetryConfig};
use sinkhole_infrastructure::repositories::JsonSnapshotRepository;
use sinkhole_jobs::SnapshotJob;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

async fn recorded_store() -> Arc<TelemetryStore> {
    let db = GravityDb::new().await;
    db.add(ListKind::Gravity, "ads.example.com", &[0]).await;
    let engine = db.engine(&GravityConfig::default()).await;
    let (store, record) = telemetry(TelemetryConfig::default(), NOW, engine);

    let traffic = [
        ("ads.example.com", "10.0.0.5"),
        ("example.com", "10.0.0.5"),
        ("example.org", "10.0.0.6"),
        ("ads.example.com", "10.0.0.6"),
        ("example.com", "10.0.0.7"),
    ];
    for (i, (domain, client)) in traffic.into_iter().enumerate() {
        record
            .execute(&forwarded(NOW - 3 * HOUR + i as i64 * 600, domain, client))
            .unwrap();
    }
    store
}

#[tokio::test]
async fn test_restart_restores_statistics() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(JsonSnapshotRepository::new(dir.path().join("sinkhole.json")));

    let original = recorded_store().await;
    let saved = SaveSnapshotUseCase::new(original.clone(), repo.clone())
        .execute()
        .await
        .unwrap();
    assert_eq!(saved, 5);

    let restarted = Arc::new(TelemetryStore::new_at(TelemetryConfig::default(), NOW + 600));
    let restored = RestoreSnapshotUseCase::new(restarted.clone(), repo)
        .execute_at(NOW + 600)
        .await
        .unwrap();
    assert!(restored);
    restarted.verify_integrity().unwrap();

    let before = GetSummaryUseCase::new(original.clone()).execute();
    let after = GetSummaryUseCase::new(restarted.clone()).execute();
    assert_eq!(after.counters, before.counters);
    assert_eq!(after.total_clients, 3);
    assert_eq!(after.unique_domains, before.unique_domains);

    let recent_before = GetRecentQueriesUseCase::new(original)
        .execute(&QueryFilter::default())
        .unwrap();
    let recent_after = GetRecentQueriesUseCase::new(restarted.clone())
        .execute(&QueryFilter::default())
        .unwrap();
    assert_eq!(recent_after, recent_before);
    assert_eq!(recent_after[0].status, QueryStatus::Forwarded);
    assert_eq!(recent_after[1].status, QueryStatus::Gravity);

    // Ids keep increasing after the restore
    let last = restarted.read().queries().next_id();
    assert_eq!(last, 5);
}

#[tokio::test]
async fn test_first_start_without_snapshot() {
    let dir = TempDir::new().unwrap();
    let repo = Arc::new(JsonSnapshotRepository::new(dir.path().join("sinkhole.json")));
    let store = Arc::new(TelemetryStore::new_at(TelemetryConfig::default(), NOW));

    let restored = RestoreSnapshotUseCase::new(store.clone(), repo)
        .execute_at(NOW)
        .await
        .unwrap();

    assert!(!restored);
    assert_eq!(store.read().queries().count(), 0);
}

#[tokio::test]
async fn test_snapshot_job_persists_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sinkhole.json");
    let repo = Arc::new(JsonSnapshotRepository::new(&path));
    let store = recorded_store().await;
    let token = CancellationToken::new();

    let job = Arc::new(
        SnapshotJob::new(Arc::new(SaveSnapshotUseCase::new(store.clone(), repo.clone())))
            .with_interval(3600)
            .with_cancellation(token.clone()),
    );
    job.start().await;
    token.cancel();
    sleep(Duration::from_millis(200)).await;

    assert!(path.exists());
    let restarted = Arc::new(TelemetryStore::new_at(TelemetryConfig::default(), NOW));
    assert!(RestoreSnapshotUseCase::new(restarted.clone(), repo)
        .execute_at(NOW)
        .await
        .unwrap());
    assert_eq!(restarted.read().counters().blocked, 2);
}
