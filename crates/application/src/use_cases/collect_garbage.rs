use crate::services::{EvictionReport, TelemetryStore};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Evicts queries that fell out of the retention window and slides the
/// OverTime window forward, all under one write lock.
pub struct CollectGarbageUseCase {
    store: Arc<TelemetryStore>,
    debug_gc: bool,
}

impl CollectGarbageUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self {
            store,
            debug_gc: false,
        }
    }

    pub fn with_debug(mut self, debug_gc: bool) -> Self {
        self.debug_gc = debug_gc;
        self
    }

    pub fn execute(&self) -> EvictionReport {
        self.execute_at(Utc::now().timestamp())
    }

    #[instrument(skip(self))]
    pub fn execute_at(&self, now: i64) -> EvictionReport {
        let cutoff = now - self.store.config().retention_secs();
        let report = {
            let mut inner = self.store.write();
            let before = inner.queries().first_id();
            let report = inner.evict_before(cutoff, now);
            if self.debug_gc {
                debug!(
                    cutoff,
                    first_id_before = before,
                    first_id_after = inner.queries().first_id(),
                    live = inner.queries().count(),
                    window_start = inner.overtime().first_timestamp(),
                    "GC pass details"
                );
            }
            report
        };

        if report.evicted > 0 || report.slots_shifted > 0 {
            info!(
                evicted = report.evicted,
                evicted_blocked = report.evicted_blocked,
                slots_shifted = report.slots_shifted,
                "Garbage collection completed"
            );
        }
        report
    }
}
