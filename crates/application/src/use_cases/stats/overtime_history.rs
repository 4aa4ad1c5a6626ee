use crate::services::TelemetryStore;
use chrono::Utc;
use sinkhole_domain::OverTimeSlot;
use std::sync::Arc;

pub struct GetOverTimeHistoryUseCase {
    store: Arc<TelemetryStore>,
}

impl GetOverTimeHistoryUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self) -> Vec<OverTimeSlot> {
        self.execute_at(Utc::now().timestamp())
    }

    /// Slots from the first non-empty one up to the slot containing `now`.
    pub fn execute_at(&self, now: i64) -> Vec<OverTimeSlot> {
        let inner = self.store.read();
        let slots = inner.overtime().slots();
        let Some(start) = slots.iter().position(|s| s.total > 0) else {
            return Vec::new();
        };
        slots[start..]
            .iter()
            .take_while(|s| s.timestamp <= now)
            .copied()
            .collect()
    }
}
