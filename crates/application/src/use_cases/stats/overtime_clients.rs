use crate::services::TelemetryStore;
use chrono::Utc;
use sinkhole_domain::HIDDEN_CLIENT;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientLabel {
    pub ip: String,
    pub name: Option<String>,
}

/// One OverTime slot broken down per client. `counts[i]` belongs to
/// `ClientOverTime::clients[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSlot {
    pub timestamp: i64,
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOverTime {
    pub clients: Vec<ClientLabel>,
    pub slots: Vec<ClientSlot>,
}

pub struct GetOverTimeClientsUseCase {
    store: Arc<TelemetryStore>,
}

impl GetOverTimeClientsUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, exclude: &[&str]) -> ClientOverTime {
        self.execute_at(Utc::now().timestamp(), exclude)
    }

    /// Per-client activity from the first non-empty slot up to the slot
    /// containing `now`.
    ///
    /// Clients listed in `exclude` (by address or name) and the collapsed
    /// hidden client are left out.
    pub fn execute_at(&self, now: i64, exclude: &[&str]) -> ClientOverTime {
        let inner = self.store.read();
        let slots = inner.overtime().slots();
        let Some(start) = slots.iter().position(|s| s.total > 0) else {
            return ClientOverTime::default();
        };
        let end = slots[start..]
            .iter()
            .position(|s| s.timestamp > now)
            .map_or(slots.len(), |offset| start + offset);

        let shown: Vec<_> = inner
            .clients()
            .iter()
            .map(|(_, client)| client)
            .filter(|client| {
                let ip = inner.resolve(client.ip);
                let name = client.name.map(|h| inner.resolve(h));
                ip != HIDDEN_CLIENT
                    && !exclude
                        .iter()
                        .any(|e| *e == ip || Some(*e) == name)
            })
            .collect();

        let clients = shown
            .iter()
            .map(|client| ClientLabel {
                ip: inner.resolve(client.ip).to_string(),
                name: client.name.map(|h| inner.resolve(h).to_string()),
            })
            .collect();

        let slots = (start..end)
            .map(|i| ClientSlot {
                timestamp: slots[i].timestamp,
                counts: shown
                    .iter()
                    .map(|client| client.overtime.get(i).copied().unwrap_or(0))
                    .collect(),
            })
            .collect();

        ClientOverTime { clients, slots }
    }
}
