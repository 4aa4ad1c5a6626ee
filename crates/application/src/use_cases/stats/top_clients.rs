use crate::services::TelemetryStore;
use sinkhole_domain::HIDDEN_CLIENT;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopClient {
    pub ip: String,
    pub name: Option<String>,
    pub count: u64,
}

pub struct GetTopClientsUseCase {
    store: Arc<TelemetryStore>,
}

impl GetTopClientsUseCase {
    pub fn new(store: Arc<TelemetryStore>) -> Self {
        Self { store }
    }

    /// Ranks clients by total (or blocked) queries. `with_zero` keeps clients
    /// whose queries have all aged out.
    pub fn execute(&self, blocked: bool, count: usize, with_zero: bool) -> Vec<TopClient> {
        let inner = self.store.read();
        let mut ranked: Vec<TopClient> = inner
            .clients()
            .iter()
            .filter_map(|(_, client)| {
                let hits = if blocked {
                    client.blocked_count
                } else {
                    client.count
                };
                let ip = inner.resolve(client.ip);
                if ip == HIDDEN_CLIENT || (hits == 0 && !with_zero) {
                    return None;
                }
                Some(TopClient {
                    ip: ip.to_string(),
                    name: client.name.map(|h| inner.resolve(h).to_string()),
                    count: hits,
                })
            })
            .collect();
        drop(inner);

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ip.cmp(&b.ip)));
        ranked.truncate(count);
        ranked
    }
}
