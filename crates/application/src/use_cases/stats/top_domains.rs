use crate::ports::ClassificationPort;
use crate::services::TelemetryStore;
use sinkhole_domain::HIDDEN_DOMAIN;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopDomain {
    pub domain: String,
    pub count: u64,
}

/// Most frequent domains, either permitted or blocked.
pub struct GetTopDomainsUseCase {
    store: Arc<TelemetryStore>,
    classifier: Arc<dyn ClassificationPort>,
}

impl GetTopDomainsUseCase {
    pub fn new(store: Arc<TelemetryStore>, classifier: Arc<dyn ClassificationPort>) -> Self {
        Self { store, classifier }
    }

    /// `audit` drops domains already present in the audit list.
    pub fn execute(&self, blocked: bool, count: usize, audit: bool) -> Vec<TopDomain> {
        let mut ranked: Vec<TopDomain> = {
            let inner = self.store.read();
            inner
                .domains()
                .iter()
                .filter_map(|(_, domain)| {
                    let hits = if blocked {
                        domain.blocked_count
                    } else {
                        domain.permitted_count()
                    };
                    let name = inner.resolve(domain.name);
                    (hits > 0 && name != HIDDEN_DOMAIN).then(|| TopDomain {
                        domain: name.to_string(),
                        count: hits,
                    })
                })
                .collect()
        };

        // Audit lookups go through the classifier, so they run without the store lock.
        if audit {
            ranked.retain(|d| !self.classifier.in_audit_list(&d.domain));
        }

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
        ranked.truncate(count);
        ranked
    }
}
