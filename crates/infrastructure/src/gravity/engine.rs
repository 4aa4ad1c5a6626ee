use super::compiler::compile_list_index;
use super::list_index::{HopMatch, ListIndex};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use sinkhole_application::ports::{ClassificationPort, ListStore};
use sinkhole_domain::{DomainError, GravityConfig, ListKind, QueryStatus};
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Blocking categories in precedence order, each with its direct and CNAME
/// status.
const PRECEDENCE: [(HopMatch, QueryStatus, QueryStatus); 3] = [
    (HopMatch::BLACKLIST, QueryStatus::Blacklist, QueryStatus::BlacklistCname),
    (HopMatch::REGEX, QueryStatus::Regex, QueryStatus::RegexCname),
    (HopMatch::GRAVITY, QueryStatus::Gravity, QueryStatus::GravityCname),
];

/// The Gravity Classification Engine.
///
/// All list data lives in memory. The compiled `ListIndex` is swapped
/// atomically via `ArcSwap` during `reload()`; lookups never wait on the
/// list store.
///
/// A list category that fails to load is left empty and reported once; the
/// next reload (or retry tick) tries it again.
pub struct GravityEngine {
    index: ArcSwap<ListIndex>,
    store: Arc<dyn ListStore>,
    regex_ignore_case: bool,
    cname_inspection: bool,
    degraded_reported: [AtomicBool; ListKind::COUNT],
    reload_lock: Mutex<()>,
}

impl GravityEngine {
    /// Create and initialise the engine.
    ///
    /// Fails when groups or clients cannot be read, which makes the list
    /// store unusable. A single unreadable category only degrades it.
    pub async fn new(store: Arc<dyn ListStore>, config: &GravityConfig) -> Result<Self, DomainError> {
        info!("Gravity list compilation started");
        let index = compile_list_index(store.as_ref(), config.regex_ignore_case).await?;

        let engine = Self {
            index: ArcSwap::from_pointee(ListIndex::empty()),
            store,
            regex_ignore_case: config.regex_ignore_case,
            cname_inspection: config.cname_inspection,
            degraded_reported: Default::default(),
            reload_lock: Mutex::new(()),
        };
        engine.install(index);

        info!(gravity = engine.gravity_size(), "GravityEngine initialized");
        Ok(engine)
    }

    /// Current compiled index.
    pub fn index(&self) -> Arc<ListIndex> {
        self.index.load_full()
    }

    pub fn degraded_lists(&self) -> Vec<ListKind> {
        self.index.load().degraded_lists()
    }

    fn install(&self, index: ListIndex) {
        self.report_degradation(&index);
        self.index.store(Arc::new(index));
    }

    /// Warns once per category when it degrades and re-arms when it recovers.
    fn report_degradation(&self, index: &ListIndex) {
        for kind in ListKind::ALL {
            let latch = &self.degraded_reported[kind.index()];
            if index.is_degraded(kind) {
                if !latch.swap(true, Ordering::Relaxed) {
                    warn!(list = %kind, "List category unavailable, treated as empty until it reloads");
                }
            } else if latch.swap(false, Ordering::Relaxed) {
                info!(list = %kind, "List category available again");
            }
        }
    }

    fn hops<'a>(&self, domain: &'a str, cname_chain: &'a [Arc<str>]) -> SmallVec<[&'a str; 4]> {
        let mut hops: SmallVec<[&str; 4]> = SmallVec::new();
        hops.push(domain);
        if self.cname_inspection {
            hops.extend(cname_chain.iter().map(|c| c.as_ref()));
        }
        hops
    }
}

#[async_trait]
impl ClassificationPort for GravityEngine {
    /// Classify the queried name and its CNAME chain.
    ///
    /// Categories are checked in precedence order (exact blacklist, regex
    /// blacklist, gravity); within a category the hops are checked in
    /// resolution order. A whitelisted hop never triggers a block, but does
    /// not shield the other hops.
    fn classify(&self, domain: &str, cname_chain: &[Arc<str>], client: IpAddr) -> Option<QueryStatus> {
        let index = self.index.load();
        let scope = index.scope_for(client);
        if scope.is_empty() {
            return None;
        }

        let verdicts: SmallVec<[HopMatch; 4]> = self
            .hops(domain, cname_chain)
            .into_iter()
            .map(|hop| index.hop_match(hop, &scope))
            .collect();

        PRECEDENCE.iter().find_map(|(category, direct, via_cname)| {
            verdicts
                .iter()
                .position(|v| !v.is_whitelisted() && v.contains(*category))
                .map(|hop| if hop == 0 { *direct } else { *via_cname })
        })
    }

    fn in_gravity(&self, domain: &str, client: IpAddr) -> bool {
        let index = self.index.load();
        let scope = index.scope_for(client);
        index.in_exact(ListKind::Gravity, domain, scope.mask)
    }

    fn in_blacklist(&self, domain: &str, client: IpAddr) -> bool {
        let index = self.index.load();
        let scope = index.scope_for(client);
        index.in_exact(ListKind::ExactBlacklist, domain, scope.mask)
    }

    fn in_whitelist(&self, domain: &str, client: IpAddr) -> bool {
        let index = self.index.load();
        let scope = index.scope_for(client);
        index.in_exact(ListKind::ExactWhitelist, domain, scope.mask)
    }

    fn match_regex(&self, domain: &str, client: IpAddr, kind: ListKind) -> Option<i64> {
        let index = self.index.load();
        let scope = index.scope_for(client);
        index.match_regex(kind, domain, &scope)
    }

    fn in_audit_list(&self, domain: &str) -> bool {
        self.index.load().in_audit_list(domain)
    }

    fn gravity_size(&self) -> usize {
        self.index.load().gravity_size()
    }

    /// Recompile the `ListIndex` and atomically swap it.
    ///
    /// On failure the previous index stays in service.
    async fn reload(&self) -> Result<(), DomainError> {
        let _guard = self.reload_lock.lock().await;
        info!("Gravity list reload started");

        let index = compile_list_index(self.store.as_ref(), self.regex_ignore_case)
            .await
            .inspect_err(|e| error!(error = %e, "Gravity list reload failed, keeping previous lists"))?;

        self.install(index);
        info!(gravity = self.gravity_size(), "Gravity list reload completed");
        Ok(())
    }

    async fn retry_degraded(&self) -> Result<bool, DomainError> {
        if self.degraded_lists().is_empty() {
            return Ok(false);
        }
        self.reload().await?;
        Ok(true)
    }
}
