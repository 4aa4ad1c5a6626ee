use super::list_index::GroupMask;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::Arc;

/// Everything the engine needs to restrict lookups to one client's groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientScope {
    pub mask: GroupMask,
    /// Positions of the regex blacklist entries that apply to this client.
    pub regex_black: SmallVec<[u32; 8]>,
    /// Positions of the regex whitelist entries that apply to this client.
    pub regex_white: SmallVec<[u32; 8]>,
}

impl ClientScope {
    pub fn unscoped() -> Self {
        Self {
            mask: 0,
            regex_black: SmallVec::new(),
            regex_white: SmallVec::new(),
        }
    }

    /// True when no list entry can apply to this client.
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }
}

/// Per-client scopes prepared on first use.
pub(super) struct ClientScopes {
    inner: DashMap<IpAddr, Arc<ClientScope>, FxBuildHasher>,
}

impl ClientScopes {
    pub(super) fn new() -> Self {
        Self {
            inner: DashMap::with_hasher(FxBuildHasher),
        }
    }

    #[inline]
    pub(super) fn get_or_prepare(&self, ip: IpAddr, prepare: impl FnOnce() -> ClientScope) -> Arc<ClientScope> {
        if let Some(scope) = self.inner.get(&ip) {
            return Arc::clone(scope.value());
        }
        let scope = Arc::new(prepare());
        self.inner.entry(ip).or_insert(scope).value().clone()
    }

    pub(super) fn len(&self) -> usize {
        self.inner.len()
    }
}
