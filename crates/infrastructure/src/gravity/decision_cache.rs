use super::list_index::{GroupMask, HopMatch};
use compact_str::CompactString;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::time::{Duration, Instant};
use tracing::debug;

const TTL: Duration = Duration::from_secs(60);
const DEFAULT_CAPACITY: usize = 65_536;

/// Shared cache of per-hop list verdicts keyed by `(name, client mask)`.
///
/// Two clients with the same group mask see exactly the same entries, so the
/// mask is a complete key. Owned by one [`super::ListIndex`] and dropped with it.
///
/// Bounded by `capacity`: a full cache first drops expired entries, then
/// starts over if every entry is still fresh.
pub struct DecisionCache {
    inner: DashMap<(CompactString, GroupMask), (HopMatch, Instant), FxBuildHasher>,
    capacity: usize,
}

impl DecisionCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DashMap::with_hasher(FxBuildHasher),
            capacity: capacity.max(1),
        }
    }

    #[inline]
    pub fn get(&self, name: &str, mask: GroupMask) -> Option<HopMatch> {
        let key = (CompactString::new(name), mask);
        if let Some(entry) = self.inner.get(&key) {
            let (verdict, inserted_at) = *entry;
            if inserted_at.elapsed() < TTL {
                return Some(verdict);
            }
            drop(entry);
            self.inner.remove(&key);
        }
        None
    }

    #[inline]
    pub fn set(&self, name: &str, mask: GroupMask, verdict: HopMatch) {
        if self.inner.len() >= self.capacity {
            self.make_room();
        }
        self.inner
            .insert((CompactString::new(name), mask), (verdict, Instant::now()));
    }

    fn make_room(&self) {
        self.inner.retain(|_, (_, inserted_at)| inserted_at.elapsed() < TTL);
        if self.inner.len() >= self.capacity {
            debug!(entries = self.inner.len(), "Decision cache full, clearing");
            self.inner.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new()
    }
}
