use super::client_scope::{ClientScope, ClientScopes};
use super::decision_cache::DecisionCache;
use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use sinkhole_domain::{ClientGroupResolver, ListKind};
use smallvec::SmallVec;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// One bit per enabled group.
pub type GroupMask = u64;

/// Enabled groups beyond this many are not assigned a bit.
pub const MAX_GROUPS: usize = GroupMask::BITS as usize;

/// Which list categories matched one hop of a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HopMatch(u8);

impl HopMatch {
    pub const NONE: HopMatch = HopMatch(0);
    pub const WHITELIST: HopMatch = HopMatch(1);
    pub const BLACKLIST: HopMatch = HopMatch(1 << 1);
    pub const REGEX: HopMatch = HopMatch(1 << 2);
    pub const GRAVITY: HopMatch = HopMatch(1 << 3);

    #[inline]
    pub fn contains(self, other: HopMatch) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: HopMatch) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn is_whitelisted(self) -> bool {
        self.contains(HopMatch::WHITELIST)
    }
}

pub(super) fn mask_of(group_ids: &[i64], group_bits: &FxHashMap<i64, u8>) -> GroupMask {
    group_ids
        .iter()
        .filter_map(|g| group_bits.get(g))
        .fold(0, |mask, bit| mask | (1u64 << bit))
}

pub struct CompiledRegex {
    pub id: i64,
    pub regex: fancy_regex::Regex,
    pub mask: GroupMask,
}

/// Compiled, immutable view of every list category.
///
/// Replaced wholesale on reload. The per-client scopes and the decision
/// cache are derived from this index and die with it.
pub struct ListIndex {
    pub(super) group_bits: FxHashMap<i64, u8>,
    pub(super) client_groups: ClientGroupResolver,
    pub(super) gravity: FxHashMap<CompactString, GroupMask>,
    pub(super) blacklist: FxHashMap<CompactString, GroupMask>,
    pub(super) whitelist: FxHashMap<CompactString, GroupMask>,
    pub(super) regex_black: Vec<CompiledRegex>,
    pub(super) regex_white: Vec<CompiledRegex>,
    pub(super) audit: FxHashSet<CompactString>,
    pub(super) degraded: [bool; ListKind::COUNT],
    pub(super) scopes: ClientScopes,
    pub(super) decisions: DecisionCache,
}

impl ListIndex {
    pub fn empty() -> Self {
        Self {
            group_bits: FxHashMap::default(),
            client_groups: ClientGroupResolver::default(),
            gravity: FxHashMap::default(),
            blacklist: FxHashMap::default(),
            whitelist: FxHashMap::default(),
            regex_black: Vec::new(),
            regex_white: Vec::new(),
            audit: FxHashSet::default(),
            degraded: [false; ListKind::COUNT],
            scopes: ClientScopes::new(),
            decisions: DecisionCache::new(),
        }
    }

    pub fn mask_for_groups(&self, groups: &[i64]) -> GroupMask {
        mask_of(groups, &self.group_bits)
    }

    /// Prepares (once) and returns the lookup scope for a client.
    pub fn scope_for(&self, client: IpAddr) -> Arc<ClientScope> {
        self.scopes.get_or_prepare(client, || {
            let groups = self.client_groups.groups_for(client);
            let mask = self.mask_for_groups(groups);
            let scope = ClientScope {
                mask,
                regex_black: self.regex_client_groups(ListKind::RegexBlacklist, mask),
                regex_white: self.regex_client_groups(ListKind::RegexWhitelist, mask),
            };
            debug!(
                client = %client,
                groups = ?groups,
                regex_black = scope.regex_black.len(),
                regex_white = scope.regex_white.len(),
                "Client scope prepared"
            );
            scope
        })
    }

    /// Positions of the regex entries of `kind` that apply to `mask`.
    pub fn regex_client_groups(&self, kind: ListKind, mask: GroupMask) -> SmallVec<[u32; 8]> {
        self.regexes(kind)
            .iter()
            .enumerate()
            .filter(|(_, r)| r.mask & mask != 0)
            .map(|(i, _)| i as u32)
            .collect()
    }

    fn regexes(&self, kind: ListKind) -> &[CompiledRegex] {
        match kind {
            ListKind::RegexWhitelist => &self.regex_white,
            ListKind::RegexBlacklist => &self.regex_black,
            _ => &[],
        }
    }

    fn exact(&self, kind: ListKind) -> Option<&FxHashMap<CompactString, GroupMask>> {
        match kind {
            ListKind::Gravity => Some(&self.gravity),
            ListKind::ExactBlacklist => Some(&self.blacklist),
            ListKind::ExactWhitelist => Some(&self.whitelist),
            _ => None,
        }
    }

    /// Case-sensitive exact lookup restricted to `mask`.
    #[inline]
    pub fn in_exact(&self, kind: ListKind, domain: &str, mask: GroupMask) -> bool {
        self.exact(kind)
            .and_then(|list| list.get(domain))
            .is_some_and(|entry_mask| entry_mask & mask != 0)
    }

    /// Id of the first applicable regex of `kind` matching `domain`.
    ///
    /// A regex that fails to evaluate counts as no match.
    pub fn match_regex(&self, kind: ListKind, domain: &str, scope: &ClientScope) -> Option<i64> {
        let (regexes, positions) = match kind {
            ListKind::RegexBlacklist => (&self.regex_black, &scope.regex_black),
            ListKind::RegexWhitelist => (&self.regex_white, &scope.regex_white),
            _ => return None,
        };

        positions.iter().find_map(|&pos| {
            let entry = regexes.get(pos as usize)?;
            match entry.regex.is_match(domain) {
                Ok(true) => Some(entry.id),
                Ok(false) => None,
                Err(e) => {
                    debug!(regex_id = entry.id, domain, error = %e, "Regex evaluation failed, treated as no match");
                    None
                }
            }
        })
    }

    /// Every category matching one name for one client scope.
    pub fn hop_match(&self, name: &str, scope: &ClientScope) -> HopMatch {
        if scope.is_empty() {
            return HopMatch::NONE;
        }
        if let Some(verdict) = self.decisions.get(name, scope.mask) {
            return verdict;
        }

        let mut verdict = HopMatch::NONE;
        if self.in_exact(ListKind::ExactWhitelist, name, scope.mask)
            || self.match_regex(ListKind::RegexWhitelist, name, scope).is_some()
        {
            verdict.insert(HopMatch::WHITELIST);
        }
        if self.in_exact(ListKind::ExactBlacklist, name, scope.mask) {
            verdict.insert(HopMatch::BLACKLIST);
        }
        if self.match_regex(ListKind::RegexBlacklist, name, scope).is_some() {
            verdict.insert(HopMatch::REGEX);
        }
        if self.in_exact(ListKind::Gravity, name, scope.mask) {
            verdict.insert(HopMatch::GRAVITY);
        }

        self.decisions.set(name, scope.mask, verdict);
        verdict
    }

    pub fn in_audit_list(&self, domain: &str) -> bool {
        self.audit.contains(domain)
    }

    /// Distinct gravity domains assigned to at least one enabled group.
    pub fn gravity_size(&self) -> usize {
        self.gravity.len()
    }

    pub fn list_size(&self, kind: ListKind) -> usize {
        match kind {
            ListKind::RegexBlacklist | ListKind::RegexWhitelist => self.regexes(kind).len(),
            _ => self.exact(kind).map_or(0, |list| list.len()),
        }
    }

    pub fn is_degraded(&self, kind: ListKind) -> bool {
        self.degraded[kind.index()]
    }

    pub fn degraded_lists(&self) -> Vec<ListKind> {
        ListKind::ALL
            .into_iter()
            .filter(|k| self.is_degraded(*k))
            .collect()
    }

    pub fn enabled_groups(&self) -> usize {
        self.group_bits.len()
    }

    pub fn prepared_clients(&self) -> usize {
        self.scopes.len()
    }
}
