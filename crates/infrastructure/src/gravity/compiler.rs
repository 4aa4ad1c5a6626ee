use super::list_index::{mask_of, CompiledRegex, GroupMask, ListIndex, MAX_GROUPS};
use compact_str::CompactString;
use rustc_hash::{FxHashMap, FxHashSet};
use sinkhole_application::ports::ListStore;
use sinkhole_domain::{ClientGroupResolver, DomainError, GroupEntry, ListEntry, ListKind};
use tracing::{debug, info, warn};

/// Backtracking budget per regex evaluation. Exceeding it is a failed
/// lookup, which classification treats as no match.
const REGEX_BACKTRACK_LIMIT: usize = 100_000;

/// Compile a fresh [`ListIndex`] from the list store.
///
/// Steps:
///   1. Load groups and assign one mask bit per enabled group (max 64)
///   2. Load client definitions into the group resolver
///   3. Load each list category; a failing category is left empty and
///      flagged degraded instead of failing the whole compile
///   4. Load the audit list (reporting only)
///
/// Failing to load groups or clients is an error: without them no scope can
/// be computed.
pub async fn compile_list_index(
    store: &dyn ListStore,
    regex_ignore_case: bool,
) -> Result<ListIndex, DomainError> {
    let mut index = ListIndex::empty();

    // ------------------------------------------------------------------
    // 1. Groups
    // ------------------------------------------------------------------
    let groups = store.load_groups().await?;
    index.group_bits = assign_group_bits(&groups);

    // ------------------------------------------------------------------
    // 2. Clients
    // ------------------------------------------------------------------
    let clients = store.load_clients().await?;
    let (resolver, rejected) = ClientGroupResolver::new(clients);
    for entry in &rejected {
        warn!(client_id = entry.id, ip = %entry.ip, "Client is neither an address nor a subnet, ignored");
    }
    index.client_groups = resolver;

    // ------------------------------------------------------------------
    // 3. List categories
    // ------------------------------------------------------------------
    for kind in ListKind::ALL {
        let entries = match store.load_list(kind).await {
            Ok(entries) => entries,
            Err(e) => {
                index.degraded[kind.index()] = true;
                debug!(list = %kind, error = %e, "List category failed to load");
                continue;
            }
        };

        match kind {
            ListKind::Gravity => index.gravity = build_exact(&entries, &index.group_bits),
            ListKind::ExactBlacklist => index.blacklist = build_exact(&entries, &index.group_bits),
            ListKind::ExactWhitelist => index.whitelist = build_exact(&entries, &index.group_bits),
            ListKind::RegexBlacklist => {
                index.regex_black = build_regex(&entries, &index.group_bits, regex_ignore_case)
            }
            ListKind::RegexWhitelist => {
                index.regex_white = build_regex(&entries, &index.group_bits, regex_ignore_case)
            }
        }
    }

    // ------------------------------------------------------------------
    // 4. Audit list
    // ------------------------------------------------------------------
    match store.load_audit_list().await {
        Ok(domains) => {
            index.audit = domains
                .iter()
                .map(|d| CompactString::from(d.as_ref()))
                .collect::<FxHashSet<_>>();
        }
        Err(e) => warn!(error = %e, "Audit list unavailable, top lists are not filtered"),
    }

    info!(
        groups = index.enabled_groups(),
        gravity = index.list_size(ListKind::Gravity),
        blacklist = index.list_size(ListKind::ExactBlacklist),
        whitelist = index.list_size(ListKind::ExactWhitelist),
        regex_blacklist = index.list_size(ListKind::RegexBlacklist),
        regex_whitelist = index.list_size(ListKind::RegexWhitelist),
        audit = index.audit.len(),
        "List index compiled"
    );

    Ok(index)
}

/// Enabled groups in id order get bits 0..64.
fn assign_group_bits(groups: &[GroupEntry]) -> FxHashMap<i64, u8> {
    let mut enabled: Vec<i64> = groups.iter().filter(|g| g.enabled).map(|g| g.id).collect();
    enabled.sort_unstable();
    enabled.dedup();

    if enabled.len() > MAX_GROUPS {
        warn!(
            count = enabled.len(),
            max = MAX_GROUPS,
            "Too many enabled groups; entries of the extra groups never apply"
        );
    }

    enabled
        .into_iter()
        .take(MAX_GROUPS)
        .enumerate()
        .map(|(bit, id)| (id, bit as u8))
        .collect()
}

/// Entries with no enabled group are dropped. Duplicate values merge masks.
fn build_exact(
    entries: &[ListEntry],
    group_bits: &FxHashMap<i64, u8>,
) -> FxHashMap<CompactString, GroupMask> {
    let mut map: FxHashMap<CompactString, GroupMask> = FxHashMap::default();
    map.reserve(entries.len());
    for entry in entries {
        let mask = mask_of(&entry.group_ids, group_bits);
        if mask == 0 {
            continue;
        }
        *map.entry(CompactString::from(entry.value.as_ref())).or_insert(0) |= mask;
    }
    map
}

/// Invalid patterns are skipped with a warning.
fn build_regex(
    entries: &[ListEntry],
    group_bits: &FxHashMap<i64, u8>,
    ignore_case: bool,
) -> Vec<CompiledRegex> {
    let mut compiled = Vec::with_capacity(entries.len());
    for entry in entries {
        let mask = mask_of(&entry.group_ids, group_bits);
        if mask == 0 {
            continue;
        }
        match compile_regex(&entry.value, ignore_case) {
            Ok(regex) => compiled.push(CompiledRegex {
                id: entry.id,
                regex,
                mask,
            }),
            Err(e) => warn!(regex_id = entry.id, error = %e, "Skipping invalid regex"),
        }
    }
    compiled
}

fn compile_regex(pattern: &str, ignore_case: bool) -> Result<fancy_regex::Regex, DomainError> {
    fancy_regex::RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .backtrack_limit(REGEX_BACKTRACK_LIMIT)
        .build()
        .map_err(|e| DomainError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}
