use crate::lists::ClientEntry;
use std::collections::HashMap;
use std::net::IpAddr;

/// Group every client belongs to when no explicit entry matches.
pub const DEFAULT_GROUP_ID: i64 = 0;

/// Resolves a client address to its group memberships.
///
/// Resolution order:
///   1. Exact address entry
///   2. Longest-prefix CIDR entry
///   3. Default group
pub struct ClientGroupResolver {
    exact: HashMap<IpAddr, Vec<i64>>,
    subnets: Vec<(ipnetwork::IpNetwork, Vec<i64>)>,
    default_groups: Vec<i64>,
}

impl ClientGroupResolver {
    /// Builds the resolver. Entries that are neither an address nor a CIDR are
    /// handed back so the caller can report them.
    pub fn new(entries: Vec<ClientEntry>) -> (Self, Vec<ClientEntry>) {
        let mut exact = HashMap::new();
        let mut subnets = Vec::new();
        let mut rejected = Vec::new();

        for entry in entries {
            if let Ok(ip) = entry.ip.parse::<IpAddr>() {
                exact.insert(ip, entry.group_ids);
            } else if let Ok(network) = entry.ip.parse::<ipnetwork::IpNetwork>() {
                subnets.push((network, entry.group_ids));
            } else {
                rejected.push(entry);
            }
        }

        let resolver = Self {
            exact,
            subnets,
            default_groups: vec![DEFAULT_GROUP_ID],
        };
        (resolver, rejected)
    }

    pub fn groups_for(&self, ip: IpAddr) -> &[i64] {
        if let Some(groups) = self.exact.get(&ip) {
            return groups;
        }

        let mut best: Option<(u8, &Vec<i64>)> = None;
        for (network, groups) in &self.subnets {
            if network.contains(ip) {
                let prefix = network.prefix();
                match best {
                    Some((existing, _)) if existing >= prefix => {}
                    _ => best = Some((prefix, groups)),
                }
            }
        }

        best.map(|(_, groups)| groups.as_slice())
            .unwrap_or(self.default_groups.as_slice())
    }
}

impl Default for ClientGroupResolver {
    fn default() -> Self {
        Self::new(Vec::new()).0
    }
}
