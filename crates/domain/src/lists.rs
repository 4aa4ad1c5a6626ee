use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The five list categories of the gravity database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    Gravity,
    ExactBlacklist,
    ExactWhitelist,
    RegexBlacklist,
    RegexWhitelist,
}

impl ListKind {
    pub const COUNT: usize = 5;

    pub const ALL: [ListKind; Self::COUNT] = [
        ListKind::Gravity,
        ListKind::ExactBlacklist,
        ListKind::ExactWhitelist,
        ListKind::RegexBlacklist,
        ListKind::RegexWhitelist,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, ListKind::RegexBlacklist | ListKind::RegexWhitelist)
    }

    pub fn is_whitelist(&self) -> bool {
        matches!(self, ListKind::ExactWhitelist | ListKind::RegexWhitelist)
    }

    /// `domainlist.type` value, `None` for the gravity table.
    pub fn domainlist_type(&self) -> Option<i64> {
        match self {
            ListKind::Gravity => None,
            ListKind::ExactWhitelist => Some(0),
            ListKind::ExactBlacklist => Some(1),
            ListKind::RegexWhitelist => Some(2),
            ListKind::RegexBlacklist => Some(3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Gravity => "gravity",
            ListKind::ExactBlacklist => "exact_blacklist",
            ListKind::ExactWhitelist => "exact_whitelist",
            ListKind::RegexBlacklist => "regex_blacklist",
            ListKind::RegexWhitelist => "regex_whitelist",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One enabled list row: a domain or a regex pattern plus the groups it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: i64,
    pub value: Arc<str>,
    pub group_ids: Vec<i64>,
}

impl ListEntry {
    pub fn new(id: i64, value: &str, group_ids: Vec<i64>) -> Self {
        Self {
            id,
            value: Arc::from(value),
            group_ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub id: i64,
    pub enabled: bool,
    pub name: Arc<str>,
}

/// A configured client: an address or a CIDR subnet plus its group memberships.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEntry {
    pub id: i64,
    pub ip: Arc<str>,
    pub group_ids: Vec<i64>,
}
