use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;

/// Stored in place of the domain name when privacy hides domains.
pub const HIDDEN_DOMAIN: &str = "hidden";

/// Stored in place of the client address when privacy hides clients.
pub const HIDDEN_CLIENT: &str = "0.0.0.0";

/// DNS query types tracked by the telemetry store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryType {
    A,
    Aaaa,
    Any,
    Srv,
    Soa,
    Ptr,
    Txt,
    Naptr,
}

impl QueryType {
    pub const COUNT: usize = 8;

    pub const ALL: [QueryType; Self::COUNT] = [
        QueryType::A,
        QueryType::Aaaa,
        QueryType::Any,
        QueryType::Srv,
        QueryType::Soa,
        QueryType::Ptr,
        QueryType::Txt,
        QueryType::Naptr,
    ];

    /// Position in the per-type histogram.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::A => "A",
            QueryType::Aaaa => "AAAA",
            QueryType::Any => "ANY",
            QueryType::Srv => "SRV",
            QueryType::Soa => "SOA",
            QueryType::Ptr => "PTR",
            QueryType::Txt => "TXT",
            QueryType::Naptr => "NAPTR",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }

    /// Maps an RR type code from the wire to a tracked type.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(QueryType::A),
            28 => Some(QueryType::Aaaa),
            255 => Some(QueryType::Any),
            33 => Some(QueryType::Srv),
            6 => Some(QueryType::Soa),
            12 => Some(QueryType::Ptr),
            16 => Some(QueryType::Txt),
            35 => Some(QueryType::Naptr),
            _ => None,
        }
    }
}

/// Terminal classification of a query. Assigned once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryStatus {
    Unknown,
    Gravity,
    Forwarded,
    Cached,
    Regex,
    Blacklist,
    ExternalBlockedIp,
    ExternalBlockedNull,
    ExternalBlockedNxra,
    GravityCname,
    RegexCname,
    BlacklistCname,
}

impl QueryStatus {
    pub const COUNT: usize = 12;

    pub const ALL: [QueryStatus; Self::COUNT] = [
        QueryStatus::Unknown,
        QueryStatus::Gravity,
        QueryStatus::Forwarded,
        QueryStatus::Cached,
        QueryStatus::Regex,
        QueryStatus::Blacklist,
        QueryStatus::ExternalBlockedIp,
        QueryStatus::ExternalBlockedNull,
        QueryStatus::ExternalBlockedNxra,
        QueryStatus::GravityCname,
        QueryStatus::RegexCname,
        QueryStatus::BlacklistCname,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_blocked(&self) -> bool {
        !matches!(
            self,
            QueryStatus::Unknown | QueryStatus::Forwarded | QueryStatus::Cached
        )
    }

    /// True for outcomes decided by a CNAME hop rather than the queried name.
    pub fn is_cname(&self) -> bool {
        matches!(
            self,
            QueryStatus::GravityCname | QueryStatus::RegexCname | QueryStatus::BlacklistCname
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Unknown => "unknown",
            QueryStatus::Gravity => "gravity",
            QueryStatus::Forwarded => "forwarded",
            QueryStatus::Cached => "cached",
            QueryStatus::Regex => "regex",
            QueryStatus::Blacklist => "blacklist",
            QueryStatus::ExternalBlockedIp => "external_blocked_ip",
            QueryStatus::ExternalBlockedNull => "external_blocked_null",
            QueryStatus::ExternalBlockedNxra => "external_blocked_nxra",
            QueryStatus::GravityCname => "gravity_cname",
            QueryStatus::RegexCname => "regex_cname",
            QueryStatus::BlacklistCname => "blacklist_cname",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|st| st.as_str() == s)
    }
}

impl Default for QueryStatus {
    fn default() -> Self {
        QueryStatus::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DnssecStatus {
    #[default]
    Unspecified,
    Secure,
    Insecure,
    Bogus,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReplyType {
    #[default]
    Unknown,
    NoData,
    NxDomain,
    Cname,
    Ip,
    Domain,
    RrName,
    ServFail,
    Refused,
    NotImp,
    Other,
}

impl ReplyType {
    pub const COUNT: usize = 11;

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReplyType::Unknown => "UNKNOWN",
            ReplyType::NoData => "NODATA",
            ReplyType::NxDomain => "NXDOMAIN",
            ReplyType::Cname => "CNAME",
            ReplyType::Ip => "IP",
            ReplyType::Domain => "DOMAIN",
            ReplyType::RrName => "RRNAME",
            ReplyType::ServFail => "SERVFAIL",
            ReplyType::Refused => "REFUSED",
            ReplyType::NotImp => "NOTIMP",
            ReplyType::Other => "OTHER",
        }
    }
}

/// Redaction tier applied when a query is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum PrivacyLevel {
    #[default]
    ShowAll,
    HideDomains,
    HideDomainsClients,
    Maximum,
    NoStats,
}

impl PrivacyLevel {
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(PrivacyLevel::ShowAll),
            1 => Some(PrivacyLevel::HideDomains),
            2 => Some(PrivacyLevel::HideDomainsClients),
            3 => Some(PrivacyLevel::Maximum),
            4 => Some(PrivacyLevel::NoStats),
            _ => None,
        }
    }

    pub fn hides_domains(&self) -> bool {
        *self >= PrivacyLevel::HideDomains
    }

    pub fn hides_clients(&self) -> bool {
        *self >= PrivacyLevel::HideDomainsClients
    }
}

/// What the resolver did with a query that was not blocked locally.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverOutcome {
    Unknown,
    Forwarded {
        upstream_ip: IpAddr,
        upstream_name: Option<Arc<str>>,
    },
    Cached,
    ExternalBlockedIp,
    ExternalBlockedNull,
    ExternalBlockedNxra,
}

impl ResolverOutcome {
    pub fn status(&self) -> QueryStatus {
        match self {
            ResolverOutcome::Unknown => QueryStatus::Unknown,
            ResolverOutcome::Forwarded { .. } => QueryStatus::Forwarded,
            ResolverOutcome::Cached => QueryStatus::Cached,
            ResolverOutcome::ExternalBlockedIp => QueryStatus::ExternalBlockedIp,
            ResolverOutcome::ExternalBlockedNull => QueryStatus::ExternalBlockedNull,
            ResolverOutcome::ExternalBlockedNxra => QueryStatus::ExternalBlockedNxra,
        }
    }
}

/// A completed query as delivered by the resolver, once per query.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    /// Unix seconds at which the query arrived.
    pub timestamp: i64,
    pub domain: Arc<str>,
    /// CNAME targets in resolution order, excluding the queried name.
    pub cname_chain: Arc<[Arc<str>]>,
    pub client_ip: IpAddr,
    pub client_name: Option<Arc<str>>,
    pub query_type: QueryType,
    pub outcome: ResolverOutcome,
    pub response_time_us: u64,
    pub dnssec: DnssecStatus,
    pub reply: ReplyType,
}

impl ResolvedQuery {
    pub fn new(timestamp: i64, domain: &str, client_ip: IpAddr, outcome: ResolverOutcome) -> Self {
        Self {
            timestamp,
            domain: Arc::from(domain),
            cname_chain: Arc::from(Vec::<Arc<str>>::new()),
            client_ip,
            client_name: None,
            query_type: QueryType::A,
            outcome,
            response_time_us: 0,
            dnssec: DnssecStatus::Unspecified,
            reply: ReplyType::Unknown,
        }
    }

    pub fn with_cname_chain(mut self, chain: &[&str]) -> Self {
        self.cname_chain = chain.iter().map(|c| Arc::from(*c)).collect();
        self
    }

    pub fn with_query_type(mut self, query_type: QueryType) -> Self {
        self.query_type = query_type;
        self
    }

    pub fn with_reply(mut self, reply: ReplyType, response_time_us: u64) -> Self {
        self.reply = reply;
        self.response_time_us = response_time_us;
        self
    }

    pub fn with_client_name(mut self, name: &str) -> Self {
        self.client_name = Some(Arc::from(name));
        self
    }

    pub fn with_dnssec(mut self, dnssec: DnssecStatus) -> Self {
        self.dnssec = dnssec;
        self
    }
}
