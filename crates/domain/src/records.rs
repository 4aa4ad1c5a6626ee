use crate::query::{DnssecStatus, PrivacyLevel, QueryStatus, QueryType, ReplyType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integrity tag written into every live record.
pub const MAGIC_BYTE: u8 = 0x57;

/// Stable reference into the string pool. Offsets survive pool reallocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StringHandle(u32);

impl StringHandle {
    /// Offset zero always resolves to the empty string.
    pub const EMPTY: StringHandle = StringHandle(0);

    pub fn new(offset: u32) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> usize {
        self.0 as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

macro_rules! record_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub usize);

        impl From<usize> for $name {
            fn from(id: usize) -> Self {
                Self(id)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(QueryId);
record_id!(ClientId);
record_id!(DomainId);
record_id!(UpstreamId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    Queries,
    Clients,
    Domains,
    Upstreams,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Queries => "query",
            TableKind::Clients => "client",
            TableKind::Domains => "domain",
            TableKind::Upstreams => "upstream",
        };
        f.write_str(name)
    }
}

/// A fixed-shape record living in one of the entity tables.
pub trait Record {
    type Id: Copy + From<usize> + Into<usize>;

    const TABLE: TableKind;

    fn magic(&self) -> u8;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub magic: u8,
    pub timestamp: i64,
    pub query_type: QueryType,
    pub status: QueryStatus,
    pub domain: DomainId,
    pub client: ClientId,
    /// Only set for forwarded queries.
    pub upstream: Option<UpstreamId>,
    pub dnssec: DnssecStatus,
    pub reply: ReplyType,
    pub response_time_us: u64,
    pub privacy_level: PrivacyLevel,
    /// Start of the OverTime slot this query was counted in, if any.
    pub overtime_slot: Option<i64>,
}

impl Record for Query {
    type Id = QueryId;
    const TABLE: TableKind = TableKind::Queries;

    fn magic(&self) -> u8 {
        self.magic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub magic: u8,
    pub ip: StringHandle,
    pub name: Option<StringHandle>,
    pub count: u64,
    pub blocked_count: u64,
    /// Per-slot counts, index-aligned with the global OverTime window.
    pub overtime: Vec<u64>,
}

impl Client {
    pub fn new(ip: StringHandle, name: Option<StringHandle>, slots: usize) -> Self {
        Self {
            magic: MAGIC_BYTE,
            ip,
            name,
            count: 0,
            blocked_count: 0,
            overtime: vec![0; slots],
        }
    }
}

impl Record for Client {
    type Id = ClientId;
    const TABLE: TableKind = TableKind::Clients;

    fn magic(&self) -> u8 {
        self.magic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub magic: u8,
    pub name: StringHandle,
    pub count: u64,
    pub blocked_count: u64,
}

impl Domain {
    pub fn new(name: StringHandle) -> Self {
        Self {
            magic: MAGIC_BYTE,
            name,
            count: 0,
            blocked_count: 0,
        }
    }

    pub fn permitted_count(&self) -> u64 {
        self.count.saturating_sub(self.blocked_count)
    }
}

impl Record for Domain {
    type Id = DomainId;
    const TABLE: TableKind = TableKind::Domains;

    fn magic(&self) -> u8 {
        self.magic
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upstream {
    pub magic: u8,
    pub ip: StringHandle,
    pub name: Option<StringHandle>,
    /// Forwarded queries inside the retention window.
    pub count: u64,
    /// Lifetime number of timed responses.
    pub responses: u64,
    pub response_time_total_us: u64,
    /// Welford running mean (milliseconds).
    pub rt_mean_ms: f64,
    /// Welford sum of squared deviations (milliseconds squared).
    pub rt_m2: f64,
}

impl Upstream {
    pub fn new(ip: StringHandle, name: Option<StringHandle>) -> Self {
        Self {
            magic: MAGIC_BYTE,
            ip,
            name,
            count: 0,
            responses: 0,
            response_time_total_us: 0,
            rt_mean_ms: 0.0,
            rt_m2: 0.0,
        }
    }

    pub fn record_response(&mut self, response_time_us: u64) {
        self.responses += 1;
        self.response_time_total_us = self.response_time_total_us.saturating_add(response_time_us);

        let sample = response_time_us as f64 / 1000.0;
        let delta = sample - self.rt_mean_ms;
        self.rt_mean_ms += delta / self.responses as f64;
        self.rt_m2 += delta * (sample - self.rt_mean_ms);
    }

    pub fn average_response_ms(&self) -> f64 {
        if self.responses == 0 {
            return 0.0;
        }
        self.response_time_total_us as f64 / 1000.0 / self.responses as f64
    }

    /// Standard uncertainty of the mean response time.
    pub fn response_uncertainty_ms(&self) -> f64 {
        if self.responses < 2 {
            return 0.0;
        }
        let n = self.responses as f64;
        (self.rt_m2 / (n - 1.0) / n).sqrt()
    }
}

impl Record for Upstream {
    type Id = UpstreamId;
    const TABLE: TableKind = TableKind::Upstreams;

    fn magic(&self) -> u8 {
        self.magic
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverTimeSlot {
    /// Unix seconds at which the slot starts.
    pub timestamp: i64,
    pub total: u64,
    pub blocked: u64,
}

impl OverTimeSlot {
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            total: 0,
            blocked: 0,
        }
    }
}
