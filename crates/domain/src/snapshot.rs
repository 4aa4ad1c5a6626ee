use crate::counters::Counters;
use crate::records::{Client, Domain, OverTimeSlot, Query, Upstream};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Flat, versioned image of the whole telemetry store.
///
/// Produced by a consistent read and consumed by the startup bulk load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub taken_at: i64,
    /// Id of `queries[0]`. Ids below it have been evicted.
    pub first_query_id: usize,
    /// String pool contents, NUL separated, starting with the empty string.
    pub strings: String,
    pub queries: Vec<Query>,
    pub clients: Vec<Client>,
    pub domains: Vec<Domain>,
    pub upstreams: Vec<Upstream>,
    pub overtime: Vec<OverTimeSlot>,
    pub counters: Counters,
}
