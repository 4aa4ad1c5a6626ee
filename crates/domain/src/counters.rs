use crate::query::{QueryStatus, QueryType, ReplyType};
use crate::records::Query;
use serde::{Deserialize, Serialize};

/// Process-wide aggregate scalars.
///
/// Every field is the sum of the matching per-entity field over the live
/// query window; they are only ever changed together with the entity tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Counters {
    pub queries: u64,
    pub blocked: u64,
    pub cached: u64,
    pub forwarded: u64,
    pub unknown: u64,
    pub clients: u64,
    pub domains: u64,
    pub upstreams: u64,
    /// Size of the compiled gravity list, set by the classification engine.
    pub gravity: u64,
    pub query_types: [u64; QueryType::COUNT],
    pub reply_types: [u64; ReplyType::COUNT],
    pub statuses: [u64; QueryStatus::COUNT],
}

impl Counters {
    pub fn count_query(&mut self, query: &Query) {
        self.queries += 1;
        self.query_types[query.query_type.index()] += 1;
        self.reply_types[query.reply.index()] += 1;
        self.statuses[query.status.index()] += 1;
        match query.status {
            QueryStatus::Forwarded => self.forwarded += 1,
            QueryStatus::Cached => self.cached += 1,
            QueryStatus::Unknown => self.unknown += 1,
            _ => {}
        }
        if query.status.is_blocked() {
            self.blocked += 1;
        }
    }

    pub fn uncount_query(&mut self, query: &Query) {
        self.queries = self.queries.saturating_sub(1);
        dec(&mut self.query_types[query.query_type.index()]);
        dec(&mut self.reply_types[query.reply.index()]);
        dec(&mut self.statuses[query.status.index()]);
        match query.status {
            QueryStatus::Forwarded => dec(&mut self.forwarded),
            QueryStatus::Cached => dec(&mut self.cached),
            QueryStatus::Unknown => dec(&mut self.unknown),
            _ => {}
        }
        if query.status.is_blocked() {
            dec(&mut self.blocked);
        }
    }

    pub fn percent_blocked(&self) -> f64 {
        if self.queries == 0 {
            return 0.0;
        }
        100.0 * self.blocked as f64 / self.queries as f64
    }

    pub fn query_type_count(&self, query_type: QueryType) -> u64 {
        self.query_types[query_type.index()]
    }

    pub fn status_count(&self, status: QueryStatus) -> u64 {
        self.statuses[status.index()]
    }

    pub fn reply_count(&self, reply: ReplyType) -> u64 {
        self.reply_types[reply.index()]
    }
}

fn dec(value: &mut u64) {
    *value = value.saturating_sub(1);
}
