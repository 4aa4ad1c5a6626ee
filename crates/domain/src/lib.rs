//! Sinkhole Domain Layer
pub mod client_groups;
pub mod config;
pub mod counters;
pub mod errors;
pub mod lists;
pub mod query;
pub mod query_filter;
pub mod records;
pub mod snapshot;
pub mod validators;

pub use client_groups::{ClientGroupResolver, DEFAULT_GROUP_ID};
pub use config::{Config, ConfigError, GravityConfig, LoggingConfig, SnapshotConfig, TelemetryConfig};
pub use counters::Counters;
pub use errors::DomainError;
pub use lists::{ClientEntry, GroupEntry, ListEntry, ListKind};
pub use query::{
    DnssecStatus, PrivacyLevel, QueryStatus, QueryType, ReplyType, ResolvedQuery,
    ResolverOutcome, HIDDEN_CLIENT, HIDDEN_DOMAIN,
};
pub use query_filter::QueryFilter;
pub use records::{
    Client, ClientId, Domain, DomainId, OverTimeSlot, Query, QueryId, Record, StringHandle,
    TableKind, Upstream, UpstreamId, MAGIC_BYTE,
};
pub use snapshot::{StoreSnapshot, SNAPSHOT_VERSION};
