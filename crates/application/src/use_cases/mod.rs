pub mod collect_garbage;
pub mod queries;
pub mod record_query;
pub mod snapshots;
pub mod stats;

pub use collect_garbage::CollectGarbageUseCase;
pub use queries::{GetRecentQueriesUseCase, QueryView};
pub use record_query::{RecordOutcome, RecordQueryUseCase};
pub use snapshots::{RestoreSnapshotUseCase, SaveSnapshotUseCase};
pub use stats::{
    ClientLabel, ClientOverTime, ClientSlot, GetOverTimeClientsUseCase, GetOverTimeHistoryUseCase,
    GetRecentBlockedUseCase, GetSummaryUseCase, GetTopClientsUseCase, GetTopDomainsUseCase,
    GetUpstreamsUseCase, Summary, TopClient, TopDomain, UpstreamStat,
};
