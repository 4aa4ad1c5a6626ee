pub mod overtime_clients;
pub mod overtime_history;
pub mod recent_blocked;
pub mod summary;
pub mod top_clients;
pub mod top_domains;
pub mod upstreams;

pub use overtime_clients::{ClientLabel, ClientOverTime, ClientSlot, GetOverTimeClientsUseCase};
pub use overtime_history::GetOverTimeHistoryUseCase;
pub use recent_blocked::GetRecentBlockedUseCase;
pub use summary::{GetSummaryUseCase, Summary};
pub use top_clients::{GetTopClientsUseCase, TopClient};
pub use top_domains::{GetTopDomainsUseCase, TopDomain};
pub use upstreams::{GetUpstreamsUseCase, UpstreamStat};
