//! In-memory telemetry store: entity tables, string pool, OverTime window
//! and aggregate counters behind one reader/writer lock.

mod integrity;
mod overtime;
mod snapshot;
mod store;
mod string_pool;
mod table;

pub use overtime::OverTime;
pub use store::{EvictionReport, StoreInner, TelemetryStore};
pub use string_pool::StringPool;
pub use table::Table;
