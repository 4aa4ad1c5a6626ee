pub mod telemetry;

pub use telemetry::{EvictionReport, StoreInner, TelemetryStore};
