pub mod garbage_collection;
pub mod gravity_reload;
pub mod runner;
pub mod snapshot;

pub use garbage_collection::GarbageCollectionJob;
pub use gravity_reload::GravityReloadJob;
pub use runner::JobRunner;
pub use snapshot::SnapshotJob;
