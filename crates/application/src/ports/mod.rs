pub mod classification;
pub mod list_store;
pub mod snapshot_repository;

pub use classification::ClassificationPort;
pub use list_store::ListStore;
pub use snapshot_repository::SnapshotRepository;
