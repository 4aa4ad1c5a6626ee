pub mod json_snapshot_repository;
pub mod sqlite_list_store;

pub use json_snapshot_repository::JsonSnapshotRepository;
pub use sqlite_list_store::SqliteListStore;
