pub mod restore;
pub mod save;

pub use restore::RestoreSnapshotUseCase;
pub use save::SaveSnapshotUseCase;
