use async_trait::async_trait;
use sinkhole_application::ports::SnapshotRepository;
use sinkhole_domain::{DomainError, StoreSnapshot};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

/// Stores the snapshot as one JSON document.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a reader never sees a half-written snapshot.
pub struct JsonSnapshotRepository {
    path: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

fn io_error(context: &str, path: &Path, e: std::io::Error) -> DomainError {
    error!(path = %path.display(), error = %e, "{}", context);
    DomainError::IoError(format!("{} {}: {}", context, path.display(), e))
}

#[async_trait]
impl SnapshotRepository for JsonSnapshotRepository {
    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    async fn save(&self, snapshot: &StoreSnapshot) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(snapshot)
            .map_err(|e| DomainError::InvalidInput(format!("snapshot serialization failed: {}", e)))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| io_error("Failed to write snapshot", &temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| io_error("Failed to replace snapshot", &self.path, e))?;

        debug!(bytes = bytes.len(), queries = snapshot.queries.len(), "Snapshot written");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Option<StoreSnapshot>, DomainError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("Failed to read snapshot", &self.path, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| DomainError::SnapshotRejected(format!("unreadable snapshot: {}", e)))
    }
}
