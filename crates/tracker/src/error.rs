use index::SnapshotError;
use storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Failed to load token groups")]
    Load(#[source] LoadError),
    #[error("Failed to save token groups")]
    Save(#[source] StorageError),
    #[error("Failed to save token groups")]
    Encode(#[source] SnapshotError),
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
