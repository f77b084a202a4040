use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
    #[error("Storage call did not complete within {0:?}")]
    Timeout(Duration),
}
