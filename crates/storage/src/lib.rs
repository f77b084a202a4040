//! Whole-blob persistence for the token snapshot.
//!
//! Stores only ever get or set a complete value under a key; there are no
//! partial updates.

mod error;
mod file;
mod memory;

use async_trait::async_trait;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// The key the snapshot is stored under.
pub const SNAPSHOT_KEY: &str = "tokenwatch.snapshot";

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the stored value, or `None` if nothing was ever written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the stored value.
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys() {
        assert!(validate_key(SNAPSHOT_KEY).is_ok());
        assert!(validate_key("snapshot_v2-final").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("with/slash").is_err());
    }
}
