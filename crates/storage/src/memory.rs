use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{SnapshotStore, StorageError};

/// Keeps values in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        crate::validate_key(key)?;
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        crate::validate_key(key)?;
        self.values.lock().await.insert(key.to_owned(), value);
        Ok(())
    }
}
