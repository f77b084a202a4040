use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;

use crate::{SnapshotStore, StorageError};

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

#[async_trait]
impl SnapshotStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        crate::validate_key(key)?;

        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_owned(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        crate::validate_key(key)?;

        let write_error = |source| StorageError::Write {
            key: key.to_owned(),
            source,
        };

        tokio::fs::create_dir_all(&self.directory).await.map_err(write_error)?;

        let target = self.path_for(key);
        let staging = self.directory.join(format!(".{key}.json.tmp"));

        tokio::fs::write(&staging, value).await.map_err(write_error)?;
        tokio::fs::rename(&staging, &target).await.map_err(write_error)?;

        log::trace!("Wrote {}", target.display());

        Ok(())
    }
}
