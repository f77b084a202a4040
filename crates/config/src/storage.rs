use std::{path::PathBuf, time::Duration};

use duration_str::deserialize_duration;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the snapshot file.
    pub path: PathBuf,
    /// Upper bound for a single read or write of the snapshot.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tokenwatch-data"),
            timeout: Duration::from_secs(5),
        }
    }
}
