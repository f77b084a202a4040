mod error;
mod index;
mod loader;
mod storage;
mod sweeper;

use std::path::Path;

use serde::Deserialize;

pub use error::Error;
pub use index::IndexConfig;
pub use storage::StorageConfig;
pub use sweeper::SweeperConfig;

pub(crate) type Result<T> = std::result::Result<T, error::Error>;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Limits for the token index.
    pub index: IndexConfig,
    /// Periodic retention sweeps.
    pub sweeper: SweeperConfig,
    /// Where the snapshot lives.
    pub storage: StorageConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(content: &str) -> crate::Result<Config> {
        loader::parse(content)
    }
}
