use std::time::Duration;

use duration_str::deserialize_duration;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweeperConfig {
    /// Time between retention sweeps. A sweep also runs once at startup.
    #[serde(deserialize_with = "deserialize_duration")]
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}
