use serde::Deserialize;

/// Limits applied to the token index.
///
/// These are the only two tunables of the index itself. A snapshot that was
/// saved with its own values overrides them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Maximum number of credential groups kept; the oldest inserted are dropped first.
    pub max_token_groups: usize,
    /// Requests older than this are pruned, and groups idle for longer are evicted.
    pub retention_hours: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_token_groups: 100,
            retention_hours: 24.0,
        }
    }
}
