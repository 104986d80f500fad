//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! incremental = false             # One changed file per build cycle
//! debounce_ms = 300               # Quiet period before a batch is released
//! full_rebuild_on_unknown = true  # Unindexed files trigger a full rebuild
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Process one changed file per build cycle.
    pub incremental: bool,

    /// Debounce window in milliseconds.
    pub debounce_ms: u64,

    /// Treat files missing from the dependency map as "assume relevant".
    pub full_rebuild_on_unknown: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            incremental: false,
            debounce_ms: 300,
            full_rebuild_on_unknown: true,
        }
    }
}

impl WatchConfig {
    pub fn validate(&self, errors: &mut Vec<String>) {
        if self.debounce_ms == 0 {
            errors.push("[watch.debounce_ms] must be greater than 0".to_string());
        }
    }
}
