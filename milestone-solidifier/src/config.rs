use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning of the solidification worker. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolidificationConfig {
    /// candidates probed on every tick
    pub queue_size: usize,

    /// pause between the end of a tick and the start of the next one
    pub interval_ms: u64,

    /// transactions a single probe may visit; a count, not a time limit
    pub max_transactions: usize,

    /// minimum pause between two progress messages
    pub status_log_interval_ms: u64,
}

impl SolidificationConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn status_log_interval(&self) -> Duration {
        Duration::from_millis(self.status_log_interval_ms)
    }
}

impl Default for SolidificationConfig {
    fn default() -> Self {
        Self {
            queue_size: 2,
            interval_ms: 5000,
            max_transactions: 50_000,
            status_log_interval_ms: 10_000,
        }
    }
}
