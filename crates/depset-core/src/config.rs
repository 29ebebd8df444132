//! Engine tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-fetch timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default per-file manifest read timeout in seconds.
pub const DEFAULT_PARSE_TIMEOUT_SECS: u64 = 30;

/// Default number of descriptor fetches in flight per breadth-first level.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Limits applied to external calls made by a session.
///
/// Deserializes from the `[engine]` table of a configuration file; every key
/// is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds before a descriptor fetch counts as failed.
    pub fetch_timeout_secs: u64,
    /// Seconds before a manifest read counts as failed.
    pub parse_timeout_secs: u64,
    /// Upper bound on concurrent fetches within one level.
    pub max_concurrent_fetches: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            parse_timeout_secs: DEFAULT_PARSE_TIMEOUT_SECS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
        }
    }
}

impl EngineConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn parse_timeout(&self) -> Duration {
        Duration::from_secs(self.parse_timeout_secs)
    }

    /// Concurrency limit, never below one.
    pub fn fetch_concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }
}
