//! Match configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables shared by every session in a registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Upper bound on live sessions. `create` fails with
    /// `RegistryFull` once reached.
    pub max_sessions: usize,

    /// Capacity of each session's command mailbox.
    pub channel_size: usize,

    /// Bound on every single catalog or directory call made while a
    /// transition holds the session.
    pub adapter_timeout: Duration,

    /// How long a completed session stays readable before the reaper
    /// may evict it.
    pub eviction_grace: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            channel_size: 64,
            adapter_timeout: Duration::from_secs(5),
            eviction_grace: Duration::from_secs(60),
        }
    }
}
