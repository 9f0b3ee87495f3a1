//! Walker Configuration
//!
//! Settings for [`DependencyWalker`](super::DependencyWalker). The struct is
//! deserializable so an embedding application can keep it in its own config
//! file; every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between "still waiting" diagnostics.
pub const DEFAULT_HEARTBEAT_MS: u64 = 5_000;

/// What a vertex does when one of its dependencies failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamFailure {
    /// Run the callback anyway once every dependency has finished.
    #[default]
    Run,
    /// Skip the callback. The vertex still completes so its own dependents
    /// are released, and they are skipped in turn.
    Skip,
}

/// Dependency walker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Milliseconds a dependency watcher waits on a single dependency before
    /// logging that it is still waiting. `0` turns the diagnostic off.
    pub heartbeat_ms: u64,

    /// Policy for dependents of a failed vertex.
    pub upstream_failure: UpstreamFailure,
}

impl WalkerConfig {
    /// Heartbeat interval, or `None` when disabled.
    pub fn heartbeat(&self) -> Option<Duration> {
        (self.heartbeat_ms > 0).then(|| Duration::from_millis(self.heartbeat_ms))
    }

    /// Set the heartbeat interval. A zero duration disables it.
    pub fn with_heartbeat(mut self, interval: Duration) -> Self {
        self.heartbeat_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the upstream failure policy.
    pub fn with_upstream_failure(mut self, policy: UpstreamFailure) -> Self {
        self.upstream_failure = policy;
        self
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            heartbeat_ms: DEFAULT_HEARTBEAT_MS,
            upstream_failure: UpstreamFailure::default(),
        }
    }
}
