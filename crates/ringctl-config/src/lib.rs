//! Configuration management for the ring topology coordinator.
//!
//! Hierarchical configuration loading from multiple sources, highest
//! precedence first:
//!
//! 1. Environment variables (`RINGCTL_*`)
//! 2. `ringctl.local.toml` (gitignored, local overrides)
//! 3. `ringctl.toml` (git-tracked, project config)
//! 4. `~/.config/ringctl/config.toml` (user defaults)
//! 5. Built-in defaults (lowest precedence)

use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Top-level configuration for one replica's topology coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub node: NodeConfig,
    pub timeouts: TimeoutConfig,
    /// Initial value for `Topology::tablet_balancing_enabled` on a fresh
    /// cluster; ignored once the cluster has a committed topology.
    pub tablet_balancing_enabled: bool,
}

/// Placement and addressing for this node. `listen_address` is consumed
/// by the gossip/RPC collaborators this crate calls through — it is
/// never dialed directly here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub datacenter: String,
    pub rack: String,
    pub listen_address: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            datacenter: "dc1".to_string(),
            rack: "rack1".to_string(),
            listen_address: "127.0.0.1:7000".to_string(),
        }
    }
}

/// Bounded-wait and RPC deadlines (§5 Concurrency & Resource Model).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// How long the Fencing Registry waits for the Applier to catch up to
    /// a fencing token that is ahead of the locally applied `version`.
    pub fencing_apply_wait_ms: u64,
    /// Deadline for a single `barrier`/`barrier_and_drain` round.
    pub barrier_timeout_ms: u64,
    /// Deadline applied to every coordinator-issued RPC before it is
    /// considered failed and retried with backoff.
    pub rpc_deadline_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            fencing_apply_wait_ms: 5_000,
            barrier_timeout_ms: 30_000,
            rpc_deadline_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_self_consistent() {
        let cfg = TopologyConfig::default();
        assert!(!cfg.tablet_balancing_enabled);
        assert!(cfg.timeouts.fencing_apply_wait_ms > 0);
        assert!(cfg.timeouts.barrier_timeout_ms >= cfg.timeouts.fencing_apply_wait_ms);
    }
}
