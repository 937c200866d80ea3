//! Coordinator-visible error kinds (§7 Error Handling Design).
//!
//! These are the wire- and log-visible error kinds. The Applier itself
//! never surfaces errors (see `ringctl_model`'s fatal-abort contract);
//! everything here is either a retryable RPC failure absorbed by the
//! coordinator's own retry loop, or a terminal failure recorded against
//! a `topology_requests` row.

use ringctl_types::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Fencing token older than the callee's `fence_version`; caller must
    /// refresh its view and retry.
    #[error("stale topology: presented token is behind the current fence_version")]
    StaleTopology,

    /// RPC submitted to a non-leader coordinator.
    #[error("not the current leader; redirect to the elected coordinator")]
    NotLeader,

    /// Attempt to enqueue a request while the topology cannot accept it.
    #[error("topology is busy with another operation")]
    Busy,

    /// Malformed request parameters (e.g. `replace` naming a node that
    /// does not exist).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A `stream_ranges` RPC failed; retried by the coordinator with
    /// backoff as long as the operation remains valid.
    #[error("stream_ranges failed for node {0}: {1}")]
    StreamFailed(NodeId, String),

    /// A `barrier`/`barrier_and_drain` RPC failed or timed out against
    /// at least one of its targets.
    #[error("barrier failed: {0}")]
    BarrierFailed(String),

    /// The operation was aborted and the node returned to its prior
    /// steady state (e.g. `rollback_to_normal`).
    #[error("operation on {0} was rolled back: {1}")]
    RolledBack(NodeId, String),

    /// An invariant was violated while applying a committed entry, or
    /// another unrecoverable condition was hit; the process should
    /// terminate rather than continue with undefined state.
    #[error("fatal coordinator error: {0}")]
    Fatal(String),
}

impl CoordinatorError {
    /// True for errors the coordinator's own retry loop should retry
    /// with backoff rather than surface immediately to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StreamFailed(..) | Self::BarrierFailed(..)
        )
    }
}
