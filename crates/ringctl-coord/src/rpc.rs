//! Coordinator RPC Surface (§4.6).
//!
//! Four RPC kinds the coordinator invokes on participating nodes, plus
//! the inverse pull used by followers. Grounded on the closed,
//! exhaustively-matched `MessagePayload` enum style in
//! `kimberlite-vsr::message`: every RPC has exactly one success shape
//! and one typed failure shape, and nothing here leaks partial-success
//! semantics.

use std::collections::BTreeSet;
use std::sync::Mutex;

use ringctl_types::{NodeId, RingSlice, SessionId, TopologyVersion};
use serde::{Deserialize, Serialize};

use crate::error::CoordinatorError;

/// The outcome of a single RPC invocation. No partial-success variant:
/// a `barrier` either collected every acknowledgement or it is a
/// [`RpcOutcome::Fail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RpcOutcome {
    Success,
    Fail(String),
}

impl RpcOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts a failure into the matching [`CoordinatorError`] variant
    /// for the RPC kind that produced it.
    pub fn into_barrier_result(self) -> Result<(), CoordinatorError> {
        match self {
            Self::Success => Ok(()),
            Self::Fail(reason) => Err(CoordinatorError::BarrierFailed(reason)),
        }
    }

    pub fn into_stream_result(self, target: NodeId) -> Result<(), CoordinatorError> {
        match self {
            Self::Success => Ok(()),
            Self::Fail(reason) => Err(CoordinatorError::StreamFailed(target, reason)),
        }
    }

    /// `wait_for_ip` has no dedicated error kind in §7; its failures are
    /// reported as a [`CoordinatorError::StreamFailed`] tagged `wait_for_ip`
    /// so callers can still distinguish it in logs.
    pub fn into_wait_result(self, target: NodeId) -> Result<(), CoordinatorError> {
        match self {
            Self::Success => Ok(()),
            Self::Fail(reason) => Err(CoordinatorError::StreamFailed(target, format!("wait_for_ip: {reason}"))),
        }
    }
}

/// The four RPC kinds the coordinator issues, plus the follower pull.
/// A production implementation fans these out over the cluster's wire
/// protocol, guarded by the current `topology_version` as a fencing
/// token on every call.
pub trait NodeRpc: Send + Sync {
    /// Waits until every node in `targets` has applied up to
    /// `topology_version`.
    fn barrier(
        &self,
        targets: &BTreeSet<NodeId>,
        topology_version: TopologyVersion,
    ) -> impl std::future::Future<Output = RpcOutcome> + Send;

    /// `barrier` plus: reject new data-plane operations at the old
    /// `fence_version` and wait for in-flight ones to drain.
    fn barrier_and_drain(
        &self,
        targets: &BTreeSet<NodeId>,
        topology_version: TopologyVersion,
    ) -> impl std::future::Future<Output = RpcOutcome> + Send;

    /// Instructs `target` to stream its newly assigned (join/replace) or
    /// disowned (leave/remove) ranges under `session_id`.
    fn stream_ranges(
        &self,
        target: NodeId,
        ranges: &RingSlice,
        session_id: SessionId,
    ) -> impl std::future::Future<Output = RpcOutcome> + Send;

    /// Waits until `target`'s address is known in the address map.
    fn wait_for_ip(&self, target: NodeId) -> impl std::future::Future<Output = RpcOutcome> + Send;
}

/// In-memory test double for [`NodeRpc`]. Every call succeeds unless the
/// target id is in the configured failure set, letting tests exercise
/// the coordinator's retry and rollback paths deterministically.
#[derive(Default)]
pub struct InMemoryNodeRpc {
    failing: Mutex<BTreeSet<NodeId>>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryNodeRpc {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_for(self, node_id: NodeId) -> Self {
        self.failing.lock().unwrap().insert(node_id);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn outcome_for(&self, target: NodeId, label: &str) -> RpcOutcome {
        self.calls.lock().unwrap().push(format!("{label}:{target}"));
        if self.failing.lock().unwrap().contains(&target) {
            RpcOutcome::Fail(format!("{label} injected failure for {target}"))
        } else {
            RpcOutcome::Success
        }
    }
}

impl NodeRpc for InMemoryNodeRpc {
    async fn barrier(&self, targets: &BTreeSet<NodeId>, _topology_version: TopologyVersion) -> RpcOutcome {
        for &target in targets {
            if let RpcOutcome::Fail(reason) = self.outcome_for(target, "barrier") {
                return RpcOutcome::Fail(reason);
            }
        }
        RpcOutcome::Success
    }

    async fn barrier_and_drain(
        &self,
        targets: &BTreeSet<NodeId>,
        _topology_version: TopologyVersion,
    ) -> RpcOutcome {
        for &target in targets {
            if let RpcOutcome::Fail(reason) = self.outcome_for(target, "barrier_and_drain") {
                return RpcOutcome::Fail(reason);
            }
        }
        RpcOutcome::Success
    }

    async fn stream_ranges(&self, target: NodeId, _ranges: &RingSlice, _session_id: SessionId) -> RpcOutcome {
        self.outcome_for(target, "stream_ranges")
    }

    async fn wait_for_ip(&self, target: NodeId) -> RpcOutcome {
        self.outcome_for(target, "wait_for_ip")
    }
}
