//! Command log entries: the committed, replicated instructions the
//! [`crate::applier`] applies deterministically to the [`crate::Topology`].
//!
//! Each variant corresponds to exactly one of the entry kinds enumerated
//! for the Command Log Applier. The consensus layer guarantees these
//! arrive in commit order; the applier never reorders or batches them
//! beyond what [`apply_committed`](crate::applier::apply_committed) does
//! for a single entry.

use ringctl_types::{
    CdcGenerationId, CleanupStatus, Datacenter, FeatureSet, NodeId, NodeState, Rack, RequestId,
    RequestKind, RingSlice, SessionId, TransitionState,
};
use serde::{Deserialize, Serialize};

use crate::request::RequestParam;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    /// A node has joined consensus and is waiting for the coordinator to
    /// start driving it; added to `new_nodes` with `NodeState::None`.
    AddNewNode {
        id: NodeId,
        datacenter: Datacenter,
        rack: Rack,
        release_version: String,
        shard_count: u32,
        partitioner_tuning: i32,
        supported_features: FeatureSet,
    },

    /// Enqueues a per-node request (replace/join/remove/leave/rebuild).
    SetRequest {
        id: NodeId,
        request_id: RequestId,
        kind: RequestKind,
        param: RequestParam,
    },

    /// Enqueues a cluster-wide request (`new_cdc_generation`/`cleanup`).
    SetGlobalRequest(ringctl_types::GlobalRequest),

    /// Clears the current global request (it has fully retired).
    ClearGlobalRequest,

    /// Advances the cluster's current transition state.
    AdvanceTransition(TransitionState),

    /// Clears the current transition state (the in-flight operation has
    /// fully retired — there is no more work driving it).
    ClearTransition,

    /// Promotes a node from `new_nodes`/`transition_nodes` into
    /// `normal_nodes`, installing its ring ownership and clearing its
    /// request/req_param.
    PromoteToNormal { id: NodeId, ring: RingSlice },

    /// Moves a node into `transition_nodes` under a new per-node state
    /// (e.g. `None` → `Bootstrapping`, `Normal` → `Decommissioning`).
    MoveToTransition { id: NodeId, state: NodeState },

    /// Returns a node in `transition_nodes` directly to `normal_nodes`,
    /// restoring `NodeState::Normal` without touching its existing ring
    /// (its ring ownership was never actually handed over). Used to
    /// abort a `leave`/`remove` before `left_token_ring`.
    RollbackToNormal { id: NodeId },

    /// Commits a new CDC generation: installs it as
    /// `current_cdc_generation_id` and pushes it onto
    /// `unpublished_cdc_generations`.
    CommitCdcGeneration { id: CdcGenerationId },

    /// Records the in-flight generation-data id while a new generation
    /// is being written, before it is committed.
    SetInFlightCdcGenerationData { id: CdcGenerationId },

    /// Drops the in-flight generation-data id (the write failed and is
    /// being retried, or it was just committed).
    ClearInFlightCdcGenerationData,

    /// Marks generations up to and including `through` as published
    /// (observed by all normal nodes); removes them from
    /// `unpublished_cdc_generations`.
    PublishCdcGenerationsThrough { through: CdcGenerationId },

    SetEnabledFeatures(FeatureSet),

    SetSessionId(SessionId),

    /// Removes a node from every live collection and tombstones its id
    /// into `left_nodes`. Clears its request/req_param as a side effect
    /// (the node can never return to `normal`).
    DeleteNode { id: NodeId },

    /// Advances `fence_version` to the current `version`. Does not by
    /// itself advance `version` beyond the usual per-entry bump.
    BumpFenceVersion,

    SetCleanupStatus { id: NodeId, status: CleanupStatus },

    SetTabletBalancingEnabled(bool),
}
