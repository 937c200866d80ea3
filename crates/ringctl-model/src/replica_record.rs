//! Per-node replica record: everything the topology knows about one node
//! other than which collection it currently lives in.

use ringctl_types::{
    CleanupStatus, Datacenter, FeatureSet, NodeState, Rack, RequestId, RingSlice,
};
use serde::{Deserialize, Serialize};

/// State carried for every node in `new_nodes`, `transition_nodes`, or
/// `normal_nodes`. Nodes in `left_nodes` retain nothing beyond their id
/// (see [`crate::topology::Topology::left_nodes`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaRecord {
    pub state: NodeState,
    pub datacenter: Datacenter,
    pub rack: Rack,
    pub release_version: String,
    /// Tokens owned on the ring. Populated only once the node is
    /// `normal`.
    pub ring: Option<RingSlice>,
    pub shard_count: u32,
    pub partitioner_tuning: i32,
    pub supported_features: FeatureSet,
    pub cleanup_status: CleanupStatus,
    /// The request currently driving this node, or the last one that
    /// did, if none is active right now.
    pub driving_request: Option<RequestId>,
}

impl ReplicaRecord {
    /// Constructs the record for a node that has just joined consensus:
    /// `state = None`, no ring, clean cleanup status.
    pub fn new_joining(
        datacenter: Datacenter,
        rack: Rack,
        release_version: String,
        shard_count: u32,
        partitioner_tuning: i32,
        supported_features: FeatureSet,
    ) -> Self {
        Self {
            state: NodeState::None,
            datacenter,
            rack,
            release_version,
            ring: None,
            shard_count,
            partitioner_tuning,
            supported_features,
            cleanup_status: CleanupStatus::Clean,
            driving_request: None,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: NodeState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn with_ring(mut self, ring: RingSlice) -> Self {
        self.ring = Some(ring);
        self
    }

    #[must_use]
    pub fn with_driving_request(mut self, request: RequestId) -> Self {
        self.driving_request = Some(request);
        self
    }

    #[must_use]
    pub fn with_cleanup_status(mut self, status: CleanupStatus) -> Self {
        self.cleanup_status = status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_joining_has_no_ring_and_clean_cleanup() {
        let record = ReplicaRecord::new_joining(
            Datacenter::new("dc1"),
            Rack::new("r1"),
            "2026.1.0".to_string(),
            8,
            1200,
            FeatureSet::new(),
        );
        assert_eq!(record.state, NodeState::None);
        assert!(record.ring.is_none());
        assert_eq!(record.cleanup_status, CleanupStatus::Clean);
    }
}
