//! The topology model: pure data plus query operations.
//!
//! All mutation is `pub(crate)`, reachable only through
//! [`crate::applier::apply_committed`]. Every other component — the
//! coordinator, the fencing registry, the request prioritizer — reads
//! through the public query API on this page and never mutates directly.

use std::collections::{BTreeMap, BTreeSet};

use ringctl_types::{
    CdcGenerationId, FeatureSet, GlobalRequest, NodeId, RequestKind, SessionId, TopologyVersion,
};
use serde::{Deserialize, Serialize};

use crate::replica_record::ReplicaRecord;
use crate::request::RequestParam;
use ringctl_types::FenceVersion;
use ringctl_types::TransitionState;

/// The singleton replicated root: one instance per replica, kept
/// identical across the cluster by the consensus log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    tstate: Option<TransitionState>,
    version: TopologyVersion,
    fence_version: FenceVersion,

    normal_nodes: BTreeMap<NodeId, ReplicaRecord>,
    new_nodes: BTreeMap<NodeId, ReplicaRecord>,
    transition_nodes: BTreeMap<NodeId, ReplicaRecord>,
    left_nodes: BTreeSet<NodeId>,

    requests: BTreeMap<NodeId, RequestKind>,
    req_param: BTreeMap<NodeId, RequestParam>,

    global_request: Option<GlobalRequest>,

    current_cdc_generation_id: Option<CdcGenerationId>,
    new_cdc_generation_data_id: Option<CdcGenerationId>,
    unpublished_cdc_generations: Vec<CdcGenerationId>,

    enabled_features: FeatureSet,
    session_id: Option<SessionId>,
    tablet_balancing_enabled: bool,
}

impl Default for Topology {
    fn default() -> Self {
        Self::genesis()
    }
}

impl Topology {
    /// The empty cluster: no nodes, no transition, version 0.
    pub fn genesis() -> Self {
        Self {
            tstate: None,
            version: TopologyVersion::ZERO,
            fence_version: FenceVersion::ZERO,
            normal_nodes: BTreeMap::new(),
            new_nodes: BTreeMap::new(),
            transition_nodes: BTreeMap::new(),
            left_nodes: BTreeSet::new(),
            requests: BTreeMap::new(),
            req_param: BTreeMap::new(),
            global_request: None,
            current_cdc_generation_id: None,
            new_cdc_generation_data_id: None,
            unpublished_cdc_generations: Vec::new(),
            enabled_features: FeatureSet::new(),
            session_id: None,
            tablet_balancing_enabled: false,
        }
    }

    // ========================================================================
    // Queries (§4.1)
    // ========================================================================

    /// Returns the replica record for `id`, if it is in any non-left
    /// collection.
    pub fn find(&self, id: NodeId) -> Option<&ReplicaRecord> {
        self.normal_nodes
            .get(&id)
            .or_else(|| self.new_nodes.get(&id))
            .or_else(|| self.transition_nodes.get(&id))
    }

    /// True if `id` appears anywhere, including `left_nodes`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some() || self.left_nodes.contains(&id)
    }

    /// Count of non-left nodes.
    pub fn size(&self) -> usize {
        self.normal_nodes.len() + self.new_nodes.len() + self.transition_nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// True iff a reconfiguration is in progress: a transition state is
    /// set, a node is mid-operation, or a global request is pending. The
    /// coordinator refuses to begin a new operation while busy.
    pub fn is_busy(&self) -> bool {
        self.tstate.is_some() || !self.transition_nodes.is_empty() || self.global_request.is_some()
    }

    /// Nodes an in-flight barrier must not wait for: dead nodes being
    /// removed/replaced, plus any `ignored_ids` declared with their
    /// request.
    pub fn excluded_nodes(&self) -> BTreeSet<NodeId> {
        let mut excluded = BTreeSet::new();
        for (&id, param) in &self.req_param {
            match param {
                RequestParam::Remove { ignored_ids } => {
                    excluded.insert(id);
                    excluded.extend(ignored_ids.iter().copied());
                }
                RequestParam::Replace {
                    replaced_id,
                    ignored_ids,
                } => {
                    excluded.insert(*replaced_id);
                    excluded.extend(ignored_ids.iter().copied());
                }
                RequestParam::Join { .. } | RequestParam::Rebuild { .. } | RequestParam::Leave => {}
            }
        }
        excluded
    }

    /// `(⋂ normal.supported_features) \ enabled_features`: features every
    /// normal node can speak but the cluster has not yet turned on.
    pub fn not_yet_enabled_features(&self) -> FeatureSet {
        let intersection = self.supported_feature_intersection();
        intersection
            .difference(&self.enabled_features)
            .cloned()
            .collect()
    }

    fn supported_feature_intersection(&self) -> FeatureSet {
        let mut nodes = self.normal_nodes.values();
        let Some(first) = nodes.next() else {
            return FeatureSet::new();
        };
        let mut acc = first.supported_features.clone();
        for node in nodes {
            acc = acc
                .intersection(&node.supported_features)
                .cloned()
                .collect();
        }
        acc
    }

    pub fn tstate(&self) -> Option<TransitionState> {
        self.tstate
    }

    pub fn version(&self) -> TopologyVersion {
        self.version
    }

    pub fn fence_version(&self) -> FenceVersion {
        self.fence_version
    }

    pub fn normal_nodes(&self) -> &BTreeMap<NodeId, ReplicaRecord> {
        &self.normal_nodes
    }

    pub fn new_nodes(&self) -> &BTreeMap<NodeId, ReplicaRecord> {
        &self.new_nodes
    }

    pub fn transition_nodes(&self) -> &BTreeMap<NodeId, ReplicaRecord> {
        &self.transition_nodes
    }

    pub fn left_nodes(&self) -> &BTreeSet<NodeId> {
        &self.left_nodes
    }

    pub fn requests(&self) -> &BTreeMap<NodeId, RequestKind> {
        &self.requests
    }

    pub fn req_param(&self, id: NodeId) -> Option<&RequestParam> {
        self.req_param.get(&id)
    }

    pub fn global_request(&self) -> Option<GlobalRequest> {
        self.global_request
    }

    pub fn current_cdc_generation_id(&self) -> Option<CdcGenerationId> {
        self.current_cdc_generation_id
    }

    pub fn new_cdc_generation_data_id(&self) -> Option<CdcGenerationId> {
        self.new_cdc_generation_data_id
    }

    pub fn unpublished_cdc_generations(&self) -> &[CdcGenerationId] {
        &self.unpublished_cdc_generations
    }

    pub fn enabled_features(&self) -> &FeatureSet {
        &self.enabled_features
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id
    }

    pub fn tablet_balancing_enabled(&self) -> bool {
        self.tablet_balancing_enabled
    }

    /// Checks every invariant from the data model section, returning the
    /// first one that fails. Used by property tests and by the applier's
    /// safety-net assertions; never called from a non-test, non-debug hot
    /// path in a way that could mask a real bug.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        let mut seen = BTreeSet::new();
        for &id in self
            .normal_nodes
            .keys()
            .chain(self.new_nodes.keys())
            .chain(self.transition_nodes.keys())
        {
            if !seen.insert(id) {
                return Err("node id appears in more than one non-left collection");
            }
        }
        for &id in &self.left_nodes {
            if seen.contains(&id) {
                return Err("node id appears in left_nodes and a live collection");
            }
        }

        if self.tstate == Some(TransitionState::CommitCdcGeneration)
            && self.new_cdc_generation_data_id.is_none()
        {
            return Err("commit_cdc_generation requires an in-flight generation data id");
        }

        let supported_intersection = self.supported_feature_intersection();
        if !self.enabled_features.is_subset(&supported_intersection) {
            return Err("enabled_features must be a subset of every normal node's supported set");
        }

        if self.fence_version > self.version {
            return Err("fence_version must never exceed version");
        }

        for node in self.normal_nodes.values() {
            if node.ring.is_none() {
                return Err("a normal node must have a ring slice");
            }
        }

        for (&id, _) in &self.requests {
            if !self.req_param.contains_key(&id) {
                return Err("every pending request must have a matching req_param");
            }
        }

        Ok(())
    }

    // ========================================================================
    // Mutations — pub(crate), reachable only via the applier.
    // ========================================================================

    pub(crate) fn bump_version(&mut self) {
        self.version = self.version.next();
    }

    pub(crate) fn insert_new_node(&mut self, id: NodeId, record: ReplicaRecord) {
        self.new_nodes.insert(id, record);
    }

    pub(crate) fn set_request(&mut self, id: NodeId, kind: RequestKind, param: RequestParam) {
        self.requests.insert(id, kind);
        self.req_param.insert(id, param);
    }

    /// Stamps the request id currently driving `id`, if the node already
    /// has a replica record (a brand-new `join` may not yet — its
    /// `AddNewNode` entry lands separately).
    pub(crate) fn set_driving_request(&mut self, id: NodeId, request_id: ringctl_types::RequestId) {
        if let Some(record) = self
            .normal_nodes
            .get_mut(&id)
            .or_else(|| self.new_nodes.get_mut(&id))
            .or_else(|| self.transition_nodes.get_mut(&id))
        {
            record.driving_request = Some(request_id);
        }
    }

    pub(crate) fn clear_request(&mut self, id: NodeId) {
        self.requests.remove(&id);
        self.req_param.remove(&id);
    }

    pub(crate) fn set_global_request(&mut self, request: GlobalRequest) {
        self.global_request = Some(request);
    }

    pub(crate) fn clear_global_request(&mut self) {
        self.global_request = None;
    }

    pub(crate) fn advance_transition(&mut self, state: TransitionState) {
        self.tstate = Some(state);
    }

    pub(crate) fn clear_transition(&mut self) {
        self.tstate = None;
    }

    /// Moves `id` out of `new_nodes`/`transition_nodes` into
    /// `normal_nodes`, installing its ring and clearing its request.
    pub(crate) fn promote_to_normal(&mut self, id: NodeId, ring: ringctl_types::RingSlice) {
        let mut record = self
            .transition_nodes
            .remove(&id)
            .or_else(|| self.new_nodes.remove(&id))
            .expect("promote_to_normal: node must be in new_nodes or transition_nodes");
        record.state = ringctl_types::NodeState::Normal;
        record.ring = Some(ring);
        self.normal_nodes.insert(id, record);
        self.clear_request(id);
    }

    /// Moves `id` into `transition_nodes` under `state`, coming from
    /// either `new_nodes` (bootstrapping/replacing start) or
    /// `normal_nodes` (decommissioning/removing/rebuilding/rollback
    /// start) or `transition_nodes` itself (an in-place state change,
    /// e.g. `decommissioning` → `rollback_to_normal`).
    pub(crate) fn move_to_transition(&mut self, id: NodeId, state: ringctl_types::NodeState) {
        let mut record = self
            .new_nodes
            .remove(&id)
            .or_else(|| self.normal_nodes.remove(&id))
            .or_else(|| self.transition_nodes.remove(&id))
            .expect("move_to_transition: node must exist in a live collection");
        record.state = state;
        self.transition_nodes.insert(id, record);
    }

    /// Rolls a node in `transition_nodes` back to `normal_nodes`,
    /// restoring it to `Normal` state without touching its ring (ring
    /// ownership was never actually handed over).
    pub(crate) fn rollback_to_normal(&mut self, id: NodeId) {
        let mut record = self
            .transition_nodes
            .remove(&id)
            .expect("rollback_to_normal: node must be in transition_nodes");
        record.state = ringctl_types::NodeState::Normal;
        self.normal_nodes.insert(id, record);
        self.clear_request(id);
    }

    pub(crate) fn commit_cdc_generation(&mut self, id: CdcGenerationId) {
        self.current_cdc_generation_id = Some(id);
        self.unpublished_cdc_generations.push(id);
        self.new_cdc_generation_data_id = None;
    }

    pub(crate) fn set_in_flight_cdc_generation_data(&mut self, id: CdcGenerationId) {
        self.new_cdc_generation_data_id = Some(id);
    }

    pub(crate) fn clear_in_flight_cdc_generation_data(&mut self) {
        self.new_cdc_generation_data_id = None;
    }

    pub(crate) fn publish_cdc_generations_through(&mut self, through: CdcGenerationId) {
        if let Some(pos) = self.unpublished_cdc_generations.iter().position(|g| *g == through) {
            self.unpublished_cdc_generations.drain(0..=pos);
        }
    }

    pub(crate) fn set_enabled_features(&mut self, features: FeatureSet) {
        self.enabled_features = features;
    }

    pub(crate) fn set_session_id(&mut self, session_id: SessionId) {
        self.session_id = Some(session_id);
    }

    /// Removes `id` from every live collection and tombstones it.
    pub(crate) fn delete_node(&mut self, id: NodeId) {
        self.normal_nodes.remove(&id);
        self.new_nodes.remove(&id);
        self.transition_nodes.remove(&id);
        self.left_nodes.insert(id);
        self.clear_request(id);
    }

    pub(crate) fn bump_fence_version(&mut self) {
        self.fence_version = FenceVersion::new(self.version.get());
    }

    pub(crate) fn set_cleanup_status(&mut self, id: NodeId, status: ringctl_types::CleanupStatus) {
        if let Some(record) = self.normal_nodes.get_mut(&id) {
            record.cleanup_status = status;
        }
    }

    pub(crate) fn set_tablet_balancing_enabled(&mut self, enabled: bool) {
        self.tablet_balancing_enabled = enabled;
    }
}
