//! # ringctl-types: Core types for the ring topology coordinator
//!
//! Shared types used by every layer of the topology state machine:
//! - Node identity ([`NodeId`]) and placement ([`Datacenter`], [`Rack`])
//! - Versioning ([`TopologyVersion`], [`FenceVersion`])
//! - Ring ownership ([`Token`], [`RingSlice`])
//! - Closed enumerations ([`NodeState`], `TransitionState`, `RequestKind`)
//! - Opaque ids minted without a wire dependency ([`CdcGenerationId`], [`RequestId`], [`SessionId`])
//!
//! This crate has no I/O and no async runtime dependency; it is pure data.

use std::collections::BTreeSet;
use std::fmt::{self, Debug, Display};

use serde::{Deserialize, Serialize};

mod ids;
mod token;

pub use ids::{CdcGenerationId, RequestId, SessionId, ID_LENGTH};
pub use token::{RingSlice, Token};

/// Unique identifier for a node, assigned when it first joins consensus.
///
/// Stable for the node's lifetime, including across `left` tombstoning —
/// ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Monotonic topology version, stamped onto every committed topology
/// change and carried by data-plane RPCs as a fencing token.
///
/// Value `0` is reserved for callers that opt out of fencing (legacy or
/// bootstrapping callers); such callers are always accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct TopologyVersion(u64);

impl TopologyVersion {
    pub const ZERO: Self = Self(0);
    /// Sentinel meaning "caller opted out of fencing".
    pub const OPT_OUT: Self = Self(0);

    pub fn new(v: u64) -> Self {
        Self(v)
    }

    /// Returns true if this token means "no fencing requested".
    pub fn is_opt_out(self) -> bool {
        self.0 == 0
    }

    /// Returns the next version after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for TopologyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// The minimum [`TopologyVersion`] a data-plane RPC must present to be
/// accepted by a replica. Always `fence_version <= version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct FenceVersion(u64);

impl FenceVersion {
    pub const ZERO: Self = Self(0);

    pub fn new(v: u64) -> Self {
        Self(v)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for FenceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

impl PartialEq<FenceVersion> for TopologyVersion {
    fn eq(&self, other: &FenceVersion) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd<FenceVersion> for TopologyVersion {
    fn partial_cmp(&self, other: &FenceVersion) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// A datacenter name, e.g. `"us-east-1"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Datacenter(String);

impl Datacenter {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Datacenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rack name within a datacenter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rack(String);

impl Rack {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Rack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single cluster feature flag, e.g. `"TABLETS"` or `"VIEW_BUILD_RANGE"`.
pub type FeatureFlag = String;

/// A set of cluster feature flags a node supports (or the cluster has
/// enabled).
pub type FeatureSet = BTreeSet<FeatureFlag>;

/// Per-node state in the ring lifecycle.
///
/// Closed enumeration; every match over `NodeState` in this codebase is
/// total — adding a variant here is a deliberate, compile-checked decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeState {
    /// Joined consensus, holds no data yet.
    None,
    Bootstrapping,
    Decommissioning,
    Removing,
    Replacing,
    Rebuilding,
    Normal,
    Left,
    RollbackToNormal,
}

impl NodeState {
    pub fn is_normal(self) -> bool {
        matches!(self, Self::Normal)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::Left)
    }

    /// True for the states the coordinator drives as part of an in-flight
    /// per-node operation (i.e. the node sits in `transition_nodes`).
    pub fn is_in_transition(self) -> bool {
        matches!(
            self,
            Self::Bootstrapping
                | Self::Decommissioning
                | Self::Removing
                | Self::Replacing
                | Self::Rebuilding
                | Self::RollbackToNormal
        )
    }
}

impl Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Bootstrapping => "bootstrapping",
            Self::Decommissioning => "decommissioning",
            Self::Removing => "removing",
            Self::Replacing => "replacing",
            Self::Rebuilding => "rebuilding",
            Self::Normal => "normal",
            Self::Left => "left",
            Self::RollbackToNormal => "rollback_to_normal",
        };
        write!(f, "{s}")
    }
}

/// The cluster-wide transition state while a reconfiguration is in
/// progress. `None` at the `Topology` level means no reconfiguration is
/// in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionState {
    JoinGroup0,
    CommitCdcGeneration,
    TabletDraining,
    WriteBothReadOld,
    WriteBothReadNew,
    TabletMigration,
    LeftTokenRing,
}

impl Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::JoinGroup0 => "join_group0",
            Self::CommitCdcGeneration => "commit_cdc_generation",
            Self::TabletDraining => "tablet_draining",
            Self::WriteBothReadOld => "write_both_read_old",
            Self::WriteBothReadNew => "write_both_read_new",
            Self::TabletMigration => "tablet_migration",
            Self::LeftTokenRing => "left_token_ring",
        };
        write!(f, "{s}")
    }
}

/// Per-node request kind. Priority order when several are pending
/// simultaneously is `Replace > Join > Remove > Leave > Rebuild` — this
/// ordering is documented upstream as minimizing subsequent cleanup work
/// and is preserved verbatim rather than re-derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    Replace,
    Join,
    Remove,
    Leave,
    Rebuild,
}

impl RequestKind {
    /// Lower number sorts first: this is the coordinator's pick order,
    /// not a general-purpose `Ord` (ties across nodes are broken by
    /// [`NodeId`] order, not by this rank).
    pub fn priority_rank(self) -> u8 {
        match self {
            Self::Replace => 0,
            Self::Join => 1,
            Self::Remove => 2,
            Self::Leave => 3,
            Self::Rebuild => 4,
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Replace => "replace",
            Self::Join => "join",
            Self::Remove => "remove",
            Self::Leave => "leave",
            Self::Rebuild => "rebuild",
        };
        write!(f, "{s}")
    }
}

/// A cluster-wide reconfiguration not tied to a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlobalRequest {
    NewCdcGeneration,
    Cleanup,
}

impl Display for GlobalRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NewCdcGeneration => "new_cdc_generation",
            Self::Cleanup => "cleanup",
        };
        write!(f, "{s}")
    }
}

/// Per-node cleanup status tracked during a cluster-wide `cleanup`
/// global request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CleanupStatus {
    Clean,
    Needed,
    Running,
}

impl Display for CleanupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Clean => "clean",
            Self::Needed => "needed",
            Self::Running => "running",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_version_compares_against_topology_version() {
        let v = TopologyVersion::new(10);
        let f = FenceVersion::new(9);
        assert!(v > f);
        assert!(FenceVersion::new(10) == v);
    }

    #[test]
    fn request_kind_priority_matches_replace_join_remove_leave_rebuild() {
        let mut kinds = vec![
            RequestKind::Rebuild,
            RequestKind::Leave,
            RequestKind::Replace,
            RequestKind::Remove,
            RequestKind::Join,
        ];
        kinds.sort_by_key(|k| k.priority_rank());
        assert_eq!(
            kinds,
            vec![
                RequestKind::Replace,
                RequestKind::Join,
                RequestKind::Remove,
                RequestKind::Leave,
                RequestKind::Rebuild,
            ]
        );
    }

    #[test]
    fn node_id_roundtrips_through_u64() {
        let id = NodeId::new(42);
        assert_eq!(u64::from(id), 42);
        assert_eq!(NodeId::from(42u64), id);
    }
}
