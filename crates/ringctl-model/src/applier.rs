//! The command log applier: deterministically applies one committed
//! entry to a [`Topology`], producing a new `Topology`.
//!
//! # Contract
//!
//! - Pure: `apply_committed(topology, entry) -> topology'`. No I/O, no
//!   clocks, no randomness.
//! - Strictly monotonic: `version` advances on every call.
//! - Infallible in the `Result` sense: an entry that would violate an
//!   invariant from the data model is a programming bug in the caller
//!   (the consensus layer must never deliver a malformed or unordered
//!   entry), so it aborts via `panic!`/`assert!` rather than returning an
//!   error — exactly like the postcondition asserts in a pure kernel
//!   `apply_committed` function.
//! - The caller (the imperative shell owning the replica's lifecycle
//!   object) is responsible for signalling its "entry applied" condition
//!   variable after each call so that coordinator and fencing waiters can
//!   rewake; this module has no async runtime dependency and does not do
//!   that itself.

use ringctl_types::FeatureSet;

use crate::entry::LogEntry;
use crate::replica_record::ReplicaRecord;
use crate::topology::Topology;

/// Applies one committed log entry, returning the updated topology.
///
/// # Panics
///
/// Panics if `entry` would violate a data-model invariant — e.g.
/// promoting a node that is not in `new_nodes`/`transition_nodes`, or
/// committing a CDC generation while not in `commit_cdc_generation`. Such
/// an entry can only reach this function if the consensus layer delivered
/// something the coordinator never proposed, which is a fatal bug.
#[allow(clippy::too_many_lines)]
pub fn apply_committed(mut topology: Topology, entry: LogEntry) -> Topology {
    let previous_version = topology.version();
    let is_rollback = matches!(entry, LogEntry::RollbackToNormal { .. });
    topology.bump_version();

    match entry {
        LogEntry::AddNewNode {
            id,
            datacenter,
            rack,
            release_version,
            shard_count,
            partitioner_tuning,
            supported_features,
        } => {
            assert!(
                !topology.contains(id),
                "AddNewNode: {id} already present in topology"
            );
            let record = ReplicaRecord::new_joining(
                datacenter,
                rack,
                release_version,
                shard_count,
                partitioner_tuning,
                supported_features,
            );
            topology.insert_new_node(id, record);
        }

        LogEntry::SetRequest {
            id,
            request_id,
            kind,
            param,
        } => {
            assert!(
                topology.contains(id) || kind == ringctl_types::RequestKind::Join,
                "SetRequest: {id} must already be known to the topology unless joining"
            );
            topology.set_request(id, kind, param);
            topology.set_driving_request(id, request_id);
        }

        LogEntry::SetGlobalRequest(request) => {
            assert!(
                topology.global_request().is_none(),
                "SetGlobalRequest: a global request is already pending"
            );
            topology.set_global_request(request);
        }

        LogEntry::ClearGlobalRequest => {
            topology.clear_global_request();
        }

        LogEntry::AdvanceTransition(state) => {
            topology.advance_transition(state);
        }

        LogEntry::ClearTransition => {
            topology.clear_transition();
        }

        LogEntry::PromoteToNormal { id, ring } => {
            topology.promote_to_normal(id, ring);
        }

        LogEntry::MoveToTransition { id, state } => {
            topology.move_to_transition(id, state);
        }

        LogEntry::RollbackToNormal { id } => {
            topology.rollback_to_normal(id);
        }

        LogEntry::CommitCdcGeneration { id } => {
            assert_eq!(
                topology.tstate(),
                Some(ringctl_types::TransitionState::CommitCdcGeneration),
                "CommitCdcGeneration entry applied outside commit_cdc_generation"
            );
            topology.commit_cdc_generation(id);
        }

        LogEntry::SetInFlightCdcGenerationData { id } => {
            topology.set_in_flight_cdc_generation_data(id);
        }

        LogEntry::ClearInFlightCdcGenerationData => {
            topology.clear_in_flight_cdc_generation_data();
        }

        LogEntry::PublishCdcGenerationsThrough { through } => {
            topology.publish_cdc_generations_through(through);
        }

        LogEntry::SetEnabledFeatures(features) => {
            let supported_by_all: FeatureSet = topology
                .not_yet_enabled_features()
                .union(topology.enabled_features())
                .cloned()
                .collect();
            assert!(
                features.is_subset(&supported_by_all),
                "SetEnabledFeatures: cannot enable a feature no normal node supports"
            );
            topology.set_enabled_features(features);
        }

        LogEntry::SetSessionId(session_id) => {
            topology.set_session_id(session_id);
        }

        LogEntry::DeleteNode { id } => {
            assert!(
                topology.contains(id),
                "DeleteNode: {id} is not known to the topology"
            );
            topology.delete_node(id);
        }

        LogEntry::BumpFenceVersion => {
            topology.bump_fence_version();
        }

        LogEntry::SetCleanupStatus { id, status } => {
            topology.set_cleanup_status(id, status);
        }

        LogEntry::SetTabletBalancingEnabled(enabled) => {
            topology.set_tablet_balancing_enabled(enabled);
        }
    }

    ringctl_properties::always!(
        topology.version() > previous_version,
        "command log version is strictly monotonic",
    );
    debug_assert!(
        topology.check_invariants().is_ok(),
        "invariant violated after applying entry: {:?}",
        topology.check_invariants()
    );
    ringctl_properties::sometimes!(is_rollback, "a leave/remove was rolled back to normal");

    topology
}

/// Applies a sequence of committed entries in order. Equivalent to
/// folding [`apply_committed`] over `entries`; used by snapshot-then-
/// entries recovery and by tests exercising whole scenarios (S1-S6).
pub fn apply_committed_batch(topology: Topology, entries: impl IntoIterator<Item = LogEntry>) -> Topology {
    entries.into_iter().fold(topology, apply_committed)
}


#[cfg(test)]
mod invariant_properties {
    use proptest::prelude::*;

    use super::*;
    use ringctl_types::{Datacenter, NodeId, Rack, RingSlice, Token};

    fn add_node(id: u64) -> LogEntry {
        LogEntry::AddNewNode {
            id: NodeId::new(id),
            datacenter: Datacenter::new("dc1"),
            rack: Rack::new("r1"),
            release_version: "2026.1".into(),
            shard_count: 8,
            partitioner_tuning: 1200,
            supported_features: FeatureSet::new(),
        }
    }

    proptest! {
        /// Distinct ids can be added in any order: version is strictly
        /// monotonic across the batch and every id ends up present, no
        /// matter how the adds are interleaved.
        #[test]
        fn adding_distinct_nodes_in_any_order_is_monotonic(
            mut ids in prop::collection::hash_set(1u64..1000, 1..12),
            shuffle in prop::collection::vec(any::<u8>(), 0..12),
        ) {
            let mut order: Vec<u64> = ids.drain().collect();
            // deterministic pseudo-shuffle keyed by the generated bytes
            order.sort_by_key(|&id| shuffle.get(id as usize % shuffle.len().max(1)).copied().unwrap_or(0));

            let mut topology = Topology::genesis();
            let mut previous_version = topology.version().get();
            for &id in &order {
                topology = apply_committed(topology, add_node(id));
                prop_assert_eq!(topology.version().get(), previous_version + 1);
                previous_version = topology.version().get();
                prop_assert!(topology.check_invariants().is_ok());
            }
            for &id in &order {
                prop_assert!(topology.find(NodeId::new(id)).is_some());
            }
            prop_assert_eq!(topology.size(), order.len());
        }

        /// Add-then-promote for a single node, for any ring slice: the
        /// node ends up normal with exactly that ring, its request is
        /// cleared, and `fence_version` never outruns `version`.
        #[test]
        fn add_then_promote_installs_the_given_ring(
            id in 1u64..1000,
            tokens in prop::collection::vec(any::<i64>(), 0..8),
        ) {
            let ring = RingSlice::new(tokens.iter().copied().map(Token::new));
            let topology = Topology::genesis();
            let topology = apply_committed(topology, add_node(id));
            let topology = apply_committed(
                topology,
                LogEntry::PromoteToNormal { id: NodeId::new(id), ring: ring.clone() },
            );

            prop_assert_eq!(topology.version().get(), 2);
            prop_assert!(topology.fence_version().get() <= topology.version().get());
            prop_assert!(topology.check_invariants().is_ok());
            let record = topology.normal_nodes().get(&NodeId::new(id)).unwrap();
            prop_assert_eq!(&record.ring, &Some(ring));
            prop_assert!(topology.req_param(NodeId::new(id)).is_none());
        }
    }
}
