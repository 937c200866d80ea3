//! Request Queue & Prioritizer (§4.4).
//!
//! Queued state lives directly on [`Topology`] (`requests`/`req_param`/
//! `global_request`) so that it is replicated for free. This module adds
//! the validation performed before a request is accepted, and the
//! selection rule the coordinator uses when idle.

use ringctl_types::{NodeId, RequestKind};

use crate::error::RequestValidationError;
use crate::request::RequestParam;
use crate::topology::Topology;

/// Validates a would-be per-node request against the current topology.
/// Does not mutate anything — acceptance happens only via the matching
/// `LogEntry::SetRequest` once this validation (run on the proposing
/// node before appending to the consensus log) passes.
pub fn validate_request(
    topology: &Topology,
    id: NodeId,
    kind: RequestKind,
    param: &RequestParam,
) -> Result<(), RequestValidationError> {
    if topology.requests().contains_key(&id) {
        return Err(RequestValidationError::AlreadyPending(id));
    }

    match (kind, param) {
        (RequestKind::Join, RequestParam::Join { .. }) => {
            if topology.contains(id) {
                return Err(RequestValidationError::AlreadyPending(id));
            }
        }
        (RequestKind::Replace, RequestParam::Replace { replaced_id, .. }) => {
            let replaced_is_normal_or_left =
                topology.find(*replaced_id).is_some() || topology.left_nodes().contains(replaced_id);
            if !replaced_is_normal_or_left {
                return Err(RequestValidationError::InvalidReplaceTarget(*replaced_id));
            }
        }
        (RequestKind::Remove | RequestKind::Leave | RequestKind::Rebuild, _) => {
            if !topology.contains(id) {
                return Err(RequestValidationError::UnknownNode(id));
            }
        }
        _ => return Err(RequestValidationError::UnknownNode(id)),
    }

    Ok(())
}

/// Selects the next request the coordinator should drive, applying the
/// fixed priority order `replace > join > remove > leave > rebuild`,
/// with ties among same-priority nodes broken by [`NodeId`] order.
///
/// Returns `None` if the topology is idle (no per-node requests and no
/// global request pending).
pub fn select_next(topology: &Topology) -> Option<(NodeId, RequestKind)> {
    topology
        .requests()
        .iter()
        .map(|(&id, &kind)| (id, kind))
        .min_by_key(|(id, kind)| (kind.priority_rank(), *id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogEntry;
    use crate::applier::apply_committed;
    use ringctl_types::{Datacenter, FeatureSet, Rack, RequestId};
    use std::collections::BTreeSet;

    fn add_node(t: Topology, id: u64) -> Topology {
        apply_committed(
            t,
            LogEntry::AddNewNode {
                id: NodeId::new(id),
                datacenter: Datacenter::new("dc1"),
                rack: Rack::new("r1"),
                release_version: "2026.1".into(),
                shard_count: 8,
                partitioner_tuning: 1200,
                supported_features: FeatureSet::new(),
            },
        )
    }

    fn set_request(t: Topology, id: u64, kind: RequestKind, param: RequestParam) -> Topology {
        apply_committed(
            t,
            LogEntry::SetRequest {
                id: NodeId::new(id),
                request_id: RequestId::generate(),
                kind,
                param,
            },
        )
    }

    #[test]
    fn priority_picks_replace_then_join_then_remove_then_leave_then_rebuild() {
        // S5/priority scenario from the distilled spec §8: join A, replace
        // B, rebuild C, leave D all pending simultaneously.
        let mut t = Topology::genesis();
        for id in [1, 2, 3, 4] {
            t = add_node(t, id);
        }
        t = set_request(t, 1, RequestKind::Join, RequestParam::Join { num_tokens: 16 });
        t = set_request(
            t,
            2,
            RequestKind::Replace,
            RequestParam::Replace {
                replaced_id: NodeId::new(99),
                ignored_ids: BTreeSet::new(),
            },
        );
        t = set_request(t, 3, RequestKind::Rebuild, RequestParam::Rebuild { source_dc: None });
        t = set_request(t, 4, RequestKind::Leave, RequestParam::Leave);

        assert_eq!(select_next(&t), Some((NodeId::new(2), RequestKind::Replace)));

        // Once B's request clears, A's join should be picked next.
        let t = apply_committed(t, LogEntry::DeleteNode { id: NodeId::new(2) });
        assert_eq!(select_next(&t), Some((NodeId::new(1), RequestKind::Join)));
    }

    #[test]
    fn ties_at_same_priority_break_on_node_id() {
        let mut t = Topology::genesis();
        for id in [5, 2] {
            t = add_node(t, id);
        }
        t = set_request(t, 5, RequestKind::Leave, RequestParam::Leave);
        t = set_request(t, 2, RequestKind::Leave, RequestParam::Leave);
        assert_eq!(select_next(&t), Some((NodeId::new(2), RequestKind::Leave)));
    }

    #[test]
    fn validate_rejects_duplicate_pending_request() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = set_request(t, 1, RequestKind::Leave, RequestParam::Leave);
        let err = validate_request(&t, NodeId::new(1), RequestKind::Rebuild, &RequestParam::Rebuild { source_dc: None });
        assert_eq!(err, Err(RequestValidationError::AlreadyPending(NodeId::new(1))));
    }

    #[test]
    fn validate_rejects_replace_of_unknown_node() {
        let t = Topology::genesis();
        let err = validate_request(
            &t,
            NodeId::new(4),
            RequestKind::Replace,
            &RequestParam::Replace {
                replaced_id: NodeId::new(99),
                ignored_ids: BTreeSet::new(),
            },
        );
        assert_eq!(err, Err(RequestValidationError::InvalidReplaceTarget(NodeId::new(99))));
    }
}
