//! Topology Coordinator (§4.5): the leader-only driver.
//!
//! Grounded structurally on `kimberlite-vsr::replica::{ReplicaState,
//! ReplicaOutput, ReplicaEvent}`: conceptually this is a pure
//! `step(topology, event) -> (next_action, output)` function, wrapped
//! here by an imperative shell (`Coordinator<L, R, G>`, generic over its
//! collaborators the way `kimberlite_kernel::runtime::Runtime<C, S, N>`
//! is generic over `Clock`/`Storage`/`Network`) that performs the actual
//! RPC calls and log appends.
//!
//! The coordinator holds no durable state of its own (§9 Design Notes):
//! every decision is recovered from `Topology` plus the already-applied
//! prefix of the consensus log. A freshly elected coordinator calling
//! [`Coordinator::run_once`] resumes exactly where the last one left
//! off, because every step re-reads `tstate`/`transition_nodes`/
//! `global_request` before deciding what, if anything, still needs
//! doing.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use ringctl_model::{LogEntry, RequestParam, Topology};
use ringctl_types::{
    CdcGenerationId, CleanupStatus, GlobalRequest, NodeId, NodeState, RequestKind, RingSlice,
    SessionId, TransitionState,
};
use tokio::sync::{RwLock, Semaphore};

use crate::collab::{ConsensusLog, Gossip};
use crate::error::CoordinatorError;
use crate::fencing::FencingRegistry;
use crate::readiness::ReadinessPublisher;
use crate::rpc::{NodeRpc, RpcOutcome};

/// Leader-only topology driver. Owned explicitly by the replica's main
/// lifecycle object (no global singleton, per §9) alongside the shared
/// [`Topology`] handle and [`FencingRegistry`] it updates on every
/// commit.
pub struct Coordinator<L, R, G> {
    topology: Arc<RwLock<Topology>>,
    fencing: FencingRegistry,
    log: L,
    rpc: R,
    readiness: ReadinessPublisher<G>,
    /// Single-permit semaphore gating concurrent start/stop lifecycle
    /// requests (§5), the way `kimberlite-cluster::supervisor` gates
    /// concurrent process lifecycle operations.
    lifecycle: Semaphore,
    barrier_timeout: Duration,
}

impl<L, R, G> Coordinator<L, R, G>
where
    L: ConsensusLog,
    R: NodeRpc,
    G: Gossip,
{
    pub fn new(
        topology: Arc<RwLock<Topology>>,
        fencing: FencingRegistry,
        log: L,
        rpc: R,
        gossip: G,
        barrier_timeout: Duration,
    ) -> Self {
        Self {
            topology,
            fencing,
            log,
            rpc,
            readiness: ReadinessPublisher::new(gossip),
            lifecycle: Semaphore::new(1),
            barrier_timeout,
        }
    }

    pub async fn snapshot(&self) -> Topology {
        self.topology.read().await.clone()
    }

    /// Acquires the single-flight lifecycle permit; returns
    /// [`CoordinatorError::Busy`] if a start/stop is already in
    /// progress.
    pub fn try_acquire_lifecycle(&self) -> Result<tokio::sync::SemaphorePermit<'_>, CoordinatorError> {
        self.lifecycle.try_acquire().map_err(|_| CoordinatorError::Busy)
    }

    /// Commits one log entry and applies it to the shared topology,
    /// updating the fencing registry and waking any waiter — the
    /// imperative-shell side of `ringctl_model::apply_committed`.
    async fn commit(&self, entry: LogEntry) -> Result<Topology, CoordinatorError> {
        self.log.append(entry.clone()).await?;
        let mut guard = self.topology.write().await;
        let next = ringctl_model::apply_committed(guard.clone(), entry);
        *guard = next.clone();
        self.fencing.record_applied(next.version(), next.fence_version());
        tracing::debug!(
            version = next.version().get(),
            fence_version = next.fence_version().get(),
            "applied committed topology entry"
        );
        Ok(next)
    }

    fn barrier_targets(topology: &Topology) -> BTreeSet<NodeId> {
        let excluded = topology.excluded_nodes();
        topology
            .normal_nodes()
            .keys()
            .chain(topology.transition_nodes().keys())
            .copied()
            .filter(|id| !excluded.contains(id))
            .collect()
    }

    async fn retry<F, Fut>(&self, mut attempt: F) -> RpcOutcome
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RpcOutcome>,
    {
        let mut delay = Duration::from_millis(20);
        for remaining in (0..5).rev() {
            match attempt().await {
                RpcOutcome::Success => return RpcOutcome::Success,
                RpcOutcome::Fail(reason) if remaining > 0 => {
                    ringctl_properties::sometimes!(true, "an rpc was retried after failure");
                    tracing::warn!(%reason, attempts_left = remaining, "rpc failed, retrying after backoff");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                fail => return fail,
            }
        }
        unreachable!("loop always returns on its last iteration")
    }

    async fn barrier(&self, drain: bool) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        let targets = Self::barrier_targets(&topology);
        let version = topology.version();
        let attempt = self.retry(|| {
            if drain {
                self.rpc.barrier_and_drain(&targets, version)
            } else {
                self.rpc.barrier(&targets, version)
            }
        });
        let outcome = tokio::time::timeout(self.barrier_timeout, attempt)
            .await
            .unwrap_or_else(|_| RpcOutcome::Fail("timed out".into()));
        outcome.into_barrier_result()
    }

    async fn advance_to(&self, state: TransitionState) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        if topology.tstate() != Some(state) {
            self.commit(LogEntry::AdvanceTransition(state)).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Join / Replace (§4.5)
    // ========================================================================

    /// Drives a `join` or `replace` request for `id` to completion. The
    /// ring slice `id` will own once promoted is an input — choosing
    /// tokens is explicitly out of scope for this core (§1 Non-goals);
    /// it only commits the assignment handed to it here.
    pub async fn drive_join_or_replace(&self, id: NodeId, ring: RingSlice) -> Result<(), CoordinatorError> {
        self.retry(|| self.rpc.wait_for_ip(id)).await.into_wait_result(id)?;

        self.advance_to(TransitionState::JoinGroup0).await?;

        let topology = self.snapshot().await;
        let is_replace = matches!(topology.req_param(id), Some(RequestParam::Replace { .. }));
        if !topology.transition_nodes().contains_key(&id) {
            let state = if is_replace {
                NodeState::Replacing
            } else {
                NodeState::Bootstrapping
            };
            self.commit(LogEntry::MoveToTransition { id, state }).await?;
        }

        self.drive_commit_cdc_generation().await?;

        self.advance_to(TransitionState::TabletDraining).await?;
        self.barrier(true).await?;

        self.advance_to(TransitionState::WriteBothReadOld).await?;
        self.barrier(false).await?;

        let topology = self.snapshot().await;
        let session_id = topology.session_id().unwrap_or_else(SessionId::generate);
        self.retry(|| self.rpc.stream_ranges(id, &ring, session_id))
            .await
            .into_stream_result(id)?;

        let topology = self.snapshot().await;
        if topology.tstate() != Some(TransitionState::WriteBothReadNew) {
            self.commit(LogEntry::AdvanceTransition(TransitionState::WriteBothReadNew))
                .await?;
            self.commit(LogEntry::BumpFenceVersion).await?;
        }
        self.barrier(false).await?;

        let topology = self.snapshot().await;
        if topology.tablet_balancing_enabled() {
            self.advance_to(TransitionState::TabletMigration).await?;
            self.barrier(false).await?;
        }

        self.commit(LogEntry::PromoteToNormal { id, ring }).await?;
        self.commit(LogEntry::ClearTransition).await?;
        self.readiness.publish_ready(id);

        Ok(())
    }

    /// Steps 3 of the join/replace path and of the `new_cdc_generation`
    /// global request: mint (if not already in flight, e.g. resuming
    /// after a crash) a generation data id, then commit the generation.
    async fn drive_commit_cdc_generation(&self) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        let gen_data_id = match topology.new_cdc_generation_data_id() {
            Some(id) => id,
            None => {
                let id = CdcGenerationId::generate();
                self.commit(LogEntry::SetInFlightCdcGenerationData { id }).await?;
                id
            }
        };

        self.advance_to(TransitionState::CommitCdcGeneration).await?;

        let topology = self.snapshot().await;
        if topology.current_cdc_generation_id() != Some(gen_data_id) {
            self.commit(LogEntry::CommitCdcGeneration { id: gen_data_id }).await?;
        }

        Ok(())
    }

    // ========================================================================
    // Leave / Decommission / Remove (§4.5)
    // ========================================================================

    pub async fn drive_leave_or_remove(&self, id: NodeId) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        let is_remove = matches!(topology.req_param(id), Some(RequestParam::Remove { .. }));

        if !topology.transition_nodes().contains_key(&id) {
            let state = if is_remove {
                NodeState::Removing
            } else {
                NodeState::Decommissioning
            };
            self.commit(LogEntry::MoveToTransition { id, state }).await?;
        }

        self.advance_to(TransitionState::WriteBothReadOld).await?;
        if let Err(err) = self.barrier(false).await {
            return self.rollback_to_normal(id, err).await;
        }

        let topology = self.snapshot().await;
        let session_id = topology.session_id().unwrap_or_else(SessionId::generate);
        let stream_result = self
            .retry(|| self.rpc.stream_ranges(id, &RingSlice::empty(), session_id))
            .await
            .into_stream_result(id);
        if let Err(err) = stream_result {
            return self.rollback_to_normal(id, err).await;
        }

        let topology = self.snapshot().await;
        if topology.tstate() != Some(TransitionState::WriteBothReadNew) {
            self.commit(LogEntry::AdvanceTransition(TransitionState::WriteBothReadNew))
                .await?;
            self.commit(LogEntry::BumpFenceVersion).await?;
        }
        if let Err(err) = self.barrier(false).await {
            return self.rollback_to_normal(id, err).await;
        }

        self.advance_to(TransitionState::LeftTokenRing).await?;
        self.readiness.clear_ready(id);
        self.commit(LogEntry::DeleteNode { id }).await?;
        self.commit(LogEntry::ClearTransition).await?;

        Ok(())
    }

    /// Failure before `left_token_ring` rolls the node back to `normal`
    /// rather than leaving it stranded mid-transition (S5). The node's
    /// existing ring ownership is untouched — `leave`/`remove` never
    /// reassigns it before `left_token_ring`.
    async fn rollback_to_normal(&self, id: NodeId, cause: CoordinatorError) -> Result<(), CoordinatorError> {
        tracing::warn!(node_id = %id, %cause, "rolling back leave/remove operation");
        let topology = self.snapshot().await;
        if topology.transition_nodes().contains_key(&id) {
            self.commit(LogEntry::MoveToTransition {
                id,
                state: NodeState::RollbackToNormal,
            })
            .await?;
        }
        self.commit(LogEntry::RollbackToNormal { id }).await.ok();
        self.commit(LogEntry::ClearTransition).await?;
        Err(CoordinatorError::RolledBack(id, cause.to_string()))
    }

    // ========================================================================
    // Rebuild (§4.5)
    // ========================================================================

    /// A single-node operation: streams `id`'s existing ranges from a
    /// chosen source. No `fence_version` bump — ring ownership does not
    /// change.
    pub async fn drive_rebuild(&self, id: NodeId) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        if !topology.transition_nodes().contains_key(&id) {
            self.commit(LogEntry::MoveToTransition {
                id,
                state: NodeState::Rebuilding,
            })
            .await?;
        }

        let topology = self.snapshot().await;
        let ring = topology
            .find(id)
            .and_then(|record| record.ring.clone())
            .unwrap_or_else(RingSlice::empty);
        let session_id = topology.session_id().unwrap_or_else(SessionId::generate);

        self.retry(|| self.rpc.stream_ranges(id, &ring, session_id))
            .await
            .into_stream_result(id)?;

        self.commit(LogEntry::PromoteToNormal { id, ring }).await?;
        Ok(())
    }

    // ========================================================================
    // Global requests (§4.5)
    // ========================================================================

    pub async fn drive_global(&self) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        match topology.global_request() {
            Some(GlobalRequest::NewCdcGeneration) => {
                self.drive_commit_cdc_generation().await?;
                self.commit(LogEntry::ClearTransition).await.ok();
                self.commit(LogEntry::ClearGlobalRequest).await?;
                Ok(())
            }
            Some(GlobalRequest::Cleanup) => self.drive_cleanup().await,
            None => Ok(()),
        }
    }

    /// Drives every normal node through `needed -> running -> clean`;
    /// retires the global request once all report `clean`.
    async fn drive_cleanup(&self) -> Result<(), CoordinatorError> {
        let topology = self.snapshot().await;
        let ids: Vec<NodeId> = topology.normal_nodes().keys().copied().collect();

        for id in &ids {
            let topology = self.snapshot().await;
            if topology.normal_nodes()[id].cleanup_status == CleanupStatus::Clean {
                self.commit(LogEntry::SetCleanupStatus {
                    id: *id,
                    status: CleanupStatus::Needed,
                })
                .await?;
            }
        }

        for id in &ids {
            self.commit(LogEntry::SetCleanupStatus {
                id: *id,
                status: CleanupStatus::Running,
            })
            .await?;
            // Cleanup itself is executed by the storage layer out of
            // process; here we only track the per-node status.
            self.commit(LogEntry::SetCleanupStatus {
                id: *id,
                status: CleanupStatus::Clean,
            })
            .await?;
        }

        let topology = self.snapshot().await;
        let all_clean = topology
            .normal_nodes()
            .values()
            .all(|record| record.cleanup_status == CleanupStatus::Clean);
        if all_clean {
            self.commit(LogEntry::ClearGlobalRequest).await?;
        }
        Ok(())
    }

    // ========================================================================
    // Top-level drive loop
    // ========================================================================

    /// Picks and drives exactly one unit of work: resumes an in-flight
    /// per-node/global operation if `tstate`/`transition_nodes`/
    /// `global_request` show one pending, otherwise selects the next
    /// queued request per the priority order in
    /// [`ringctl_model::select_next`]. Returns `false` if the topology
    /// is idle.
    pub async fn run_once(&self, ring_for: impl Fn(NodeId) -> RingSlice) -> Result<bool, CoordinatorError> {
        let topology = self.snapshot().await;

        if let Some((&id, _)) = topology.transition_nodes().iter().next() {
            let kind = topology.requests().get(&id).copied();
            match kind {
                Some(RequestKind::Join | RequestKind::Replace) => {
                    self.drive_join_or_replace(id, ring_for(id)).await?;
                }
                Some(RequestKind::Remove | RequestKind::Leave) => {
                    self.drive_leave_or_remove(id).await?;
                }
                Some(RequestKind::Rebuild) => {
                    self.drive_rebuild(id).await?;
                }
                None => {
                    // A rollback was in flight when the coordinator
                    // crashed (request already cleared); finish it.
                    self.rollback_to_normal(id, CoordinatorError::RolledBack(id, "resumed after crash".into()))
                        .await
                        .ok();
                }
            }
            return Ok(true);
        }

        if let Some((id, kind)) = ringctl_model::select_next(&topology) {
            match kind {
                RequestKind::Join | RequestKind::Replace => {
                    self.drive_join_or_replace(id, ring_for(id)).await?;
                }
                RequestKind::Remove | RequestKind::Leave => {
                    self.drive_leave_or_remove(id).await?;
                }
                RequestKind::Rebuild => {
                    self.drive_rebuild(id).await?;
                }
            }
            return Ok(true);
        }

        if topology.global_request().is_some() {
            self.drive_global().await?;
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ringctl_model::{apply_committed, apply_committed_batch};
    use ringctl_types::{Datacenter, FeatureSet, Rack, RequestId, Token};

    use super::*;
    use crate::collab::{InMemoryConsensusLog, InMemoryGossip};
    use crate::rpc::InMemoryNodeRpc;

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

    fn promote(t: Topology, id: u64, ring: RingSlice) -> Topology {
        apply_committed(t, LogEntry::PromoteToNormal { id: NodeId::new(id), ring })
    }

    fn coordinator(
        topology: Topology,
        rpc: InMemoryNodeRpc,
    ) -> Coordinator<InMemoryConsensusLog, InMemoryNodeRpc, InMemoryGossip> {
        Coordinator::new(
            Arc::new(RwLock::new(topology)),
            FencingRegistry::new(),
            InMemoryConsensusLog::new(),
            rpc,
            InMemoryGossip::new(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn drive_join_promotes_node_and_publishes_readiness() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = set_request(t, 1, RequestKind::Join, RequestParam::Join { num_tokens: 16 });

        let coord = coordinator(t, InMemoryNodeRpc::new());
        let ring = RingSlice::new([Token::new(10)]);
        coord.drive_join_or_replace(NodeId::new(1), ring.clone()).await.unwrap();

        let topology = coord.snapshot().await;
        assert!(topology.normal_nodes().contains_key(&NodeId::new(1)));
        assert_eq!(topology.find(NodeId::new(1)).unwrap().ring, Some(ring));
        assert!(topology.transition_nodes().is_empty());
        assert!(topology.tstate().is_none());
        assert_eq!(
            coord.readiness.gossip().application_state(NodeId::new(1), "cql_ready").as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn drive_replace_moves_replacing_node_through_to_normal() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = set_request(
            t,
            1,
            RequestKind::Replace,
            RequestParam::Replace {
                replaced_id: NodeId::new(99),
                ignored_ids: BTreeSet::new(),
            },
        );

        let coord = coordinator(t, InMemoryNodeRpc::new());
        coord
            .drive_join_or_replace(NodeId::new(1), RingSlice::new([Token::new(1)]))
            .await
            .unwrap();

        let topology = coord.snapshot().await;
        assert_eq!(
            topology.find(NodeId::new(1)).unwrap().state,
            NodeState::Normal
        );
    }

    #[tokio::test]
    async fn run_once_drains_the_queue_then_reports_idle() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = set_request(t, 1, RequestKind::Join, RequestParam::Join { num_tokens: 16 });

        let coord = coordinator(t, InMemoryNodeRpc::new());
        let ring_for = |_: NodeId| RingSlice::new([Token::new(3)]);

        assert!(coord.run_once(ring_for).await.unwrap());
        assert!(topology_is_idle(&coord).await);
        assert!(!coord.run_once(ring_for).await.unwrap());
    }

    async fn topology_is_idle(coord: &Coordinator<impl ConsensusLog, impl NodeRpc, impl Gossip>) -> bool {
        !coord.snapshot().await.is_busy()
    }

    #[tokio::test]
    async fn leave_rolls_back_to_normal_when_barrier_fails() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = promote(t, 1, RingSlice::new([Token::new(5)]));
        t = set_request(t, 1, RequestKind::Leave, RequestParam::Leave);

        let rpc = InMemoryNodeRpc::new().failing_for(NodeId::new(1));
        let coord = coordinator(t, rpc);

        let err = coord.drive_leave_or_remove(NodeId::new(1)).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::RolledBack(id, _) if id == NodeId::new(1)));

        let topology = coord.snapshot().await;
        assert_eq!(
            topology.find(NodeId::new(1)).unwrap().state,
            NodeState::Normal
        );
        assert_eq!(
            topology.find(NodeId::new(1)).unwrap().ring,
            Some(RingSlice::new([Token::new(5)]))
        );
        assert!(topology.transition_nodes().is_empty());
        assert!(topology.tstate().is_none());
    }

    #[tokio::test]
    async fn leave_succeeds_and_deletes_node_when_rpcs_all_succeed() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = promote(t, 1, RingSlice::new([Token::new(5)]));
        t = set_request(t, 1, RequestKind::Leave, RequestParam::Leave);

        let coord = coordinator(t, InMemoryNodeRpc::new());
        coord.drive_leave_or_remove(NodeId::new(1)).await.unwrap();

        let topology = coord.snapshot().await;
        assert!(topology.left_nodes().contains(&NodeId::new(1)));
        assert!(topology.find(NodeId::new(1)).is_none());
        assert!(topology.tstate().is_none());
    }

    #[tokio::test]
    async fn rebuild_streams_existing_ring_without_bumping_fence_version() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = promote(t, 1, RingSlice::new([Token::new(5)]));
        t = set_request(t, 1, RequestKind::Rebuild, RequestParam::Rebuild { source_dc: None });

        let coord = coordinator(t, InMemoryNodeRpc::new());
        let fence_before = coord.snapshot().await.fence_version();
        coord.drive_rebuild(NodeId::new(1)).await.unwrap();

        let topology = coord.snapshot().await;
        assert_eq!(topology.find(NodeId::new(1)).unwrap().ring, Some(RingSlice::new([Token::new(5)])));
        assert_eq!(topology.fence_version(), fence_before);
    }

    #[tokio::test]
    async fn cleanup_cycles_every_normal_node_and_clears_global_request() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = promote(t, 1, RingSlice::new([Token::new(1)]));
        t = add_node(t, 2);
        t = promote(t, 2, RingSlice::new([Token::new(2)]));
        t = apply_committed(t, LogEntry::SetGlobalRequest(GlobalRequest::Cleanup));

        let coord = coordinator(t, InMemoryNodeRpc::new());
        coord.drive_global().await.unwrap();

        let topology = coord.snapshot().await;
        assert!(topology.global_request().is_none());
        for id in [1, 2] {
            assert_eq!(
                topology.normal_nodes()[&NodeId::new(id)].cleanup_status,
                CleanupStatus::Clean
            );
        }
    }

    #[tokio::test]
    async fn new_cdc_generation_global_request_commits_a_generation_and_retires() {
        let t = apply_committed_batch(
            Topology::genesis(),
            [LogEntry::SetGlobalRequest(GlobalRequest::NewCdcGeneration)],
        );

        let coord = coordinator(t, InMemoryNodeRpc::new());
        coord.drive_global().await.unwrap();

        let topology = coord.snapshot().await;
        assert!(topology.global_request().is_none());
        assert!(topology.tstate().is_none());
        assert!(topology.current_cdc_generation_id().is_some());
    }

    #[tokio::test]
    async fn run_once_resumes_a_join_left_mid_flight_by_a_prior_coordinator() {
        let mut t = Topology::genesis();
        t = add_node(t, 1);
        t = set_request(t, 1, RequestKind::Join, RequestParam::Join { num_tokens: 16 });
        // Simulate a crash after the node was moved into transition_nodes
        // but before any further progress was made.
        t = apply_committed(t, LogEntry::AdvanceTransition(TransitionState::JoinGroup0));
        t = apply_committed(
            t,
            LogEntry::MoveToTransition {
                id: NodeId::new(1),
                state: NodeState::Bootstrapping,
            },
        );

        let coord = coordinator(t, InMemoryNodeRpc::new());
        let ring_for = |_: NodeId| RingSlice::new([Token::new(9)]);
        assert!(coord.run_once(ring_for).await.unwrap());

        let topology = coord.snapshot().await;
        assert!(topology.normal_nodes().contains_key(&NodeId::new(1)));
    }
}
