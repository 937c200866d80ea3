//! The replica's main lifecycle object (§9 Design Notes): owns the
//! shared [`Topology`] handle, the [`FencingRegistry`] derived from it,
//! and the [`Coordinator`] that drives it — nothing here is a global
//! singleton, all of it is constructed once per replica process and
//! passed explicitly to whatever needs it (RPC handlers, the admin
//! surface, tests).
//!
//! Grounded on `kimberlite::kimberlite::KimberliteInner`: a single
//! struct gathering the pieces a node-local process needs, built from a
//! loaded configuration and a set of collaborators supplied by the
//! embedding application.

use std::sync::Arc;
use std::time::Duration;

use ringctl_coord::{ConsensusLog, Coordinator, FencingRegistry, Gossip, NodeRpc};
use ringctl_config::TopologyConfig;
use ringctl_model::Topology;
use ringctl_types::NodeId;
use tokio::sync::RwLock;

use crate::error::Result;

/// One replica's view of the cluster topology plus the machinery that
/// drives it forward. `L`/`R`/`G` are the same collaborator traits
/// `Coordinator` is generic over — this struct only adds the
/// configuration and the shared, lock-guarded [`Topology`] handle.
pub struct Replica<L, R, G> {
    topology: Arc<RwLock<Topology>>,
    fencing: FencingRegistry,
    coordinator: Coordinator<L, R, G>,
    config: TopologyConfig,
}

impl<L, R, G> Replica<L, R, G>
where
    L: ConsensusLog,
    R: NodeRpc,
    G: Gossip,
{
    /// Builds a replica from an already-recovered [`Topology`] (either
    /// genesis, or replayed from a snapshot plus log suffix — both out
    /// of scope for this crate) and the collaborators it will drive
    /// through.
    pub fn new(config: TopologyConfig, initial: Topology, log: L, rpc: R, gossip: G) -> Self {
        let topology = Arc::new(RwLock::new(initial));
        let fencing = FencingRegistry::new();
        let barrier_timeout = Duration::from_millis(config.timeouts.barrier_timeout_ms);
        let coordinator = Coordinator::new(
            Arc::clone(&topology),
            fencing.clone(),
            log,
            rpc,
            gossip,
            barrier_timeout,
        );
        Self {
            topology,
            fencing,
            coordinator,
            config,
        }
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    pub fn fencing(&self) -> &FencingRegistry {
        &self.fencing
    }

    pub fn coordinator(&self) -> &Coordinator<L, R, G> {
        &self.coordinator
    }

    pub async fn snapshot(&self) -> Topology {
        self.topology.read().await.clone()
    }

    /// Drives the coordinator's loop for as long as it reports work was
    /// done. `ring_for` supplies the ring slice a join/replace should be
    /// promoted to — token assignment lives outside this crate (§1
    /// Non-goals).
    pub async fn drive_until_idle(&self, ring_for: impl Fn(NodeId) -> ringctl_types::RingSlice) -> Result<()> {
        while self.coordinator.run_once(&ring_for).await? {}
        Ok(())
    }
}

/// Installs a `tracing-subscriber` fmt layer honoring `RUST_LOG`,
/// defaulting to `info`. Grounded on the logging setup in
/// `kimberlite-cli`'s `main`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use ringctl_coord::collab::{InMemoryConsensusLog, InMemoryGossip};
    use ringctl_coord::rpc::InMemoryNodeRpc;
    use ringctl_model::LogEntry;
    use ringctl_types::{Datacenter, FeatureSet, Rack, RequestId, RequestKind, RingSlice, Token};

    use super::*;
    use crate::RequestParam;

    fn genesis_with_one_pending_join() -> Topology {
        let t = ringctl_model::apply_committed(
            Topology::genesis(),
            LogEntry::AddNewNode {
                id: NodeId::new(1),
                datacenter: Datacenter::new("dc1"),
                rack: Rack::new("r1"),
                release_version: "2026.1".into(),
                shard_count: 8,
                partitioner_tuning: 1200,
                supported_features: FeatureSet::new(),
            },
        );
        ringctl_model::apply_committed(
            t,
            LogEntry::SetRequest {
                id: NodeId::new(1),
                request_id: RequestId::generate(),
                kind: RequestKind::Join,
                param: RequestParam::Join { num_tokens: 16 },
            },
        )
    }

    #[tokio::test]
    async fn drive_until_idle_promotes_a_pending_join_and_then_stops() {
        let replica = Replica::new(
            TopologyConfig::default(),
            genesis_with_one_pending_join(),
            InMemoryConsensusLog::new(),
            InMemoryNodeRpc::new(),
            InMemoryGossip::new(),
        );

        replica
            .drive_until_idle(|_| RingSlice::new([Token::new(1)]))
            .await
            .unwrap();

        let topology = replica.snapshot().await;
        assert!(topology.normal_nodes().contains_key(&NodeId::new(1)));
        assert!(!topology.is_busy());
    }

    #[tokio::test]
    async fn config_and_fencing_accessors_reflect_construction() {
        let mut config = TopologyConfig::default();
        config.node.datacenter = "dc2".to_string();
        let replica = Replica::new(
            config,
            Topology::genesis(),
            InMemoryConsensusLog::new(),
            InMemoryNodeRpc::new(),
            InMemoryGossip::new(),
        );

        assert_eq!(replica.config().node.datacenter, "dc2");
        assert_eq!(replica.fencing().version().get(), 0);
    }
}
