//! # ringctl
//!
//! A cluster topology state machine for a shard-per-core, wide-column
//! database: the functional core that decides how nodes join, replace,
//! leave, are removed, and rebuild, plus the imperative shell that
//! drives that decision through a replicated command log and the
//! cluster's RPC surface.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                            ringctl                            │
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────────────┐  │
//! │  │  Request  │ → │   Topology   │ → │     Coordinator    │  │
//! │  │  Queue    │   │ (pure model) │   │ (RPCs, log, retry)  │  │
//! │  └───────────┘   └──────────────┘   └───────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `ringctl-model` holds the pure state machine (no I/O, no clocks, no
//! randomness); `ringctl-coord` holds the driver that performs RPCs and
//! appends to the consensus log; this crate wires the two together
//! behind [`Replica`], the object a node process owns for its whole
//! lifetime.
//!
//! # Modules
//!
//! - **Facade**: [`Replica`] — the main lifecycle object
//! - **Model**: re-exported from `ringctl-model` — [`Topology`], [`LogEntry`]
//! - **Coordinator**: re-exported from `ringctl-coord` — [`Coordinator`], collaborator traits

mod error;
mod replica;

pub use error::{Result, RingCtlError};
pub use replica::{init_tracing, Replica};

pub use ringctl_config::{ConfigError, ConfigLoader, NodeConfig, TimeoutConfig, TopologyConfig};
pub use ringctl_coord::{
    ConsensusLog, Coordinator, CoordinatorError, FencingRegistry, Gossip, NodeRpc,
    ReadinessPublisher, RpcOutcome,
};
pub use ringctl_model::{
    apply_committed, apply_committed_batch, select_next, validate_request, LogEntry, ReplicaRecord,
    RequestParam, RequestValidationError, Topology,
};
pub use ringctl_types::{
    CdcGenerationId, CleanupStatus, Datacenter, FeatureSet, FenceVersion, GlobalRequest, NodeId,
    NodeState, Rack, RequestId, RequestKind, RingSlice, SessionId, Token, TopologyVersion,
    TransitionState,
};
