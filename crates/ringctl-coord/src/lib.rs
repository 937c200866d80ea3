//! The imperative shell that drives a [`ringctl_model::Topology`] through
//! its committed log and the cluster's RPC surface.
//!
//! Everything in `ringctl-model` is pure; everything here touches the
//! network, the clock, or a collaborator. Grounded structurally on
//! `kimberlite-kernel::runtime::Runtime`, which plays the same role
//! against `kimberlite-kernel`'s own pure core.

pub mod collab;
pub mod coordinator;
pub mod error;
pub mod fencing;
pub mod readiness;
pub mod rpc;

pub use collab::{ConsensusLog, Gossip};
pub use coordinator::Coordinator;
pub use error::CoordinatorError;
pub use fencing::FencingRegistry;
pub use readiness::ReadinessPublisher;
pub use rpc::{NodeRpc, RpcOutcome};
