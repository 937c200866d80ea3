//! Validation errors raised before a request is accepted into the
//! replicated `requests`/`req_param` queue. These are distinct from the
//! applier's fatal-abort path: a validation failure here means a client
//! asked for something nonsensical, not that the consensus log delivered
//! a malformed entry.

use ringctl_types::NodeId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestValidationError {
    #[error("node {0} is not known to the topology")]
    UnknownNode(NodeId),

    #[error("node {0} is already the target of a pending request")]
    AlreadyPending(NodeId),

    #[error("replace target {0} must name a node that is currently normal or already left")]
    InvalidReplaceTarget(NodeId),

    #[error("topology is busy with another operation")]
    Busy,
}
