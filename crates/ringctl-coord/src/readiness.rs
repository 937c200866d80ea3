//! Readiness Publisher (§4.7).
//!
//! A thin adapter over the external gossip collaborator, grounded on
//! the narrow-collaborator-trait pattern of `kimberlite-kernel::traits`.
//! Carries no state of its own beyond the `Gossip` handle it wraps.

use ringctl_types::NodeId;

use crate::collab::Gossip;

const READY_KEY: &str = "cql_ready";

/// Publishes and clears the single "ready to serve" bit gossiped once a
/// node transitions to/from `normal`.
pub struct ReadinessPublisher<G> {
    gossip: G,
}

impl<G: Gossip> ReadinessPublisher<G> {
    pub fn new(gossip: G) -> Self {
        Self { gossip }
    }

    /// Called immediately after a node is promoted to `normal_nodes`.
    pub fn publish_ready(&self, node_id: NodeId) {
        tracing::info!(node_id = %node_id, "publishing CQL readiness");
        self.gossip.set_application_state(node_id, READY_KEY, "true");
    }

    /// Called before a node transitions out of `normal` (decommission,
    /// removal, replace-of-self).
    pub fn clear_ready(&self, node_id: NodeId) {
        tracing::info!(node_id = %node_id, "clearing CQL readiness");
        self.gossip.set_application_state(node_id, READY_KEY, "false");
    }

    pub fn gossip(&self) -> &G {
        &self.gossip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::InMemoryGossip;

    #[test]
    fn publish_then_clear_round_trips_through_gossip() {
        let publisher = ReadinessPublisher::new(InMemoryGossip::new());
        let node = NodeId::new(1);

        publisher.publish_ready(node);
        assert_eq!(
            publisher.gossip().application_state(node, READY_KEY).as_deref(),
            Some("true")
        );

        publisher.clear_ready(node);
        assert_eq!(
            publisher.gossip().application_state(node, READY_KEY).as_deref(),
            Some("false")
        );
    }
}
