//! Collaborator contracts consumed by the core (§6), modeled as narrow
//! Rust traits — grounded on the `Network`/`Storage` collaborator-trait
//! pattern used to keep `kimberlite-kernel`'s pure core decoupled from
//! any concrete transport or durability implementation.
//!
//! Production implementations of these traits live outside this crate
//! (the consensus log replication layer and gossip subsystem are both
//! explicitly out of scope per §1). Streaming and address-map lookups
//! are collaborator concerns too, but they are folded into
//! [`crate::rpc::NodeRpc`] (`stream_ranges`/`wait_for_ip`) rather than
//! modeled as separate traits here — the coordinator never calls a
//! streamer or address map except through an RPC to the target node.
//! The in-memory test doubles below exist only for this crate's own
//! unit tests, grounded on the `NoOpNetwork`/`InMemoryStorage` doubles
//! in `kimberlite-kernel::runtime`.

use std::collections::BTreeMap;
use std::sync::Mutex;

use ringctl_model::LogEntry;
use ringctl_types::NodeId;

use crate::error::CoordinatorError;

/// The consensus log replication layer. `append` returns once the entry
/// has committed; the core never observes uncommitted entries.
pub trait ConsensusLog: Send + Sync {
    /// Appends `entry`, waiting for it to commit. Errors only on
    /// unrecoverable conditions (e.g. loss of leadership mid-append);
    /// transient replication delays are hidden behind this future.
    fn append(
        &self,
        entry: LogEntry,
    ) -> impl std::future::Future<Output = Result<(), CoordinatorError>> + Send;
}

/// Gossip of liveness and out-of-band application state (§4.7 Readiness
/// Publisher rides on this).
pub trait Gossip: Send + Sync {
    fn set_application_state(&self, node_id: NodeId, key: &str, value: &str);
    fn address_of(&self, node_id: NodeId) -> Option<String>;
}

/// In-memory test double for [`ConsensusLog`]. Appends always "commit"
/// immediately; entries are recorded for assertions but never replayed
/// (callers apply them to their own `Topology` handle directly).
#[derive(Default)]
pub struct InMemoryConsensusLog {
    appended: Mutex<Vec<LogEntry>>,
}

impl InMemoryConsensusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appended_entries(&self) -> Vec<LogEntry> {
        self.appended.lock().unwrap().clone()
    }
}

impl ConsensusLog for InMemoryConsensusLog {
    async fn append(&self, entry: LogEntry) -> Result<(), CoordinatorError> {
        self.appended.lock().unwrap().push(entry);
        Ok(())
    }
}

/// In-memory test double for [`Gossip`].
#[derive(Default)]
pub struct InMemoryGossip {
    state: Mutex<BTreeMap<(NodeId, String), String>>,
    addresses: Mutex<BTreeMap<NodeId, String>>,
}

impl InMemoryGossip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(self, node_id: NodeId, address: impl Into<String>) -> Self {
        self.addresses.lock().unwrap().insert(node_id, address.into());
        self
    }

    pub fn application_state(&self, node_id: NodeId, key: &str) -> Option<String> {
        self.state.lock().unwrap().get(&(node_id, key.to_string())).cloned()
    }
}

impl Gossip for InMemoryGossip {
    fn set_application_state(&self, node_id: NodeId, key: &str, value: &str) {
        self.state
            .lock()
            .unwrap()
            .insert((node_id, key.to_string()), value.to_string());
    }

    fn address_of(&self, node_id: NodeId) -> Option<String> {
        self.addresses.lock().unwrap().get(&node_id).cloned()
    }
}
