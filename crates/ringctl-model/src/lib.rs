//! # ringctl-model: the pure topology state machine
//!
//! This crate is the functional core of the ring topology coordinator
//! (FCIS, as in `kimberlite-kernel`): [`Topology`] is plain data, every
//! mutation runs deterministically through [`applier::apply_committed`],
//! and nothing in this crate performs I/O, reads a clock, or calls a
//! random number generator.
//!
//! - No IO.
//! - No clocks.
//! - No randomness (id generation lives in `ringctl-types`, one layer
//!   down, and is never called from here — ids arrive pre-minted in
//!   [`entry::LogEntry`] variants).
//! - Pure functions: same topology + same entry always yields the same
//!   resulting topology.
//!
//! The imperative shell (the `ringctl` facade crate) owns the consensus
//! log, the clock, and the wakeup/notification plumbing; it hands
//! committed entries to [`applier::apply_committed`] one at a time and
//! publishes the resulting [`Topology`] to readers.

pub mod applier;
pub mod entry;
pub mod error;
pub mod queue;
pub mod replica_record;
pub mod request;
pub mod topology;

pub use applier::{apply_committed, apply_committed_batch};
pub use entry::LogEntry;
pub use error::RequestValidationError;
pub use queue::{select_next, validate_request};
pub use replica_record::ReplicaRecord;
pub use request::RequestParam;
pub use topology::Topology;
