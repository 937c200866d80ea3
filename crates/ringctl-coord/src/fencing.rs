//! Fencing Registry (§4.3).
//!
//! Per replica, the last-applied `topology_version`/`fence_version`.
//! Grounded on the wake-on-apply pattern implied by the Command Log
//! Applier: every applied entry notifies a `tokio::sync::Notify`, and a
//! request whose fencing token is ahead of the locally applied version
//! waits (bounded) for the Applier to catch up rather than failing
//! immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ringctl_types::{FenceVersion, TopologyVersion};
use tokio::sync::Notify;

use crate::error::CoordinatorError;

/// Shared, cheaply clonable handle onto one replica's fencing state.
///
/// Written only by the component applying committed entries (the
/// facade's replica lifecycle object, after each `apply_committed`
/// call); read by every data-plane request handler.
#[derive(Clone)]
pub struct FencingRegistry {
    inner: Arc<Inner>,
}

struct Inner {
    version: AtomicU64,
    fence_version: AtomicU64,
    applied: Notify,
}

impl Default for FencingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FencingRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                version: AtomicU64::new(0),
                fence_version: AtomicU64::new(0),
                applied: Notify::new(),
            }),
        }
    }

    pub fn version(&self) -> TopologyVersion {
        TopologyVersion::new(self.inner.version.load(Ordering::SeqCst))
    }

    pub fn fence_version(&self) -> FenceVersion {
        FenceVersion::new(self.inner.fence_version.load(Ordering::SeqCst))
    }

    /// Called by the replica lifecycle object immediately after every
    /// `apply_committed`, with the resulting topology's version and
    /// fence_version. Wakes every pending [`Self::check`] waiter.
    pub fn record_applied(&self, version: TopologyVersion, fence_version: FenceVersion) {
        ringctl_properties::never!(
            fence_version.get() > version.get(),
            "fence_version must never exceed version",
        );
        self.inner.version.store(version.get(), Ordering::SeqCst);
        self.inner
            .fence_version
            .store(fence_version.get(), Ordering::SeqCst);
        self.inner.applied.notify_waiters();
    }

    /// Checks a fencing token from an incoming data-plane RPC.
    ///
    /// - `token == 0` (opt-out): always accepted.
    /// - `token < fence_version`: rejected with [`CoordinatorError::StaleTopology`].
    /// - `token > version`: waits up to `apply_wait` for the Applier to
    ///   catch up, then re-checks; times out as [`CoordinatorError::StaleTopology`]
    ///   (the caller should retry against a different replica or after a
    ///   longer wait).
    /// - otherwise: accepted immediately.
    pub async fn check(
        &self,
        token: TopologyVersion,
        apply_wait: Duration,
    ) -> Result<(), CoordinatorError> {
        if token.is_opt_out() {
            return Ok(());
        }

        if token < self.fence_version() {
            return Err(CoordinatorError::StaleTopology);
        }

        if token > self.version() {
            let notified = self.inner.applied.notified();
            tokio::select! {
                () = notified => {}
                () = tokio::time::sleep(apply_wait) => {
                    return Err(CoordinatorError::StaleTopology);
                }
            }
            if token > self.version() {
                return Err(CoordinatorError::StaleTopology);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opt_out_token_always_accepted() {
        let reg = FencingRegistry::new();
        assert!(reg
            .check(TopologyVersion::OPT_OUT, Duration::from_millis(10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn token_behind_fence_version_is_rejected() {
        let reg = FencingRegistry::new();
        reg.record_applied(TopologyVersion::new(10), FenceVersion::new(10));
        let err = reg
            .check(TopologyVersion::new(9), Duration::from_millis(10))
            .await;
        assert_eq!(err, Err(CoordinatorError::StaleTopology));
    }

    #[tokio::test]
    async fn token_equal_to_fence_version_is_accepted() {
        let reg = FencingRegistry::new();
        reg.record_applied(TopologyVersion::new(10), FenceVersion::new(10));
        assert!(reg
            .check(TopologyVersion::new(10), Duration::from_millis(10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn token_ahead_of_version_blocks_then_succeeds_after_apply() {
        let reg = FencingRegistry::new();
        reg.record_applied(TopologyVersion::new(10), FenceVersion::new(10));
        let reg2 = reg.clone();

        let waiter = tokio::spawn(async move {
            reg2.check(TopologyVersion::new(11), Duration::from_secs(5))
                .await
        });

        tokio::task::yield_now().await;
        reg.record_applied(TopologyVersion::new(11), FenceVersion::new(10));

        assert!(waiter.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn token_ahead_of_version_times_out_if_never_applied() {
        let reg = FencingRegistry::new();
        let err = reg
            .check(TopologyVersion::new(5), Duration::from_millis(20))
            .await;
        assert_eq!(err, Err(CoordinatorError::StaleTopology));
    }
}
