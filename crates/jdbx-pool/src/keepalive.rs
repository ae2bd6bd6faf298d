//! Keepalive probe task
//!
//! Each pooled connection configured for keepalive gets its own recurring
//! task that issues a trivial query, preventing server-side or firewall
//! connection reaping. Probe failures are logged, never propagated; a broken
//! connection is discovered lazily on next use or by a validity check.

use std::sync::Arc;

use jdbx_core::ConnectionHandle;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::KeepaliveConfig;

/// Handle to a running keepalive task. Aborts the task on drop, so an
/// evicted or purged entry always stops its probe loop.
pub(crate) struct KeepaliveHandle {
    task: JoinHandle<()>,
}

impl KeepaliveHandle {
    pub(crate) fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn the recurring probe for one connection.
pub(crate) fn spawn(
    id: Uuid,
    handle: Arc<dyn ConnectionHandle>,
    config: KeepaliveConfig,
) -> KeepaliveHandle {
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // An interval's first tick completes immediately; skip it so the
        // first probe happens one full interval after creation.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            if handle.is_closed() {
                tracing::debug!(connection_id = %id, "connection closed, stopping keepalive");
                break;
            }

            match handle.execute(config.probe_query()).await {
                Ok(()) => tracing::trace!(connection_id = %id, "keepalive probe ok"),
                Err(error) => {
                    tracing::warn!(connection_id = %id, %error, "keepalive probe failed");
                }
            }
        }
    });

    KeepaliveHandle { task }
}
