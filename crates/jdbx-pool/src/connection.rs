//! Pooled connection wrappers

use std::ops::Deref;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jdbx_core::ConnectionHandle;
use uuid::Uuid;

use crate::keepalive::KeepaliveHandle;

/// Pool-owned record for one live connection.
///
/// Entries live in exactly one of the manager's two collections (available
/// or reserved) until evicted or purged. `last_idle_at` is only stamped when
/// idle eviction is configured; under keepalive it stays `None`.
pub(crate) struct PoolEntry {
    pub(crate) id: Uuid,
    pub(crate) handle: Arc<dyn ConnectionHandle>,
    pub(crate) last_idle_at: Option<Instant>,
    pub(crate) keepalive: Option<KeepaliveHandle>,
}

impl PoolEntry {
    /// Refresh the idle stamp, if idle tracking is enabled.
    ///
    /// The stamp is refreshed rather than cleared: eviction subtracts from
    /// "now", and a just-reserved connection must not be immediately
    /// eligible again.
    pub(crate) fn touch(&mut self) {
        if self.last_idle_at.is_some() {
            self.last_idle_at = Some(Instant::now());
        }
    }

    /// Whether this entry has sat longer than `max_idle` since its stamp.
    pub(crate) fn expired(&self, max_idle: Duration) -> bool {
        self.last_idle_at
            .map(|stamp| stamp.elapsed() > max_idle)
            .unwrap_or(false)
    }

    /// Caller-facing view of this entry.
    pub(crate) fn view(&self) -> PooledConnection {
        PooledConnection {
            id: self.id,
            handle: Arc::clone(&self.handle),
        }
    }
}

/// A connection checked out of the pool.
///
/// This is a borrowed view: the pool keeps ownership of the underlying
/// entry, and the caller must hand the view back through
/// `PoolManager::release` when done. Dereferences to the wrapped
/// [`ConnectionHandle`].
#[derive(Clone)]
pub struct PooledConnection {
    id: Uuid,
    handle: Arc<dyn ConnectionHandle>,
}

impl PooledConnection {
    /// Identity of the pooled connection, assigned at creation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The wrapped driver-level connection.
    pub fn handle(&self) -> &Arc<dyn ConnectionHandle> {
        &self.handle
    }
}

impl Deref for PooledConnection {
    type Target = dyn ConnectionHandle;

    fn deref(&self) -> &Self::Target {
        self.handle.as_ref()
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
