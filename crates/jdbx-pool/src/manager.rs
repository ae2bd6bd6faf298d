//! Bounded connection pool manager

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use jdbx_core::{ConnectionHandle, DriverRegistry, JdbxError, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::connection::{PoolEntry, PooledConnection};
use crate::factory::ConnectionFactory;
use crate::reaper;
use crate::status::{ConnectionStatus, PoolStatus};

/// How long a `status()` validity probe may wait on the driver.
const VALIDITY_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Mutable pool state, guarded by a single mutex.
///
/// No await happens while the lock is held; driver I/O is always done
/// outside the critical section.
struct PoolState {
    /// Connections not currently handed to a caller. `release` pushes to the
    /// front and `reserve` pops from the front, so the most-recently-released
    /// (warmest) connection is reused first.
    available: VecDeque<PoolEntry>,
    /// Connections currently checked out. Disjoint from `available` by id.
    reserved: VecDeque<PoolEntry>,
    /// Reservations currently opening a connection outside the lock. Counted
    /// against `max_size` so concurrent overflow reservations cannot
    /// overshoot the cap.
    pending_creations: usize,
    initialized: bool,
    initializing: bool,
}

/// The bounded set of available and reserved connections.
///
/// Callers `initialize` once, then `reserve` a connection, use it, and
/// `release` it back. Idle eviction runs at the top of every `reserve` (and
/// optionally on a timer, see [`crate::spawn_reaper`]); keepalive probes run
/// per connection on their own timers. `purge` tears everything down and
/// returns the pool to its pre-initialize state.
pub struct PoolManager {
    config: PoolConfig,
    factory: ConnectionFactory,
    state: Mutex<PoolState>,
    ready_tx: watch::Sender<bool>,
}

impl PoolManager {
    /// Create a pool manager over the given driver registry.
    ///
    /// No connections are opened until [`initialize`](Self::initialize).
    pub fn new(config: PoolConfig, registry: Arc<DriverRegistry>) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            factory: ConnectionFactory::new(config.clone(), registry),
            config,
            state: Mutex::new(PoolState {
                available: VecDeque::new(),
                reserved: VecDeque::new(),
                pending_creations: 0,
                initialized: false,
                initializing: false,
            }),
            ready_tx,
        }
    }

    /// The pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Observe the `initialized` lifecycle event.
    ///
    /// The receiver yields `false` until `initialize` completes
    /// successfully, then `true`. Useful for readiness probes.
    pub fn ready(&self) -> watch::Receiver<bool> {
        self.ready_tx.subscribe()
    }

    /// Current available/reserved counts, without probing any connection.
    pub fn counts(&self) -> (usize, usize) {
        let state = self.state.lock();
        (state.available.len(), state.reserved.len())
    }

    /// Build the pool: verify the pinned driver (when configured) and open
    /// `min_size` connections in parallel.
    ///
    /// Callable exactly once per lifecycle; a second call fails with
    /// `Lifecycle` until the pool is purged. If any creation fails the pool
    /// does not start partially populated: siblings that did connect are
    /// closed and the first error is returned.
    #[tracing::instrument(skip(self), fields(min_size = self.config.min_size()))]
    pub async fn initialize(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.initialized || state.initializing {
                return Err(JdbxError::Lifecycle("pool is already initialized".into()));
            }
            state.initializing = true;
        }

        let result = self.populate().await;

        let mut state = self.state.lock();
        state.initializing = false;
        match result {
            Ok(entries) => {
                let count = entries.len();
                state.available.extend(entries);
                state.initialized = true;
                drop(state);
                self.ready_tx.send_replace(true);
                tracing::info!(connections = count, "pool initialized");
                Ok(())
            }
            Err(error) => {
                drop(state);
                tracing::error!(%error, "pool initialization failed");
                Err(error)
            }
        }
    }

    async fn populate(&self) -> Result<Vec<PoolEntry>> {
        if let Some(name) = self.config.driver_name()
            && !self.factory.registry().contains(name)
        {
            return Err(JdbxError::Driver(format!("Unknown driver: {name}")));
        }

        let creations = (0..self.config.min_size()).map(|_| self.factory.create());
        let results = join_all(creations).await;

        let mut entries = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => Ok(entries),
            Some(error) => {
                // All-or-nothing: close the siblings that did connect.
                close_entries(entries).await;
                Err(error)
            }
        }
    }

    /// Reserve a connection for exclusive use.
    ///
    /// Reuses the most-recently-released available connection; if none is
    /// available and capacity allows, opens a new one. Fails with
    /// `PoolExhausted` when the pool is at `max_size` or not initialized.
    pub async fn reserve(&self) -> Result<PooledConnection> {
        self.reserve_inner(None).await
    }

    /// Like [`reserve`](Self::reserve), but bound the new-connection path by
    /// `timeout`, failing with `ReservationTimeout` when exceeded.
    ///
    /// The reuse path never blocks on driver I/O and is unaffected.
    pub async fn reserve_timeout(&self, timeout: Duration) -> Result<PooledConnection> {
        self.reserve_inner(Some(timeout)).await
    }

    async fn reserve_inner(&self, timeout: Option<Duration>) -> Result<PooledConnection> {
        self.evict_idle().await;

        {
            let mut state = self.state.lock();
            if !state.initialized {
                return Err(JdbxError::PoolExhausted);
            }
            if let Some(mut entry) = state.available.pop_front() {
                entry.touch();
                let view = entry.view();
                state.reserved.push_front(entry);
                tracing::debug!(connection_id = %view.id(), "connection reserved");
                return Ok(view);
            }
            if state.reserved.len() + state.pending_creations >= self.config.max_size() {
                return Err(JdbxError::PoolExhausted);
            }
            state.pending_creations += 1;
        }

        // Driver I/O happens outside the critical section; the pending slot
        // reserved above keeps the capacity invariant intact meanwhile.
        let created = match timeout {
            Some(limit) => match tokio::time::timeout(limit, self.factory.create()).await {
                Ok(result) => result,
                Err(_) => Err(JdbxError::ReservationTimeout(limit)),
            },
            None => self.factory.create().await,
        };

        let entry = {
            let mut state = self.state.lock();
            state.pending_creations -= 1;
            match created {
                Ok(entry) if state.initialized => {
                    let view = entry.view();
                    state.reserved.push_front(entry);
                    tracing::debug!(connection_id = %view.id(), "connection created and reserved");
                    return Ok(view);
                }
                // Purged while we were connecting; the fresh connection has
                // no pool to live in.
                Ok(entry) => entry,
                Err(error) => {
                    tracing::error!(%error, "failed to create connection for reservation");
                    return Err(error);
                }
            }
        };

        close_entries(vec![entry]).await;
        Err(JdbxError::PoolExhausted)
    }

    /// Return a reserved connection to the pool.
    ///
    /// The entry moves to the front of `available` (LIFO reuse). Releasing a
    /// connection the pool does not hold in `reserved` is a silent no-op.
    #[tracing::instrument(skip(self, conn), fields(connection_id = %conn.id()))]
    pub fn release(&self, conn: PooledConnection) -> Result<()> {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(JdbxError::InvalidConnection(
                "pool is not initialized".into(),
            ));
        }

        let position = state.reserved.iter().position(|e| e.id == conn.id());
        let Some(position) = position else {
            tracing::debug!("released connection not found in reserved set");
            return Ok(());
        };

        if let Some(mut entry) = state.reserved.remove(position) {
            entry.touch();
            state.available.push_front(entry);
            tracing::debug!("connection released");
        }
        Ok(())
    }

    /// Evict every connection that has exceeded the configured idle timeout.
    ///
    /// No-op when `max_idle` is unset (keepalive mode). Both collections are
    /// swept: a reserved entry that expires is unlinked and closed even
    /// though a caller still holds its view; that caller's next driver call
    /// fails against the closed handle. Close errors are swallowed so one
    /// bad connection cannot block eviction of the rest.
    pub async fn evict_idle(&self) {
        let Some(max_idle) = self.config.max_idle() else {
            return;
        };

        let expired = {
            let mut state = self.state.lock();
            let mut expired = reaper::collect_expired(&mut state.available, max_idle);
            expired.extend(reaper::collect_expired(&mut state.reserved, max_idle));
            expired
        };

        if expired.is_empty() {
            return;
        }
        tracing::debug!(count = expired.len(), "evicting idle connections");
        close_entries(expired).await;
    }

    /// Snapshot the pool, probing each connection's liveness.
    ///
    /// Read-only; never mutates pool state and never fails as a whole. A
    /// connection that errors on a probe is reported at its worst-known
    /// state instead of aborting the call.
    pub async fn status(&self) -> PoolStatus {
        let (available, reserved) = {
            let state = self.state.lock();
            let snapshot = |entries: &VecDeque<PoolEntry>| -> Vec<_> {
                entries
                    .iter()
                    .map(|e| (e.id, Arc::clone(&e.handle)))
                    .collect()
            };
            (snapshot(&state.available), snapshot(&state.reserved))
        };

        PoolStatus {
            available: available.len(),
            reserved: reserved.len(),
            pool: probe_all(available).await,
            rpool: probe_all(reserved).await,
        }
    }

    /// Close every connection in both collections and reset the pool to its
    /// pre-initialize state.
    ///
    /// Closes run concurrently and best-effort; individual failures are
    /// logged, not propagated. After `purge` the pool must be re-initialized
    /// before reuse, and `reserve` fails with `PoolExhausted` until then.
    #[tracing::instrument(skip(self))]
    pub async fn purge(&self) {
        let entries = {
            let mut state = self.state.lock();
            state.initialized = false;
            let mut entries: Vec<PoolEntry> = state.available.drain(..).collect();
            entries.extend(state.reserved.drain(..));
            entries
        };

        self.ready_tx.send_replace(false);
        tracing::info!(connections = entries.len(), "purging pool");
        close_entries(entries).await;
    }
}

/// Close a batch of entries concurrently, stopping their keepalive tasks.
/// Individual close failures are logged and swallowed.
async fn close_entries(entries: Vec<PoolEntry>) {
    let closes = entries.into_iter().map(|entry| async move {
        if let Some(keepalive) = &entry.keepalive {
            keepalive.abort();
        }
        if let Err(error) = entry.handle.close().await {
            tracing::warn!(connection_id = %entry.id, %error, "failed to close connection");
        }
    });
    join_all(closes).await;
}

async fn probe_all(conns: Vec<(Uuid, Arc<dyn ConnectionHandle>)>) -> Vec<ConnectionStatus> {
    join_all(conns.into_iter().map(|(id, handle)| probe_one(id, handle))).await
}

async fn probe_one(id: Uuid, handle: Arc<dyn ConnectionHandle>) -> ConnectionStatus {
    let closed = handle.is_closed();

    let read_only = match handle.is_read_only().await {
        Ok(read_only) => read_only,
        Err(error) => {
            tracing::warn!(connection_id = %id, %error, "read-only probe failed");
            false
        }
    };

    match handle.is_valid(VALIDITY_PROBE_TIMEOUT).await {
        Ok(valid) => ConnectionStatus {
            id,
            closed,
            read_only,
            valid,
        },
        Err(error) => {
            tracing::warn!(connection_id = %id, %error, "validity probe failed");
            // Unprobeable: report the worst-known state.
            ConnectionStatus {
                id,
                closed: true,
                read_only,
                valid: false,
            }
        }
    }
}
