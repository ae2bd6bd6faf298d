//! Idle-connection eviction

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::connection::PoolEntry;
use crate::manager::PoolManager;

/// Unlink every entry idle longer than `max_idle`, returning the expired
/// entries so the caller can close them outside the pool lock.
pub(crate) fn collect_expired(
    entries: &mut VecDeque<PoolEntry>,
    max_idle: Duration,
) -> Vec<PoolEntry> {
    let mut expired = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        if entries[i].expired(max_idle) {
            if let Some(entry) = entries.remove(i) {
                expired.push(entry);
            }
        } else {
            i += 1;
        }
    }
    expired
}

/// Run idle eviction on a timer, independent of reserve traffic.
///
/// The sweep already runs at the top of every `reserve`; this task covers
/// pools that sit without reservations for long stretches. The returned
/// handle can be aborted to stop the task.
pub fn spawn_reaper(pool: Arc<PoolManager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            pool.evict_idle().await;
        }
    })
}
