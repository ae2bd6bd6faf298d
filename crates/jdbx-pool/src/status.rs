//! Pool status reporting types

use serde::Serialize;
use uuid::Uuid;

/// Liveness snapshot of one pooled connection.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub id: Uuid,
    pub closed: bool,
    pub read_only: bool,
    pub valid: bool,
}

/// Snapshot of the pool's current state.
///
/// `pool` describes the available connections, `rpool` the reserved ones.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStatus {
    pub available: usize,
    pub reserved: usize,
    pub pool: Vec<ConnectionStatus>,
    pub rpool: Vec<ConnectionStatus>,
}

impl PoolStatus {
    /// Total number of connections the pool currently owns.
    pub fn total(&self) -> usize {
        self.available + self.reserved
    }
}
