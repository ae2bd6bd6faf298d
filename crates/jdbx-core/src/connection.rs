//! Connection handle trait

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// A live driver-level database connection.
///
/// Everything beyond this surface (statement preparation, result sets,
/// metadata) belongs to the driver and is invisible to the pool. A handle is
/// shared behind an `Arc`, so every method takes `&self`.
#[async_trait]
pub trait ConnectionHandle: Send + Sync + Debug {
    /// Execute a statement, discarding any result rows.
    async fn execute(&self, query: &str) -> Result<()>;

    /// Check whether the connection has been closed.
    fn is_closed(&self) -> bool;

    /// Check whether the connection is in read-only mode.
    async fn is_read_only(&self) -> Result<bool>;

    /// Check that the connection is still usable, waiting at most `timeout`
    /// for the driver to answer.
    async fn is_valid(&self, timeout: Duration) -> Result<bool>;

    /// Close the connection.
    ///
    /// Closing an already-closed connection is a no-op.
    async fn close(&self) -> Result<()>;
}
