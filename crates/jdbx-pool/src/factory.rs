//! Connection factory

use std::sync::Arc;
use std::time::Instant;

use jdbx_core::{Driver, DriverRegistry, JdbxError, Result};
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::connection::PoolEntry;
use crate::keepalive;

/// Creates pool entries from the configured driver.
///
/// Resolves the driver through the registry (by pinned name when configured,
/// by URL routing otherwise), opens exactly one connection per `create`
/// call, and wires up per-connection keepalive when enabled.
pub(crate) struct ConnectionFactory {
    config: PoolConfig,
    registry: Arc<DriverRegistry>,
}

impl ConnectionFactory {
    pub(crate) fn new(config: PoolConfig, registry: Arc<DriverRegistry>) -> Self {
        Self { config, registry }
    }

    pub(crate) fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    fn resolve_driver(&self) -> Result<Arc<dyn Driver>> {
        match self.config.driver_name() {
            Some(name) => self
                .registry
                .get(name)
                .ok_or_else(|| JdbxError::Driver(format!("Unknown driver: {name}"))),
            None => self.registry.driver_for_url(self.config.url()).ok_or_else(|| {
                JdbxError::Driver(format!("No suitable driver for url: {}", self.config.url()))
            }),
        }
    }

    /// Open one new driver-level connection and wrap it for the pool.
    ///
    /// A connect failure propagates as `ConnectionCreation`; nothing
    /// partially constructed is ever pooled.
    pub(crate) async fn create(&self) -> Result<PoolEntry> {
        let driver = self.resolve_driver()?;

        let handle = driver
            .connect(self.config.url(), self.config.credentials())
            .await
            .map_err(|e| JdbxError::ConnectionCreation(e.to_string()))?;

        let id = Uuid::new_v4();

        let keepalive = if self.config.keepalive().enabled() {
            Some(keepalive::spawn(
                id,
                Arc::clone(&handle),
                self.config.keepalive().clone(),
            ))
        } else {
            None
        };

        let last_idle_at = self.config.max_idle().map(|_| Instant::now());

        tracing::debug!(connection_id = %id, driver = %driver.name(), "connection created");

        Ok(PoolEntry {
            id,
            handle,
            last_idle_at,
            keepalive,
        })
    }
}
