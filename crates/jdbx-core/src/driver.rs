//! Database driver trait and registry

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{ConnectionHandle, JdbxError, Result};

/// Credentials and extra driver properties for opening a connection.
///
/// Explicit entries in `properties` take precedence over the `user` and
/// `password` fields, mirroring how JDBC merges a `Properties` bag with the
/// user/password arguments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Credentials {
    /// Create credentials with a user and password.
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            password: Some(password.into()),
            properties: HashMap::new(),
        }
    }

    /// Set an extra driver property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Resolve a property, falling back to the `user`/`password` fields for
    /// the well-known keys.
    pub fn property(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.properties.get(key) {
            return Some(value);
        }
        match key {
            "user" => self.user.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

/// A database driver that can open connections for the URLs it accepts.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Unique identifier for this driver, used as the registry key.
    fn name(&self) -> &str;

    /// Whether this driver can handle the given connection URL.
    fn accepts_url(&self, url: &str) -> bool;

    /// Open a new connection.
    async fn connect(&self, url: &str, credentials: &Credentials)
    -> Result<Arc<dyn ConnectionHandle>>;
}

/// Registry of database drivers.
///
/// An explicit value injected wherever connections are opened; there is no
/// process-wide singleton. Lookup is either by name or by asking each driver
/// whether it accepts a URL, in registration order.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: RwLock<Vec<Arc<dyn Driver>>>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver, replacing any previous driver with the same name.
    pub fn register(&self, driver: Arc<dyn Driver>) {
        let mut drivers = self.drivers.write();
        drivers.retain(|d| d.name() != driver.name());
        tracing::debug!(driver = %driver.name(), "driver registered");
        drivers.push(driver);
    }

    /// Look up a driver by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.read().iter().find(|d| d.name() == name).cloned()
    }

    /// Check whether a driver with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.drivers.read().iter().any(|d| d.name() == name)
    }

    /// Find the first registered driver that accepts the given URL.
    pub fn driver_for_url(&self, url: &str) -> Option<Arc<dyn Driver>> {
        self.drivers.read().iter().find(|d| d.accepts_url(url)).cloned()
    }

    /// Open a connection through whichever driver accepts the URL.
    pub async fn connect(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<Arc<dyn ConnectionHandle>> {
        let driver = self
            .driver_for_url(url)
            .ok_or_else(|| JdbxError::Driver(format!("No suitable driver for url: {url}")))?;
        driver.connect(url, credentials).await
    }
}
