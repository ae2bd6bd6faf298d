//! Pool configuration types

use std::time::Duration;

use jdbx_core::Credentials;
use serde::{Deserialize, Serialize};

/// Keepalive probe settings.
///
/// When enabled, every pooled connection gets a recurring background task
/// that issues `probe_query` at `interval_ms` cadence so the server or an
/// intermediate firewall does not reap the connection while it sits idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepaliveConfig {
    enabled: bool,
    interval_ms: u64,
    probe_query: String,
}

impl KeepaliveConfig {
    /// Create an enabled keepalive configuration.
    pub fn new(interval_ms: u64, probe_query: impl Into<String>) -> Self {
        Self {
            enabled: true,
            interval_ms,
            probe_query: probe_query.into(),
        }
    }

    /// Create a disabled keepalive configuration with the stock defaults
    /// (60 second interval, `SELECT 1` probe).
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            interval_ms: 60_000,
            probe_query: "SELECT 1".into(),
        }
    }

    /// Whether keepalive probing is enabled.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Probe cadence as a Duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// The trivial query issued on each probe.
    pub fn probe_query(&self) -> &str {
        &self.probe_query
    }
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Configuration for a connection pool.
///
/// Constructed once at startup and read-only thereafter. `max_idle_ms` is
/// only honored while keepalive is disabled: a connection that is probed
/// never goes idle, so the two are alternative strategies for the same
/// problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    url: String,
    #[serde(default)]
    credentials: Credentials,
    #[serde(default)]
    driver_name: Option<String>,
    min_size: usize,
    max_size: usize,
    #[serde(default)]
    keepalive: KeepaliveConfig,
    #[serde(default)]
    max_idle_ms: Option<u64>,
}

impl PoolConfig {
    /// Create a configuration for the given connection URL.
    ///
    /// Defaults to a pool of exactly one connection with keepalive and
    /// idle eviction both disabled.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: Credentials::default(),
            driver_name: None,
            min_size: 1,
            max_size: 1,
            keepalive: KeepaliveConfig::default(),
            max_idle_ms: None,
        }
    }

    /// Set the minimum and maximum pool sizes.
    ///
    /// # Panics
    ///
    /// Panics if `min_size` is 0 or exceeds `max_size`.
    pub fn with_sizes(mut self, min_size: usize, max_size: usize) -> Self {
        assert!(min_size >= 1, "min_size must be at least 1, got {min_size}");
        assert!(
            min_size <= max_size,
            "min_size ({min_size}) cannot exceed max_size ({max_size})"
        );
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Set the connection credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Pin connection creation to a named driver instead of routing by URL.
    pub fn with_driver_name(mut self, name: impl Into<String>) -> Self {
        self.driver_name = Some(name.into());
        self
    }

    /// Set the keepalive configuration.
    ///
    /// Enabling keepalive clears any configured idle timeout.
    pub fn with_keepalive(mut self, keepalive: KeepaliveConfig) -> Self {
        if keepalive.enabled() {
            self.max_idle_ms = None;
        }
        self.keepalive = keepalive;
        self
    }

    /// Evict connections idle for longer than `max_idle_ms`.
    ///
    /// Ignored while keepalive is enabled.
    pub fn with_max_idle_ms(mut self, max_idle_ms: u64) -> Self {
        self.max_idle_ms = Some(max_idle_ms);
        self
    }

    /// The connection URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The connection credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The pinned driver name, if any.
    pub fn driver_name(&self) -> Option<&str> {
        self.driver_name.as_deref()
    }

    /// Minimum pool size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum pool size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The keepalive settings.
    pub fn keepalive(&self) -> &KeepaliveConfig {
        &self.keepalive
    }

    /// The idle timeout, or `None` when unset or preempted by keepalive.
    pub fn max_idle(&self) -> Option<Duration> {
        if self.keepalive.enabled() {
            return None;
        }
        self.max_idle_ms.map(Duration::from_millis)
    }
}
