//! JDBX Pool - bounded connection pooling over JDBX drivers
//!
//! Maintains a bounded set of pre-established driver connections that
//! callers reserve and release. Connections are kept healthy either by a
//! periodic keepalive probe or by idle-timeout eviction; the two strategies
//! are mutually exclusive per configuration.
//!
//! # Example
//!
//! ```ignore
//! use jdbx_pool::{PoolConfig, PoolManager};
//!
//! let config = PoolConfig::new("jdbc:pg:localhost/app")
//!     .with_sizes(2, 10)
//!     .with_max_idle_ms(60_000);
//!
//! let pool = PoolManager::new(config, registry);
//! pool.initialize().await?;
//!
//! let conn = pool.reserve().await?;
//! conn.execute("SELECT 1").await?;
//! pool.release(conn)?;
//! ```

mod config;
mod connection;
mod factory;
mod keepalive;
mod manager;
mod reaper;
mod status;


pub use config::{KeepaliveConfig, PoolConfig};
pub use connection::PooledConnection;
pub use manager::PoolManager;
pub use reaper::spawn_reaper;
pub use status::{ConnectionStatus, PoolStatus};
