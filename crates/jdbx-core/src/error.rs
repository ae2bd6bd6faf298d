//! Error types for JDBX

use std::time::Duration;

use thiserror::Error;

/// Core error type for JDBX operations
#[derive(Error, Debug)]
pub enum JdbxError {
    #[error("Connection error: {0}")]
    ConnectionCreation(String),

    #[error("No more pool connections available")]
    PoolExhausted,

    #[error("Invalid connection: {0}")]
    InvalidConnection(String),

    #[error("Timed out reserving a connection (timeout: {0:?})")]
    ReservationTimeout(Duration),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for JDBX operations
pub type Result<T> = std::result::Result<T, JdbxError>;
