//! JDBX Core - driver-facing abstractions for the JDBX connection pool
//!
//! This crate defines the narrow surface the pool needs from a database
//! driver:
//!
//! - `ConnectionHandle` - a live driver-level connection
//! - `Driver` - opens connections for the URLs it accepts
//! - `DriverRegistry` - named driver lookup and URL routing
//! - `JdbxError` / `Result` - the shared error type

mod connection;
mod driver;
mod error;


pub use connection::*;
pub use driver::*;
pub use error::*;
