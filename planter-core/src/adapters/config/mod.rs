//! Configuration types for schema providers.
//!
//! # Security
//! These structs never store passwords. The connection string itself is
//! handed to the driver and redacted wherever it is displayed.

mod connection;

pub use connection::{ConnectionConfig, DEFAULT_PORT};
