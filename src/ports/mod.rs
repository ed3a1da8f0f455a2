//! Port traits at the I/O boundary.

pub mod config_port;
pub mod record_port;
