//! Port traits (interfaces) for hexagonal architecture.

pub mod config_port;
pub mod persistence_port;
pub mod source_port;
