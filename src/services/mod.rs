//! Runtime services: logging and the socket transport.

pub mod log_dirs;
pub mod tracing_setup;
pub mod transport;
