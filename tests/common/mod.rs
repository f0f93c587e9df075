// Common test utilities

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod surface;
#[allow(dead_code)]
pub mod tracing;
