//! Live buffer synchronization for a shader authoring client.
//!
//! Keeps a set of shader source buffers in sync with a remote preview and
//! compiler service: edits are batched into periodic writes over a single
//! reconnecting channel, and compiler output comes back as line decorations.
//!
//! [`session::Session`] is the engine; the `runtime` feature adds the event
//! loop, the WebSocket transport and logging setup.

pub mod buffer;
pub mod config;
pub mod connection;
pub mod decoration;
pub mod diagnostics;
pub mod project;
pub mod protocol;
pub mod scheduler;
pub mod session;
pub mod version;

#[cfg(feature = "runtime")]
pub mod runtime;
#[cfg(feature = "runtime")]
pub mod services;
