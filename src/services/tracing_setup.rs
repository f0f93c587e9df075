//! Tracing subscriber setup
//!
//! Shared by the binary and the tests: an `EnvFilter` driven by `RUST_LOG`
//! (defaulting to `info` for this crate) in front of a plain fmt layer.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "shader_sync=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber, logging to `log_file_path`.
pub fn init_global(log_file_path: &Path) -> io::Result<()> {
    let log_file = File::create(log_file_path)?;
    build_subscriber(Arc::new(log_file)).init();
    Ok(())
}

/// Install the global subscriber, logging to stderr.
pub fn init_stderr() {
    build_subscriber(io::stderr).init();
}

/// Build a subscriber writing to `writer`.
pub fn build_subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer().with_ansi(false).with_writer(writer);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter())
}
