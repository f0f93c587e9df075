use anyhow::{Context, Result};
use clap::Parser;
use shader_sync::config::Config;
use shader_sync::connection::ConnectionState;
use shader_sync::runtime::{self, Intent};
use shader_sync::services::transport::WebSocketConnector;
use shader_sync::services::{log_dirs, tracing_setup};
use shader_sync::session::SessionSnapshot;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

/// Headless client for the shader preview service
#[derive(Parser, Debug)]
#[command(name = "shader-sync")]
#[command(about = "Keeps shader buffers in sync with a live preview service", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Service endpoint, overrides the config file
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Path to log file (default: per-process file in the state directory)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long)]
    log_stderr: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => match log_dirs::default_config_path() {
            Some(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        },
    };
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_logging(args: &Args) -> Result<()> {
    if args.log_stderr {
        tracing_setup::init_stderr();
        return Ok(());
    }
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(log_dirs::main_log_path);
    tracing_setup::init_global(&log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    log_dirs::cleanup_stale_logs();
    Ok(())
}

/// Read newline-delimited JSON intents until EOF.
async fn read_intents(intents: mpsc::UnboundedSender<Intent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => match serde_json::from_str::<Intent>(&line) {
                Ok(intent) => {
                    if intents.send(intent).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!("Ignoring bad intent {:?}: {}", line, e),
            },
            Ok(None) => {
                tracing::info!("End of input");
                break;
            }
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }
}

/// Log the parts of the snapshot a headless user cares about.
async fn log_snapshots(mut snapshots: watch::Receiver<SessionSnapshot>) {
    let mut last_state = ConnectionState::Disconnected;
    let mut last_error: Option<String> = None;
    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.connection_state != last_state {
            tracing::info!("Connection state: {:?}", snapshot.connection_state);
            last_state = snapshot.connection_state;
        }
        if snapshot.last_error != last_error {
            if let Some(error) = &snapshot.last_error {
                tracing::warn!("Service error: {}", error);
            }
            last_error = snapshot.last_error.clone();
        }
        for buffer in &snapshot.buffers {
            for entry in &buffer.diagnostics {
                tracing::debug!(
                    "{}:{}: {} {}: {}",
                    buffer.file_path,
                    entry.line_number,
                    entry.error_type,
                    entry.error_code,
                    entry.message
                );
            }
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    init_logging(&args)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let result = runtime.block_on(async move {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());

        tokio::spawn(read_intents(intent_tx));
        tokio::spawn(log_snapshots(snapshot_rx));

        runtime::run(config, WebSocketConnector, intent_rx, snapshot_tx).await
    });

    // The stdin reader may still be parked in a blocking read
    runtime.shutdown_background();
    result
}
