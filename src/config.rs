use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// WebSocket endpoint of the preview/compiler service
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How often to try (re)connecting while disconnected
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_ms: u64,

    /// How often pending edits are flushed to the service
    #[serde(default = "default_flush_interval")]
    pub flush_interval_ms: u64,

    /// How often the playhead position is requested
    #[serde(default = "default_time_poll_interval")]
    pub time_poll_interval_ms: u64,

    /// Whole-project upserts whose payload is larger than this are dropped.
    /// Measured before the payload is escaped into the envelope, so the
    /// frame on the wire can be up to about twice this size.
    #[serde(default = "default_max_project_payload")]
    pub max_project_payload_bytes: usize,
}

fn default_endpoint() -> String {
    "ws://localhost:8080/ws/".to_string()
}

fn default_reconnect_interval() -> u64 {
    1000
}

fn default_flush_interval() -> u64 {
    1000
}

fn default_time_poll_interval() -> u64 {
    500
}

fn default_max_project_payload() -> usize {
    50 * 1024 // 50 KiB
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect_interval_ms: default_reconnect_interval(),
            flush_interval_ms: default_flush_interval(),
            time_poll_interval_ms: default_time_poll_interval(),
            max_project_payload_bytes: default_max_project_payload(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.as_ref().display())))?;

        let config: Config =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(
                "No config at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.validate()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path.as_ref(), contents).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn time_poll_interval(&self) -> Duration {
        Duration::from_millis(self.time_poll_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must be a ws:// or wss:// URL, got '{}'",
                self.endpoint
            )));
        }

        for (name, value) in [
            ("reconnect_interval_ms", self.reconnect_interval_ms),
            ("flush_interval_ms", self.flush_interval_ms),
            ("time_poll_interval_ms", self.time_poll_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.max_project_payload_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "max_project_payload_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(msg) => write!(f, "IO error: {msg}"),
            ConfigError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::SerializeError(msg) => write!(f, "Serialize error: {msg}"),
            ConfigError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
