//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `hestia.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Recipe persistence settings.
    pub storage: StorageConfig,
    /// Event broker settings.
    pub broker: BrokerConfig,
    /// Command pipeline settings.
    pub commands: CommandsConfig,
    /// Clock tick settings.
    pub clock: ClockConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
}

/// Where recipe files live.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one `<id>.json` file per recipe.
    pub recipes_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Events buffered between producers and the broker before they wait.
    pub ingest_capacity: usize,
    /// Events buffered per observer before it starts lagging.
    pub observer_capacity: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Command groups waiting for the processor before actions fail.
    pub queue_capacity: usize,
    /// How long echoed feature reports are hidden after a command.
    pub suppress_window_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Seconds between clock ticks, in `1..60`.
    pub tick_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the virtual bridge and its demo inventory.
    pub virtual_enabled: bool,
}

impl Config {
    /// Load configuration from `hestia.toml` (if present), apply
    /// environment-variable overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("hestia.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HESTIA_RECIPES_DIR") {
            self.storage.recipes_dir = PathBuf::from(val);
        }
        if let Some(val) = var("HESTIA_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let capacities = [
            ("broker.ingest_capacity", self.broker.ingest_capacity),
            ("broker.observer_capacity", self.broker.observer_capacity),
            ("commands.queue_capacity", self.commands.queue_capacity),
        ];
        if let Some((name, _)) = capacities.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Validation(format!("{name} must be non-zero")));
        }
        if self.clock.tick_secs == 0 {
            return Err(ConfigError::Validation(
                "clock.tick_secs must be non-zero".to_string(),
            ));
        }
        // time triggers match on the minute, every minute needs a tick
        if self.clock.tick_secs >= 60 {
            return Err(ConfigError::Validation(
                "clock.tick_secs must be below 60".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn suppress_window(&self) -> Duration {
        Duration::from_millis(self.commands.suppress_window_ms)
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.clock.tick_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            recipes_dir: PathBuf::from("data/recipes"),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            ingest_capacity: 256,
            observer_capacity: 256,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            suppress_window_ms: 1500,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_secs: 15 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "hestiad=info,hestia_app=info,hestia_adapter_virtual=info".to_string(),
        }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            virtual_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
