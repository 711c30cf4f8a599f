//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a small TOML file. Every field has a built-in
//! default, so running without any file is supported.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `FLOWSTATE_CONFIG` environment variable
//! 3. Platform config dir (`~/.config/flowstate/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A file named explicitly (1 or 2) must exist and parse. A file at the
//! platform location is optional; if it is missing or broken the loader logs
//! a warning and continues with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FLOWSTATE_CONFIG";

/// Default lookahead horizon for cue scheduling (milliseconds)
pub const DEFAULT_LOOKAHEAD_WINDOW_MS: u64 = 5000;

/// Default host tick cadence (milliseconds)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 250;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub scheduler: SchedulerConfig,
    pub workout: WorkoutConfig,
    pub logging: LoggingConfig,

    /// Cue id → asset label handed to the audio backend
    pub cues: BTreeMap<String, String>,
}

/// Cue scheduling settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Horizon within which cues are committed to the precise clock
    pub lookahead_window_ms: u64,

    /// How often the host drives the scheduler
    pub tick_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            lookahead_window_ms: DEFAULT_LOOKAHEAD_WINDOW_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// Segments added around every loaded workout
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkoutConfig {
    /// Get-ready interval before the first block
    pub prep_seconds: Option<f64>,

    /// Cooldown interval after the last block
    pub cooldown_seconds: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load and parse a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the scheduler cannot work with
    pub fn validate(&self) -> Result<()> {
        let scheduler = &self.scheduler;
        if scheduler.lookahead_window_ms == 0 {
            return Err(Error::Config(
                "scheduler.lookahead_window_ms must be greater than 0".to_string(),
            ));
        }
        if scheduler.tick_interval_ms == 0 {
            return Err(Error::Config(
                "scheduler.tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if scheduler.tick_interval_ms >= scheduler.lookahead_window_ms {
            return Err(Error::Config(format!(
                "scheduler.tick_interval_ms ({}) must be smaller than lookahead_window_ms ({})",
                scheduler.tick_interval_ms, scheduler.lookahead_window_ms
            )));
        }
        for (name, value) in [
            ("workout.prep_seconds", self.workout.prep_seconds),
            ("workout.cooldown_seconds", self.workout.cooldown_seconds),
        ] {
            if let Some(seconds) = value {
                if !seconds.is_finite() || seconds <= 0.0 {
                    return Err(Error::Config(format!(
                        "{} must be a positive number of seconds, got {}",
                        name, seconds
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    PlatformDefault(PathBuf),
    CompiledDefaults,
}

/// Platform config file location (`<config_dir>/flowstate/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("flowstate").join("config.toml"))
}

/// Resolve and load configuration using the process environment
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let env_path = std::env::var_os(CONFIG_ENV_VAR)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    load_config_with(cli_arg, env_path, default_config_path())
}

/// Resolve and load configuration from explicit candidates
///
/// Split out from [`load_config`] so resolution order can be exercised
/// without touching the real environment or home directory.
pub fn load_config_with(
    cli_arg: Option<&Path>,
    env_path: Option<PathBuf>,
    platform_path: Option<PathBuf>,
) -> Result<(TomlConfig, ConfigSource)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        let config = TomlConfig::load(path)?;
        config.validate()?;
        info!("Loaded config from command line: {}", path.display());
        return Ok((config, ConfigSource::CommandLine(path.to_path_buf())));
    }

    // Priority 2: Environment variable
    if let Some(path) = env_path {
        let config = TomlConfig::load(&path)?;
        config.validate()?;
        info!("Loaded config from {}: {}", CONFIG_ENV_VAR, path.display());
        return Ok((config, ConfigSource::Environment(path)));
    }

    // Priority 3: Platform config dir
    if let Some(path) = platform_path {
        if path.exists() {
            match TomlConfig::load(&path).and_then(|c| c.validate().map(|_| c)) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    return Ok((config, ConfigSource::PlatformDefault(path)));
                }
                Err(e) => {
                    warn!("Ignoring config file {}: {}", path.display(), e);
                }
            }
        }
    }

    // Priority 4: Compiled defaults
    Ok((TomlConfig::default(), ConfigSource::CompiledDefaults))
}
