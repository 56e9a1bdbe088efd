//! TOML-based configuration for keyhook.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\keyhook\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/keyhook/config.toml` or `~/.config/keyhook/config.toml`
//! - macOS:    `~/Library/Application Support/keyhook/config.toml`
//!
//! ```toml
//! [capture]
//! start_enabled = false
//! channel_capacity = 512
//! startup_timeout_ms = 2000
//! ignore_injected = false
//! skip_modifier_keys = false
//!
//! [logging]
//! log_level = "info"
//!
//! [output]
//! format = "text"
//! heartbeat_secs = 5
//! ```
//!
//! # Serde default values
//!
//! Every section and every field has a default, so a missing file, a missing
//! section, or a missing key all fall back to the values above.

use std::path::{Path, PathBuf};
use std::time::Duration;

use keyhook_core::channel::DEFAULT_CAPACITY;
use keyhook_core::PipelineOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::application::capture::CaptureOptions;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Hook thread and delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Whether the hook is installed as soon as capture starts.
    #[serde(default)]
    pub start_enabled: bool,
    /// Events held for the consumer before new ones are dropped.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// How long to wait for the hook thread to become ready.
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
    /// Ignore key events synthesised by other programs.
    #[serde(default)]
    pub ignore_injected: bool,
    /// Do not report Shift/Ctrl/Alt presses as events of their own.
    #[serde(default)]
    pub skip_modifier_keys: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// How the binary prints captured events.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Seconds between "still listening" messages while capturing.  0 disables.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_channel_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_startup_timeout_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_heartbeat_secs() -> u64 {
    5
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            start_enabled: false,
            channel_capacity: default_channel_capacity(),
            startup_timeout_ms: default_startup_timeout_ms(),
            ignore_injected: false,
            skip_modifier_keys: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

impl CaptureConfig {
    pub fn to_options(&self) -> CaptureOptions {
        CaptureOptions {
            start_enabled: self.start_enabled,
            channel_capacity: self.channel_capacity,
            startup_timeout: Duration::from_millis(self.startup_timeout_ms),
            pipeline: PipelineOptions {
                ignore_injected: self.ignore_injected,
                skip_modifier_keys: self.skip_modifier_keys,
            },
        }
    }
}

impl OutputConfig {
    /// `None` when the heartbeat is disabled.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        (self.heartbeat_secs > 0).then(|| Duration::from_secs(self.heartbeat_secs))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the platform config file.
///
/// On first run the file is created with the defaults, so there is a file to
/// edit afterwards.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_or_init_config_at(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, writing the defaults there first if the file
/// does not exist.
pub fn load_or_init_config_at(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        return load_config_from(path);
    }
    let config = AppConfig::default();
    save_config_to(&config, path)?;
    debug!(path = %path.display(), "wrote default configuration");
    Ok(config)
}

/// Loads `AppConfig` from `path`, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `keyhook` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("keyhook"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keyhook"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("keyhook")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
