//! Configuration system for the `tasklists` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/tasklists/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    sync: SyncFileConfig,
    ui: UiFileConfig,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    channel_capacity: Option<usize>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    timestamp_format: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (e.g. `http://127.0.0.1:8080/api`).
    /// `None` runs the offline demo against an in-memory store.
    pub api_url: Option<String>,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Capacity of the sync worker's command and event channels.
    pub channel_capacity: usize,
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Timestamp format for the status bar (chrono).
    pub timestamp_format: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout: Duration::from_secs(10),
            channel_capacity: crate::sync::DEFAULT_CHANNEL_CAPACITY,
            poll_timeout: Duration::from_millis(50),
            timestamp_format: "%H:%M:%S".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path is tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            api_url: cli
                .api_url
                .clone()
                .or_else(|| file.api.url.clone())
                .filter(|url| !url.trim().is_empty()),
            request_timeout: cli
                .request_timeout_secs
                .or(file.api.request_timeout_secs)
                .map_or(defaults.request_timeout, Duration::from_secs),
            channel_capacity: file
                .sync
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            timestamp_format: file
                .ui
                .timestamp_format
                .clone()
                .filter(|f| is_valid_timestamp_format(f))
                .unwrap_or(defaults.timestamp_format),
        }
    }
}

/// Whether chrono can render `format` without error.
fn is_valid_timestamp_format(format: &str) -> bool {
    chrono::format::StrftimeItems::new(format)
        .all(|item| !matches!(item, chrono::format::Item::Error))
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Terminal task lists backed by a REST store")]
pub struct CliArgs {
    /// Base URL of the task list API. Omit to run the offline demo.
    #[arg(long, env = "TASKLISTS_API_URL")]
    pub api_url: Option<String>,

    /// HTTP request timeout in seconds.
    #[arg(long, env = "TASKLISTS_REQUEST_TIMEOUT")]
    pub request_timeout_secs: Option<u64>,

    /// Path to config file (default: `~/.config/tasklists/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKLISTS_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/tasklists.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Load and parse a TOML config file.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("tasklists").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, None);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.poll_timeout, Duration::from_millis(50));
        assert_eq!(config.timestamp_format, "%H:%M:%S");
    }

    #[test]
    fn toml_parsing_full() {
        let toml_str = r#"
[api]
url = "http://tasks.example.com/api"
request_timeout_secs = 3

[sync]
channel_capacity = 16

[ui]
poll_timeout_ms = 100
timestamp_format = "%H:%M"
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file);

        assert_eq!(config.api_url.as_deref(), Some("http://tasks.example.com/api"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.channel_capacity, 16);
        assert_eq!(config.poll_timeout, Duration::from_millis(100));
        assert_eq!(config.timestamp_format, "%H:%M");
    }

    #[test]
    fn toml_parsing_partial() {
        let file: ConfigFile = toml::from_str("[ui]\npoll_timeout_ms = 20\n").unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file);

        assert_eq!(config.poll_timeout, Duration::from_millis(20));
        assert_eq!(config.api_url, None);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn cli_overrides_file() {
        let toml_str = r#"
[api]
url = "http://from-file/api"
request_timeout_secs = 3
"#;
        let file: ConfigFile = toml::from_str(toml_str).unwrap();
        let cli = CliArgs {
            api_url: Some("http://from-cli/api".to_string()),
            request_timeout_secs: Some(30),
            ..Default::default()
        };
        let config = ClientConfig::resolve(&cli, &file);

        assert_eq!(config.api_url.as_deref(), Some("http://from-cli/api"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_api_url_means_offline() {
        let cli = CliArgs {
            api_url: Some("  ".to_string()),
            ..Default::default()
        };
        let config = ClientConfig::resolve(&cli, &ConfigFile::default());
        assert_eq!(config.api_url, None);
    }

    #[test]
    fn invalid_timestamp_format_falls_back() {
        let file: ConfigFile = toml::from_str("[ui]\ntimestamp_format = \"%Q\"\n").unwrap();
        let config = ClientConfig::resolve(&CliArgs::default(), &file);
        assert_eq!(config.timestamp_format, "%H:%M:%S");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let result: Result<ConfigFile, _> = toml::from_str("[api]\nurl = 5\n");
        assert!(result.is_err());
    }

    #[test]
    fn explicit_missing_config_file_returns_error() {
        let result = load_config_file(Some(std::path::Path::new("/nonexistent/tasklists.toml")));
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }
}
