//! Server configuration: CLI (and env) over `[server]` in a TOML file over
//! defaults.
//!
//! The file is `~/.config/tasklists-server/config.toml` unless `--config`
//! names one, in which case it must exist.

use std::path::{Path, PathBuf};

use crate::api::normalize_base_path;

/// Errors that can occur when loading server configuration.
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

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerConfigFile {
    server: ServerSection,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    base_path: Option<String>,
}

/// CLI arguments for the server.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Task list REST server")]
pub struct ServerCliArgs {
    /// Address to bind the server to.
    #[arg(short, long, env = "TASKLISTS_SERVER_ADDR")]
    pub bind: Option<String>,

    /// Path prefix the API is served under (e.g. `/api`, or `/` for none).
    #[arg(long, env = "TASKLISTS_BASE_PATH")]
    pub base_path: Option<String>,

    /// Path to config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKLISTS_SERVER_LOG")]
    pub log_level: String,
}

/// Where and under which prefix the API is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `0.0.0.0:8080`.
    pub bind_addr: String,
    /// Normalized route prefix: `""` for the root, otherwise `/segment`.
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            base_path: "/api".to_string(),
        }
    }
}

impl ServerConfig {
    /// Resolves the configuration for `cli`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit config file is missing, or any
    /// config file cannot be read or parsed.
    pub fn load(cli: &ServerCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file.server))
    }

    fn resolve(cli: &ServerCliArgs, file: ServerSection) -> Self {
        let defaults = Self::default();
        let base_path = cli
            .base_path
            .clone()
            .or(file.base_path)
            .unwrap_or(defaults.base_path);

        Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.bind_addr)
                .unwrap_or(defaults.bind_addr),
            base_path: normalize_base_path(&base_path),
        }
    }
}

fn load_config_file(explicit_path: Option<&Path>) -> Result<ServerConfigFile, ConfigError> {
    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => match dirs::config_dir() {
            Some(dir) => dir.join("tasklists-server").join("config.toml"),
            None => return Ok(ServerConfigFile::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if explicit_path.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
            Ok(ServerConfigFile::default())
        }
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}
