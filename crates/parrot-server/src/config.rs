//! Server configuration loading from file and environment variables.

use parrot_voice::{ConverterConfig, ProviderConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Audio cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote speech provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Telephony transcoder settings.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Audio cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Directory holding cached artifacts. Created on startup if missing.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "parrot_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults, then
/// applies environment overrides.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

/// Applies environment variable overrides using `lookup` to read variables.
///
/// - `ELEVENLABS_API_KEY` overrides `provider.api_key`
/// - `PORT` / `PARROT_PORT` override `server.port` (`PARROT_PORT` wins)
/// - `CACHE_DIR` / `PARROT_CACHE_DIR` override `cache.dir` (`PARROT_CACHE_DIR` wins)
/// - `PARROT_HOST` overrides `server.host`
/// - `PARROT_PROVIDER_URL` overrides `provider.base_url`
/// - `PARROT_FFMPEG_PATH` overrides `converter.binary`
/// - `PARROT_LOG_LEVEL` overrides `logging.level`
/// - `PARROT_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// Host and port values that fail to parse are logged at warn level and skipped.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty("ELEVENLABS_API_KEY") {
        config.provider.api_key = key;
    }
    if let Some(host) = non_empty("PARROT_HOST") {
        match host.parse() {
            Ok(parsed) => config.server.host = parsed,
            Err(e) => tracing::warn!(
                value = %host,
                error = %e,
                "ignoring invalid PARROT_HOST"
            ),
        }
    }
    for name in ["PORT", "PARROT_PORT"] {
        if let Some(port) = non_empty(name) {
            match port.parse() {
                Ok(parsed) => config.server.port = parsed,
                Err(e) => tracing::warn!(
                    var = name,
                    value = %port,
                    error = %e,
                    "ignoring invalid port override"
                ),
            }
        }
    }
    for name in ["CACHE_DIR", "PARROT_CACHE_DIR"] {
        if let Some(dir) = non_empty(name) {
            config.cache.dir = PathBuf::from(dir);
        }
    }
    if let Some(url) = non_empty("PARROT_PROVIDER_URL") {
        config.provider.base_url = url;
    }
    if let Some(binary) = non_empty("PARROT_FFMPEG_PATH") {
        config.converter.binary = PathBuf::from(binary);
    }
    if let Some(level) = non_empty("PARROT_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = non_empty("PARROT_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
}
