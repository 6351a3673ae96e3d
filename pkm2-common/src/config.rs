//! Configuration loading
//!
//! Every setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and defaults apply.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::results::ConfidenceLevel;
use crate::{Error, Result};

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
/// Port the prediction service listens on by default
pub const DEFAULT_PREDICTION_PORT: u16 = 5328;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

pub const ENV_CONFIG: &str = "PKM2_CONFIG";
pub const ENV_BIND_ADDRESS: &str = "PKM2_BIND_ADDRESS";
pub const ENV_PREDICTION_URL: &str = "PKM2_PREDICTION_URL";
pub const ENV_FLASK_PORT: &str = "FLASK_PORT";
pub const ENV_DEFAULT_CONFIDENCE: &str = "PKM2_DEFAULT_CONFIDENCE";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "PKM2_REQUEST_TIMEOUT_SECS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "PKM2_MAX_UPLOAD_BYTES";
pub const ENV_THEME_FILE: &str = "PKM2_THEME_FILE";

/// On-disk configuration (`config.toml`). All keys optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub prediction_url: Option<String>,
    pub default_confidence: Option<i64>,
    pub request_timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<usize>,
    pub allowed_origins: Option<Vec<String>>,
    pub theme_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub prediction_url: Option<String>,
    pub default_confidence: Option<i64>,
    pub request_timeout_secs: Option<u64>,
    pub theme_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub prediction_url: String,
    pub default_confidence: ConfidenceLevel,
    /// `None` disables the outbound request timeout
    pub request_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
    pub allowed_origins: Vec<String>,
    pub theme_file: PathBuf,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            prediction_url: prediction_url_for_port(DEFAULT_PREDICTION_PORT),
            default_confidence: ConfidenceLevel::DEFAULT,
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            theme_file: default_theme_file(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Resolve configuration from CLI overrides, environment, and TOML file.
    ///
    /// `config_path` is the explicit file location (CLI or `PKM2_CONFIG`);
    /// when `None` the platform config directory is consulted.
    pub fn resolve(overrides: &ConfigOverrides, config_path: Option<&Path>) -> Result<Self> {
        let toml = load_toml_config(config_path)?;
        let defaults = ServiceConfig::default();

        let bind_address = overrides
            .bind_address
            .clone()
            .or_else(|| env_var(ENV_BIND_ADDRESS))
            .or(toml.bind_address)
            .unwrap_or(defaults.bind_address);

        let prediction_url = match overrides
            .prediction_url
            .clone()
            .or_else(|| env_var(ENV_PREDICTION_URL))
        {
            Some(url) => url,
            None => match env_var(ENV_FLASK_PORT) {
                Some(port) => prediction_url_for_port(parse_env(ENV_FLASK_PORT, &port)?),
                None => toml.prediction_url.unwrap_or(defaults.prediction_url),
            },
        };

        let default_confidence = match overrides.default_confidence {
            Some(value) => Some(value),
            None => env_var(ENV_DEFAULT_CONFIDENCE)
                .map(|raw| parse_env(ENV_DEFAULT_CONFIDENCE, &raw))
                .transpose()?,
        }
        .or(toml.default_confidence)
        .map(|value| {
            ConfidenceLevel::new(value)
                .map_err(|e| Error::Config(format!("default_confidence: {}", e)))
        })
        .transpose()?
        .unwrap_or(defaults.default_confidence);

        let timeout_secs = match overrides.request_timeout_secs {
            Some(value) => Some(value),
            None => env_var(ENV_REQUEST_TIMEOUT_SECS)
                .map(|raw| parse_env(ENV_REQUEST_TIMEOUT_SECS, &raw))
                .transpose()?,
        }
        .or(toml.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let max_upload_bytes = env_var(ENV_MAX_UPLOAD_BYTES)
            .map(|raw| parse_env(ENV_MAX_UPLOAD_BYTES, &raw))
            .transpose()?
            .or(toml.max_upload_bytes)
            .unwrap_or(defaults.max_upload_bytes);

        let allowed_origins = toml.allowed_origins.unwrap_or(defaults.allowed_origins);

        let theme_file = overrides
            .theme_file
            .clone()
            .or_else(|| env_var(ENV_THEME_FILE).map(PathBuf::from))
            .or(toml.theme_file)
            .unwrap_or(defaults.theme_file);

        let log_level = overrides
            .log_level
            .clone()
            .or(toml.log_level)
            .unwrap_or(defaults.log_level);

        Ok(ServiceConfig {
            bind_address,
            prediction_url,
            default_confidence,
            request_timeout,
            max_upload_bytes,
            allowed_origins,
            theme_file,
            log_level,
        })
    }
}

/// Read the TOML config file, tolerating its absence
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// `~/.config/pkm2/config.toml` (platform equivalent elsewhere)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pkm2").join("config.toml"))
}

fn default_theme_file() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("pkm2").join("theme.toml"))
        .unwrap_or_else(|| PathBuf::from("./pkm2_theme.toml"))
}

/// Prediction endpoint on the local loopback for a given port
pub fn prediction_url_for_port(port: u16) -> String {
    format!("http://127.0.0.1:{}/api/predict", port)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", name, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:3000");
        assert_eq!(config.prediction_url, "http://127.0.0.1:5328/api/predict");
        assert_eq!(config.default_confidence.get(), 95);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(120)));
        assert_eq!(config.allowed_origins.len(), 2);
    }

    #[test]
    fn test_toml_parse_partial() {
        let config: TomlConfig = toml::from_str(
            r#"
            prediction_url = "http://10.0.0.5:8000/api/predict"
            default_confidence = 90
            "#,
        )
        .unwrap();
        assert_eq!(
            config.prediction_url.as_deref(),
            Some("http://10.0.0.5:8000/api/predict")
        );
        assert_eq!(config.default_confidence, Some(90));
        assert!(config.bind_address.is_none());
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(toml::from_str::<TomlConfig>("colour = \"blue\"").is_err());
    }
}
