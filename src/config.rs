//! Configuration management for the weather aggregator
//!
//! Handles loading configuration from files and environment variables,
//! and validates provider credentials before the server starts.

use crate::AggregatorError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the weather aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// OpenWeatherMap (primary provider) settings
    pub openweather: ProviderConfig,
    /// WeatherAPI (fallback provider) settings
    pub weatherapi: ProviderConfig,
    /// Outbound HTTP client settings
    pub http: HttpConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory holding `index.html` and the page assets
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Credentials and endpoint of one weather provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key, sent as `appid` (OpenWeatherMap) or `key` (WeatherAPI)
    pub api_key: Option<String>,
    /// Base URL; left blank, the provider's public endpoint is used
    #[serde(default)]
    pub base_url: String,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_weatherapi_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_http_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("weather-aggregator/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            openweather: ProviderConfig {
                api_key: None,
                base_url: default_openweather_base_url(),
            },
            weatherapi: ProviderConfig {
                api_key: None,
                base_url: default_weatherapi_base_url(),
            },
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AggregatorConfig {
    /// Load configuration from the given file (or the default location) and
    /// `WEATHER_`-prefixed environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(config_path, None)
    }

    /// `env` replaces the process environment when given
    fn load_with_env(
        config_path: Option<PathBuf>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(AggregatorError::config(format!(
                        "Config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Some(path)
            }
            None => Self::get_config_path()
                .filter(|path| path.exists())
                .or_else(|| Some(PathBuf::from("config.toml")).filter(|path| path.exists())),
        };

        if let Some(config_file) = config_file {
            tracing::debug!("Reading configuration from {}", config_file.display());
            builder = builder.add_source(
                File::from(config_file)
                    .required(true)
                    .format(config::FileFormat::Toml),
            );
        }

        // WEATHER_OPENWEATHER__API_KEY -> openweather.api_key. Values stay
        // strings so keys with leading zeros survive.
        builder = builder.add_source(
            Environment::with_prefix("WEATHER")
                .prefix_separator("_")
                .separator("__")
                .source(env),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AggregatorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-aggregator").join("config.toml"))
    }

    /// Apply default values to fields that were set but left blank
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.openweather.base_url.is_empty() {
            self.openweather.base_url = default_openweather_base_url();
        }
        if self.weatherapi.base_url.is_empty() {
            self.weatherapi.base_url = default_weatherapi_base_url();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate provider API keys
    pub fn validate_api_keys(&self) -> Result<()> {
        check_api_key("openweather", self.openweather.api_key.as_deref())?;
        check_api_key("weatherapi", self.weatherapi.api_key.as_deref())?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(
                AggregatorError::config("HTTP timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AggregatorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AggregatorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("openweather", &self.openweather.base_url),
            ("weatherapi", &self.weatherapi.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AggregatorError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

fn check_api_key(provider: &str, api_key: Option<&str>) -> Result<()> {
    let Some(api_key) = api_key else {
        return Err(AggregatorError::config(format!(
            "No API key configured for {provider}. Set WEATHER_{}__API_KEY or add it to the config file.",
            provider.to_uppercase()
        ))
        .into());
    };

    if api_key.trim().is_empty() {
        return Err(
            AggregatorError::config(format!("{provider} API key cannot be empty")).into(),
        );
    }

    if api_key.len() < 8 {
        return Err(AggregatorError::config(format!(
            "{provider} API key appears to be invalid (too short)"
        ))
        .into());
    }

    if api_key.len() > 100 {
        return Err(AggregatorError::config(format!(
            "{provider} API key appears to be invalid (too long)"
        ))
        .into());
    }

    Ok(())
}
