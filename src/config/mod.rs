//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::calculate::comparator::{DEFAULT_MIN_MAPS, DEFAULT_MIN_TIME_SECONDS, DEFAULT_SAMPLE_LIMIT};
use crate::calculate::mvp::{MvpThresholds, DEFAULT_MVP_MIN_MAPS, DEFAULT_MVP_MIN_TIME_SECONDS};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Whole-request deadline. Expiry fails the request with 503.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// Population and MVP eligibility thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Minimum maps on a hero for a player to join its population.
    #[serde(default = "default_comparator_min_maps")]
    pub comparator_min_maps: u32,

    /// Minimum seconds on a hero for a player to join its population.
    #[serde(default = "default_comparator_min_time")]
    pub comparator_min_time_seconds: f64,

    /// Cap on population size; players with the most time are kept.
    #[serde(default = "default_sample_limit")]
    pub sample_limit: usize,

    #[serde(default = "default_mvp_min_maps")]
    pub mvp_min_maps: u32,

    #[serde(default = "default_mvp_min_time")]
    pub mvp_min_time_seconds: f64,
}

fn default_comparator_min_maps() -> u32 {
    DEFAULT_MIN_MAPS
}

fn default_comparator_min_time() -> f64 {
    DEFAULT_MIN_TIME_SECONDS
}

fn default_sample_limit() -> usize {
    DEFAULT_SAMPLE_LIMIT
}

fn default_mvp_min_maps() -> u32 {
    DEFAULT_MVP_MIN_MAPS
}

fn default_mvp_min_time() -> f64 {
    DEFAULT_MVP_MIN_TIME_SECONDS
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            comparator_min_maps: default_comparator_min_maps(),
            comparator_min_time_seconds: default_comparator_min_time(),
            sample_limit: default_sample_limit(),
            mvp_min_maps: default_mvp_min_maps(),
            mvp_min_time_seconds: default_mvp_min_time(),
        }
    }
}

impl AnalyticsConfig {
    pub fn mvp_thresholds(&self) -> MvpThresholds {
        MvpThresholds {
            min_maps: self.mvp_min_maps,
            min_time_seconds: self.mvp_min_time_seconds,
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.server.request_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.cors_origin != "*"
            && self.server.cors_origin.parse::<axum::http::HeaderValue>().is_err()
        {
            return Err(ConfigError::ValidationError(format!(
                "Invalid CORS origin: {}",
                self.server.cors_origin
            )));
        }

        let a = &self.analytics;
        if a.comparator_min_maps == 0 || a.mvp_min_maps == 0 {
            return Err(ConfigError::ValidationError(
                "Minimum map counts must be greater than 0".to_string(),
            ));
        }

        // `!(x > 0.0)` also rejects NaN.
        if !(a.comparator_min_time_seconds > 0.0) || !(a.mvp_min_time_seconds > 0.0) {
            return Err(ConfigError::ValidationError(
                "Minimum time played must be greater than 0".to_string(),
            ));
        }

        if a.sample_limit < 2 {
            return Err(ConfigError::ValidationError(
                "Sample limit must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}
