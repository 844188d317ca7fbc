//! Service configuration
//!
//! Loaded from an optional TOML file merged with `SICBO_`-prefixed
//! environment variables (e.g. `SICBO_SERVER__PORT=8080`).

use crate::error::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
}

impl Config {
    /// Load configuration, tolerating a missing file
    pub fn load(path: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SICBO").separator("__"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

/// Upstream results feed
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

/// HTTP prediction API
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Ensemble weighting parameters
#[derive(Debug, Clone, Deserialize)]
pub struct EnsembleConfig {
    /// Smoothing rate of the online weight update
    #[serde(default = "default_ema_alpha")]
    pub ema_alpha: f64,
    /// Floor applied to every predictor weight
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    /// Number of trailing rounds replayed during calibration
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            ema_alpha: default_ema_alpha(),
            min_weight: default_min_weight(),
            history_window: default_history_window(),
        }
    }
}

fn default_feed_url() -> String {
    "https://api.wsktnus8.net/v2/history/getLastResult?gameId=ktrng_3979&size=100&tableId=39791215743193&curPage=1".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ema_alpha() -> f64 {
    0.1
}

fn default_min_weight() -> f64 {
    0.001
}

fn default_history_window() -> usize {
    500
}
