//! Error types for the service plumbing.
//!
//! The prediction engine itself has no error paths: insufficient data
//! degrades to abstention or fixed fallbacks. Errors only arise at the
//! feed and configuration boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed feed payload: {0}")]
    MalformedFeed(String),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, OracleError>;
