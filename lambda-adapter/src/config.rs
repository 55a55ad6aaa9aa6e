//! Configuration module for environment variable parsing.
//!
//! The verification deadline is fixed and deliberately absent from here.

use std::env;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secret shared with GitHub for `X-Hub-Signature-256` verification
    pub webhook_secret: String,

    /// Port for the local web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_secret = env::var("GITHUB_WEBHOOK_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("GITHUB_WEBHOOK_SECRET"))?;

        Ok(Config {
            webhook_secret,

            port: parse_or("PORT", 8080),
        })
    }
}

/// Parse a variable, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    parse_optional(name).unwrap_or(default)
}

fn parse_optional<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;

    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}
