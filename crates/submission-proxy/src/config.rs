//! Configuration management for the Submission Proxy
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen host
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Upstream spreadsheet script endpoint. Requests fail while unset.
    pub google_script_url: Option<String>,

    /// Mirror the client-side submission limit on the server
    pub gate_enabled: bool,

    /// Redis URL for the gate's records; in-memory when unset
    pub redis_url: Option<String>,

    /// Include upstream error detail in failure responses
    pub expose_error_details: bool,

    /// Re-check form fields on the server. The page already validates them.
    pub validate_fields: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            host: non_blank("PROXY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: non_blank("PROXY_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("Invalid PROXY_PORT")?,

            google_script_url: non_blank("GOOGLE_SCRIPT_URL"),

            gate_enabled: parse_flag(non_blank("SUBMISSION_GATE_ENABLED"), true)
                .context("Invalid SUBMISSION_GATE_ENABLED")?,

            redis_url: non_blank("REDIS_URL"),

            expose_error_details: parse_flag(non_blank("EXPOSE_ERROR_DETAILS"), false)
                .context("Invalid EXPOSE_ERROR_DETAILS")?,

            validate_fields: parse_flag(non_blank("VALIDATE_FORM_FIELDS"), false)
                .context("Invalid VALIDATE_FORM_FIELDS")?,
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("PROXY_PORT must be greater than 0");
        }

        Ok(())
    }

    /// Get the listen address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: Option<String>, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {:?}", other),
    }
}
