use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::ValidationError;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-pro";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub max_concurrent_requests: usize,
    pub request_timeout_seconds: u64,
    pub api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub retry_on_rate_limit: bool,
    pub max_retry_delay_seconds: u64,
    pub session_ttl_minutes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ValidationError::MissingCredential(API_KEY_VAR))?;

        let configured_port = Self::parse_var(&lookup, "SERVER_PORT", 8080)
            .context("Failed to parse SERVER_PORT")?;

        let config = Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            // PORT wins when the hosting platform provides one
            server_port: Self::parse_var(&lookup, "PORT", configured_port)
                .context("Failed to parse PORT")?,
            max_file_size_mb: Self::parse_var(&lookup, "MAX_FILE_SIZE_MB", 200)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            max_concurrent_requests: Self::parse_var(&lookup, "MAX_CONCURRENT_REQUESTS", 100)
                .context("Failed to parse MAX_CONCURRENT_REQUESTS")?,
            request_timeout_seconds: Self::parse_var(&lookup, "REQUEST_TIMEOUT_SECONDS", 60)
                .context("Failed to parse REQUEST_TIMEOUT_SECONDS")?,
            api_key,
            gemini_model: lookup("GEMINI_MODEL")
                .filter(|model| !model.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: lookup("GEMINI_BASE_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            retry_on_rate_limit: Self::parse_var(&lookup, "RETRY_ON_RATE_LIMIT", true)
                .context("Failed to parse RETRY_ON_RATE_LIMIT")?,
            max_retry_delay_seconds: Self::parse_var(&lookup, "MAX_RETRY_DELAY_SECONDS", 10)
                .context("Failed to parse MAX_RETRY_DELAY_SECONDS")?,
            session_ttl_minutes: Self::parse_var(&lookup, "SESSION_TTL_MINUTES", 60)
                .context("Failed to parse SESSION_TTL_MINUTES")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_var<F, T>(lookup: &F, var_name: &str, default: T) -> Result<T>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr + Copy + fmt::Debug,
        T::Err: fmt::Display,
    {
        match lookup(var_name) {
            Some(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            None => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_REQUESTS must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.session_ttl_minutes == 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_MINUTES must be greater than 0"));
        }
        Ok(())
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb * 1024 * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn max_retry_delay(&self) -> Duration {
        Duration::from_secs(self.max_retry_delay_seconds)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_minutes * 60)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("api_key", &"<redacted>")
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("retry_on_rate_limit", &self.retry_on_rate_limit)
            .field("max_retry_delay_seconds", &self.max_retry_delay_seconds)
            .field("session_ttl_minutes", &self.session_ttl_minutes)
            .finish()
    }
}
