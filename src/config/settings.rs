//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default service address when `AI_ENDPOINT` is not set
pub const DEFAULT_ENDPOINT: &str = "http://10.0.20.100:11434";

/// Default model when `LLM_MODEL` is not set
pub const DEFAULT_MODEL: &str = "llama3:8b";

/// Directory the usage statistics file lives in
pub const DEFAULT_OUTPUT_DIR: &str = "/output";

/// Name of the usage statistics file inside the output directory
pub const USAGE_FILE_NAME: &str = ".llm_usage_stats.json";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Remote generation service configuration
    pub service: ServiceConfig,
    /// Usage accounting configuration
    pub usage: UsageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Remote generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service base URL, without trailing slash
    pub endpoint: String,
    /// Model used when a call does not name one
    pub default_model: String,
    /// Request timeout in seconds. `None` means requests may wait forever.
    pub timeout: Option<u64>,
}

/// Usage accounting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Directory holding the usage statistics file
    pub output_dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the process environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or_default = |key: &str, default: &str| {
            lookup(key).unwrap_or_else(|| default.to_string())
        };

        let timeout = match lookup("AI_REQUEST_TIMEOUT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid AI_REQUEST_TIMEOUT value: {}", raw))?,
            ),
            None => None,
        };

        let settings = Self {
            service: ServiceConfig {
                endpoint: get_or_default("AI_ENDPOINT", DEFAULT_ENDPOINT)
                    .trim_end_matches('/')
                    .to_string(),
                default_model: get_or_default("LLM_MODEL", DEFAULT_MODEL),
                timeout,
            },
            usage: UsageConfig {
                output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            },
            logging: LoggingConfig {
                level: get_or_default("RUST_LOG", "info"),
                format: get_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings the client needs.
    ///
    /// Logging settings are checked separately by [`LoggingConfig::validate`]
    /// when a subscriber is installed.
    pub fn validate(&self) -> Result<()> {
        if !self.service.endpoint.starts_with("http") {
            anyhow::bail!(
                "Invalid AI endpoint format, should start with 'http': {}",
                self.service.endpoint
            );
        }

        if self.service.default_model.trim().is_empty() {
            anyhow::bail!("Default model cannot be empty");
        }

        if self.service.timeout == Some(0) {
            anyhow::bail!("Timeout value cannot be 0");
        }

        Ok(())
    }

    /// Full URL for an API path such as `/api/generate`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.service.endpoint, path)
    }

    /// Pick the requested model or fall back to the configured default
    pub fn resolve_model(&self, model: Option<&str>) -> String {
        match model {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.service.default_model.clone(),
        }
    }

    /// Request timeout, if one was configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.service.timeout.map(Duration::from_secs)
    }
}

impl LoggingConfig {
    /// Check the level is a usable `RUST_LOG` filter and the format is known
    pub fn validate(&self) -> Result<()> {
        tracing_subscriber::EnvFilter::try_new(&self.level)
            .with_context(|| format!("Invalid log level: {}", self.level))?;

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.format);
        }

        Ok(())
    }
}

impl UsageConfig {
    /// Path of the usage statistics file
    pub fn stats_path(&self) -> PathBuf {
        self.output_dir.join(USAGE_FILE_NAME)
    }
}
