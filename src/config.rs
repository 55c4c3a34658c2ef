use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

use crate::llm_providers::{DEFAULT_BASE_URL, DEFAULT_MODEL};

// Import logging macros
use crate::{log_system_event, log_validation};

/// Complete application configuration loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Completion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    /// Unset means requests may wait on the model forever
    pub timeout_secs: Option<u64>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Logging system configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        log_system_event!(config, "Loading application configuration from environment variables");

        let config = Config {
            llm: LLMConfig::from_env()?,
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        Ok(config)
    }

    /// Log a summary of loaded configuration
    pub fn log_configuration_summary(&self) {
        info!(
            llm_base_url = %self.llm.base_url,
            llm_model = %self.llm.model,
            llm_timeout_secs = ?self.llm.timeout_secs,
            server_address = %self.server.address(),
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| {
            log_validation!(failure, "configuration", error = message.as_str());
            anyhow!(message)
        };

        if self.server.port == 0 {
            return Err(fail("Server port must be greater than 0".to_string()));
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://") {
            return Err(fail(format!(
                "LLM_BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.llm.base_url
            )));
        }

        if self.llm.model.trim().is_empty() {
            return Err(fail("LLM_MODEL must not be empty".to_string()));
        }

        match self.llm.timeout_secs {
            Some(0) => return Err(fail("LLM_TIMEOUT_SECS must be greater than 0".to_string())),
            Some(_) => {}
            None => warn!(
                "LLM_TIMEOUT_SECS is not set - requests will wait on the model indefinitely"
            ),
        }

        if !["trace", "debug", "info", "warn", "error"]
            .iter()
            .any(|level| self.logging.level.to_lowercase().starts_with(level))
        {
            warn!("Unrecognised log level '{}', filter parsing may fall back to defaults", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl LLMConfig {
    fn from_env() -> Result<Self> {
        let base_url = env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = match env::var("LLM_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|_| {
                anyhow!("Invalid LLM_TIMEOUT_SECS value: '{}'. Must be a whole number of seconds", raw)
            })?),
            Err(_) => None,
        };

        Ok(LLMConfig {
            base_url,
            model,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let port_str = env::var("PORT").unwrap_or_else(|_| "8000".to_string());

        let port = port_str.parse::<u16>().map_err(|_| {
            anyhow!("Invalid PORT value: '{}'. Must be a number between 1-65535", port_str)
        })?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(ServerConfig { port, host })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LoggingConfig {
    fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info,learning_api=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY").unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}
