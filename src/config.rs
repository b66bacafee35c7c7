//! SDK configuration module
//! Handles environment variable loading, configuration validation, and SDK settings

use crate::error::CorrelationScope;
use std::env;

/// Main SDK configuration
#[derive(Debug, Clone)]
pub struct SdkConfig {
    pub environment: Environment,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_transport_retries: u32,
    pub refresh_retries: u32,
    pub refresh_delay_secs: u64,
    pub challenge_timeout_secs: u64,
    pub correlation_scope: CorrelationScope,
    pub logging: LoggingConfig,
}

/// Target payments API environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Test,
    Live,
    Custom(String),
}

impl Environment {
    /// REST root all endpoint paths hang off.
    pub fn base_url(&self) -> &str {
        match self {
            Environment::Test => "https://api.test.paymenthub.example",
            Environment::Live => "https://api.paymenthub.example",
            Environment::Custom(url) => url,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Environment::Test => "test",
            Environment::Live => "live",
            Environment::Custom(_) => "custom",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

impl SdkConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("PAYHANDLE_ENV")
            .unwrap_or_else(|_| "test".to_string())
            .as_str()
        {
            "test" => Environment::Test,
            "live" => Environment::Live,
            custom => Environment::Custom(custom.to_string()),
        };

        Ok(SdkConfig {
            environment,
            api_key: env::var("PAYHANDLE_API_KEY")
                .map_err(|_| ConfigError::MissingVariable("PAYHANDLE_API_KEY".to_string()))?,
            timeout_secs: env::var("PAYHANDLE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYHANDLE_TIMEOUT_SECS".to_string()))?,
            max_transport_retries: env::var("PAYHANDLE_MAX_TRANSPORT_RETRIES")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PAYHANDLE_MAX_TRANSPORT_RETRIES".to_string())
                })?,
            refresh_retries: env::var("PAYHANDLE_REFRESH_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PAYHANDLE_REFRESH_RETRIES".to_string()))?,
            refresh_delay_secs: env::var("PAYHANDLE_REFRESH_DELAY_SECS")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PAYHANDLE_REFRESH_DELAY_SECS".to_string())
                })?,
            challenge_timeout_secs: env::var("PAYHANDLE_CHALLENGE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::InvalidValue("PAYHANDLE_CHALLENGE_TIMEOUT_SECS".to_string())
                })?,
            correlation_scope: match env::var("PAYHANDLE_CORRELATION_SCOPE")
                .unwrap_or_else(|_| "client".to_string())
                .as_str()
            {
                "client" => CorrelationScope::PerClient,
                "attempt" => CorrelationScope::PerAttempt,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "PAYHANDLE_CORRELATION_SCOPE".to_string(),
                    ))
                }
            },
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() {
            return Err(ConfigError::InvalidValue(
                "PAYHANDLE_API_KEY cannot be empty".to_string(),
            ));
        }

        if let Environment::Custom(url) = &self.environment {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(
                    "PAYHANDLE_ENV must be test, live or a valid base URL".to_string(),
                ));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PAYHANDLE_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        if self.challenge_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "PAYHANDLE_CHALLENGE_TIMEOUT_SECS cannot be 0".to_string(),
            ));
        }

        self.logging.validate()?;

        Ok(())
    }

    /// Sensible defaults for the test environment; merchants override fields
    /// as needed.
    pub fn for_environment(environment: Environment, api_key: impl Into<String>) -> Self {
        SdkConfig {
            environment,
            api_key: api_key.into(),
            timeout_secs: 30,
            max_transport_retries: 2,
            refresh_retries: 3,
            refresh_delay_secs: 6,
            challenge_timeout_secs: 120,
            correlation_scope: CorrelationScope::PerClient,
            logging: LoggingConfig {
                level: "INFO".to_string(),
                format: LogFormat::Plain,
            },
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}
