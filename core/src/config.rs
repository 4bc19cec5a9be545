//! Client configuration.
//!
//! Environment variables:
//! - `BREVO_API_KEY` - API key sent in the `api-key` header (required)
//! - `currentEnv` - `production` disables the `test` tag on sends
//! - `BREVO_BASE_URL` - API root, defaults to `https://api.brevo.com/v3`
//! - `BREVO_TIMEOUT_SECS` - per-request timeout, defaults to 30

use std::time::Duration;

use secrecy::SecretString;

pub const DEFAULT_BASE_URL: &str = "https://api.brevo.com/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PRODUCTION: &str = "production";

/// Deployment the process runs in. Only affects vendor-side tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    #[default]
    NonProduction,
}

impl Environment {
    /// Exactly `"production"` is production; anything else, or nothing, is not.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(PRODUCTION) => Environment::Production,
            _ => Environment::NonProduction,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BREVO_API_KEY is not set")]
    MissingApiKey,
    #[error("BREVO_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: SecretString,
    pub environment: Environment,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            environment: Environment::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("BREVO_API_KEY")
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key)
            .with_environment(Environment::from_name(lookup("currentEnv").as_deref()));

        if let Some(base_url) = lookup("BREVO_BASE_URL") {
            config = config.with_base_url(&base_url);
        }
        if let Some(raw) = lookup("BREVO_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}
