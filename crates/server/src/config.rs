//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! ## Server
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `CORS_ORIGIN` - Allowed CORS origin (default: `*`)
//! - `SHUTDOWN_GRACE_SECS` - Forced exit deadline after a shutdown signal (default: 10)
//! - `LOG_FORMAT` - `json` for JSON log lines, anything else for text
//!
//! ## Store registry
//! - `STORES_BACKEND` - `file` or `memory` (default: file)
//! - `STORES_FILE` - Registry file path (default: stores.json)
//!
//! ## Upstream (BigCommerce)
//! - `BIGCOMMERCE_API_BASE` - API base URL (default: <https://api.bigcommerce.com>)
//! - `UPSTREAM_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `UPSTREAM_MAX_ATTEMPTS` - Attempts per call including the first (default: 3)
//! - `BULK_APPROVAL_CONCURRENCY` - Max in-flight approvals per bulk request (default: 8)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sample rates (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default upstream API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.bigcommerce.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origin (`None` allows any origin)
    pub cors_origin: Option<String>,
    /// Deadline for in-flight requests after a shutdown signal
    pub shutdown_grace: Duration,
    /// Emit JSON log lines instead of text
    pub log_json: bool,
    /// Store registry backend
    pub registry: RegistryConfig,
    /// Upstream API client settings
    pub upstream: UpstreamConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Where the store registry keeps its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryConfig {
    /// Persist to a JSON file, rewritten in full on every mutation.
    File(PathBuf),
    /// Keep state in process memory only.
    Memory,
}

/// Upstream commerce API client settings.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// API base URL; store paths are appended to it.
    pub api_base: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Attempts per call, including the first.
    pub max_attempts: u32,
    /// Maximum approvals in flight for one bulk request.
    pub approval_concurrency: NonZeroUsize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            approval_concurrency: NonZeroUsize::new(8).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host: IpAddr = env.parse_or("APP_HOST", "127.0.0.1".parse().ok())?;
        let port: u16 = env.parse_or("PORT", Some(3000))?;
        let cors_origin = env.get("CORS_ORIGIN").filter(|origin| origin != "*");
        let shutdown_grace = Duration::from_secs(env.parse_or("SHUTDOWN_GRACE_SECS", Some(10))?);
        let log_json = env
            .get("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));

        let registry = RegistryConfig::from_env(&env)?;
        let upstream = UpstreamConfig::from_env(&env)?;

        let sentry_dsn = env.get("SENTRY_DSN");
        let sentry_environment = env.get("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env.sample_rate("SENTRY_SAMPLE_RATE")?;
        let sentry_traces_sample_rate = env.sample_rate("SENTRY_TRACES_SAMPLE_RATE")?;

        Ok(Self {
            host,
            port,
            cors_origin,
            shutdown_grace,
            log_json,
            registry,
            upstream,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RegistryConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let backend = env.get("STORES_BACKEND").unwrap_or_else(|| "file".to_owned());
        match backend.to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File(PathBuf::from(
                env.get("STORES_FILE")
                    .unwrap_or_else(|| "stores.json".to_owned()),
            ))),
            "memory" => Ok(Self::Memory),
            other => Err(ConfigError::InvalidEnvVar(
                "STORES_BACKEND".to_owned(),
                format!("expected `file` or `memory`, got `{other}`"),
            )),
        }
    }
}

impl UpstreamConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base = match env.get("BIGCOMMERCE_API_BASE") {
            Some(raw) => Url::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("BIGCOMMERCE_API_BASE".to_owned(), e.to_string())
            })?,
            None => defaults.api_base,
        };
        let timeout = Duration::from_secs(
            env.parse_or("UPSTREAM_TIMEOUT_SECS", Some(defaults.timeout.as_secs()))?,
        );
        let max_attempts: u32 =
            env.parse_or("UPSTREAM_MAX_ATTEMPTS", Some(defaults.max_attempts))?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "UPSTREAM_MAX_ATTEMPTS".to_owned(),
                "must be at least 1".to_owned(),
            ));
        }
        let approval_concurrency = env.parse_or(
            "BULK_APPROVAL_CONCURRENCY",
            Some(defaults.approval_concurrency),
        )?;

        Ok(Self {
            api_base,
            timeout,
            max_attempts,
            approval_concurrency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed parsing helpers.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
            None => default.ok_or_else(|| {
                ConfigError::InvalidEnvVar(key.to_owned(), "no default available".to_owned())
            }),
        }
    }

    /// A rate in `0.0..=1.0`, defaulting to `1.0`.
    fn sample_rate(&self, key: &str) -> Result<f32, ConfigError> {
        let rate: f32 = self.parse_or(key, Some(1.0))?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_owned(),
                "must be between 0.0 and 1.0".to_owned(),
            ))
        }
    }
}
