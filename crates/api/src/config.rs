//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (postgres store)
//! - `NORKYS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `NORKYS_HOST` - Bind address (default: 127.0.0.1)
//! - `NORKYS_PORT` - Listen port (default: 3000)
//! - `NORKYS_STORE` - `postgres` or `memory` (default: postgres)
//! - `RESERVED_ADMIN_USER_ID` - Account that may never own carts or wishlists (default: 1)
//! - `CART_STATUS_POLICY` - `strict` or `permissive` (default: strict)
//! - `ANALYTICS_UTC_OFFSET_MINUTES` - Reporting offset for dashboard days (default: 0)
//! - `ANALYTICS_CACHE_TTL_SECS` - Dashboard cache TTL, 0 disables (default: 60)
//! - `REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `CORS_ALLOW_ANY_ORIGIN` - Allow cross-origin requests from anywhere (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;

use norkys_core::{StatusPolicy, UserId};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Which store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local demo data; nothing survives a restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected postgres or memory, got {other}")),
        }
    }
}

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Store implementation
    pub store: StoreBackend,
    /// Reserved administrator account
    pub reserved_admin: UserId,
    /// How cart status changes are checked
    pub status_policy: StatusPolicy,
    /// Reporting offset for dashboard calendar days
    pub analytics_offset: FixedOffset,
    /// Dashboard cache TTL (zero disables)
    pub analytics_cache_ttl: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Allow any origin through CORS
    pub cors_allow_any_origin: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl ApiConfig {
    /// Load configuration from the process environment (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        let store: StoreBackend = env.parse_or("NORKYS_STORE", StoreBackend::Postgres)?;
        let database_url = env.database_url("NORKYS_DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingEnvVar("NORKYS_DATABASE_URL".to_string()));
        }

        let reserved_admin = UserId::new(env.parse_or("RESERVED_ADMIN_USER_ID", 1)?);
        if !reserved_admin.is_positive() {
            return Err(ConfigError::InvalidEnvVar(
                "RESERVED_ADMIN_USER_ID".to_string(),
                "must be positive".to_string(),
            ));
        }

        let offset_minutes: i32 = env.parse_or("ANALYTICS_UTC_OFFSET_MINUTES", 0)?;
        let analytics_offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "ANALYTICS_UTC_OFFSET_MINUTES".to_string(),
                    "must be within +/- 1439 minutes".to_string(),
                )
            })?;

        let request_timeout_secs: u64 = env.parse_or("REQUEST_TIMEOUT_SECS", 30)?;
        if request_timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host: env.parse_or("NORKYS_HOST", IpAddr::from([127, 0, 0, 1]))?,
            port: env.parse_or("NORKYS_PORT", 3000)?,
            store,
            reserved_admin,
            status_policy: env.parse_or("CART_STATUS_POLICY", StatusPolicy::Strict)?,
            analytics_offset,
            analytics_cache_ttl: Duration::from_secs(env.parse_or("ANALYTICS_CACHE_TTL_SECS", 60)?),
            request_timeout: Duration::from_secs(request_timeout_secs),
            cors_allow_any_origin: env.parse_or("CORS_ALLOW_ANY_ORIGIN", true)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, or use `default` when it is unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Option<SecretString> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("NORKYS_DATABASE_URL", "postgres://localhost/norkys")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.reserved_admin, UserId::new(1));
        assert_eq!(config.status_policy, StatusPolicy::Strict);
        assert_eq!(config.analytics_offset.local_minus_utc(), 0);
        assert_eq!(config.analytics_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.cors_allow_any_origin);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_postgres_requires_database_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "NORKYS_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/norkys")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://fly/norkys"
        );
    }

    #[test]
    fn test_memory_store_needs_no_database() {
        let config = load(&[
            ("NORKYS_STORE", "memory"),
            ("CART_STATUS_POLICY", "permissive"),
            ("ANALYTICS_UTC_OFFSET_MINUTES", "-300"),
            ("ANALYTICS_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.status_policy, StatusPolicy::Permissive);
        assert_eq!(config.analytics_offset.local_minus_utc(), -18_000);
        assert!(config.analytics_cache_ttl.is_zero());
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let cases = [
            ("NORKYS_PORT", "eighty"),
            ("CART_STATUS_POLICY", "lenient"),
            ("RESERVED_ADMIN_USER_ID", "0"),
            ("ANALYTICS_UTC_OFFSET_MINUTES", "1440"),
            ("REQUEST_TIMEOUT_SECS", "0"),
            ("CORS_ALLOW_ANY_ORIGIN", "maybe"),
        ];
        for (key, value) in cases {
            let err = load(&[("NORKYS_STORE", "memory"), (key, value)]).unwrap_err();
            assert!(
                matches!(&err, ConfigError::InvalidEnvVar(k, _) if k == key),
                "{key}={value} gave {err}"
            );
        }
    }
}
