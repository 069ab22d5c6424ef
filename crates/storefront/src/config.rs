//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (`https://` enables secure cookies)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_AUTH_ROOT` - Sign-in/sign-up pages (default: /auth)
//! - `STOREFRONT_ADMIN_ROOT` - Admin dashboard (default: /admin)
//! - `STOREFRONT_ACCOUNT_ROOT` - Customer account pages (default: /account)
//! - `STOREFRONT_SIGN_IN_PATH` - Redirect target for anonymous visitors (default: /auth/signin)
//! - `STOREFRONT_HOME_PATH` - Redirect target for refused visitors (default: /)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use emporium_core::AccessPolicy;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Route guard roots and redirect targets
    pub access: AccessPolicy,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let base_url = env.required("STOREFRONT_BASE_URL")?;
        let access = access_policy(&env)?;

        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            base_url,
            access,
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

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn access_policy<F>(env: &Env<F>) -> Result<AccessPolicy, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let invalid = |key: &str| {
        let key = key.to_string();
        move |e: emporium_core::PolicyError| ConfigError::InvalidEnvVar(key, e.to_string())
    };

    let auth_root = env.or_default("STOREFRONT_AUTH_ROOT", AccessPolicy::DEFAULT_AUTH_ROOT);
    let admin_root = env.or_default("STOREFRONT_ADMIN_ROOT", AccessPolicy::DEFAULT_ADMIN_ROOT);
    let account_root = env.or_default("STOREFRONT_ACCOUNT_ROOT", AccessPolicy::DEFAULT_ACCOUNT_ROOT);
    let sign_in = env.or_default("STOREFRONT_SIGN_IN_PATH", AccessPolicy::DEFAULT_SIGN_IN_PATH);
    let home = env.or_default("STOREFRONT_HOME_PATH", AccessPolicy::DEFAULT_HOME_PATH);

    let policy = AccessPolicy::default()
        .with_roots(&auth_root, &admin_root, &account_root)
        .map_err(invalid("STOREFRONT_*_ROOT"))?
        .with_redirects(&sign_in, &home)
        .map_err(invalid("STOREFRONT_SIGN_IN_PATH/STOREFRONT_HOME_PATH"))?;
    Ok(policy)
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a required environment variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get an optional environment variable. Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use emporium_core::PathCategory;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_BASE_URL", "http://localhost:3000")]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.access, AccessPolicy::default());
        assert!(!config.is_secure());
        assert!(config.sentry_dsn.is_none());
        assert!((config.sentry_sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "https://shop.example"),
            ("STOREFRONT_PORT", "http"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_policy_overrides() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "https://shop.example"),
            ("STOREFRONT_ADMIN_ROOT", "/backoffice"),
            ("STOREFRONT_SIGN_IN_PATH", "/auth/login"),
        ])
        .unwrap();
        assert!(config.is_secure());
        assert_eq!(config.access.classify("/backoffice/orders"), PathCategory::Admin);
        assert_eq!(config.access.classify("/admin"), PathCategory::Public);
        assert_eq!(config.access.sign_in_path(), "/auth/login");
    }

    #[test]
    fn test_relative_root_rejected() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "https://shop.example"),
            ("STOREFRONT_ACCOUNT_ROOT", "account"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }
}
