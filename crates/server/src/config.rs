//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FARMS_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `FARMS_JWT_SECRET` - HMAC secret used to validate bearer tokens (high entropy)
//! - `GOOGLE_MAPS_API_KEY` - API key for the Geocoding and Distance Matrix APIs
//!
//! ## Optional
//! - `FARMS_HOST` - Bind address (default: 127.0.0.1)
//! - `FARMS_PORT` - Listen port (default: 3000)
//! - `GOOGLE_MAPS_BASE_URL` - Maps API root (default: <https://maps.googleapis.com/maps/api>)
//! - `FARMS_ENRICHMENT_CONCURRENCY` - Max in-flight distance lookups per report (default: 8)
//! - `FARMS_ENRICHMENT_TIMEOUT_MS` - Per-lookup timeout in milliseconds (default: 5000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Default root of the Google Maps web service APIs.
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Farm report server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Secret used to verify HS256 bearer tokens
    pub jwt_secret: SecretString,
    /// Google Maps API configuration
    pub maps: MapsConfig,
    /// Limits applied to report enrichment
    pub enrichment: EnrichmentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Google Maps API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct MapsConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// API key sent as the `key` query parameter
    pub api_key: SecretString,
}

impl std::fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Bounds on the per-report distance fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentConfig {
    /// Maximum distance lookups in flight at once for a single report
    pub max_in_flight: usize,
    /// Upper bound on a single distance lookup
    pub timeout: Duration,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            timeout: Duration::from_secs(5),
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = database_url("FARMS_DATABASE_URL")?;
        let host = parsed_or::<IpAddr>("FARMS_HOST", "127.0.0.1")?;
        let port = parsed_or::<u16>("FARMS_PORT", "3000")?;
        let jwt_secret = signing_secret("FARMS_JWT_SECRET")?;

        let maps = MapsConfig::from_env()?;
        let enrichment = EnrichmentConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            maps,
            enrichment,
            sentry_dsn: env("SENTRY_DSN"),
            sentry_environment: env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl MapsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or("GOOGLE_MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL);
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("GOOGLE_MAPS_BASE_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: required_secret("GOOGLE_MAPS_API_KEY")?,
        })
    }
}

impl EnrichmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_in_flight = parsed_or::<usize>("FARMS_ENRICHMENT_CONCURRENCY", "8")?;
        if max_in_flight == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "FARMS_ENRICHMENT_CONCURRENCY".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let timeout_ms = parsed_or::<u64>("FARMS_ENRICHMENT_TIMEOUT_MS", "5000")?;

        Ok(Self {
            max_in_flight,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn required(key: &str) -> Result<String, ConfigError> {
    env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_owned()))
}

fn required_secret(key: &str) -> Result<SecretString, ConfigError> {
    required(key).map(SecretString::from)
}

/// `primary` first, then the conventional `DATABASE_URL`.
fn database_url(primary: &str) -> Result<SecretString, ConfigError> {
    env(primary)
        .or_else(|| env("DATABASE_URL"))
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_owned()))
}

fn env_or(key: &str, default: &str) -> String {
    env(key).unwrap_or_else(|| default.to_owned())
}

fn parsed_or<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_or(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
}

/// Shannon entropy of `s` in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    let mut total = 0_u32;
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject short, placeholder-looking or low-entropy signing secrets.
fn check_secret(secret: &str, key: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_owned(), reason));

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return insecure(format!(
            "must be at least {MIN_JWT_SECRET_LENGTH} characters (got {})",
            secret.len()
        ));
    }

    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return insecure(format!("looks like a placeholder (contains '{pattern}')"));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "entropy {entropy:.2} bits/char is below {MIN_ENTROPY_BITS_PER_CHAR:.1}"
        ));
    }

    Ok(())
}

fn signing_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = required(key)?;
    check_secret(&value, key)?;
    Ok(SecretString::from(value))
}
