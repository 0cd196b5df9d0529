//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOCKROOM_DATA_DIR` - Directory holding the JSON blobs (default: ./data)
//! - `STOCKROOM_HOST` - Bind address (default: 127.0.0.1)
//! - `STOCKROOM_PORT` - Listen port (default: 3002)
//! - `STOCKROOM_BASE_URL` - Public URL (default: `http://{host}:{port}`)
//! - `STOCKROOM_UTC_OFFSET` - Store-local offset such as `+08:00` (default: host offset)
//! - `STOCKROOM_CURRENCY` - ISO 4217 code used for display (default: PHP)
//! - `STOCKROOM_LOG_JSON` - Emit JSON logs when set to `1` or `true`
//! - `STOCKROOM_SUPER_ADMIN_USERNAME` - Bootstrap super admin (default: superadmin)
//! - `STOCKROOM_SUPER_ADMIN_PASSWORD` - Bootstrap super admin password
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::{FixedOffset, Local, Offset};
use secrecy::SecretString;
use thiserror::Error;

use stockroom_core::CurrencyCode;

use crate::services::accounts::SuperAdminSeed;

const DEFAULT_SUPER_ADMIN_USERNAME: &str = "superadmin";
const DEFAULT_SUPER_ADMIN_PASSWORD: &str = "superadmin123";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Stockroom server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Directory holding the local storage blobs
    pub data_dir: PathBuf,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: String,
    /// Store-local UTC offset used for timestamps and period maths
    pub utc_offset: FixedOffset,
    /// Display currency
    pub currency: CurrencyCode,
    /// Emit JSON formatted logs
    pub log_json: bool,
    /// Super admin restored on every start
    pub super_admin: SuperAdminSeed,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("data_dir", &self.data_dir)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("utc_offset", &self.utc_offset)
            .field("currency", &self.currency)
            .field("log_json", &self.log_json)
            .field("super_admin", &self.super_admin)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let data_dir = PathBuf::from(get_env_or_default("STOCKROOM_DATA_DIR", "./data"));
        let host = parse_env("STOCKROOM_HOST", "127.0.0.1")?;
        let port = parse_env("STOCKROOM_PORT", "3002")?;
        let base_url = get_optional_env("STOCKROOM_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));
        let utc_offset = match get_optional_env("STOCKROOM_UTC_OFFSET") {
            Some(value) => parse_utc_offset(&value).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "STOCKROOM_UTC_OFFSET".to_string(),
                    format!("expected +HH:MM, got {value}"),
                )
            })?,
            None => Local::now().offset().fix(),
        };
        let currency = get_env_or_default("STOCKROOM_CURRENCY", "PHP")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOCKROOM_CURRENCY".to_string(), e))?;
        let log_json = get_optional_env("STOCKROOM_LOG_JSON")
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        Ok(Self {
            data_dir,
            host,
            port,
            base_url,
            utc_offset,
            currency,
            log_json,
            super_admin: super_admin_from_env(),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

fn super_admin_from_env() -> SuperAdminSeed {
    let username = get_optional_env("STOCKROOM_SUPER_ADMIN_USERNAME");
    let password = get_optional_env("STOCKROOM_SUPER_ADMIN_PASSWORD");
    if password.is_none() {
        tracing::warn!(
            "STOCKROOM_SUPER_ADMIN_PASSWORD is not set, using the default super admin password"
        );
    }

    SuperAdminSeed {
        username: username.unwrap_or_else(|| DEFAULT_SUPER_ADMIN_USERNAME.to_string()),
        password: SecretString::from(
            password.unwrap_or_else(|| DEFAULT_SUPER_ADMIN_PASSWORD.to_string()),
        ),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a `+HH:MM`, `-HH:MM`, `+HHMM` or `Z` offset.
#[must_use]
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match value.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..)?.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
