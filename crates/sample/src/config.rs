//! Application configuration loaded from environment variables.

use std::time::Duration;

use publisher::RetryPolicy;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Runtime configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
/// - `DATABASE_URL`: PostgreSQL URL; the in-memory store is used when unset
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `PUBLISH_MAX_ATTEMPTS`: attempts per envelope (default: `3`)
/// - `PUBLISH_RETRY_DELAY_MS`: first backoff delay (default: `100`)
/// - `PUBLISH_TIMEOUT_MS`: per-attempt bus timeout (default: `5000`)
/// - `RECONCILE_INTERVAL_SECS`: sweep interval (default: `30`)
///
/// Unparseable numbers fall back to the default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub log_level: String,
    pub log_format: LogFormat,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub publish_max_attempts: u32,
    pub publish_retry_delay: Duration,
    pub publish_timeout: Duration,
    pub reconcile_interval: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            database_max_connections: number("DATABASE_MAX_CONNECTIONS")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.database_max_connections),
            publish_max_attempts: number("PUBLISH_MAX_ATTEMPTS")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.publish_max_attempts),
            publish_retry_delay: number("PUBLISH_RETRY_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.publish_retry_delay),
            publish_timeout: number("PUBLISH_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.publish_timeout),
            reconcile_interval: number("RECONCILE_INTERVAL_SECS")
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconcile_interval),
        }
    }

    /// Returns the publisher retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.publish_max_attempts)
            .with_initial_delay(self.publish_retry_delay)
            .with_publish_timeout(self.publish_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            database_url: None,
            database_max_connections: 5,
            publish_max_attempts: 3,
            publish_retry_delay: Duration::from_millis(100),
            publish_timeout: Duration::from_secs(5),
            reconcile_interval: Duration::from_secs(30),
        }
    }
}
