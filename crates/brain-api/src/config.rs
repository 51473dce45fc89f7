//! Server configuration from environment variables.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use brain_core::defaults;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// CORS origin whitelist.
    pub allowed_origins: Vec<String>,
    pub settings_path: PathBuf,
    pub pandoc_path: String,
    pub convert_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
    pub db_max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/second_brain".to_string(),
            host: "0.0.0.0".to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            settings_path: PathBuf::from(defaults::SETTINGS_PATH),
            pandoc_path: "pandoc".to_string(),
            convert_timeout_secs: defaults::CONVERT_TIMEOUT_SECS,
            max_upload_bytes: defaults::MAX_UPLOAD_BYTES,
            rate_limit_enabled: true,
            rate_limit_requests: 100,
            rate_limit_period_secs: 60,
            db_max_connections: 5,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. Values that fail to parse are logged
    /// and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        Self {
            database_url: string("DATABASE_URL", base.database_url),
            host: string("HOST", base.host),
            port: parsed(&lookup, "PORT", base.port),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .filter(|v| !v.is_empty())
                .unwrap_or(base.allowed_origins),
            settings_path: lookup("SETTINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(base.settings_path),
            pandoc_path: string("PANDOC_PATH", base.pandoc_path),
            convert_timeout_secs: parsed(&lookup, "CONVERT_TIMEOUT_SECS", base.convert_timeout_secs),
            max_upload_bytes: parsed(&lookup, "MAX_UPLOAD_BYTES", base.max_upload_bytes),
            rate_limit_enabled: lookup("RATE_LIMIT_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(base.rate_limit_enabled),
            rate_limit_requests: parsed(&lookup, "RATE_LIMIT_REQUESTS", base.rate_limit_requests)
                .max(1),
            rate_limit_period_secs: parsed(
                &lookup,
                "RATE_LIMIT_PERIOD_SECS",
                base.rate_limit_period_secs,
            )
            .max(1),
            db_max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", base.db_max_connections),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid config value, using default");
            default
        }),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
