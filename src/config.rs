//! Configuration loaded from environment variables.
//!
//! Every setting has a default suitable for local development.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const DEFAULT_SESSION_FILE: &str = ".session";

/// Upper bound for `TOKEN_TTL_HOURS`: one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Env: `HTTP_ADDR`, default `0.0.0.0:8080`.
    pub http_addr: SocketAddr,

    /// Directory holding `books.json` and `users.json`.
    /// Env: `DATA_DIR`, default `.`.
    pub data_dir: PathBuf,

    /// Lifetime of tokens issued at login.
    /// Env: `TOKEN_TTL_HOURS`, default `24`, at most [`MAX_TOKEN_TTL_HOURS`].
    pub token_ttl_hours: i64,

    /// Origins allowed by CORS.
    /// Env: `ALLOWED_ORIGINS` (comma separated).
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            data_dir: PathBuf::from("."),
            token_ttl_hours: 24,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ],
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default"),
            }
        }

        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(val) = lookup("TOKEN_TTL_HOURS") {
            match val.parse::<i64>() {
                Ok(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => {
                    config.token_ttl_hours = hours
                }
                _ => tracing::warn!(value = %val, "Invalid TOKEN_TTL_HOURS, using default"),
            }
        }

        if let Some(origins) = lookup("ALLOWED_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                config.allowed_origins = parsed;
            }
        }

        config
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.token_ttl_hours)
    }
}

/// Settings for the `akweb` client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub session_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl ClientConfig {
    pub fn new(api_base: impl Into<String>, session_file: impl Into<PathBuf>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
            session_file: session_file.into(),
        }
    }
}
