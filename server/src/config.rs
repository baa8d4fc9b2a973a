//! Runtime configuration read from the environment.
//!
//! An optional `.env` file in the working directory is loaded first; real
//! environment variables take precedence over it.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::info;

use crate::backend::storage::ConnectPolicy;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEVELOPMENT_PORT: u16 = 4000;
pub const DEFAULT_STATIC_DIR: &str = "dist/public";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// PostgreSQL URL, in-memory storage when unset
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Create the database and apply the schema before serving
    pub run_migrations: bool,
    pub connect_policy: ConnectPolicy,
}

impl Config {
    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let development = get("APP_ENV").as_deref() == Some("development");
        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None if development => DEVELOPMENT_PORT,
            None => DEFAULT_PORT,
        };

        let defaults = ConnectPolicy::default();
        let max_attempts = match get("DB_CONNECT_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("DB_CONNECT_ATTEMPTS must be a positive integer, got '{}'", raw))?,
            None => defaults.max_attempts,
        };
        if max_attempts == 0 {
            bail!("DB_CONNECT_ATTEMPTS must be a positive integer, got '0'");
        }
        let delay = match get("DB_CONNECT_DELAY_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .with_context(|| format!("DB_CONNECT_DELAY_MS must be milliseconds, got '{}'", raw))?,
            ),
            None => defaults.delay,
        };

        let run_migrations = match get("RUN_MIGRATIONS_IN_SERVER") {
            Some(raw) => parse_flag(&raw)
                .with_context(|| format!("RUN_MIGRATIONS_IN_SERVER must be true or false, got '{}'", raw))?,
            None => false,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            run_migrations,
            connect_policy: ConnectPolicy {
                max_attempts,
                delay,
            },
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
