// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Built once at startup and shared read-only through `AppState`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Bind to loopback only
    pub local_only: bool,
    /// SQLite database file (`:memory:` for a throwaway store)
    pub database_path: String,
    /// Most records accepted in a single syncup
    pub max_record_count: u32,
    /// Token lifetime
    pub token_expire_time: Duration,
    /// Push a token's expiry forward every time it is used
    pub token_expire_refresh: bool,
    /// Period of the expired-token purge loop
    pub token_purge_interval: Duration,
    /// Per-request deadline
    pub request_timeout: Duration,
    /// Drop users, tokens and cursor tables at startup
    pub clear_db_auth: bool,
    /// Drop entity tables at startup
    pub clear_db_data: bool,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 0,
            local_only: true,
            database_path: ":memory:".to_string(),
            max_record_count: 1000,
            token_expire_time: Duration::from_secs(7 * 24 * 3600),
            token_expire_refresh: true,
            token_purge_interval: Duration::from_secs(3600),
            request_timeout: Duration::from_secs(10),
            clear_db_auth: false,
            clear_db_data: false,
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_record_count: u32 = parse_or(&lookup, "MAX_RECORD_COUNT", 1000)?;
        if max_record_count == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_RECORD_COUNT",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            local_only: parse_flag(&lookup, "LOCAL_ONLY", false)?,
            database_path: lookup("DATABASE_PATH")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "organizer.db".to_string()),
            max_record_count,
            token_expire_time: Duration::from_secs(parse_or(
                &lookup,
                "TOKEN_EXPIRE_TIME",
                7 * 24 * 3600,
            )?),
            token_expire_refresh: parse_flag(&lookup, "TOKEN_EXPIRE_REFRESH", true)?,
            token_purge_interval: Duration::from_secs(parse_or(
                &lookup,
                "TOKEN_PURGE_INTERVAL",
                3600,
            )?),
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 10)?),
            clear_db_auth: parse_flag(&lookup, "CLEAR_DB_AUTH", false)?,
            clear_db_data: parse_flag(&lookup, "CLEAR_DB_DATA", false)?,
        })
    }

    /// Token lifetime in milliseconds, as stored in token rows.
    pub fn token_expire_millis(&self) -> i64 {
        i64::try_from(self.token_expire_time.as_millis()).unwrap_or(i64::MAX)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}

fn parse_flag<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
