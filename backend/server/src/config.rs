use std::{env, fmt::Display, fs::read_to_string, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::MenuPeriod;

const SECRETS_DIR: &str = "/run/secrets";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected 'redis' or 'memory', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
    pub connect_timeout: Duration,
    pub retries: usize,
    pub key_prefix: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    pub redis: RedisSettings,
    pub default_period: MenuPeriod,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(var)
    }

    /// Builds the config from any key lookup, environment or otherwise.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            port: try_load(&lookup, "RUST_PORT", "5000")?,
            storage: try_load(&lookup, "MESS_STORAGE", "redis")?,
            redis: RedisSettings {
                url: redis_url(&lookup),
                connect_timeout: Duration::from_millis(try_load(
                    &lookup,
                    "REDIS_CONNECT_TIMEOUT_MS",
                    "10000",
                )?),
                retries: try_load(&lookup, "REDIS_RETRIES", "1")?,
                key_prefix: try_load(&lookup, "MESS_KEY_PREFIX", "mess")?,
            },
            default_period: MenuPeriod {
                month: try_load(&lookup, "MESS_DEFAULT_MONTH", "July")?,
                year: try_load(&lookup, "MESS_DEFAULT_YEAR", "2025")?,
            },
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn try_load<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key: key.to_string(),
            value,
            reason: e.to_string(),
        }
    })
}

fn redis_url<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("REDIS_URL")
        .or_else(|| read_secret("REDIS_URL"))
        .unwrap_or_else(|| {
            info!("REDIS_URL not set, using default: {DEFAULT_REDIS_URL}");
            DEFAULT_REDIS_URL.to_string()
        })
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("{SECRETS_DIR}/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            debug!("No {secret_name} secret at {path}: {e}");
        })
        .ok()
}
