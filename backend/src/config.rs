//! Runtime configuration, read from the environment.

use std::net::SocketAddr;
use thiserror::Error;

use crate::domain::ledger::PropagationMode;

const DEFAULT_DATABASE_URL: &str = "sqlite:finance.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has an invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_address: SocketAddr,
    pub cors_allowed_origin: String,
    pub propagation: PropagationMode,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup. Unset keys take their default,
    /// set but unparsable keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => return Err(invalid("DATABASE_MAX_CONNECTIONS", raw, "must be at least 1")),
                Ok(value) => value,
                Err(e) => return Err(invalid("DATABASE_MAX_CONNECTIONS", raw, e)),
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let raw_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = raw_address
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDRESS", raw_address.clone(), e))?;

        let cors_allowed_origin =
            lookup("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        let propagation = match lookup("HISTORY_PROPAGATION") {
            Some(raw) => raw
                .parse::<PropagationMode>()
                .map_err(|e| invalid("HISTORY_PROPAGATION", raw.clone(), e))?,
            None => PropagationMode::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_address,
            cors_allowed_origin,
            propagation,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            cors_allowed_origin: DEFAULT_CORS_ORIGIN.to_string(),
            propagation: PropagationMode::default(),
        }
    }
}

fn invalid(key: &'static str, value: String, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value,
        reason: reason.to_string(),
    }
}
