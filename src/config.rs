use std::env;
use std::num::ParseIntError;

use thiserror::Error;

use crate::store::DEFAULT_DATABASE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        source: ParseIntError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Without it events are kept in memory and lost on restart.
    pub mongodb_uri: Option<String>,
    pub database_name: String,
    pub api_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(value) => {
                let parsed = value.trim().parse::<u16>();
                parsed.map_err(|source| ConfigError::InvalidPort { value, source })?
            }
            None => 8080,
        };

        Ok(Config {
            host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            mongodb_uri: non_empty("MONGODB_URI"),
            database_name: non_empty("DATABASE_NAME")
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            api_token: non_empty("API_TOKEN"),
        })
    }
}
