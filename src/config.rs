//! Runtime configuration loaded from the environment.
//!
//! | Variable              | Default | Meaning                          |
//! |-----------------------|---------|----------------------------------|
//! | `CANOPY_MAX_DEPTH`    | `5`     | Maximum task nesting depth (≥ 1) |
//! | `DATABASE_URL`        | unset   | `PostgreSQL` connection string   |
//! | `CANOPY_DB_POOL_SIZE` | `8`     | Maximum pooled connections       |
//! | `RUST_LOG`            | `info`  | Tracing filter directive         |
//!
//! A `.env` file in the working directory is read first when present.

use crate::todo::hierarchy::DepthLimit;
use std::env;
use thiserror::Error;

const MAX_DEPTH_VAR: &str = "CANOPY_MAX_DEPTH";
const DATABASE_URL_VAR: &str = "DATABASE_URL";
const POOL_SIZE_VAR: &str = "CANOPY_DB_POOL_SIZE";
const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors raised while reading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that is not a valid number.
    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },

    /// A numeric variable is zero.
    #[error("{0} must be at least 1")]
    Zero(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanopyConfig {
    max_depth: DepthLimit,
    database_url: Option<String>,
    database_pool_size: u32,
    log_filter: String,
}

impl CanopyConfig {
    /// Loads configuration from a `.env` file, if any, and the process
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a numeric variable is malformed or zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is not an error.
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable when it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a numeric variable is malformed or zero.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let max_depth = match read(MAX_DEPTH_VAR) {
            Some(raw) => {
                let depth: usize = parse_number(MAX_DEPTH_VAR, &raw)?;
                DepthLimit::new(depth).ok_or(ConfigError::Zero(MAX_DEPTH_VAR))?
            }
            None => DepthLimit::DEFAULT,
        };

        let database_pool_size = match read(POOL_SIZE_VAR) {
            Some(raw) => match parse_number(POOL_SIZE_VAR, &raw)? {
                0 => return Err(ConfigError::Zero(POOL_SIZE_VAR)),
                size => size,
            },
            None => DEFAULT_POOL_SIZE,
        };

        Ok(Self {
            max_depth,
            database_url: read(DATABASE_URL_VAR),
            database_pool_size,
            log_filter: read(LOG_FILTER_VAR).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_owned()),
        })
    }

    /// Returns the hierarchy depth limit.
    #[must_use]
    pub const fn depth_limit(&self) -> DepthLimit {
        self.max_depth
    }

    /// Returns the database connection string, if configured.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Returns the maximum number of pooled database connections.
    #[must_use]
    pub const fn database_pool_size(&self) -> u32 {
        self.database_pool_size
    }

    /// Returns the tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_owned(),
    })
}
