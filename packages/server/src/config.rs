use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Empty means any origin is allowed
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: match lookup("PORT") {
                Some(port) => port.parse().context("PORT must be a valid number")?,
                None => DEFAULT_PORT,
            },
            max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(max) => max
                    .parse()
                    .context("DATABASE_MAX_CONNECTIONS must be a positive number")?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
