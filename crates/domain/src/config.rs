//! Application configuration structures
//!
//! Populated by the infra config loader from environment variables or a
//! TOML file. Defaults are suitable for local development.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BIND_ADDR, DEFAULT_DB_POOL_SIZE};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: "debitum.db".into(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP surface binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: DEFAULT_BIND_ADDR.into() }
    }
}
