//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Missing values fall back to the domain defaults
//!
//! ## Environment Variables
//! - `DEBITUM_DB_PATH`: Database file path
//! - `DEBITUM_DB_POOL_SIZE`: Connection pool size
//! - `DEBITUM_BIND_ADDR`: HTTP bind address
//!
//! ## File Locations
//! The loader probes `./config.toml` and `./debitum.toml` in the current
//! working directory.

use std::path::{Path, PathBuf};

use debitum_domain::{BillingError, Config, Result};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the database path
/// is not configured there, falls back to a config file, and finally to
/// built-in defaults.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `BillingError::Config` if `DEBITUM_DB_PATH` is missing or a
/// present variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.database.path = env_var("DEBITUM_DB_PATH")?;

    if let Ok(pool_size) = std::env::var("DEBITUM_DB_POOL_SIZE") {
        config.database.pool_size = pool_size
            .parse::<u32>()
            .map_err(|e| BillingError::Config(format!("invalid pool size: {e}")))?;
    }
    if let Ok(bind_addr) = std::env::var("DEBITUM_BIND_ADDR") {
        config.server.bind_addr = bind_addr;
    }

    Ok(config)
}

/// Load configuration from a TOML file
///
/// Probes the default locations when no explicit path is given; falls back
/// to built-in defaults when no file exists.
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path.map(Path::to_path_buf).or_else(probe_config_paths) else {
        tracing::info!("no config file found, using defaults");
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        BillingError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let config = toml::from_str(&contents).map_err(|e| {
        BillingError::Config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::info!(path = %path.display(), "configuration loaded from file");
    Ok(config)
}

fn probe_config_paths() -> Option<PathBuf> {
    ["config.toml", "debitum.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| BillingError::Config(format!("missing environment variable {name}")))
}
