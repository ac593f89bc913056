use std::path::PathBuf;

use thiserror::Error;

use crate::app_config::AppConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read services file at {path}: {source}")]
    ServicesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse services file: {0}")]
    ServicesFileParse(#[from] serde_yaml::Error),

    #[error("services file validation failed: {0}")]
    Validation(String),
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function, so parsing and validation are testable against a plain map.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let cache_base_url = require("SERVMAP_CACHE_BASE_URL")?;

    let log_level = or_default("SERVMAP_LOG_LEVEL", "info");
    let services_path = PathBuf::from(or_default(
        "SERVMAP_SERVICES_PATH",
        "./config/services.yaml",
    ));
    let osrm_base_url = or_default("SERVMAP_OSRM_BASE_URL", "https://router.project-osrm.org");
    let osrm_profile = or_default("SERVMAP_OSRM_PROFILE", "driving");
    let request_timeout_secs = parse_u64("SERVMAP_REQUEST_TIMEOUT_SECS", "30")?;

    let grid_size = parse_usize("SERVMAP_GRID_SIZE", "32")?;
    if grid_size < 2 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SERVMAP_GRID_SIZE".to_string(),
            reason: format!("grid needs at least 2 points per axis, got {grid_size}"),
        });
    }

    let batch_size = parse_usize("SERVMAP_BATCH_SIZE", "20")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SERVMAP_BATCH_SIZE".to_string(),
            reason: "batch size must be at least 1".to_string(),
        });
    }

    let max_distance_km = parse_f64("SERVMAP_MAX_DISTANCE_KM", "50")?;

    let checkpoint_every_batches = parse_usize("SERVMAP_CHECKPOINT_EVERY_BATCHES", "5")?;
    if checkpoint_every_batches == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SERVMAP_CHECKPOINT_EVERY_BATCHES".to_string(),
            reason: "checkpoint interval must be at least 1 batch".to_string(),
        });
    }

    let inter_batch_delay_ms = parse_u64("SERVMAP_INTER_BATCH_DELAY_MS", "100")?;
    let recompute_cron = or_default("SERVMAP_RECOMPUTE_CRON", "0 0 4 * * *");

    Ok(AppConfig {
        log_level,
        services_path,
        osrm_base_url,
        osrm_profile,
        request_timeout_secs,
        cache_base_url,
        grid_size,
        batch_size,
        max_distance_km,
        checkpoint_every_batches,
        inter_batch_delay_ms,
        recompute_cron,
    })
}
