//! Configuration module
//!
//! Environment-driven configuration for the API and background services:
//! server settings, storage root, upload limits, per-role retention, sweep
//! cadence, and download grace periods.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Upload limits
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_BATCH_FILES: usize = 20;

// Retention defaults (seconds)
const STAGING_TTL_SECS: u64 = 30 * 60;
const CONVERTED_TTL_SECS: u64 = 60 * 60;
const BATCH_TTL_SECS: u64 = 60 * 60;
const SWEEP_INTERVAL_SECS: u64 = 15 * 60;
const FORCED_SWEEP_TTL_SECS: u64 = 5 * 60;

// Post-download grace periods (seconds)
const DOWNLOAD_GRACE_SECS: u64 = 30;
const BATCH_DOWNLOAD_GRACE_SECS: u64 = 60;
const BATCH_DIR_GRACE_SECS: u64 = 5;

// Worker pool
const MAX_CONCURRENT_CONVERSIONS: usize = 4;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Root directory holding the role-scoped storage directories.
    pub storage_root: PathBuf,
    pub max_file_size_bytes: usize,
    pub max_batch_files: usize,
    pub allowed_content_types: Vec<String>,
    pub staging_ttl: Duration,
    pub converted_ttl: Duration,
    pub batch_ttl: Duration,
    pub sweep_interval: Duration,
    pub forced_sweep_ttl: Duration,
    pub download_grace: Duration,
    pub batch_download_grace: Duration,
    /// Delay before a batch's intermediate working directory is removed once
    /// its archive exists.
    pub batch_dir_grace: Duration,
    pub max_concurrent_conversions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/jpg,image/png,image/gif,image/bmp,image/tiff,image/webp"
                    .to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            storage_root: env::var("STORAGE_ROOT")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_batch_files: env::var("MAX_BATCH_FILES")
                .unwrap_or_else(|_| MAX_BATCH_FILES.to_string())
                .parse()
                .unwrap_or(MAX_BATCH_FILES),
            allowed_content_types,
            staging_ttl: duration_from_env("STAGING_TTL_SECS", STAGING_TTL_SECS),
            converted_ttl: duration_from_env("CONVERTED_TTL_SECS", CONVERTED_TTL_SECS),
            batch_ttl: duration_from_env("BATCH_TTL_SECS", BATCH_TTL_SECS),
            sweep_interval: duration_from_env("SWEEP_INTERVAL_SECS", SWEEP_INTERVAL_SECS),
            forced_sweep_ttl: duration_from_env("FORCED_SWEEP_TTL_SECS", FORCED_SWEEP_TTL_SECS),
            download_grace: duration_from_env("DOWNLOAD_GRACE_SECS", DOWNLOAD_GRACE_SECS),
            batch_download_grace: duration_from_env(
                "BATCH_DOWNLOAD_GRACE_SECS",
                BATCH_DOWNLOAD_GRACE_SECS,
            ),
            batch_dir_grace: duration_from_env("BATCH_DIR_GRACE_SECS", BATCH_DIR_GRACE_SECS),
            max_concurrent_conversions: env::var("MAX_CONCURRENT_CONVERSIONS")
                .unwrap_or_else(|_| MAX_CONCURRENT_CONVERSIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_CONVERSIONS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_batch_files == 0 {
            return Err(anyhow::anyhow!("MAX_BATCH_FILES must be greater than 0"));
        }

        if self.sweep_interval.is_zero() {
            return Err(anyhow::anyhow!("SWEEP_INTERVAL_SECS must be greater than 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }

        if self.max_concurrent_conversions == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_CONVERSIONS must be greater than 0"
            ));
        }

        Ok(())
    }
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}
