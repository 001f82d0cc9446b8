//! Configuration module
//!
//! Explicit configuration for the service, loaded from the environment at
//! startup and passed into the components that need it. Nothing reads the
//! environment after startup.

use std::env;
use std::path::PathBuf;

const DEFAULT_SERVER_PORT: u16 = 8080;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
/// Upload cap: 1 GiB, enforced at the transport layer before staging I/O.
const DEFAULT_MAX_VIDEO_SIZE_BYTES: usize = 1 << 30;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    // Object storage
    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, Spaces, ...)
    pub s3_endpoint: Option<String>,
    /// Public prefix (CDN distribution) joined with the storage key to form
    /// the published URL.
    pub public_base_url: String,
    // Ingestion
    pub staging_root: PathBuf,
    pub max_video_size_bytes: usize,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    // Misc
    pub environment: String,
    pub cors_origins: Vec<String>,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_required(key: &str) -> Result<String, anyhow::Error> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable not set", key))
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Config {
            server_port: env_parse_or("SERVER_PORT", DEFAULT_SERVER_PORT),
            database_url: env_or("DATABASE_URL", "sqlite://clipvault.db?mode=rwc"),
            jwt_secret: env_required("JWT_SECRET")?,
            jwt_expiry_hours: env_parse_or("JWT_EXPIRY_HOURS", DEFAULT_JWT_EXPIRY_HOURS),
            s3_bucket: env_required("S3_BUCKET")?,
            s3_region: env_or("S3_REGION", "us-east-1"),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            public_base_url: env_required("PUBLIC_BASE_URL")?,
            staging_root: env::var("STAGING_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            max_video_size_bytes: env_parse_or(
                "MAX_VIDEO_SIZE_BYTES",
                DEFAULT_MAX_VIDEO_SIZE_BYTES,
            ),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            environment: env_or("ENVIRONMENT", "development"),
            cors_origins: env_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        if self.s3_bucket.is_empty() {
            anyhow::bail!("S3_BUCKET must not be empty");
        }
        if self.public_base_url.is_empty() {
            anyhow::bail!("PUBLIC_BASE_URL must not be empty");
        }
        if self.max_video_size_bytes == 0 {
            anyhow::bail!("MAX_VIDEO_SIZE_BYTES must be greater than zero");
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
