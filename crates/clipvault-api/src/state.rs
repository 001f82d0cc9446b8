//! Shared application state.

use crate::auth::JwtService;
use anyhow::Context;
use clipvault_core::Config;
use clipvault_db::VideoRepository;
use clipvault_processing::{FfmpegTool, IngestConfig, MediaTool, VideoIngestor};
use clipvault_storage::{S3Storage, Storage};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct AppState {
    pub config: Config,
    pub db_pool: SqlitePool,
    pub videos: VideoRepository,
    pub storage: Arc<dyn Storage>,
    pub ingestor: VideoIngestor,
    pub jwt: JwtService,
}

impl AppState {
    /// Wire up production collaborators from the configuration.
    pub async fn from_config(config: Config) -> Result<Arc<Self>, anyhow::Error> {
        let db_pool = clipvault_db::connect(&config.database_url)
            .await
            .context("Failed to connect to database")?;

        let storage: Arc<dyn Storage> = Arc::new(
            S3Storage::new(
                config.s3_bucket.clone(),
                config.s3_region.clone(),
                config.s3_endpoint.clone(),
            )
            .context("Failed to initialize object storage")?,
        );

        let tool: Arc<dyn MediaTool> = Arc::new(FfmpegTool::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
        ));

        Ok(Self::with_collaborators(config, db_pool, storage, tool))
    }

    /// Assemble state from explicit collaborators. Production wiring and
    /// tests both go through here.
    pub fn with_collaborators(
        config: Config,
        db_pool: SqlitePool,
        storage: Arc<dyn Storage>,
        tool: Arc<dyn MediaTool>,
    ) -> Arc<Self> {
        let videos = VideoRepository::new(db_pool.clone());
        let ingestor = VideoIngestor::new(
            videos.clone(),
            storage.clone(),
            tool,
            IngestConfig {
                staging_root: config.staging_root.clone(),
                public_base_url: config.public_base_url.clone(),
            },
        );
        let jwt = JwtService::new(&config.jwt_secret);

        Arc::new(AppState {
            config,
            db_pool,
            videos,
            storage,
            ingestor,
            jwt,
        })
    }
}
