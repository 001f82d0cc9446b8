//! Video ingestion orchestration: stage → probe → normalize → publish → persist.

use std::path::PathBuf;
use std::sync::Arc;

use clipvault_core::models::{Orientation, PublishedAsset, Video};
use clipvault_core::AppError;
use clipvault_db::VideoRepository;
use clipvault_storage::{generate_video_key, Storage, StorageError};
use tokio::io::AsyncRead;
use uuid::Uuid;

use crate::media_tool::MediaTool;
use crate::staging::StagingScope;

/// The single media type accepted for video uploads.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

const PUBLISHED_EXTENSION: &str = "mp4";

/// Pipeline failures, one variant per taxonomy bucket. Converted to
/// [`AppError`] at the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Staging failed: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Probe failed: {0}")]
    Probe(#[source] anyhow::Error),

    #[error("Normalize failed: {0}")]
    Normalize(#[source] anyhow::Error),

    /// Record absent or lookup failed; deliberately one bucket.
    #[error("Video not found or not owned by caller")]
    NotAuthorized,

    #[error("Publish failed: {0}")]
    Publish(#[source] StorageError),

    #[error("Persist failed: {0}")]
    Persist(#[source] AppError),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedMediaType(got) => AppError::UnsupportedMediaType(got),
            IngestError::Staging(e) => AppError::Staging(e.to_string()),
            IngestError::Probe(e) => AppError::Probe(format!("{:#}", e)),
            IngestError::Normalize(e) => AppError::Normalize(format!("{:#}", e)),
            IngestError::NotAuthorized => AppError::NotAuthorized,
            IngestError::Publish(e) => AppError::Publish(e.to_string()),
            IngestError::Persist(e) => AppError::Persist(e.to_string()),
        }
    }
}

/// Config for the ingestion pipeline.
#[derive(Clone)]
pub struct IngestConfig {
    /// Directory under which per-request staging scopes are created.
    pub staging_root: PathBuf,
    /// Public prefix (CDN distribution) joined with the storage key.
    pub public_base_url: String,
}

/// A successfully ingested upload: the updated record and the published
/// asset behind it.
#[derive(Debug, Clone)]
pub struct IngestedVideo {
    pub video: Video,
    pub asset: PublishedAsset,
}

/// Sequences the full ingestion pipeline for one upload.
///
/// Concurrent ingestions for the same video id are not serialized here; the
/// metadata store's last-write-wins semantics decide the final visible URL.
pub struct VideoIngestor {
    videos: VideoRepository,
    storage: Arc<dyn Storage>,
    tool: Arc<dyn MediaTool>,
    config: IngestConfig,
}

/// Strip parameters from a declared content type (`video/mp4; codecs=...`).
fn media_type_essence(declared: &str) -> String {
    declared
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

impl VideoIngestor {
    pub fn new(
        videos: VideoRepository,
        storage: Arc<dyn Storage>,
        tool: Arc<dyn MediaTool>,
        config: IngestConfig,
    ) -> Self {
        Self {
            videos,
            storage,
            tool,
            config,
        }
    }

    /// Run the pipeline for one upload. On any failure the request is
    /// aborted, the staged and normalized files are removed, and the stored
    /// record is left untouched.
    pub async fn ingest<R>(
        &self,
        video_id: Uuid,
        owner_id: Uuid,
        declared_content_type: &str,
        mut body: R,
    ) -> Result<IngestedVideo, IngestError>
    where
        R: AsyncRead + Send + Unpin,
    {
        let media_type = media_type_essence(declared_content_type);
        if media_type != VIDEO_CONTENT_TYPE {
            return Err(IngestError::UnsupportedMediaType(media_type));
        }

        tracing::info!(video_id = %video_id, owner_id = %owner_id, "Ingesting video upload");

        // Scope owns staged and normalized files until the request ends.
        let scope =
            StagingScope::new_in(&self.config.staging_root).map_err(IngestError::Staging)?;
        let staged = scope.stage(&mut body).await.map_err(IngestError::Staging)?;

        let geometry = self.tool.probe(&staged).await.map_err(IngestError::Probe)?;
        let orientation = Orientation::from_dimensions(geometry.width, geometry.height);
        tracing::debug!(
            video_id = %video_id,
            width = geometry.width,
            height = geometry.height,
            orientation = %orientation,
            "Probed stream geometry"
        );

        let normalized = self
            .tool
            .faststart(&staged)
            .await
            .map_err(IngestError::Normalize)?;

        // Absent record and failed lookup are one outcome by design.
        let current = match self.videos.get_video(video_id).await {
            Ok(Some(video)) => video,
            Ok(None) => return Err(IngestError::NotAuthorized),
            Err(e) => {
                tracing::debug!(video_id = %video_id, error = %e, "Video lookup failed");
                return Err(IngestError::NotAuthorized);
            }
        };

        let storage_key = generate_video_key(orientation, PUBLISHED_EXTENSION);
        let content_length = tokio::fs::metadata(&normalized).await.ok().map(|m| m.len());
        let file = tokio::fs::File::open(&normalized)
            .await
            .map_err(|e| IngestError::Normalize(e.into()))?;

        // Publish before persist: no reader observes a record URL that is
        // not durably stored yet.
        self.storage
            .put_stream(&storage_key, VIDEO_CONTENT_TYPE, content_length, Box::pin(file))
            .await
            .map_err(IngestError::Publish)?;

        let public_url = format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            storage_key
        );

        let updated = current.with_video_url(&public_url);
        if let Err(e) = self.videos.update_video(&updated).await {
            // The record never references the object, so remove it rather
            // than leak an orphan. Best effort; the persist error is what
            // the caller sees.
            if let Err(cleanup_err) = self.storage.delete(&storage_key).await {
                tracing::debug!(
                    error = %cleanup_err,
                    storage_key = %storage_key,
                    "Failed to remove published object after persist error"
                );
            }
            return Err(IngestError::Persist(e));
        }

        tracing::info!(
            video_id = %video_id,
            storage_key = %storage_key,
            public_url = %public_url,
            "Video ingestion complete"
        );

        Ok(IngestedVideo {
            video: updated,
            asset: PublishedAsset {
                storage_key,
                public_url,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_tool::StreamGeometry;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use clipvault_storage::LocalStorage;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::path::Path;

    /// Canned media tool: fixed geometry, faststart copies the staged file
    /// to the `.processing` sibling the real tool produces.
    struct StubTool {
        geometry: StreamGeometry,
        fail_probe: bool,
        fail_faststart: bool,
    }

    impl StubTool {
        fn with_geometry(width: i64, height: i64) -> Self {
            Self {
                geometry: StreamGeometry { width, height },
                fail_probe: false,
                fail_faststart: false,
            }
        }
    }

    #[async_trait]
    impl MediaTool for StubTool {
        async fn probe(&self, _path: &Path) -> anyhow::Result<StreamGeometry> {
            if self.fail_probe {
                return Err(anyhow!("ffprobe failed: invalid data"));
            }
            Ok(self.geometry)
        }

        async fn faststart(&self, path: &Path) -> anyhow::Result<PathBuf> {
            if self.fail_faststart {
                return Err(anyhow!("ffmpeg failed: moov atom not found"));
            }
            let mut output_os = path.as_os_str().to_os_string();
            output_os.push(".processing");
            let output = PathBuf::from(output_os);
            tokio::fs::copy(path, &output).await?;
            Ok(output)
        }
    }

    struct Harness {
        ingestor: VideoIngestor,
        videos: VideoRepository,
        staging_root: tempfile::TempDir,
        storage_root: tempfile::TempDir,
    }

    async fn harness(tool: StubTool) -> Harness {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        clipvault_db::MIGRATOR.run(&pool).await.expect("migrations");
        let videos = VideoRepository::new(pool);

        let staging_root = tempfile::tempdir().expect("staging root");
        let storage_root = tempfile::tempdir().expect("storage root");
        let storage = LocalStorage::new(storage_root.path())
            .await
            .expect("local storage");

        let ingestor = VideoIngestor::new(
            videos.clone(),
            Arc::new(storage),
            Arc::new(tool),
            IngestConfig {
                staging_root: staging_root.path().to_path_buf(),
                public_base_url: "https://cdn.example.com".to_string(),
            },
        );

        Harness {
            ingestor,
            videos,
            staging_root,
            storage_root,
        }
    }

    fn staging_entries(harness: &Harness) -> usize {
        std::fs::read_dir(harness.staging_root.path())
            .expect("read staging root")
            .count()
    }

    fn published_objects(harness: &Harness) -> usize {
        walk_files(harness.storage_root.path())
    }

    fn walk_files(dir: &Path) -> usize {
        let mut count = 0;
        for entry in std::fs::read_dir(dir).expect("read_dir") {
            let entry = entry.expect("entry");
            if entry.file_type().expect("file_type").is_dir() {
                count += walk_files(&entry.path());
            } else {
                count += 1;
            }
        }
        count
    }

    async fn seed_video(harness: &Harness) -> Video {
        let mut video = harness
            .videos
            .create_video(Uuid::new_v4(), "demo", "a demo clip")
            .await
            .expect("create video");
        video.thumbnail_url = Some("https://cdn.example.com/thumbs/demo.jpg".to_string());
        harness.videos.update_video(&video).await.expect("seed thumbnail");
        video
    }

    #[tokio::test]
    async fn test_ingest_landscape_upload() {
        let harness = harness(StubTool::with_geometry(1280, 720)).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"fake mp4 payload";
        let ingested = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/mp4", body)
            .await
            .expect("ingest");

        assert!(ingested.asset.storage_key.starts_with("landscape/"));
        assert!(ingested.asset.storage_key.ends_with(".mp4"));
        assert_eq!(
            ingested.asset.public_url,
            format!("https://cdn.example.com/{}", ingested.asset.storage_key)
        );

        // Record carries the new URL and the prior thumbnail.
        let stored = harness
            .videos
            .get_video(video.id)
            .await
            .expect("get")
            .expect("some");
        assert_eq!(stored.video_url.as_deref(), Some(ingested.asset.public_url.as_str()));
        assert_eq!(stored.thumbnail_url, video.thumbnail_url);

        // Artifact published, staging cleaned up.
        assert_eq!(published_objects(&harness), 1);
        assert_eq!(staging_entries(&harness), 0);
    }

    #[tokio::test]
    async fn test_ingest_portrait_prefix() {
        let harness = harness(StubTool::with_geometry(1080, 1920)).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"fake mp4 payload";
        let ingested = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/mp4", body)
            .await
            .expect("ingest");
        assert!(ingested.asset.storage_key.starts_with("portrait/"));
    }

    #[tokio::test]
    async fn test_content_type_parameters_are_stripped() {
        let harness = harness(StubTool::with_geometry(1000, 1000)).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"fake mp4 payload";
        let ingested = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/mp4; codecs=\"avc1\"", body)
            .await
            .expect("ingest");
        assert!(ingested.asset.storage_key.starts_with("other/"));
    }

    #[tokio::test]
    async fn test_unsupported_media_type_rejected_before_staging() {
        let harness = harness(StubTool::with_geometry(1280, 720)).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"riff avi bytes";
        let err = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/avi", body)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::UnsupportedMediaType(_)));
        assert_eq!(staging_entries(&harness), 0);
        assert_eq!(published_objects(&harness), 0);
        let stored = harness
            .videos
            .get_video(video.id)
            .await
            .expect("get")
            .expect("some");
        assert!(stored.video_url.is_none());
    }

    #[tokio::test]
    async fn test_probe_failure_cleans_staging() {
        let mut tool = StubTool::with_geometry(1280, 720);
        tool.fail_probe = true;
        let harness = harness(tool).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"fake mp4 payload";
        let err = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/mp4", body)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Probe(_)));
        assert_eq!(staging_entries(&harness), 0);
        assert_eq!(published_objects(&harness), 0);
    }

    #[tokio::test]
    async fn test_normalize_failure_cleans_staging() {
        let mut tool = StubTool::with_geometry(1280, 720);
        tool.fail_faststart = true;
        let harness = harness(tool).await;
        let video = seed_video(&harness).await;

        let body: &[u8] = b"fake mp4 payload";
        let err = harness
            .ingestor
            .ingest(video.id, video.user_id, "video/mp4", body)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Normalize(_)));
        assert_eq!(staging_entries(&harness), 0);
        assert_eq!(published_objects(&harness), 0);
    }

    #[tokio::test]
    async fn test_missing_record_is_not_authorized_and_nothing_published() {
        let harness = harness(StubTool::with_geometry(1280, 720)).await;

        let body: &[u8] = b"fake mp4 payload";
        let err = harness
            .ingestor
            .ingest(Uuid::new_v4(), Uuid::new_v4(), "video/mp4", body)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::NotAuthorized));
        assert_eq!(staging_entries(&harness), 0);
        assert_eq!(published_objects(&harness), 0);
    }

    /// Storage double that deletes every video row as it publishes, so the
    /// record update that follows finds nothing to update.
    struct VanishingStore {
        inner: LocalStorage,
        pool: sqlx::SqlitePool,
    }

    #[async_trait]
    impl Storage for VanishingStore {
        async fn put_stream(
            &self,
            key: &str,
            content_type: &str,
            content_length: Option<u64>,
            reader: std::pin::Pin<Box<dyn tokio::io::AsyncRead + Send + Unpin>>,
        ) -> Result<(), StorageError> {
            self.inner
                .put_stream(key, content_type, content_length, reader)
                .await?;
            sqlx::query("DELETE FROM videos")
                .execute(&self.pool)
                .await
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.inner.delete(key).await
        }

        async fn exists(&self, key: &str) -> Result<bool, StorageError> {
            self.inner.exists(key).await
        }
    }

    #[tokio::test]
    async fn test_persist_failure_removes_published_object() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("connect in-memory sqlite");
        clipvault_db::MIGRATOR.run(&pool).await.expect("migrations");
        let videos = VideoRepository::new(pool.clone());

        let staging_root = tempfile::tempdir().expect("staging root");
        let storage_root = tempfile::tempdir().expect("storage root");
        let storage = VanishingStore {
            inner: LocalStorage::new(storage_root.path())
                .await
                .expect("local storage"),
            pool,
        };

        let ingestor = VideoIngestor::new(
            videos.clone(),
            Arc::new(storage),
            Arc::new(StubTool::with_geometry(1280, 720)),
            IngestConfig {
                staging_root: staging_root.path().to_path_buf(),
                public_base_url: "https://cdn.example.com".to_string(),
            },
        );

        let video = videos
            .create_video(Uuid::new_v4(), "demo", "a demo clip")
            .await
            .expect("create video");

        let body: &[u8] = b"fake mp4 payload";
        let err = ingestor
            .ingest(video.id, video.user_id, "video/mp4", body)
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Persist(_)));
        // The published object is unpublished again; no orphan remains.
        assert_eq!(walk_files(storage_root.path()), 0);
        assert_eq!(
            std::fs::read_dir(staging_root.path()).expect("read staging root").count(),
            0
        );
    }

    #[test]
    fn test_media_type_essence() {
        assert_eq!(media_type_essence("video/mp4"), "video/mp4");
        assert_eq!(media_type_essence("VIDEO/MP4; codecs=\"avc1\""), "video/mp4");
        assert_eq!(media_type_essence(" video/avi "), "video/avi");
    }
}
