//! Video repository.
//!
//! Thin data access over the `videos` table. The ingestion pipeline treats
//! this as an external collaborator: it reads the current record and writes
//! back a complete replacement, relying on last-write-wins for concurrent
//! updates to the same row.

use chrono::Utc;
use clipvault_core::models::Video;
use clipvault_core::AppError;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct VideoRepository {
    pool: SqlitePool,
}

impl VideoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new video record with no asset URLs yet.
    pub async fn create_video(
        &self,
        user_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Video, AppError> {
        let video = Video {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: title.to_string(),
            description: description.to_string(),
            user_id,
            video_url: None,
            thumbnail_url: None,
        };

        sqlx::query(
            r#"
            INSERT INTO videos (id, created_at, updated_at, title, description, user_id, video_url, thumbnail_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(video.id)
        .bind(video.created_at)
        .bind(video.updated_at)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.user_id)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .execute(&self.pool)
        .await?;

        Ok(video)
    }

    /// Fetch a video record by id, `None` if absent.
    pub async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(video)
    }

    /// Replace a video record in full. Both URL fields must already be
    /// populated (carried over or new) by the caller.
    pub async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET updated_at = ?, title = ?, description = ?, user_id = ?, video_url = ?, thumbnail_url = ?
            WHERE id = ?
            "#,
        )
        .bind(video.updated_at)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.user_id)
        .bind(&video.video_url)
        .bind(&video.thumbnail_url)
        .bind(video.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("video {}", video.id)));
        }
        Ok(())
    }
}
