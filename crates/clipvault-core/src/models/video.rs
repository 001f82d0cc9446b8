//! Video record and published-asset models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A video record in the metadata store.
///
/// `video_url` and `thumbnail_url` are filled in by their respective upload
/// paths. Updates always write the complete record: the field not being
/// updated is carried over from the stored row, never nulled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl Video {
    /// Copy of this record with a new video URL, everything else carried over.
    pub fn with_video_url(&self, url: impl Into<String>) -> Video {
        Video {
            video_url: Some(url.into()),
            updated_at: Utc::now(),
            ..self.clone()
        }
    }
}

/// A durably published artifact: its storage key and public URL.
/// Created once per successful ingestion; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedAsset {
    pub storage_key: String,
    pub public_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> Video {
        Video {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            title: "demo".to_string(),
            description: "a demo clip".to_string(),
            user_id: Uuid::new_v4(),
            video_url: None,
            thumbnail_url: Some("https://cdn.example.com/thumbs/a.jpg".to_string()),
        }
    }

    #[test]
    fn test_with_video_url_carries_thumbnail_forward() {
        let video = sample_video();
        let updated = video.with_video_url("https://cdn.example.com/landscape/x.mp4");
        assert_eq!(
            updated.video_url.as_deref(),
            Some("https://cdn.example.com/landscape/x.mp4")
        );
        assert_eq!(updated.thumbnail_url, video.thumbnail_url);
        assert_eq!(updated.id, video.id);
        assert_eq!(updated.title, video.title);
    }
}
