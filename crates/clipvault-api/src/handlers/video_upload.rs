//! Video upload endpoint.
//!
//! The request body is never buffered: the multipart field streams straight
//! into the ingestion pipeline's staging file.

use crate::auth::AuthenticatedUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use clipvault_core::models::Video;
use clipvault_core::AppError;
use futures::TryStreamExt;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;

const UPLOAD_FIELD_NAME: &str = "video";

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the configured size cap".to_string())
    } else {
        AppError::InvalidInput(format!("Malformed multipart request: {}", err))
    }
}

/// `POST /api/v0/videos/{video_id}/video`
///
/// Replaces the video asset for an existing record. Returns the updated
/// record with its new public URL.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(video_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Video>, HttpAppError> {
    let video_id =
        Uuid::parse_str(&video_id).map_err(|_| AppError::InvalidId(video_id.clone()))?;

    loop {
        let field = match multipart.next_field().await.map_err(multipart_error)? {
            Some(field) => field,
            None => break,
        };
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let reader = StreamReader::new(field.map_err(std::io::Error::other));

        let ingested = state
            .ingestor
            .ingest(video_id, user.user_id, &content_type, reader)
            .await
            .map_err(AppError::from)?;

        return Ok(Json(ingested.video));
    }

    Err(AppError::InvalidInput(format!("Missing form field: {}", UPLOAD_FIELD_NAME)).into())
}
