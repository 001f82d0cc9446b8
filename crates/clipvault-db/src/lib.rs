//! Database layer: SQLite pool setup and the video repository.

mod video;

pub use video::VideoRepository;

use clipvault_core::AppError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Embedded migrations, applied at startup and in tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Connect to the database and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
    Ok(pool)
}
