//! Object storage backends and key generation.
//!
//! The [`Storage`] trait is the publish seam of the ingestion pipeline: the
//! orchestrator streams a normalized artifact to it under a generated key and
//! derives the public URL itself. Backends: S3-compatible object storage for
//! production, the local filesystem for development and tests.

pub mod keys;
mod local;
mod s3;
mod traits;

pub use keys::generate_video_key;
pub use local::LocalStorage;
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
