//! Video ingestion pipeline: staging, probing, fast-start normalization, and
//! orchestration.

pub mod ingest;
pub mod media_tool;
pub mod staging;

pub use ingest::{IngestConfig, IngestError, IngestedVideo, VideoIngestor};
pub use media_tool::{FfmpegTool, MediaTool, StreamGeometry};
pub use staging::StagingScope;
