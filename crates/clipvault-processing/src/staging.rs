//! Scoped staging area for an in-flight upload.
//!
//! Each request gets its own temporary directory under the configured
//! staging root. The staged upload and the normalizer's sibling output both
//! live inside it, so dropping the scope removes everything on every exit
//! path. The staging directory is the only disk shared between concurrent
//! requests; unique per-request directories keep them from colliding.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncRead;

const STAGED_FILE_NAME: &str = "upload.mp4";

/// Owns the on-disk staging directory for one ingestion.
pub struct StagingScope {
    dir: TempDir,
}

impl StagingScope {
    /// Create a fresh scope under `root`.
    pub fn new_in(root: &Path) -> io::Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("clipvault-ingest-")
            .tempdir_in(root)?;
        Ok(Self { dir })
    }

    /// Stream-copy the upload body into the scope and return the staged path.
    /// The body is written through to disk, never accumulated in memory.
    pub async fn stage<R>(&self, body: &mut R) -> io::Result<PathBuf>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.dir.path().join(STAGED_FILE_NAME);
        let mut file = tokio::fs::File::create(&path).await?;
        tokio::io::copy(body, &mut file).await?;
        file.sync_all().await?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}
