//! External media tool invocation.
//!
//! The pipeline never links against ffmpeg; it shells out to `ffprobe` for
//! stream inspection and `ffmpeg` for the fast-start remux, behind the
//! [`MediaTool`] trait so tests can substitute canned results.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Geometry of the first stream reported by the inspection tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamGeometry {
    pub width: i64,
    pub height: i64,
}

/// External media tool capability: one method per operation.
///
/// Both operations are blocking from the caller's point of view and are not
/// cancelled once started; their runtime is bounded by the (size-capped)
/// input.
#[async_trait]
pub trait MediaTool: Send + Sync {
    /// Inspect the file and return the first stream's geometry.
    async fn probe(&self, path: &Path) -> Result<StreamGeometry>;

    /// Remux the file with the container index moved to the front, copying
    /// all streams verbatim. Returns the path of the new sibling file; the
    /// caller owns its cleanup.
    async fn faststart(&self, path: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width: Option<i64>,
    height: Option<i64>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
fn parse_ffprobe_output(stdout: &[u8]) -> Result<StreamGeometry> {
    let parsed: FfprobeOutput =
        serde_json::from_slice(stdout).context("Malformed ffprobe output")?;
    let stream = parsed
        .streams
        .first()
        .ok_or_else(|| anyhow!("ffprobe reported no streams"))?;
    match (stream.width, stream.height) {
        (Some(width), Some(height)) => Ok(StreamGeometry { width, height }),
        _ => Err(anyhow!("First stream has no video geometry")),
    }
}

/// Production [`MediaTool`] that shells to the configured binaries.
#[derive(Clone)]
pub struct FfmpegTool {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegTool {
    pub fn new(ffmpeg_path: String, ffprobe_path: String) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
        }
    }
}

#[async_trait]
impl MediaTool for FfmpegTool {
    async fn probe(&self, path: &Path) -> Result<StreamGeometry> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffprobe")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffprobe failed: {}", stderr.trim()));
        }

        parse_ffprobe_output(&output.stdout)
    }

    async fn faststart(&self, path: &Path) -> Result<PathBuf> {
        let mut output_os = path.as_os_str().to_os_string();
        output_os.push(".processing");
        let output_path = PathBuf::from(output_os);

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(path)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .context("Failed to execute ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("ffmpeg failed: {}", stderr.trim()));
        }

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffprobe_output() {
        let stdout = br#"{"streams": [{"index": 0, "codec_type": "video", "width": 1920, "height": 1080}, {"index": 1, "codec_type": "audio"}]}"#;
        let geometry = parse_ffprobe_output(stdout).expect("parse");
        assert_eq!(geometry, StreamGeometry { width: 1920, height: 1080 });
    }

    #[test]
    fn test_parse_empty_stream_list_fails() {
        let err = parse_ffprobe_output(br#"{"streams": []}"#).unwrap_err();
        assert!(err.to_string().contains("no streams"));
    }

    #[test]
    fn test_parse_missing_geometry_fails() {
        let stdout = br#"{"streams": [{"index": 0, "codec_type": "audio"}]}"#;
        assert!(parse_ffprobe_output(stdout).is_err());
    }

    #[test]
    fn test_parse_malformed_json_fails() {
        assert!(parse_ffprobe_output(b"not json").is_err());
    }
}
