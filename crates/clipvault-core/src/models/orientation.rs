//! Orientation classification for video streams.

use serde::{Deserialize, Serialize};

/// Coarse aspect-ratio bucket derived from the first video stream's geometry.
/// Used as the storage-key prefix so assets are grouped by orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    /// Classify integer stream dimensions into an orientation bucket.
    ///
    /// Integer division makes this an approximate match: it tolerates minor
    /// encoding padding around the canonical 16:9 and 9:16 families, and
    /// everything else (including exact 4:3) lands in `Other`.
    pub fn from_dimensions(width: i64, height: i64) -> Self {
        if width / 16 == height / 9 {
            Orientation::Landscape
        } else if width / 9 == height / 16 {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }

    /// Key-prefix form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
