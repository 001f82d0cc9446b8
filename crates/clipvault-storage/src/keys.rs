//! Storage key generation.
//!
//! Key format: `{orientation}/{token}.{extension}` where `token` encodes 32
//! cryptographically random bytes as unpadded base64-URL. At that entropy the
//! collision probability is negligible, so keys are never checked for
//! uniqueness against existing objects.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use clipvault_core::models::Orientation;
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// Generate a storage key for a published video asset.
pub fn generate_video_key(orientation: Orientation, extension: &str) -> String {
    let mut raw = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut raw);
    let token = URL_SAFE_NO_PAD.encode(raw);
    format!("{}/{}.{}", orientation.as_str(), token, extension)
}
