//! Domain models.

mod orientation;
mod video;

pub use orientation::Orientation;
pub use video::{PublishedAsset, Video};
