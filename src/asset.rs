//! The decoded source image owned by a session.
//!
//! An [`ImageAsset`] is replaced wholesale on every upload and never mutated.
//! Its [`ImageId`] is a SHA-256 of the decoded pixels, so two uploads of the
//! same photo share an identity while any pixel change produces a new one.
//! The session uses the id to tag palette requests and discard stale results.

use crate::imaging::Dimensions;
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Content-derived identity of a decoded image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageId(String);

impl ImageId {
    /// SHA-256 over the dimensions and RGBA8 pixels.
    pub fn of(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let mut hasher = Sha256::new();
        hasher.update(b"image\0");
        hasher.update(rgba.width().to_le_bytes());
        hasher.update(rgba.height().to_le_bytes());
        hasher.update(rgba.as_raw());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex digits, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded bitmap plus its identity. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    id: ImageId,
    image: Arc<DynamicImage>,
}

impl ImageAsset {
    pub fn new(image: DynamicImage) -> Self {
        let id = ImageId::of(&image);
        Self {
            id,
            image: Arc::new(image),
        }
    }

    pub fn id(&self) -> &ImageId {
        &self.id
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Natural pixel size.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}
