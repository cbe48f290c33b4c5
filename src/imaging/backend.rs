//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the renderer
//! needs from a codec: decode and encode_png.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) on the `image` crate.
//! Tests use the `MockBackend` in this module, which records every call.

use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
}

/// Pixel size of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image codec backends.
///
/// Every backend implements both operations so the session and the export
/// renderer stay backend-agnostic.
pub trait ImageBackend: Sync {
    /// Fully decode an image file.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode straight-alpha RGBA pixels as PNG.
    fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>, BackendError>;
}
