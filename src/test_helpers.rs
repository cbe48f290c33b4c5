//! Shared test utilities for the snapwrap test suite.
//!
//! Writes synthetic images to disk and builds in-memory fixtures so tests
//! never depend on checked-in binaries.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("red.png");
//! create_test_png(&path, 100, 80, [255, 0, 0, 255]);
//!
//! let img = solid_image(10, 10, [0, 0, 255, 255]);
//! assert_pixel_near(&img.to_rgba8(), 5, 5, [0, 0, 255, 255], 0);
//! ```

use image::{DynamicImage, ImageEncoder, Rgba, RgbImage, RgbaImage};
use std::path::Path;

// =========================================================================
// Files on disk
// =========================================================================

/// Write a small valid JPEG with a gradient pattern.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let file = std::fs::File::create(path).unwrap();
    let writer = std::io::BufWriter::new(file);
    image::codecs::jpeg::JpegEncoder::new(writer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
}

/// Write a single-color PNG.
pub fn create_test_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    solid_image(width, height, rgba).save(path).unwrap();
}

// =========================================================================
// In-memory images
// =========================================================================

pub fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(rgba)))
}

/// Left half `left`, right half `right`. Handy for checking cover cropping.
pub fn split_image(width: u32, height: u32, left: [u8; 4], right: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
        Rgba(if x < width / 2 { left } else { right })
    }))
}

// =========================================================================
// Pixel assertions: panic with coordinates and values on mismatch
// =========================================================================

/// Assert every channel of the pixel at `(x, y)` is within `tolerance` of `expected`.
pub fn assert_pixel_near(img: &RgbaImage, x: u32, y: u32, expected: [u8; 4], tolerance: u8) {
    let got = img.get_pixel(x, y).0;
    let close = got
        .iter()
        .zip(expected.iter())
        .all(|(&g, &e)| g.abs_diff(e) <= tolerance);
    assert!(
        close,
        "pixel ({x}, {y}) = {got:?}, expected {expected:?} ±{tolerance}"
    );
}

pub fn alpha_at(img: &RgbaImage, x: u32, y: u32) -> u8 {
    img.get_pixel(x, y).0[3]
}
