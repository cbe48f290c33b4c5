//! Image decoding, encoding and rasterization.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Encode → PNG** | `image::codecs::png::PngEncoder` |
//! | **Draw** | `tiny-skia` pixmap, paths and shaders |
//! | **Resample** | `image::imageops::resize` on premultiplied pixels |
//! | **Shadow blur** | `image::imageops::fast_blur` on a coverage mask |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for placement and pixel-size math (unit testable)
//! - **Parameters**: [`PixelDensity`]
//! - **Resample**: premultiplied resize shared by the surface and the palette
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Surface**: [`RasterSurface`], the drawing primitives the export renderer uses

pub mod backend;
pub(crate) mod calculations;
mod params;
pub(crate) mod resample;
pub mod rust_backend;
pub mod surface;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use params::PixelDensity;
pub use rust_backend::{RustBackend, supported_input_extensions};
pub use surface::RasterSurface;
