//! Export renderer.
//!
//! Replays a [`Composition`] on a [`RasterSurface`] at a fixed pixel density
//! and encodes the result as PNG. The geometry comes from [`compose`], the
//! same function the preview uses, so nothing here does layout math.
//!
//! Draw order:
//!
//! 1. Background fill (solid, linear gradient or mesh) over the whole canvas
//! 2. Wallpaper image covering the canvas (wallpaper kind only)
//! 3. Card shadow, cast by the border fill
//! 4. White border fill (only when inset > 0)
//! 5. Source image covering the inner rect, clipped to its rounded corners
//!
//! A source image that cannot be decoded aborts the export. A wallpaper that
//! cannot be found or decoded is logged and skipped.

use crate::asset::ImageAsset;
use crate::background::FillInstruction;
use crate::compose::{Composition, compose};
use crate::imaging::calculations::{cover_rect, device_extent};
use crate::imaging::{BackendError, Dimensions, ImageBackend, PixelDensity, RasterSurface};
use crate::palette::{Palette, extract_palette};
use crate::settings::{BackgroundKind, StyleSettings};
use image::DynamicImage;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot decode source image: {0}")]
    SourceDecode(#[source] BackendError),
    #[error("no image loaded")]
    NoImage,
    #[error("cannot allocate export surface: {0}")]
    Surface(#[source] BackendError),
    #[error("PNG encoding failed: {0}")]
    Encode(#[source] BackendError),
    #[error("export produced no data")]
    EmptyOutput,
    #[error("an export is already in progress")]
    InProgress,
    #[error("cannot write export, check the destination and try again: {0}")]
    Sink(#[from] std::io::Error),
}

/// Everything one export needs besides the backend.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub settings: &'a StyleSettings,
    pub asset: &'a ImageAsset,
    pub palette: Option<&'a Palette>,
    pub density: PixelDensity,
    /// Directory `url("...")` wallpaper references resolve against.
    pub wallpaper_root: Option<&'a Path>,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub png: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// The geometry that was drawn, in logical px.
    pub composition: Composition,
}

/// Render `request` to PNG bytes.
pub fn render_export(
    backend: &impl ImageBackend,
    request: &ExportRequest<'_>,
) -> Result<ExportOutput, ExportError> {
    let composition = compose(request.asset.dimensions(), request.settings, request.palette);
    let wallpaper = match &composition.background {
        FillInstruction::Image { reference } => {
            load_wallpaper(backend, reference, request.wallpaper_root)
        }
        _ => None,
    };

    let density = request.density;
    let pixel_width = device_extent(composition.canvas_width, density.value());
    let pixel_height = device_extent(composition.canvas_height, density.value());
    debug!(
        "export {}: canvas {:.2}x{:.2} -> {pixel_width}x{pixel_height}px @{}x",
        request.asset.id().short(),
        composition.canvas_width,
        composition.canvas_height,
        density.value()
    );

    let mut surface =
        RasterSurface::new(pixel_width, pixel_height, density).map_err(ExportError::Surface)?;
    draw_composition(&mut surface, &composition, request.asset.image(), wallpaper.as_ref());

    let png = backend
        .encode_png(&surface.to_rgba_image())
        .map_err(ExportError::Encode)?;
    if png.is_empty() {
        return Err(ExportError::EmptyOutput);
    }
    info!(
        "rendered {pixel_width}x{pixel_height} PNG ({} bytes)",
        png.len()
    );

    Ok(ExportOutput {
        png,
        pixel_width,
        pixel_height,
        composition,
    })
}

fn draw_composition(
    surface: &mut RasterSurface,
    composition: &Composition,
    source: &DynamicImage,
    wallpaper: Option<&DynamicImage>,
) {
    surface.fill_background(&composition.background);

    if let Some(wallpaper) = wallpaper {
        let canvas = composition.canvas();
        let dims = Dimensions {
            width: wallpaper.width(),
            height: wallpaper.height(),
        };
        surface.draw_image(wallpaper, cover_rect(dims, canvas), canvas, 0.0);
    }

    let card = &composition.card;
    if let Some(fill) = card.border_fill {
        if let Some(shadow) = &composition.shadow {
            surface.draw_shadow(card.outer, card.outer_radius, shadow);
        }
        surface.fill_rounded_rect(card.outer, card.outer_radius, fill);
    }

    surface.draw_image(source, card.image, card.inner, card.inner_radius);
}

/// Map a wallpaper reference to a local file.
///
/// A leading `/` is treated as relative to `root` (the reference is
/// site-absolute). Remote and inline references are not fetched.
pub fn resolve_wallpaper_path(reference: &str, root: Option<&Path>) -> Option<PathBuf> {
    let reference = reference.trim();
    let lower = reference.to_ascii_lowercase();
    if reference.is_empty()
        || lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("data:")
    {
        return None;
    }
    match root {
        Some(root) => Some(root.join(reference.trim_start_matches('/'))),
        None => Some(PathBuf::from(reference)),
    }
}

fn load_wallpaper(
    backend: &impl ImageBackend,
    reference: &str,
    root: Option<&Path>,
) -> Option<DynamicImage> {
    let Some(path) = resolve_wallpaper_path(reference, root) else {
        warn!("wallpaper {reference:?} is not a local file, exporting without it");
        return None;
    };
    match backend.decode(&path) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(
                "wallpaper {} could not be decoded, exporting without it: {e}",
                path.display()
            );
            None
        }
    }
}

/// Decode `input` and export it in one go, without a session.
///
/// The palette is only extracted when the mesh background needs it.
pub fn export_file(
    backend: &impl ImageBackend,
    input: &Path,
    settings: &StyleSettings,
    density: PixelDensity,
    wallpaper_root: Option<&Path>,
) -> Result<ExportOutput, ExportError> {
    let image = backend.decode(input).map_err(ExportError::SourceDecode)?;
    let asset = ImageAsset::new(image);
    let palette =
        (settings.background_kind == BackgroundKind::Mesh).then(|| extract_palette(asset.image()));
    render_export(
        backend,
        &ExportRequest {
            settings,
            asset: &asset,
            palette: palette.as_ref(),
            density,
            wallpaper_root,
        },
    )
}

/// Write a finished export to `path`, creating parent directories.
pub fn write_export(output: &ExportOutput, path: &Path) -> Result<(), ExportError> {
    if output.png.is_empty() {
        return Err(ExportError::EmptyOutput);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &output.png)?;
    info!("wrote {}", path.display());
    Ok(())
}
