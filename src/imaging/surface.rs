//! Raster drawing surface for the export renderer, on tiny-skia.
//!
//! All inputs are logical-pixel geometry from a
//! [`Composition`](crate::compose::Composition). The surface multiplies by
//! its pixel density once, at the edge, and then draws in device pixels with
//! identity transforms.
//!
//! | Primitive | tiny-skia |
//! |---|---|
//! | solid / linear / mesh background | `fill_rect` with a color, `LinearGradient` or `RadialGradient` shader |
//! | mesh blobs | `BlendMode::Multiply` |
//! | rounded rects | cubic-bezier corners, `fill_path` |
//! | image cover + clip | `Pattern` shader (bilinear) filling the clip path |
//! | drop shadow | coverage layer → `image::imageops::fast_blur` → black at shadow alpha |

use super::backend::BackendError;
use super::params::PixelDensity;
use super::resample::resize_premultiplied;
use crate::background::{FillInstruction, LinearGradientFill, MeshFill};
use crate::color::Color;
use crate::gradient::GradientStop;
use crate::layout::{Point, Rect};
use crate::shadow::ShadowParams;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, RgbaImage};
use tiny_skia::{
    BlendMode, FillRule, FilterQuality, LinearGradient, Paint, Path, PathBuilder, Pattern,
    Pixmap, PixmapPaint, PremultipliedColorU8, RadialGradient, Shader, SpreadMode, Transform,
};

/// Cubic-bezier circle approximation constant, 4/3·tan(π/8).
const KAPPA: f32 = 0.552_284_8;

pub struct RasterSurface {
    pixmap: Pixmap,
    density: f32,
}

impl RasterSurface {
    /// Allocate a transparent `width × height` device-pixel surface.
    pub fn new(width: u32, height: u32, density: PixelDensity) -> Result<Self, BackendError> {
        let pixmap = Pixmap::new(width, height).ok_or(BackendError::Surface { width, height })?;
        Ok(Self {
            pixmap,
            density: density.factor(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn full_rect(&self) -> Option<tiny_skia::Rect> {
        tiny_skia::Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32)
    }

    fn device_rect(&self, r: Rect) -> Option<tiny_skia::Rect> {
        if r.is_empty() {
            return None;
        }
        let d = self.density;
        tiny_skia::Rect::from_xywh(
            r.x as f32 * d,
            r.y as f32 * d,
            r.width as f32 * d,
            r.height as f32 * d,
        )
    }

    fn device_point(&self, p: Point) -> tiny_skia::Point {
        tiny_skia::Point::from_xy(p.x as f32 * self.density, p.y as f32 * self.density)
    }

    fn fill_everything(&mut self, paint: &Paint) {
        if let Some(rect) = self.full_rect() {
            self.pixmap.fill_rect(rect, paint, Transform::identity(), None);
        }
    }

    /// Paint a background instruction over the whole surface.
    ///
    /// `None` and `Image` are no-ops; image backgrounds go through
    /// [`draw_image`](Self::draw_image).
    pub fn fill_background(&mut self, fill: &FillInstruction) {
        match fill {
            FillInstruction::None | FillInstruction::Image { .. } => {}
            FillInstruction::Solid(color) => self.fill_everything(&solid_paint(*color)),
            FillInstruction::Linear(linear) => {
                if let Some(shader) = self.linear_shader(linear, 1.0) {
                    self.fill_everything(&shader_paint(shader, BlendMode::SourceOver));
                }
            }
            FillInstruction::Mesh(mesh) => self.fill_mesh(mesh),
        }
    }

    fn linear_shader(&self, fill: &LinearGradientFill, opacity: f64) -> Option<Shader<'static>> {
        LinearGradient::new(
            self.device_point(fill.start),
            self.device_point(fill.end),
            skia_stops(&fill.stops, opacity),
            SpreadMode::Pad,
            Transform::identity(),
        )
    }

    fn fill_mesh(&mut self, mesh: &MeshFill) {
        self.fill_everything(&solid_paint(mesh.base));
        if let Some(shader) = self.linear_shader(&mesh.wash, mesh.wash_opacity) {
            self.fill_everything(&shader_paint(shader, BlendMode::SourceOver));
        }
        for blob in &mesh.blobs {
            let center = self.device_point(blob.center);
            let stops = vec![
                GradientStop {
                    offset: 0.0,
                    color: blob.color,
                },
                GradientStop {
                    offset: 1.0,
                    color: blob.color.with_opacity(0.0),
                },
            ];
            let shader = RadialGradient::new(
                center,
                center,
                blob.radius as f32 * self.density,
                skia_stops(&stops, mesh.blob_opacity),
                SpreadMode::Pad,
                Transform::identity(),
            );
            if let Some(shader) = shader {
                self.fill_everything(&shader_paint(shader, BlendMode::Multiply));
            }
        }
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Color) {
        let Some(path) = self.rounded_path(rect, radius) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &solid_paint(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    fn rounded_path(&self, rect: Rect, radius: f64) -> Option<Path> {
        rounded_rect_path(self.device_rect(rect)?, radius as f32 * self.density)
    }

    /// Draw the blurred shadow cast by a rounded rect.
    ///
    /// The negative spread shrinks the shape (and its radius) before the blur.
    pub fn draw_shadow(&mut self, rect: Rect, radius: f64, shadow: &ShadowParams) {
        let shrink = -shadow.spread.min(0.0);
        let shape = rect
            .inset(shrink)
            .translate(shadow.offset_x, shadow.offset_y);
        let Some(path) = self.rounded_path(shape, (radius - shrink).max(0.0)) else {
            return;
        };

        let sigma = shadow.sigma() as f32 * self.density;
        let pad = (sigma * 3.0).ceil().max(0.0) as u32;
        let Some(area) = shadow_layer_area(path.bounds(), pad, self.width(), self.height()) else {
            return;
        };
        let (w, h) = (area.width, area.height);
        let Some(mut layer) = Pixmap::new(w, h) else {
            return;
        };
        layer.fill_path(
            &path,
            &solid_paint(Color::BLACK),
            FillRule::Winding,
            Transform::from_translate(-area.x as f32, -area.y as f32),
            None,
        );

        let coverage: Vec<u8> = layer.pixels().iter().map(|p| p.alpha()).collect();
        let Some(coverage) = GrayImage::from_raw(w, h, coverage) else {
            return;
        };
        let blurred = if sigma > 0.0 {
            imageops::fast_blur(&coverage, sigma)
        } else {
            coverage
        };

        let alpha = shadow.color_alpha.clamp(0.0, 1.0);
        for (dst, src) in layer.pixels_mut().iter_mut().zip(blurred.pixels()) {
            let a = (src.0[0] as f64 * alpha).round() as u8;
            *dst = PremultipliedColorU8::from_rgba(0, 0, 0, a)
                .unwrap_or(PremultipliedColorU8::TRANSPARENT);
        }

        self.pixmap.draw_pixmap(
            area.x,
            area.y,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Draw `image` stretched into `dest`, visible only inside the rounded `clip`.
    ///
    /// The source is resampled once to its device size, premultiplied so
    /// transparent pixels do not tint their neighbours, and the pattern
    /// shader only does sub-pixel placement.
    pub fn draw_image(&mut self, image: &DynamicImage, dest: Rect, clip: Rect, clip_radius: f64) {
        let Some(dest_px) = self.device_rect(dest) else {
            return;
        };
        let Some(path) = self.rounded_path(clip, clip_radius) else {
            return;
        };

        let target_w = (dest_px.width().ceil() as u32).max(1);
        let target_h = (dest_px.height().ceil() as u32).max(1);
        let filter = if target_w < image.width() {
            FilterType::Lanczos3
        } else {
            FilterType::CatmullRom
        };
        let resampled = resize_premultiplied(&image.to_rgba8(), target_w, target_h, filter);
        let Some(pixmap) = pixmap_from_premultiplied(&resampled) else {
            return;
        };

        let transform = Transform::from_row(
            dest_px.width() / target_w as f32,
            0.0,
            0.0,
            dest_px.height() / target_h as f32,
            dest_px.x(),
            dest_px.y(),
        );
        let shader = Pattern::new(
            pixmap.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            transform,
        );
        self.pixmap.fill_path(
            &path,
            &shader_paint(shader, BlendMode::SourceOver),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Straight-alpha RGBA copy of the surface.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let w = self.width();
        let pixels = self.pixmap.pixels();
        RgbaImage::from_fn(w, self.height(), |x, y| {
            let c = pixels[(y * w + x) as usize].demultiply();
            image::Rgba([c.red(), c.green(), c.blue(), c.alpha()])
        })
    }
}

/// Device-pixel region of a shadow layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayerArea {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

/// The shape's bounds grown by the blur `pad`, limited to the surface grown
/// by the same pad (coverage further out cannot reach a visible pixel).
/// `None` when nothing of the blurred shape can land on the surface.
fn shadow_layer_area(
    bounds: tiny_skia::Rect,
    pad: u32,
    surface_w: u32,
    surface_h: u32,
) -> Option<LayerArea> {
    let pad = pad as i64;
    let x0 = (bounds.left().floor() as i64 - pad).max(-pad);
    let y0 = (bounds.top().floor() as i64 - pad).max(-pad);
    let x1 = (bounds.right().ceil() as i64 + pad).min(surface_w as i64 + pad);
    let y1 = (bounds.bottom().ceil() as i64 + pad).min(surface_h as i64 + pad);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(LayerArea {
        x: i32::try_from(x0).ok()?,
        y: i32::try_from(y0).ok()?,
        width: u32::try_from(x1 - x0).ok()?,
        height: u32::try_from(y1 - y0).ok()?,
    })
}

fn skia_color(color: Color, opacity: f64) -> tiny_skia::Color {
    let a = (color.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, a)
}

fn skia_stops(stops: &[GradientStop], opacity: f64) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| tiny_skia::GradientStop::new(s.offset as f32, skia_color(s.color, opacity)))
        .collect()
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color, 1.0));
    paint.anti_alias = true;
    paint
}

fn shader_paint(shader: Shader<'_>, blend_mode: BlendMode) -> Paint<'_> {
    Paint {
        shader,
        blend_mode,
        anti_alias: true,
        ..Paint::default()
    }
}

fn pixmap_from_premultiplied(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = PremultipliedColorU8::from_rgba(r, g, b, a)
            .unwrap_or(PremultipliedColorU8::TRANSPARENT);
    }
    Some(pixmap)
}

/// Rounded rectangle with circular corners, radius clamped to half the short side.
fn rounded_rect_path(rect: tiny_skia::Rect, radius: f32) -> Option<Path> {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    if r <= 0.0 {
        return Some(PathBuilder::from_rect(rect));
    }
    let (x, y, w, h) = (rect.x(), rect.y(), rect.width(), rect.height());
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.cubic_to(x + w - r + k, y, x + w, y + r - k, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.cubic_to(x + w, y + h - r + k, x + w - r + k, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.cubic_to(x + r - k, y + h, x, y + h - r + k, x, y + h - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}
