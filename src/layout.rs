//! Layout engine: canvas and card sizes from the image size and style.
//!
//! ```text
//! export   = natural size, or natural grown on one axis to hit the ratio
//! safe     = max(0, export − 2·padding)            per axis
//! base     = natural + 2·inset                     per axis
//! fit      = min(safe.w / base.w, safe.h / base.h) (0 when base is 0)
//! effective = fit · scale_percent / 100
//! card     = base · effective
//! ```
//!
//! No pixels are read here; the same [`Layout`] feeds the preview and the
//! export renderer.

use crate::imaging::Dimensions;
use crate::settings::{AspectRatio, StyleSettings};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Shrink by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f64) -> Rect {
        Rect {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - 2.0 * amount).max(0.0),
            height: (self.height - 2.0 * amount).max(0.0),
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Derived geometry, in logical (1x) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Layout {
    pub export_width: f64,
    pub export_height: f64,
    pub card_width: f64,
    pub card_height: f64,
    pub fit_scale: f64,
    /// `fit_scale × scale_percent / 100`, applied to inset and corner radius.
    pub effective_scale: f64,
}

impl Layout {
    /// Inset in canvas units after scaling.
    pub fn scaled_inset(&self, settings: &StyleSettings) -> f64 {
        settings.inset * self.effective_scale
    }

    /// Image corner radius in canvas units after scaling.
    pub fn scaled_radius(&self, settings: &StyleSettings) -> f64 {
        settings.border_radius * self.effective_scale
    }
}

/// Compute the layout for an image of natural size `image`.
///
/// An empty image (either side 0) yields an all-zero layout.
pub fn compute_layout(image: Dimensions, settings: &StyleSettings) -> Layout {
    if image.width == 0 || image.height == 0 {
        return Layout::default();
    }
    let natural_w = image.width as f64;
    let natural_h = image.height as f64;

    let (export_width, export_height) = export_size(natural_w, natural_h, settings.aspect_ratio);

    let safe_w = (export_width - settings.padding * 2.0).max(0.0);
    let safe_h = (export_height - settings.padding * 2.0).max(0.0);
    let base_w = natural_w + settings.inset * 2.0;
    let base_h = natural_h + settings.inset * 2.0;

    let fit_scale = if base_w <= 0.0 || base_h <= 0.0 {
        0.0
    } else {
        (safe_w / base_w).min(safe_h / base_h)
    };
    let effective_scale = fit_scale * (settings.scale_percent / 100.0);

    Layout {
        export_width,
        export_height,
        card_width: base_w * effective_scale,
        card_height: base_h * effective_scale,
        fit_scale,
        effective_scale,
    }
}

/// Grow one axis of the natural size so `w / h` matches the ratio.
fn export_size(natural_w: f64, natural_h: f64, ratio: AspectRatio) -> (f64, f64) {
    match ratio.value() {
        None => (natural_w, natural_h),
        Some(target) => {
            if natural_w / natural_h > target {
                (natural_w, natural_w / target)
            } else {
                (natural_h * target, natural_h)
            }
        }
    }
}
