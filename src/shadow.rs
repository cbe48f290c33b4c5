//! Drop-shadow geometry and the canvas margins that keep it unclipped.
//!
//! For intensity `I` and angle `θ` (0° = right, clockwise on screen):
//!
//! | Quantity | Formula |
//! |---|---|
//! | offset | `(cos θ, sin θ) · 0.6·I` |
//! | blur | `1.2·I` |
//! | spread | `−0.1·I` (shrinks the shape before blurring) |
//! | alpha | `0.15 + I/250` |
//!
//! Margins only apply to transparent-background exports. On any other
//! background the canvas never grows and an extreme shadow may clip at the
//! canvas edge.

use crate::settings::StyleSettings;
use serde::Serialize;

/// Fixed pad added to every margin side.
pub const SHADOW_SAFETY_PAD: f64 = 20.0;

const OFFSET_FACTOR: f64 = 0.6;
const BLUR_FACTOR: f64 = 1.2;
const SPREAD_FACTOR: f64 = 0.1;
const BASE_ALPHA: f64 = 0.15;
const ALPHA_DIVISOR: f64 = 250.0;

/// Shadow parameters in logical pixels. Color is black at `color_alpha`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ShadowParams {
    pub offset_x: f64,
    pub offset_y: f64,
    /// CSS-style blur radius; the Gaussian sigma is half of this.
    pub blur: f64,
    /// Always ≤ 0.
    pub spread: f64,
    pub color_alpha: f64,
}

impl ShadowParams {
    pub fn is_visible(&self) -> bool {
        self.color_alpha > 0.0 && (self.blur > 0.0 || self.offset_x != 0.0 || self.offset_y != 0.0)
    }

    /// Gaussian standard deviation matching the CSS blur radius.
    pub fn sigma(&self) -> f64 {
        self.blur / 2.0
    }
}

/// Extra canvas around the export area, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ShadowMargin {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl ShadowMargin {
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    pub fn is_zero(&self) -> bool {
        *self == ShadowMargin::default()
    }
}

pub fn compute_shadow(settings: &StyleSettings) -> ShadowParams {
    let intensity = settings.shadow_intensity;
    let angle = settings.shadow_angle.to_radians();
    let distance = intensity * OFFSET_FACTOR;
    ShadowParams {
        offset_x: angle.cos() * distance,
        offset_y: angle.sin() * distance,
        blur: intensity * BLUR_FACTOR,
        spread: -intensity * SPREAD_FACTOR,
        color_alpha: BASE_ALPHA + intensity / ALPHA_DIVISOR,
    }
}

/// Margins for export-canvas sizing. All zero unless the background is transparent.
pub fn compute_shadow_margin(settings: &StyleSettings) -> ShadowMargin {
    if !settings.has_transparent_background() {
        return ShadowMargin::default();
    }
    let s = compute_shadow(settings);
    let reach = s.blur + s.spread + SHADOW_SAFETY_PAD;
    ShadowMargin {
        top: (-s.offset_y + reach).max(0.0),
        bottom: (s.offset_y + reach).max(0.0),
        left: (-s.offset_x + reach).max(0.0),
        right: (s.offset_x + reach).max(0.0),
    }
}
