//! The single geometry contract shared by both renderers.
//!
//! [`compose`] runs layout, shadow and background resolution once and
//! returns a [`Composition`]: every rectangle, radius, shadow parameter and
//! fill the preview and the export need, in logical canvas coordinates.
//! Neither renderer recomputes any of it.
//!
//! Canvas coordinates include the shadow margin: the export area starts at
//! `(margin.left, margin.top)`.

use crate::background::{FillInstruction, resolve_fill};
use crate::color::Color;
use crate::imaging::Dimensions;
use crate::imaging::calculations::cover_rect;
use crate::layout::{Layout, Rect, compute_layout};
use crate::palette::Palette;
use crate::settings::StyleSettings;
use crate::shadow::{ShadowMargin, ShadowParams, compute_shadow, compute_shadow_margin};
use serde::Serialize;

/// The framed card, positioned on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardGeometry {
    /// Card bounds after centering and pan.
    pub outer: Rect,
    pub outer_radius: f64,
    /// Image clip: `outer` shrunk by the scaled inset.
    pub inner: Rect,
    pub inner_radius: f64,
    /// Where the source image lands so it covers `inner` (may overflow it).
    pub image: Rect,
    /// White border fill; present only when inset > 0.
    pub border_fill: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub margin: ShadowMargin,
    pub layout: Layout,
    pub background: FillInstruction,
    pub card: CardGeometry,
    /// Cast by the border fill. `None` when there is no fill or the shadow is invisible.
    pub shadow: Option<ShadowParams>,
}

impl Composition {
    /// The export area (canvas minus margins).
    pub fn export_area(&self) -> Rect {
        Rect::new(
            self.margin.left,
            self.margin.top,
            self.layout.export_width,
            self.layout.export_height,
        )
    }

    pub fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.canvas_width, self.canvas_height)
    }
}

/// Compose the frame for an image of natural size `image`.
pub fn compose(image: Dimensions, settings: &StyleSettings, palette: Option<&Palette>) -> Composition {
    let layout = compute_layout(image, settings);
    let margin = compute_shadow_margin(settings);
    let canvas_width = layout.export_width + margin.horizontal();
    let canvas_height = layout.export_height + margin.vertical();

    let background = resolve_fill(settings, palette, canvas_width, canvas_height);
    let card = card_geometry(image, settings, &layout, &margin);

    let shadow = Some(compute_shadow(settings))
        .filter(|s| card.border_fill.is_some() && s.is_visible());

    Composition {
        canvas_width,
        canvas_height,
        margin,
        layout,
        background,
        card,
        shadow,
    }
}

fn card_geometry(
    image: Dimensions,
    settings: &StyleSettings,
    layout: &Layout,
    margin: &ShadowMargin,
) -> CardGeometry {
    let center_x = margin.left + layout.export_width / 2.0 + settings.pan_x as f64;
    let center_y = margin.top + layout.export_height / 2.0 + settings.pan_y as f64;
    let outer = Rect::new(
        center_x - layout.card_width / 2.0,
        center_y - layout.card_height / 2.0,
        layout.card_width,
        layout.card_height,
    );

    let inset = layout.scaled_inset(settings);
    let radius = layout.scaled_radius(settings);
    let inner = outer.inset(inset);

    let outer_radius = if settings.border_radius == 0.0 {
        0.0
    } else {
        clamp_radius(radius + inset, &outer)
    };

    CardGeometry {
        outer,
        outer_radius,
        inner,
        inner_radius: clamp_radius(radius, &inner),
        image: cover_rect(image, inner),
        border_fill: (settings.inset > 0.0).then_some(Color::WHITE),
    }
}

/// A corner radius can be at most half the shorter side.
fn clamp_radius(radius: f64, rect: &Rect) -> f64 {
    radius.min(rect.width.min(rect.height) / 2.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Background, BackgroundKind};

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // =========================================================================
    // Card placement
    // =========================================================================

    #[test]
    fn card_is_centered_on_opaque_canvas() {
        let s = StyleSettings {
            padding: 10.0,
            inset: 5.0,
            border_radius: 0.0,
            shadow_intensity: 0.0,
            background: Background::parse("#0000ff"),
            background_kind: BackgroundKind::Custom,
            ..Default::default()
        };
        let c = compose(dims(100, 80), &s, None);
        assert!(c.margin.is_zero());
        assert_eq!((c.canvas_width, c.canvas_height), (100.0, 80.0));
        // safe 80x60, base 110x90 → fit 2/3
        assert!(approx(c.layout.effective_scale, 2.0 / 3.0));
        assert!(approx(c.card.outer.x, (100.0 - 110.0 * 2.0 / 3.0) / 2.0));
        assert!(approx(c.card.outer.y, 10.0));
        assert!(approx(c.card.inner.x - c.card.outer.x, 5.0 * 2.0 / 3.0));
        assert_eq!(c.card.outer_radius, 0.0);
        assert_eq!(c.card.border_fill, Some(Color::WHITE));
        assert!(c.shadow.is_none());
    }

    #[test]
    fn pan_moves_the_card_only() {
        let s = StyleSettings {
            pan_x: 30,
            pan_y: -12,
            ..Default::default()
        };
        let base = compose(dims(1000, 800), &StyleSettings::default(), None);
        let panned = compose(dims(1000, 800), &s, None);
        assert!(approx(panned.card.outer.x - base.card.outer.x, 30.0));
        assert!(approx(panned.card.outer.y - base.card.outer.y, -12.0));
        assert_eq!(panned.layout, base.layout);
        assert_eq!(panned.margin, base.margin);
    }

    #[test]
    fn transparent_margin_offsets_the_export_area() {
        let c = compose(dims(1000, 800), &StyleSettings::default(), None);
        assert!(approx(c.margin.left, 80.970563));
        assert!(approx(c.canvas_width, 1000.0 + c.margin.horizontal()));
        let area = c.export_area();
        assert!(approx(c.card.outer.center().x, area.center().x));
        assert!(approx(c.card.outer.center().y, area.center().y));
    }

    // =========================================================================
    // Radii, border and shadow
    // =========================================================================

    #[test]
    fn outer_radius_adds_scaled_inset() {
        let c = compose(dims(1000, 800), &StyleSettings::default(), None);
        let scale = c.layout.effective_scale;
        assert!(approx(c.card.inner_radius, 32.0 * scale));
        assert!(approx(c.card.outer_radius, (32.0 + 55.0) * scale));
    }

    #[test]
    fn radii_are_clamped_to_half_the_short_side() {
        let s = StyleSettings {
            border_radius: 100.0,
            inset: 0.0,
            padding: 0.0,
            ..Default::default()
        };
        let c = compose(dims(100, 40), &s, None);
        assert!(approx(c.card.inner_radius, 20.0));
        assert!(approx(c.card.outer_radius, 20.0));
    }

    #[test]
    fn zero_inset_has_no_border_and_no_shadow() {
        let s = StyleSettings {
            inset: 0.0,
            ..Default::default()
        };
        let c = compose(dims(400, 300), &s, None);
        assert_eq!(c.card.border_fill, None);
        assert!(c.shadow.is_none());
        assert_eq!(c.card.inner, c.card.outer);
    }

    #[test]
    fn shadow_follows_the_border_fill() {
        let c = compose(dims(400, 300), &StyleSettings::default(), None);
        let shadow = c.shadow.expect("default style casts a shadow");
        assert!((shadow.blur - 48.0).abs() < 1e-9);
    }

    #[test]
    fn image_covers_the_inner_rect() {
        let s = StyleSettings {
            padding: 0.0,
            inset: 0.0,
            aspect_ratio: "1/1".parse().unwrap(),
            ..Default::default()
        };
        let c = compose(dims(200, 100), &s, None);
        assert!(approx(c.card.image.width, c.card.inner.width));
        assert!(approx(c.card.image.height, c.card.inner.height));
    }

    #[test]
    fn background_is_resolved_over_the_full_canvas() {
        let s = StyleSettings {
            background_kind: BackgroundKind::Mesh,
            ..Default::default()
        };
        let c = compose(dims(300, 200), &s, None);
        let FillInstruction::Mesh(mesh) = &c.background else {
            panic!("expected mesh");
        };
        assert_eq!(mesh.wash.end.x, c.canvas_width);
        assert_eq!(mesh.wash.end.y, c.canvas_height);
    }
}
