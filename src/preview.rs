//! Interactive compositor contract.
//!
//! The live preview is a declarative renderer: [`PreviewStyle`] turns a
//! [`Composition`] into CSS declaration blocks for five nested elements.
//!
//! ```text
//! .snapwrap-viewport          canvas size × viewport scale
//! └── .snapwrap-canvas        canvas size, scaled down, background layers
//!     └── .snapwrap-card      outer rect, border fill, box-shadow
//!     └── .snapwrap-clip      inner rect, rounded, overflow hidden
//!         └── .snapwrap-image cover rect relative to the clip
//! ```
//!
//! Every number comes from the composition, so the preview and the export
//! renderer draw the same geometry. The gradient conversion is the only
//! translation step: a CSS gradient line always spans the element's box,
//! so stop offsets are remapped onto it.
//!
//! Pointer handling lives here too: [`viewport_scale`] fits the canvas into
//! the container, [`hit_test_card`] decides whether a press lands on the
//! card and [`PanGesture`] turns pointer movement into pan updates.

use crate::background::{FillInstruction, LinearGradientFill, MeshFill};
use crate::color::{Color, trim_float};
use crate::compose::Composition;
use crate::layout::{Point, Rect};
use crate::settings::{StylePatch, StyleSettings};
use serde::Serialize;

/// Share of the container the canvas may fill.
pub const VIEWPORT_FILL: f64 = 0.75;
/// Scale used before the container or the canvas has a size.
pub const VIEWPORT_FALLBACK_SCALE: f64 = 0.1;

/// Ordered CSS declarations, `(property, value)`.
pub type Declarations = Vec<(&'static str, String)>;

/// Scale that fits the export area into `container_width × container_height`.
///
/// Shadow margins are left out of the fit, so toggling a transparent
/// background does not zoom the preview.
pub fn viewport_scale(container_width: f64, container_height: f64, composition: &Composition) -> f64 {
    let (w, h) = (composition.layout.export_width, composition.layout.export_height);
    if container_width <= 0.0 || container_height <= 0.0 || w <= 0.0 || h <= 0.0 {
        return VIEWPORT_FALLBACK_SCALE;
    }
    (container_width * VIEWPORT_FILL / w).min(container_height * VIEWPORT_FILL / h)
}

/// Whether `point` (canvas coordinates) lies on the card, rounded corners included.
pub fn hit_test_card(composition: &Composition, point: Point) -> bool {
    let outer = composition.card.outer;
    if outer.is_empty() || !outer.contains(point) {
        return false;
    }
    let r = composition.card.outer_radius;
    if r <= 0.0 {
        return true;
    }
    let nearest_x = point.x.max(outer.x + r).min(outer.right() - r);
    let nearest_y = point.y.max(outer.y + r).min(outer.bottom() - r);
    (point.x - nearest_x).hypot(point.y - nearest_y) <= r
}

/// A drag that started on the card.
///
/// Pointer positions are viewport pixels; the gesture divides by the
/// viewport scale so the card follows the pointer exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    origin: Point,
    start_pan_x: i32,
    start_pan_y: i32,
    scale: f64,
}

impl PanGesture {
    /// Start a drag at `pointer`, or `None` if the press misses the card.
    pub fn begin(
        composition: &Composition,
        settings: &StyleSettings,
        pointer: Point,
        viewport_scale: f64,
    ) -> Option<Self> {
        if !(viewport_scale.is_finite() && viewport_scale > 0.0) {
            return None;
        }
        let on_canvas = Point::new(pointer.x / viewport_scale, pointer.y / viewport_scale);
        hit_test_card(composition, on_canvas).then_some(Self {
            origin: pointer,
            start_pan_x: settings.pan_x,
            start_pan_y: settings.pan_y,
            scale: viewport_scale,
        })
    }

    /// Pan update for the pointer now at `pointer`.
    pub fn update(&self, pointer: Point) -> StylePatch {
        let dx = ((pointer.x - self.origin.x) / self.scale).round() as i32;
        let dy = ((pointer.y - self.origin.y) / self.scale).round() as i32;
        StylePatch {
            pan_x: Some(self.start_pan_x.saturating_add(dx)),
            pan_y: Some(self.start_pan_y.saturating_add(dy)),
            ..Default::default()
        }
    }
}

/// CSS for one composition at one viewport scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewStyle {
    pub viewport: Declarations,
    pub canvas: Declarations,
    pub card: Declarations,
    pub clip: Declarations,
    pub image: Declarations,
}

impl PreviewStyle {
    pub fn new(composition: &Composition, scale: f64) -> Self {
        let (w, h) = (composition.canvas_width, composition.canvas_height);
        let card = &composition.card;

        let viewport = vec![
            ("position", "relative".into()),
            ("width", px(w * scale)),
            ("height", px(h * scale)),
            ("overflow", "hidden".into()),
        ];

        let mut canvas = vec![
            ("position", "relative".into()),
            ("width", px(w)),
            ("height", px(h)),
            ("transform", format!("scale({})", trim_float(scale, 4))),
            ("transform-origin", "top left".into()),
        ];
        canvas.extend(background_declarations(&composition.background, w, h));

        let mut card_css = placed(card.outer);
        card_css.push(("border-radius", px(card.outer_radius)));
        card_css.push((
            "background-color",
            card.border_fill
                .map_or_else(|| "transparent".to_string(), |c| c.to_css()),
        ));
        if let Some(shadow) = &composition.shadow {
            card_css.push((
                "box-shadow",
                format!(
                    "{} {} {} {} {}",
                    px(shadow.offset_x),
                    px(shadow.offset_y),
                    px(shadow.blur),
                    px(shadow.spread),
                    Color::BLACK.with_opacity(shadow.color_alpha).to_css()
                ),
            ));
        }
        card_css.push(("cursor", "grab".into()));

        let mut clip = placed(card.inner);
        clip.push(("border-radius", px(card.inner_radius)));
        clip.push(("overflow", "hidden".into()));
        clip.push(("pointer-events", "none".into()));

        let image_rect = card.image.translate(-card.inner.x, -card.inner.y);
        let mut image = placed(image_rect);
        image.push(("display", "block".into()));

        Self {
            viewport,
            canvas,
            card: card_css,
            clip,
            image,
        }
    }

    /// Render as a stylesheet.
    pub fn to_css(&self) -> String {
        let blocks = [
            ("snapwrap-viewport", &self.viewport),
            ("snapwrap-canvas", &self.canvas),
            ("snapwrap-card", &self.card),
            ("snapwrap-clip", &self.clip),
            ("snapwrap-image", &self.image),
        ];
        let mut out = String::new();
        for (class, declarations) in blocks {
            out.push_str(&format!(".{class} {{\n"));
            for (property, value) in declarations {
                out.push_str(&format!("  {property}: {value};\n"));
            }
            out.push_str("}\n");
        }
        out
    }
}

fn px(value: f64) -> String {
    format!("{}px", trim_float(value, 2))
}

fn placed(rect: Rect) -> Declarations {
    vec![
        ("position", "absolute".into()),
        ("left", px(rect.x)),
        ("top", px(rect.y)),
        ("width", px(rect.width)),
        ("height", px(rect.height)),
        ("box-sizing", "border-box".into()),
    ]
}

fn background_declarations(fill: &FillInstruction, width: f64, height: f64) -> Declarations {
    match fill {
        FillInstruction::None => vec![("background", "transparent".into())],
        FillInstruction::Solid(color) => vec![("background-color", color.to_css())],
        FillInstruction::Linear(linear) => vec![(
            "background-image",
            linear_gradient_css(linear, 1.0, width, height),
        )],
        FillInstruction::Mesh(mesh) => mesh_declarations(mesh, width, height),
        FillInstruction::Image { reference } => vec![
            (
                "background-image",
                format!("url(\"{}\")", reference.replace('"', "\\\"")),
            ),
            ("background-position", "center".into()),
            ("background-size", "cover".into()),
            ("background-repeat", "no-repeat".into()),
        ],
    }
}

/// Mesh as stacked backgrounds: blobs first (topmost), wash last, base color below.
fn mesh_declarations(mesh: &MeshFill, width: f64, height: f64) -> Declarations {
    let mut layers: Vec<String> = mesh
        .blobs
        .iter()
        .rev()
        .map(|blob| {
            let color = blob.color.with_opacity(mesh.blob_opacity);
            format!(
                "radial-gradient(circle {} at {} {}, {} 0%, {} 100%)",
                px(blob.radius),
                px(blob.center.x),
                px(blob.center.y),
                color.to_css(),
                color.with_opacity(0.0).to_css()
            )
        })
        .collect();
    let blend: Vec<&str> = std::iter::repeat_n("multiply", layers.len())
        .chain(std::iter::once("normal"))
        .collect();
    layers.push(linear_gradient_css(&mesh.wash, mesh.wash_opacity, width, height));

    vec![
        ("background-color", mesh.base.to_css()),
        ("background-image", layers.join(", ")),
        ("background-blend-mode", blend.join(", ")),
    ]
}

/// CSS angle (0deg = up, clockwise) and stop positions (0-1 along the CSS
/// gradient line) equivalent to `fill` on a `width × height` box.
fn css_gradient_geometry(fill: &LinearGradientFill, width: f64, height: f64) -> (f64, Vec<f64>) {
    let dx = fill.end.x - fill.start.x;
    let dy = fill.end.y - fill.start.y;
    let length = dx.hypot(dy);
    if length <= 0.0 {
        return (180.0, fill.stops.iter().map(|s| s.offset).collect());
    }

    let angle = dx.atan2(-dy).to_degrees().rem_euclid(360.0);
    let rad = angle.to_radians();
    let css_length = (width * rad.sin()).abs() + (height * rad.cos()).abs();
    if css_length <= 0.0 {
        return (angle, fill.stops.iter().map(|s| s.offset).collect());
    }

    // Where the box center falls on our gradient line, as an offset.
    let center = Point::new(width / 2.0, height / 2.0);
    let center_offset =
        ((center.x - fill.start.x) * dx + (center.y - fill.start.y) * dy) / (length * length);
    let positions = fill
        .stops
        .iter()
        .map(|s| 0.5 + (s.offset - center_offset) * length / css_length)
        .collect();
    (angle, positions)
}

fn linear_gradient_css(fill: &LinearGradientFill, opacity: f64, width: f64, height: f64) -> String {
    let (angle, positions) = css_gradient_geometry(fill, width, height);
    let stops: Vec<String> = fill
        .stops
        .iter()
        .zip(positions)
        .map(|(stop, pos)| {
            format!(
                "{} {}%",
                stop.color.with_opacity(opacity).to_css(),
                trim_float(pos * 100.0, 2)
            )
        })
        .collect();
    format!(
        "linear-gradient({}deg, {})",
        trim_float(angle, 2),
        stops.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::compose;
    use crate::gradient::parse_linear_gradient;
    use crate::imaging::Dimensions;
    use crate::settings::{Background, BackgroundKind};

    fn composition(settings: &StyleSettings) -> Composition {
        compose(
            Dimensions {
                width: 1000,
                height: 800,
            },
            settings,
            None,
        )
    }

    fn fill_for(css: &str, width: f64, height: f64) -> LinearGradientFill {
        let spec = parse_linear_gradient(css).unwrap();
        let (start, end) = spec.endpoints(width, height);
        LinearGradientFill {
            start,
            end,
            stops: spec.stops,
        }
    }

    // =========================================================================
    // Viewport fit
    // =========================================================================

    #[test]
    fn viewport_fills_three_quarters_of_the_tighter_axis() {
        let mut c = composition(&StyleSettings::default());
        c.layout.export_width = 400.0;
        c.layout.export_height = 300.0;
        assert!((viewport_scale(800.0, 600.0, &c) - 1.5).abs() < 1e-12);
        assert!((viewport_scale(400.0, 1000.0, &c) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn viewport_falls_back_when_empty() {
        let c = composition(&StyleSettings::default());
        assert_eq!(viewport_scale(0.0, 600.0, &c), VIEWPORT_FALLBACK_SCALE);
        let mut empty = c.clone();
        empty.layout.export_width = 0.0;
        assert_eq!(viewport_scale(800.0, 600.0, &empty), VIEWPORT_FALLBACK_SCALE);
    }

    #[test]
    fn viewport_fit_ignores_shadow_margins() {
        // default background is transparent, so the canvas carries margins
        let c = composition(&StyleSettings::default());
        assert!(c.canvas_width > 1000.0 && c.canvas_height > 800.0);
        assert!((viewport_scale(1000.0, 800.0, &c) - VIEWPORT_FILL).abs() < 1e-12);
    }

    // =========================================================================
    // Hit testing and panning
    // =========================================================================

    #[test]
    fn hit_test_respects_rounded_corners() {
        let c = composition(&StyleSettings::default());
        let outer = c.card.outer;
        assert!(hit_test_card(&c, outer.center()));
        // the very corner lies outside the rounded shape
        assert!(!hit_test_card(&c, Point::new(outer.x + 0.5, outer.y + 0.5)));
        // the middle of the top edge is on the card
        assert!(hit_test_card(&c, Point::new(outer.center().x, outer.y + 0.5)));
        assert!(!hit_test_card(&c, Point::new(outer.x - 1.0, outer.center().y)));
    }

    #[test]
    fn pan_starts_only_on_the_card() {
        let settings = StyleSettings::default();
        let c = composition(&settings);
        assert!(PanGesture::begin(&c, &settings, Point::new(1.0, 1.0), 1.0).is_none());
        assert!(PanGesture::begin(&c, &settings, c.card.outer.center(), 0.0).is_none());
    }

    #[test]
    fn pan_follows_the_pointer_in_canvas_units() {
        let settings = StyleSettings {
            pan_x: 10,
            pan_y: -5,
            ..Default::default()
        };
        let c = composition(&settings);
        let scale = 0.5;
        let center = c.card.outer.center();
        let press = Point::new(center.x * scale, center.y * scale);

        let gesture = PanGesture::begin(&c, &settings, press, scale).unwrap();
        let patch = gesture.update(Point::new(press.x + 15.0, press.y - 4.0));
        assert_eq!(patch.pan_x, Some(40));
        assert_eq!(patch.pan_y, Some(-13));
        assert_eq!(patch.padding, None);
    }

    // =========================================================================
    // Gradients
    // =========================================================================

    #[test]
    fn axis_aligned_gradients_keep_their_stops() {
        let fill = fill_for("linear-gradient(90deg, red, blue)", 200.0, 100.0);
        let (angle, positions) = css_gradient_geometry(&fill, 200.0, 100.0);
        assert!((angle - 90.0).abs() < 1e-9);
        assert!((positions[0]).abs() < 1e-9);
        assert!((positions[1] - 1.0).abs() < 1e-9);

        let fill = fill_for("linear-gradient(to bottom, red, blue)", 200.0, 100.0);
        let (angle, _) = css_gradient_geometry(&fill, 200.0, 100.0);
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_gradient_is_remapped_onto_the_css_line() {
        let fill = fill_for("linear-gradient(135deg, red 0%, blue 100%)", 200.0, 100.0);
        let (angle, positions) = css_gradient_geometry(&fill, 200.0, 100.0);
        // direction (141.42, 70.71)
        let expected_angle = 141.421_356_f64.atan2(-70.710_678).to_degrees();
        assert!((angle - expected_angle).abs() < 1e-4);

        let rad = angle.to_radians();
        let css_len = (200.0 * rad.sin()).abs() + (100.0 * rad.cos()).abs();
        let len = 141.421_356_f64.hypot(70.710_678);
        assert!((positions[0] - (0.5 - 0.5 * len / css_len)).abs() < 1e-6);
        assert!((positions[1] - (0.5 + 0.5 * len / css_len)).abs() < 1e-6);
        // symmetric around the center
        assert!((positions[0] + positions[1] - 1.0).abs() < 1e-9);
    }

    // =========================================================================
    // Stylesheet
    // =========================================================================

    #[test]
    fn stylesheet_carries_card_geometry_and_shadow() {
        let c = composition(&StyleSettings::default());
        let css = PreviewStyle::new(&c, 0.5).to_css();
        assert!(css.contains(".snapwrap-card {"));
        assert!(css.contains(&format!("left: {};", px(c.card.outer.x))));
        assert!(css.contains(&format!("border-radius: {};", px(c.card.outer_radius))));
        assert!(css.contains("box-shadow: "));
        assert!(css.contains("background-color: #ffffff;"));
        assert!(css.contains("transform: scale(0.5);"));
        assert!(css.contains("background: transparent;"));
    }

    #[test]
    fn image_block_is_relative_to_the_clip() {
        let settings = StyleSettings {
            aspect_ratio: "1/1".parse().unwrap(),
            ..Default::default()
        };
        let c = composition(&settings);
        let style = PreviewStyle::new(&c, 1.0);
        let left = &style.image.iter().find(|(k, _)| *k == "left").unwrap().1;
        assert_eq!(left, &px(c.card.image.x - c.card.inner.x));
    }

    #[test]
    fn borderless_card_has_transparent_fill_and_no_shadow() {
        let settings = StyleSettings {
            inset: 0.0,
            ..Default::default()
        };
        let style = PreviewStyle::new(&composition(&settings), 1.0);
        assert!(style.card.contains(&("background-color", "transparent".to_string())));
        assert!(!style.card.iter().any(|(k, _)| *k == "box-shadow"));
    }

    #[test]
    fn mesh_stacks_nine_multiplied_blobs_over_the_wash() {
        let settings = StyleSettings {
            background_kind: BackgroundKind::Mesh,
            ..Default::default()
        };
        let style = PreviewStyle::new(&composition(&settings), 1.0);
        let image = &style.canvas.iter().find(|(k, _)| *k == "background-image").unwrap().1;
        assert_eq!(image.matches("radial-gradient(circle").count(), 9);
        assert!(image.trim_end().ends_with(')'));
        let blend = &style
            .canvas
            .iter()
            .find(|(k, _)| *k == "background-blend-mode")
            .unwrap()
            .1;
        assert_eq!(blend.matches("multiply").count(), 9);
        assert!(blend.ends_with("normal"));
    }

    #[test]
    fn wallpaper_becomes_a_cover_background() {
        let settings = StyleSettings {
            background: Background::parse("url('/walls/a.png')"),
            background_kind: BackgroundKind::Wallpaper,
            ..Default::default()
        };
        let style = PreviewStyle::new(&composition(&settings), 1.0);
        assert!(
            style
                .canvas
                .contains(&("background-image", "url(\"/walls/a.png\")".to_string()))
        );
        assert!(style.canvas.contains(&("background-size", "cover".to_string())));
    }
}
