//! Background resolver: style + palette + surface size → one [`FillInstruction`].
//!
//! The instruction carries resolved geometry (gradient endpoints, blob
//! anchors, radii) so the CSS preview and the raster export draw from the
//! same numbers. Resolution is pure: identical inputs give identical output.
//!
//! | Kind | Background value | Instruction |
//! |---|---|---|
//! | preset / custom / ai-suggested | `transparent` | [`FillInstruction::None`] |
//! | preset / custom / ai-suggested | color | [`FillInstruction::Solid`] |
//! | preset / custom / ai-suggested | `linear-gradient(...)` | [`FillInstruction::Linear`] |
//! | mesh | ignored | [`FillInstruction::Mesh`] |
//! | wallpaper-image | `url(...)` | [`FillInstruction::Image`] |

use crate::color::Color;
use crate::gradient::{GradientStop, parse_linear_gradient};
use crate::layout::Point;
use crate::palette::Palette;
use crate::settings::{Background, BackgroundKind, StyleSettings};
use log::warn;
use serde::Serialize;

/// Opacity of the corner-to-corner wash over the white mesh base.
pub const MESH_WASH_OPACITY: f64 = 0.95;
/// Opacity of each multiply-blended mesh blob.
pub const MESH_BLOB_OPACITY: f64 = 0.3;
/// Blob radius as a fraction of surface width.
pub const MESH_BLOB_RADIUS: f64 = 0.4;

/// Neutral ramp used when fewer than nine palette colors are available.
pub const MESH_FALLBACK_RAMP: [Color; 9] = [
    Color::rgb(0xf3, 0xf4, 0xf6),
    Color::rgb(0xe5, 0xe7, 0xeb),
    Color::rgb(0xd1, 0xd5, 0xdb),
    Color::rgb(0x9c, 0xa3, 0xaf),
    Color::rgb(0x6b, 0x72, 0x80),
    Color::rgb(0x4b, 0x55, 0x63),
    Color::rgb(0x37, 0x41, 0x51),
    Color::rgb(0x1f, 0x29, 0x37),
    Color::rgb(0x11, 0x18, 0x27),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradientFill {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<GradientStop>,
}

/// A radial blob: `color` at the center fading to fully transparent at `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshBlob {
    pub center: Point,
    pub radius: f64,
    pub color: Color,
}

/// Layers of the Aurora background, bottom to top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshFill {
    pub base: Color,
    pub wash: LinearGradientFill,
    pub wash_opacity: f64,
    /// Composited with multiply blending.
    pub blobs: Vec<MeshBlob>,
    pub blob_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FillInstruction {
    /// Leave the surface untouched.
    None,
    Solid(Color),
    Linear(LinearGradientFill),
    Mesh(MeshFill),
    /// The caller decodes `reference` and draws it covering the surface.
    Image { reference: String },
}

impl FillInstruction {
    pub fn is_none(&self) -> bool {
        matches!(self, FillInstruction::None)
    }
}

/// Resolve the background for a `width × height` surface.
///
/// `palette` is the extracted palette of the current image, if any. Mesh
/// resolution without one uses the neutral ramp.
pub fn resolve_fill(
    settings: &StyleSettings,
    palette: Option<&Palette>,
    width: f64,
    height: f64,
) -> FillInstruction {
    match settings.background_kind {
        BackgroundKind::Mesh => {
            FillInstruction::Mesh(resolve_mesh(palette, settings.mesh_seed, width, height))
        }
        BackgroundKind::Wallpaper => match &settings.background {
            Background::Image(reference) => FillInstruction::Image {
                reference: reference.clone(),
            },
            other => {
                warn!("wallpaper background without an image reference: {other}");
                FillInstruction::None
            }
        },
        BackgroundKind::Preset | BackgroundKind::Custom | BackgroundKind::AiSuggested => {
            resolve_value(&settings.background, width, height)
        }
    }
}

fn resolve_value(background: &Background, width: f64, height: f64) -> FillInstruction {
    match background {
        Background::Transparent => FillInstruction::None,
        Background::Solid(color) => FillInstruction::Solid(*color),
        Background::LinearGradient(css) => match parse_linear_gradient(css) {
            Some(spec) => {
                let (start, end) = spec.endpoints(width, height);
                FillInstruction::Linear(LinearGradientFill {
                    start,
                    end,
                    stops: spec.stops,
                })
            }
            None => {
                warn!("could not parse background gradient {css:?}, leaving canvas unfilled");
                FillInstruction::None
            }
        },
        Background::Image(reference) => FillInstruction::Image {
            reference: reference.clone(),
        },
        Background::Unrecognized(value) => {
            warn!("unrecognized background {value:?}, leaving canvas unfilled");
            FillInstruction::None
        }
    }
}

/// Nine blob colors: the palette padded with the neutral ramp.
fn mesh_colors(palette: Option<&Palette>) -> Vec<Color> {
    let colors = palette.map(|p| p.colors.as_slice()).unwrap_or(&[]);
    colors
        .iter()
        .chain(MESH_FALLBACK_RAMP.iter())
        .take(9)
        .copied()
        .collect()
}

fn resolve_mesh(palette: Option<&Palette>, seed: u32, width: f64, height: f64) -> MeshFill {
    let mut colors = mesh_colors(palette);
    let (top, bottom) = match palette {
        Some(p) => (p.gradient.top, p.gradient.bottom),
        None => (colors[0], colors[colors.len() - 1]),
    };
    colors.rotate_left((seed.saturating_sub(1) % 9) as usize);

    let blobs = colors
        .iter()
        .enumerate()
        .map(|(i, &color)| MeshBlob {
            center: Point::new((i % 3) as f64 * width / 2.0, (i / 3) as f64 * height / 2.0),
            radius: width * MESH_BLOB_RADIUS,
            color,
        })
        .collect();

    MeshFill {
        base: Color::WHITE,
        wash: LinearGradientFill {
            start: Point::new(0.0, 0.0),
            end: Point::new(width, height),
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: top,
                },
                GradientStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        },
        wash_opacity: MESH_WASH_OPACITY,
        blobs,
        blob_opacity: MESH_BLOB_OPACITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::GradientPair;

    fn style(kind: BackgroundKind, value: &str) -> StyleSettings {
        StyleSettings {
            background_kind: kind,
            background: Background::parse(value),
            ..Default::default()
        }
    }

    fn nine_color_palette() -> Palette {
        Palette {
            dominant: Color::rgb(5, 5, 5),
            colors: (1..=9).map(|i| Color::rgb(i * 10, 0, 0)).collect(),
            gradient: GradientPair {
                top: Color::rgb(1, 2, 3),
                bottom: Color::rgb(4, 5, 6),
            },
        }
    }

    // =========================================================================
    // Flat values
    // =========================================================================

    #[test]
    fn transparent_is_no_fill() {
        let fill = resolve_fill(&style(BackgroundKind::Preset, "transparent"), None, 100.0, 100.0);
        assert!(fill.is_none());
    }

    #[test]
    fn solid_color_resolves_directly() {
        let fill = resolve_fill(&style(BackgroundKind::Custom, "#336699"), None, 10.0, 10.0);
        assert_eq!(fill, FillInstruction::Solid(Color::rgb(0x33, 0x66, 0x99)));
    }

    #[test]
    fn ai_suggested_resolves_like_custom() {
        let fill = resolve_fill(
            &style(BackgroundKind::AiSuggested, "linear-gradient(to right, #000, #fff)"),
            None,
            200.0,
            100.0,
        );
        let FillInstruction::Linear(linear) = fill else {
            panic!("expected linear fill, got {fill:?}");
        };
        assert_eq!(linear.start, Point::new(0.0, 50.0));
        assert_eq!(linear.end, Point::new(200.0, 50.0));
        assert_eq!(linear.stops.len(), 2);
    }

    #[test_log::test]
    fn unrecognized_value_is_no_fill() {
        let fill = resolve_fill(&style(BackgroundKind::Custom, "plaid"), None, 10.0, 10.0);
        assert!(fill.is_none());
        let broken = resolve_fill(
            &style(BackgroundKind::Custom, "linear-gradient(45deg, nope)"),
            None,
            10.0,
            10.0,
        );
        assert!(broken.is_none());
    }

    // =========================================================================
    // Wallpaper
    // =========================================================================

    #[test]
    fn wallpaper_defers_to_image_draw() {
        let fill = resolve_fill(
            &style(BackgroundKind::Wallpaper, "url('/Wallpapers/01.png')"),
            None,
            10.0,
            10.0,
        );
        assert_eq!(
            fill,
            FillInstruction::Image {
                reference: "/Wallpapers/01.png".into()
            }
        );
    }

    #[test_log::test]
    fn wallpaper_without_reference_is_no_fill() {
        let fill = resolve_fill(&style(BackgroundKind::Wallpaper, "#fff"), None, 10.0, 10.0);
        assert!(fill.is_none());
    }

    // =========================================================================
    // Mesh
    // =========================================================================

    #[test]
    fn mesh_uses_gradient_pair_and_grid_anchors() {
        let palette = nine_color_palette();
        let fill = resolve_fill(&style(BackgroundKind::Mesh, "transparent"), Some(&palette), 400.0, 200.0);
        let FillInstruction::Mesh(mesh) = fill else {
            panic!("expected mesh");
        };
        assert_eq!(mesh.base, Color::WHITE);
        assert_eq!(mesh.wash.stops[0].color, palette.gradient.top);
        assert_eq!(mesh.wash.stops[1].color, palette.gradient.bottom);
        assert_eq!(mesh.wash.end, Point::new(400.0, 200.0));
        assert_eq!(mesh.wash_opacity, MESH_WASH_OPACITY);
        assert_eq!(mesh.blob_opacity, MESH_BLOB_OPACITY);
        assert_eq!(mesh.blobs.len(), 9);
        assert_eq!(mesh.blobs[0].center, Point::new(0.0, 0.0));
        assert_eq!(mesh.blobs[4].center, Point::new(200.0, 100.0));
        assert_eq!(mesh.blobs[8].center, Point::new(400.0, 200.0));
        assert_eq!(mesh.blobs[0].radius, 160.0);
        assert_eq!(mesh.blobs[0].color, palette.colors[0]);
    }

    #[test]
    fn short_palette_is_padded_with_the_ramp() {
        let palette = Palette::fallback();
        let colors = mesh_colors(Some(&palette));
        assert_eq!(colors.len(), 9);
        assert_eq!(&colors[..5], palette.colors.as_slice());
        assert_eq!(&colors[5..], &MESH_FALLBACK_RAMP[..4]);
    }

    #[test]
    fn mesh_without_palette_washes_ramp_ends() {
        let fill = resolve_fill(&style(BackgroundKind::Mesh, "transparent"), None, 90.0, 90.0);
        let FillInstruction::Mesh(mesh) = fill else {
            panic!("expected mesh");
        };
        assert_eq!(mesh.wash.stops[0].color, MESH_FALLBACK_RAMP[0]);
        assert_eq!(mesh.wash.stops[1].color, MESH_FALLBACK_RAMP[8]);
    }

    #[test]
    fn mesh_seed_rotates_blob_colors() {
        let palette = nine_color_palette();
        let mut s = style(BackgroundKind::Mesh, "transparent");
        s.mesh_seed = 2;
        let FillInstruction::Mesh(mesh) = resolve_fill(&s, Some(&palette), 90.0, 90.0) else {
            panic!("expected mesh");
        };
        assert_eq!(mesh.blobs[0].color, palette.colors[1]);
        assert_eq!(mesh.blobs[8].color, palette.colors[0]);
        // anchors do not move
        assert_eq!(mesh.blobs[0].center, Point::new(0.0, 0.0));
    }

    #[test]
    fn resolution_is_deterministic() {
        let palette = nine_color_palette();
        for (kind, value) in [
            (BackgroundKind::Mesh, "transparent"),
            (BackgroundKind::Preset, "linear-gradient(120deg, #84fab0 0%, #8fd3f4 100%)"),
            (BackgroundKind::Custom, "#123456"),
        ] {
            let s = style(kind, value);
            assert_eq!(
                resolve_fill(&s, Some(&palette), 321.0, 123.0),
                resolve_fill(&s, Some(&palette), 321.0, 123.0)
            );
        }
    }
}
