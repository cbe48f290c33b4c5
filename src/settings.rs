//! Style settings: the immutable snapshot every render is computed from.
//!
//! [`StyleSettings`] is a plain value. The UI (or CLI) never mutates a
//! snapshot that a renderer holds; it builds a [`StylePatch`] and the
//! [`Session`](crate::session::Session) produces the next snapshot from it.
//!
//! ## Defaults and presets
//!
//! ```text
//! padding 220, inset 55, border_radius 32, shadow 40 @ 135°,
//! background "transparent" (preset), aspect "auto", scale 100%, pan 0/0, mesh_seed 1
//! ```
//!
//! | Preset | Fields |
//! |---|---|
//! | `borderless` | inset 0, padding 220, background_kind mesh |
//! | `transparent` | inset 55, padding 220, background "transparent", kind preset |

use crate::color::{Color, normalize_color_input};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("invalid aspect ratio {0:?} (expected \"auto\" or \"W/H\")")]
    AspectRatio(String),
    #[error("unknown background kind {0:?}")]
    BackgroundKind(String),
    #[error("unknown preset {0:?}")]
    Preset(String),
}

pub const PADDING_MAX: f64 = 400.0;
pub const INSET_MAX: f64 = 100.0;
pub const RADIUS_MAX: f64 = 100.0;
pub const SCALE_MIN: f64 = 10.0;
pub const SCALE_MAX: f64 = 300.0;

/// Where the background value came from. Drives how the resolver reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackgroundKind {
    #[serde(rename = "preset")]
    Preset,
    #[serde(rename = "custom")]
    Custom,
    #[serde(rename = "ai-suggested", alias = "ai")]
    AiSuggested,
    #[serde(rename = "mesh")]
    Mesh,
    #[serde(rename = "wallpaper-image", alias = "wallpaper")]
    Wallpaper,
}

impl BackgroundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundKind::Preset => "preset",
            BackgroundKind::Custom => "custom",
            BackgroundKind::AiSuggested => "ai-suggested",
            BackgroundKind::Mesh => "mesh",
            BackgroundKind::Wallpaper => "wallpaper-image",
        }
    }
}

impl FromStr for BackgroundKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "preset" => Ok(BackgroundKind::Preset),
            "custom" => Ok(BackgroundKind::Custom),
            "ai" | "ai-suggested" => Ok(BackgroundKind::AiSuggested),
            "mesh" | "aurora" => Ok(BackgroundKind::Mesh),
            "wallpaper" | "wallpaper-image" => Ok(BackgroundKind::Wallpaper),
            _ => Err(SettingsError::BackgroundKind(s.to_string())),
        }
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target canvas aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    /// Canvas matches the image's natural size.
    Auto,
    /// Canvas grows one axis of the natural size to reach `width / height`.
    Ratio { width: f64, height: f64 },
}

impl AspectRatio {
    /// `width / height`, or `None` for [`AspectRatio::Auto`].
    pub fn value(&self) -> Option<f64> {
        match self {
            AspectRatio::Auto => None,
            AspectRatio::Ratio { width, height } => Some(width / height),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("auto") || trimmed.eq_ignore_ascii_case("original") {
            return Ok(AspectRatio::Auto);
        }
        let err = || SettingsError::AspectRatio(s.to_string());
        let (w, h) = trimmed
            .split_once('/')
            .or_else(|| trimmed.split_once(':'))
            .ok_or_else(err)?;
        let width: f64 = w.trim().parse().map_err(|_| err())?;
        let height: f64 = h.trim().parse().map_err(|_| err())?;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(err());
        }
        Ok(AspectRatio::Ratio { width, height })
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Auto => f.write_str("auto"),
            AspectRatio::Ratio { width, height } => write!(f, "{width}/{height}"),
        }
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(r: AspectRatio) -> Self {
        r.to_string()
    }
}

/// The background value as typed, classified by shape.
///
/// Parsing never fails: a string that is neither `transparent`, a color,
/// a `linear-gradient(...)` nor a `url(...)` is kept as
/// [`Background::Unrecognized`] and resolves to no fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Background {
    Transparent,
    Solid(Color),
    /// A CSS `linear-gradient(...)` string, parsed lazily by the resolver.
    LinearGradient(String),
    /// Image reference extracted from `url("...")`.
    Image(String),
    Unrecognized(String),
}

impl Background {
    pub fn parse(input: &str) -> Self {
        let val = normalize_color_input(input);
        if val == "transparent" {
            return Background::Transparent;
        }
        if val.to_ascii_lowercase().starts_with("linear-gradient") {
            return Background::LinearGradient(val);
        }
        if let Some(reference) = parse_url_reference(&val) {
            return Background::Image(reference);
        }
        match Color::parse(&val) {
            Some(c) if c.is_transparent() => Background::Transparent,
            Some(c) => Background::Solid(c),
            None => Background::Unrecognized(val),
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Background::Transparent)
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::Transparent
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Background::Transparent => f.write_str("transparent"),
            Background::Solid(c) => f.write_str(&c.to_hex()),
            Background::LinearGradient(s) | Background::Unrecognized(s) => f.write_str(s),
            Background::Image(reference) => write!(f, "url(\"{reference}\")"),
        }
    }
}

impl From<String> for Background {
    fn from(value: String) -> Self {
        Background::parse(&value)
    }
}

impl From<Background> for String {
    fn from(b: Background) -> Self {
        b.to_string()
    }
}

/// Extract the reference from `url(...)`, with or without quotes.
fn parse_url_reference(val: &str) -> Option<String> {
    let inner = val.strip_prefix("url(")?.strip_suffix(')')?.trim();
    let inner = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    (!inner.is_empty()).then(|| inner.to_string())
}

/// Immutable style snapshot consumed by layout, shadow, background and both renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSettings {
    /// Canvas padding around the card, logical px.
    pub padding: f64,
    /// Border width between card edge and image, logical px before scaling.
    pub inset: f64,
    /// Image corner radius, logical px before scaling.
    pub border_radius: f64,
    /// 0–100.
    pub shadow_intensity: f64,
    /// Degrees, 0 = right, clockwise in screen coordinates.
    pub shadow_angle: f64,
    pub background: Background,
    pub background_kind: BackgroundKind,
    pub aspect_ratio: AspectRatio,
    /// User zoom, 10–300.
    pub scale_percent: f64,
    pub pan_x: i32,
    pub pan_y: i32,
    /// Bumped to re-layout the mesh without touching the image.
    pub mesh_seed: u32,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            padding: 220.0,
            inset: 55.0,
            border_radius: 32.0,
            shadow_intensity: 40.0,
            shadow_angle: 135.0,
            background: Background::Transparent,
            background_kind: BackgroundKind::Preset,
            aspect_ratio: AspectRatio::Auto,
            scale_percent: 100.0,
            pan_x: 0,
            pan_y: 0,
            mesh_seed: 1,
        }
    }
}

impl StyleSettings {
    /// Clamp every field into its documented domain.
    ///
    /// Non-finite numbers fall back to the default for that field.
    pub fn normalized(mut self) -> Self {
        let defaults = StyleSettings::default();
        let clean = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        self.padding = clean(self.padding, defaults.padding).max(0.0);
        self.inset = clean(self.inset, defaults.inset).max(0.0);
        self.border_radius = clean(self.border_radius, defaults.border_radius).max(0.0);
        self.shadow_intensity =
            clean(self.shadow_intensity, defaults.shadow_intensity).clamp(0.0, 100.0);
        self.shadow_angle = clean(self.shadow_angle, defaults.shadow_angle).rem_euclid(360.0);
        self.scale_percent =
            clean(self.scale_percent, defaults.scale_percent).clamp(SCALE_MIN, SCALE_MAX);
        self
    }

    /// Whether the active background leaves the canvas fully transparent.
    ///
    /// Mesh and wallpaper kinds always paint the canvas, whatever the
    /// background string still holds from an earlier choice.
    pub fn has_transparent_background(&self) -> bool {
        match self.background_kind {
            BackgroundKind::Mesh | BackgroundKind::Wallpaper => false,
            BackgroundKind::Preset | BackgroundKind::Custom | BackgroundKind::AiSuggested => {
                self.background.is_transparent()
            }
        }
    }
}

/// A partial update to [`StyleSettings`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylePatch {
    pub padding: Option<f64>,
    pub inset: Option<f64>,
    pub border_radius: Option<f64>,
    pub shadow_intensity: Option<f64>,
    pub shadow_angle: Option<f64>,
    pub background: Option<Background>,
    pub background_kind: Option<BackgroundKind>,
    pub aspect_ratio: Option<AspectRatio>,
    pub scale_percent: Option<f64>,
    pub pan_x: Option<i32>,
    pub pan_y: Option<i32>,
    pub mesh_seed: Option<u32>,
}

impl StylePatch {
    /// Produce the next snapshot. The result is always normalized.
    pub fn apply(&self, base: &StyleSettings) -> StyleSettings {
        let p = self.clone();
        StyleSettings {
            padding: p.padding.unwrap_or(base.padding),
            inset: p.inset.unwrap_or(base.inset),
            border_radius: p.border_radius.unwrap_or(base.border_radius),
            shadow_intensity: p.shadow_intensity.unwrap_or(base.shadow_intensity),
            shadow_angle: p.shadow_angle.unwrap_or(base.shadow_angle),
            background: p.background.unwrap_or_else(|| base.background.clone()),
            background_kind: p.background_kind.unwrap_or(base.background_kind),
            aspect_ratio: p.aspect_ratio.unwrap_or(base.aspect_ratio),
            scale_percent: p.scale_percent.unwrap_or(base.scale_percent),
            pan_x: p.pan_x.unwrap_or(base.pan_x),
            pan_y: p.pan_y.unwrap_or(base.pan_y),
            mesh_seed: p.mesh_seed.unwrap_or(base.mesh_seed),
        }
        .normalized()
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merged(self, other: StylePatch) -> StylePatch {
        StylePatch {
            padding: other.padding.or(self.padding),
            inset: other.inset.or(self.inset),
            border_radius: other.border_radius.or(self.border_radius),
            shadow_intensity: other.shadow_intensity.or(self.shadow_intensity),
            shadow_angle: other.shadow_angle.or(self.shadow_angle),
            background: other.background.or(self.background),
            background_kind: other.background_kind.or(self.background_kind),
            aspect_ratio: other.aspect_ratio.or(self.aspect_ratio),
            scale_percent: other.scale_percent.or(self.scale_percent),
            pan_x: other.pan_x.or(self.pan_x),
            pan_y: other.pan_y.or(self.pan_y),
            mesh_seed: other.mesh_seed.or(self.mesh_seed),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }

    /// Pure background, no border: the Aurora mesh fills the canvas.
    pub fn borderless() -> Self {
        Self {
            inset: Some(0.0),
            padding: Some(220.0),
            background_kind: Some(BackgroundKind::Mesh),
            ..Default::default()
        }
    }

    /// Pure border on a transparent canvas.
    pub fn transparent() -> Self {
        Self {
            inset: Some(55.0),
            padding: Some(220.0),
            background: Some(Background::Transparent),
            background_kind: Some(BackgroundKind::Preset),
            ..Default::default()
        }
    }

    /// Applied whenever a new image replaces the current one.
    pub fn after_upload() -> Self {
        Self {
            pan_x: Some(0),
            pan_y: Some(0),
            scale_percent: Some(100.0),
            ..Default::default()
        }
        .merged(Self::transparent())
    }

    /// Picking a ratio recenters the card and resets zoom.
    pub fn aspect_ratio(ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio: Some(ratio),
            scale_percent: Some(100.0),
            pan_x: Some(0),
            pan_y: Some(0),
            ..Default::default()
        }
    }

    /// Selecting a gradient from the preset catalog.
    pub fn gradient_preset(preset: &GradientPreset) -> Self {
        Self {
            background: Some(Background::parse(preset.value)),
            background_kind: Some(BackgroundKind::Preset),
            ..Default::default()
        }
    }

    /// Look up a named preset bundle (`borderless`, `transparent`).
    pub fn named(name: &str) -> Result<Self, SettingsError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "borderless" => Ok(Self::borderless()),
            "transparent" => Ok(Self::transparent()),
            _ => Err(SettingsError::Preset(name.to_string())),
        }
    }
}

/// A named gradient background from the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPreset {
    pub name: &'static str,
    pub value: &'static str,
}

pub const GRADIENT_PRESETS: &[GradientPreset] = &[
    GradientPreset { name: "Transparent", value: "transparent" },
    GradientPreset { name: "Desktop", value: "linear-gradient(135deg, #FF9A9E 0%, #FECFEF 99%, #FECFEF 100%)" },
    GradientPreset { name: "Cool", value: "linear-gradient(120deg, #84fab0 0%, #8fd3f4 100%)" },
    GradientPreset { name: "Nice", value: "linear-gradient(120deg, #e0c3fc 0%, #8ec5fc 100%)" },
    GradientPreset { name: "Morning", value: "linear-gradient(120deg, #f6d365 0%, #fda085 100%)" },
    GradientPreset { name: "Bright", value: "linear-gradient(to right, #4facfe 0%, #00f2fe 100%)" },
    GradientPreset { name: "Love", value: "linear-gradient(to top, #30cfd0 0%, #330867 100%)" },
    GradientPreset { name: "Rain", value: "linear-gradient(to top, #5f72bd 0%, #9b23ea 100%)" },
    GradientPreset { name: "Sky", value: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)" },
    GradientPreset { name: "Subtle Gray", value: "linear-gradient(to bottom, #f3f4f6, #d1d5db)" },
];

/// Aspect ratios offered by the ratio picker, as `(label, value)`.
pub const RATIO_PRESETS: &[(&str, &str)] = &[
    ("Original", "auto"),
    ("1:1", "1/1"),
    ("4:3", "4/3"),
    ("16:9", "16/9"),
    ("9:16", "9/16"),
];
