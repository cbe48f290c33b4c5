//! Configuration module.
//!
//! Handles loading, validating, and merging `snapwrap.toml`. Stock defaults
//! are the base layer; a user file in the config directory overrides any
//! subset of keys.
//!
//! ## Config File Location
//!
//! ```text
//! <config-dir>/          # current directory unless --config-dir is given
//! └── snapwrap.toml
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [style]
//! padding = 220             # Canvas padding around the card (px)
//! inset = 55                # Border width (px, before scaling)
//! border_radius = 32        # Image corner radius (px, before scaling)
//! shadow_intensity = 40     # 0-100
//! shadow_angle = 135        # Degrees, 0 = right, clockwise
//! background = "transparent"
//! background_kind = "preset"
//! aspect_ratio = "auto"
//! scale_percent = 100       # 10-300
//! pan_x = 0
//! pan_y = 0
//! mesh_seed = 1
//!
//! [export]
//! pixel_density = 2         # Device pixels per logical pixel (1-4)
//! file_name = "snapwrap.png"
//!
//! [wallpapers]
//! # directory = "wallpapers"  # Root for url("...") wallpaper references
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::PixelDensity;
use crate::settings::{SCALE_MAX, SCALE_MIN, StyleSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file inside the config directory.
pub const CONFIG_FILENAME: &str = "snapwrap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `snapwrap.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Starting style for every render.
    pub style: StyleSettings,
    /// Output surface settings.
    pub export: ExportConfig,
    /// Where wallpaper references are looked up.
    pub wallpapers: WallpaperConfig,
}

impl FrameConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.style;
        let non_negative = [
            ("style.padding", s.padding),
            ("style.inset", s.inset),
            ("style.border_radius", s.border_radius),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!("{name} must be >= 0")));
            }
        }
        if !(0.0..=100.0).contains(&s.shadow_intensity) {
            return Err(ConfigError::Validation(
                "style.shadow_intensity must be 0-100".into(),
            ));
        }
        if !(0.0..=360.0).contains(&s.shadow_angle) {
            return Err(ConfigError::Validation(
                "style.shadow_angle must be 0-360".into(),
            ));
        }
        if !(SCALE_MIN..=SCALE_MAX).contains(&s.scale_percent) {
            return Err(ConfigError::Validation(format!(
                "style.scale_percent must be {SCALE_MIN}-{SCALE_MAX}"
            )));
        }
        if !(PixelDensity::MIN..=PixelDensity::MAX).contains(&self.export.pixel_density) {
            return Err(ConfigError::Validation(format!(
                "export.pixel_density must be {}-{}",
                PixelDensity::MIN,
                PixelDensity::MAX
            )));
        }
        if !self.export.file_name.to_ascii_lowercase().ends_with(".png") {
            return Err(ConfigError::Validation(
                "export.file_name must end in .png".into(),
            ));
        }
        Ok(())
    }
}

/// Output surface settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Device pixels per logical pixel.
    pub pixel_density: u32,
    /// Default output file name.
    pub file_name: String,
}

impl ExportConfig {
    pub fn density(&self) -> PixelDensity {
        PixelDensity::new(self.pixel_density)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pixel_density: PixelDensity::default().value(),
            file_name: "snapwrap.png".to_string(),
        }
    }
}

/// Wallpaper lookup settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WallpaperConfig {
    /// Directory that `url("/...")` wallpaper references resolve against.
    /// Relative paths are relative to the config directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(FrameConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `snapwrap.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<FrameConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: FrameConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `snapwrap.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// validates the result, and anchors a relative wallpaper directory at `dir`.
pub fn load_config(dir: &Path) -> Result<FrameConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let mut config = resolve_config(base, overlay)?;
    config.wallpapers.directory = config
        .wallpapers
        .directory
        .take()
        .map(|d| if d.is_relative() { dir.join(d) } else { d });
    Ok(config)
}

/// Returns a fully-commented stock `snapwrap.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# snapwrap Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file as snapwrap.toml in the working directory, or point
# --config-dir at the directory holding it. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Frame style (the starting point for every render; CLI flags override it)
# ---------------------------------------------------------------------------
[style]
# Canvas padding around the card, in logical px.
padding = 220

# White border between card edge and image, in px before scaling.
# 0 = no border (and no shadow).
inset = 55

# Image corner radius in px before scaling. 0 = square corners.
border_radius = 32

# Drop shadow strength, 0-100, and direction in degrees
# (0 = right, 90 = down, clockwise).
shadow_intensity = 40
shadow_angle = 135

# "transparent", a color ("#1e293b", "rgb(30,41,59)"), a
# "linear-gradient(...)" or, with background_kind = "wallpaper-image",
# a url("...") reference.
background = "transparent"

# preset | custom | ai-suggested | mesh | wallpaper-image
# mesh paints an Aurora background from the image's own colors.
background_kind = "preset"

# "auto" keeps the image's shape; "1/1", "4/3", "16/9", "9/16" grow the
# canvas to that ratio without cropping.
aspect_ratio = "auto"

# Zoom applied on top of the fitted card size, 10-300.
scale_percent = 100

# Card offset from the canvas center, in logical px.
pan_x = 0
pan_y = 0

# Bump to reshuffle the mesh blobs without changing the image.
mesh_seed = 1

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Device pixels per logical pixel (1-4). 2 = crisp on high-density screens.
pixel_density = 2

# Output file name used when -o is not given.
file_name = "snapwrap.png"

# ---------------------------------------------------------------------------
# Wallpapers
# ---------------------------------------------------------------------------
[wallpapers]
# Directory that url("/...") references resolve against. Relative paths
# are relative to the config directory.
# directory = "wallpapers"
"##
}
