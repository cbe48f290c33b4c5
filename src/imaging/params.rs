//! Parameter types for raster output.
//!
//! ## Types
//!
//! - [`PixelDensity`]: device pixels per logical pixel (1–4, default 2). Clamped on construction.

use serde::{Deserialize, Serialize};

/// Device pixels per logical pixel for the export surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub struct PixelDensity(u32);

impl PixelDensity {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 4;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    pub fn factor(self) -> f32 {
        self.0 as f32
    }
}

impl Default for PixelDensity {
    fn default() -> Self {
        Self(2)
    }
}

impl From<u32> for PixelDensity {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<PixelDensity> for u32 {
    fn from(d: PixelDensity) -> Self {
        d.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_clamps_to_valid_range() {
        assert_eq!(PixelDensity::new(0).value(), 1);
        assert_eq!(PixelDensity::new(3).value(), 3);
        assert_eq!(PixelDensity::new(16).value(), 4);
    }

    #[test]
    fn density_default_is_2() {
        assert_eq!(PixelDensity::default().value(), 2);
        assert_eq!(PixelDensity::default().factor(), 2.0);
    }
}
