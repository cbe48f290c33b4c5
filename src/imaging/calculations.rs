//! Pure calculation functions for image placement and pixel sizes.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use crate::layout::Rect;

/// Place a `source`-sized image so it covers `target`, centered.
///
/// The returned rect matches `target` on one axis and overflows it on the
/// other (CSS `object-fit: cover`). An empty source or target yields `target`.
pub fn cover_rect(source: Dimensions, target: Rect) -> Rect {
    if source.width == 0 || source.height == 0 || target.is_empty() {
        return target;
    }
    let src_aspect = source.width as f64 / source.height as f64;
    let tgt_aspect = target.width / target.height;

    let (width, height) = if src_aspect > tgt_aspect {
        // Source is wider: height matches, width overflows
        (target.height * src_aspect, target.height)
    } else {
        // Source is taller: width matches, height overflows
        (target.width, target.width / src_aspect)
    };
    Rect::new(
        target.x + (target.width - width) / 2.0,
        target.y + (target.height - height) / 2.0,
        width,
        height,
    )
}

/// Device pixel count for a logical length at `density` (truncated).
pub fn device_extent(logical: f64, density: u32) -> u32 {
    let px = logical * density as f64;
    if px.is_finite() && px > 0.0 {
        px.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    // =========================================================================
    // cover_rect
    // =========================================================================

    #[test]
    fn cover_wide_source_in_square() {
        let r = cover_rect(dims(200, 100), Rect::new(10.0, 10.0, 50.0, 50.0));
        assert_eq!(r, Rect::new(-15.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn cover_tall_source_in_square() {
        let r = cover_rect(dims(100, 400), Rect::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(r, Rect::new(0.0, -60.0, 40.0, 160.0));
    }

    #[test]
    fn cover_same_aspect_is_exact() {
        let target = Rect::new(3.0, 4.0, 80.0, 60.0);
        assert_eq!(cover_rect(dims(800, 600), target), target);
    }

    #[test]
    fn cover_empty_inputs_return_target() {
        let target = Rect::new(1.0, 1.0, 0.0, 5.0);
        assert_eq!(cover_rect(dims(10, 10), target), target);
        assert_eq!(cover_rect(dims(0, 10), Rect::new(0.0, 0.0, 5.0, 5.0)).width, 5.0);
    }

    // =========================================================================
    // device_extent
    // =========================================================================

    #[test]
    fn device_extent_truncates() {
        assert_eq!(device_extent(100.0, 2), 200);
        assert_eq!(device_extent(100.7, 2), 201);
        assert_eq!(device_extent(227.9, 1), 227);
        assert_eq!(device_extent(-3.0, 2), 0);
        assert_eq!(device_extent(f64::NAN, 2), 0);
    }
}
