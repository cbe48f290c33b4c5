//! Alpha-correct resampling.
//!
//! `image::imageops::resize` filters each channel independently, so on
//! straight-alpha RGBA the color hidden under fully transparent pixels leaks
//! into its visible neighbours. Resampling premultiplied pixels weights every
//! color by its own coverage, which is what browsers do when they scale an
//! image.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Resize `image` to `width × height` and return **premultiplied** pixels.
///
/// Every color channel of the result is at most its alpha, so the buffer can
/// be loaded directly into a premultiplied surface.
pub fn resize_premultiplied(
    image: &RgbaImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> RgbaImage {
    let premultiplied = premultiply(image);
    let mut resized = if (image.width(), image.height()) == (width, height) {
        premultiplied
    } else {
        imageops::resize(&premultiplied, width, height, filter)
    };
    // Ringing filters (Lanczos, Catmull-Rom) can push a channel above alpha.
    for px in resized.pixels_mut() {
        let a = px.0[3];
        for c in &mut px.0[..3] {
            *c = (*c).min(a);
        }
    }
    resized
}

/// Straight-alpha copy of premultiplied `image`.
pub fn demultiply(image: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        demultiply_pixel(*image.get_pixel(x, y))
    })
}

pub fn demultiply_pixel(px: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, a] = px.0;
    if a == 0 {
        return Rgba([0, 0, 0, 0]);
    }
    let scale = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
    Rgba([scale(r), scale(g), scale(b), a])
}

fn premultiply(image: &RgbaImage) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let mul = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        Rgba([mul(r), mul(g), mul(b), a])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Premultiplied resize
    // =========================================================================

    #[test]
    fn hidden_color_under_transparency_does_not_bleed() {
        // Left half transparent red, right half opaque white.
        let img = RgbaImage::from_fn(40, 4, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        let small = demultiply(&resize_premultiplied(&img, 10, 1, FilterType::Triangle));
        for px in small.pixels() {
            if px.0[3] > 0 {
                // any visible pixel is white, never pink
                assert!(px.0[1] >= 250 && px.0[2] >= 250, "{px:?}");
            }
        }
    }

    #[test]
    fn ringing_filters_keep_channels_within_alpha() {
        let img = RgbaImage::from_fn(64, 8, |x, _| {
            if x % 8 < 4 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        for filter in [FilterType::Lanczos3, FilterType::CatmullRom] {
            for (w, h) in [(20, 3), (128, 16)] {
                let out = resize_premultiplied(&img, w, h, filter);
                assert!(out.pixels().all(|p| p.0[..3].iter().all(|&c| c <= p.0[3])));
            }
        }
    }

    #[test]
    fn same_size_only_premultiplies() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([200, 100, 50, 128]));
        let out = resize_premultiplied(&img, 3, 3, FilterType::Lanczos3);
        assert_eq!(out.get_pixel(1, 1).0, [100, 50, 25, 128]);
    }

    // =========================================================================
    // Demultiply
    // =========================================================================

    #[test]
    fn demultiply_restores_straight_alpha() {
        assert_eq!(demultiply_pixel(Rgba([100, 50, 25, 128])).0, [199, 100, 50, 128]);
        assert_eq!(demultiply_pixel(Rgba([9, 9, 9, 0])).0, [0, 0, 0, 0]);
        assert_eq!(demultiply_pixel(Rgba([255, 0, 0, 255])).0, [255, 0, 0, 255]);
    }
}
