//! Color/palette extraction for the Aurora mesh background.
//!
//! The source is downsampled to a 5×5 grid (the `image` crate's triangle
//! filter widens its support with the scale factor, so every cell is an
//! area average of its region). From that grid:
//!
//! ```text
//!   (0,0) . (2,0) . (4,0)      palette: the nine marked cells, row-major
//!     .   .   .   .   .        top:     mean of rows 0–1
//!   (0,2) . (2,2) . (4,2)      bottom:  mean of rows 3–4
//!     .   .   .   .   .        dominant: the center cell (2,2)
//!   (0,4) . (2,4) . (4,4)
//! ```
//!
//! The grid is averaged with premultiplied alpha, so a cell's color comes
//! only from its visible pixels. Cells below 50% opacity are left out of
//! every mean. A sampled cell that
//! is itself transparent takes the mean of all opaque cells instead. If no
//! cell is opaque (or the image is empty) the fixed neutral [`Palette::fallback`]
//! is returned. Extraction never fails.

use crate::color::Color;
use crate::imaging::resample::{demultiply_pixel, resize_premultiplied};
use image::DynamicImage;
use image::imageops::FilterType;
use log::debug;
use serde::Serialize;

const GRID: u32 = 5;
const OPAQUE_THRESHOLD: u8 = 128;
const SAMPLE_POINTS: [(u32, u32); 9] = [
    (0, 0),
    (2, 0),
    (4, 0),
    (0, 2),
    (2, 2),
    (4, 2),
    (0, 4),
    (2, 4),
    (4, 4),
];

/// Two-stop vertical gradient used for the mesh wash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradientPair {
    pub top: Color,
    pub bottom: Color,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub dominant: Color,
    /// Nine samples for an extracted palette; five stops for the fallback.
    pub colors: Vec<Color>,
    pub gradient: GradientPair,
}

impl Palette {
    /// Light neutral gradient with a five-stop palette mixed between its ends.
    pub fn fallback() -> Self {
        let top = Color::rgb(0xe6, 0xe8, 0xec);
        let bottom = Color::rgb(0xc6, 0xca, 0xd4);
        Self {
            dominant: Color::rgb(0x4b, 0x55, 0x63),
            colors: [0.0, 0.25, 0.5, 0.75, 1.0]
                .iter()
                .map(|&t| top.mix(bottom, t))
                .collect(),
            gradient: GradientPair { top, bottom },
        }
    }
}

/// Derive the mesh palette from `image`. Always returns a value.
pub fn extract_palette(image: &DynamicImage) -> Palette {
    match sample_grid(image) {
        Some(palette) => palette,
        None => {
            debug!(
                "no opaque pixels in {}x{} image, using fallback palette",
                image.width(),
                image.height()
            );
            Palette::fallback()
        }
    }
}

fn sample_grid(image: &DynamicImage) -> Option<Palette> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    let grid = resize_premultiplied(&image.to_rgba8(), GRID, GRID, FilterType::Triangle);
    let cell = |x: u32, y: u32| -> Option<[u8; 3]> {
        let px = demultiply_pixel(*grid.get_pixel(x, y)).0;
        (px[3] >= OPAQUE_THRESHOLD).then_some([px[0], px[1], px[2]])
    };

    let all: Vec<[u8; 3]> = (0..GRID)
        .flat_map(|y| (0..GRID).map(move |x| (x, y)))
        .filter_map(|(x, y)| cell(x, y))
        .collect();
    let overall = mean(&all)?;

    let rows_mean = |rows: &[u32]| {
        let cells: Vec<[u8; 3]> = rows
            .iter()
            .flat_map(|&y| (0..GRID).map(move |x| (x, y)))
            .filter_map(|(x, y)| cell(x, y))
            .collect();
        mean(&cells).unwrap_or(overall)
    };
    let sample = |(x, y): (u32, u32)| {
        cell(x, y)
            .map(|[r, g, b]| Color::rgb(r, g, b))
            .unwrap_or(overall)
    };

    Some(Palette {
        dominant: sample((2, 2)),
        colors: SAMPLE_POINTS.iter().map(|&p| sample(p)).collect(),
        gradient: GradientPair {
            top: rows_mean(&[0, 1]),
            bottom: rows_mean(&[3, 4]),
        },
    })
}

fn mean(cells: &[[u8; 3]]) -> Option<Color> {
    if cells.is_empty() {
        return None;
    }
    let n = cells.len() as f64;
    let mut sum = [0.0f64; 3];
    for c in cells {
        for (acc, &v) in sum.iter_mut().zip(c) {
            *acc += v as f64;
        }
    }
    let avg = |i: usize| (sum[i] / n).round() as u8;
    Some(Color::rgb(avg(0), avg(1), avg(2)))
}
