//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Render
//!
//! ```text
//! frame.png (2162x1856 px, 184213 bytes)
//!     Canvas: 1081x928 (margin 47 top, 115 bottom, 81 left, 0 right)
//!     Card: 439.21x360 at (320.9, 283.98), scale 0.3956
//!     Background: none
//!     Shadow: offset -16.97,16.97 blur 48 spread -4 alpha 0.31
//! ```
//!
//! ## Palette
//!
//! ```text
//! Dominant #4b5563
//! Palette
//!     001 #e6e8ec
//!     ...
//! Gradient
//!     top    #e6e8ec
//!     bottom #c6cad4
//! ```
//!
//! ## Presets
//!
//! ```text
//! Gradients
//! 001 Transparent
//!     transparent
//! ...
//! Aspect ratios
//! 001 Original (auto)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::background::FillInstruction;
use crate::color::trim_float;
use crate::export::ExportOutput;
use crate::palette::Palette;
use crate::preview::PreviewStyle;
use crate::settings::{GRADIENT_PRESETS, RATIO_PRESETS};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn num(value: f64) -> String {
    trim_float(value, 2)
}

fn describe_fill(fill: &FillInstruction) -> String {
    match fill {
        FillInstruction::None => "none".to_string(),
        FillInstruction::Solid(color) => format!("solid {}", color.to_hex()),
        FillInstruction::Linear(linear) => {
            format!("linear gradient, {} stops", linear.stops.len())
        }
        FillInstruction::Mesh(mesh) => format!("mesh, {} blobs", mesh.blobs.len()),
        FillInstruction::Image { reference } => format!("wallpaper {reference}"),
    }
}

// ============================================================================
// Render
// ============================================================================

/// Summarize a finished export written to `path`.
pub fn format_render_output(output: &ExportOutput, path: &Path) -> Vec<String> {
    let c = &output.composition;
    let card = &c.card;
    let mut lines = vec![format!(
        "{} ({}x{} px, {} bytes)",
        path.display(),
        output.pixel_width,
        output.pixel_height,
        output.png.len()
    )];

    let canvas = format!("{}Canvas: {}x{}", indent(1), num(c.canvas_width), num(c.canvas_height));
    if c.margin.is_zero() {
        lines.push(canvas);
    } else {
        lines.push(format!(
            "{canvas} (margin {} top, {} bottom, {} left, {} right)",
            num(c.margin.top),
            num(c.margin.bottom),
            num(c.margin.left),
            num(c.margin.right)
        ));
    }
    lines.push(format!(
        "{}Card: {}x{} at ({}, {}), scale {}",
        indent(1),
        num(card.outer.width),
        num(card.outer.height),
        num(card.outer.x),
        num(card.outer.y),
        trim_float(c.layout.effective_scale, 4)
    ));
    lines.push(format!("{}Background: {}", indent(1), describe_fill(&c.background)));
    lines.push(match &c.shadow {
        Some(s) => format!(
            "{}Shadow: offset {},{} blur {} spread {} alpha {}",
            indent(1),
            num(s.offset_x),
            num(s.offset_y),
            num(s.blur),
            num(s.spread),
            num(s.color_alpha)
        ),
        None => format!("{}Shadow: none", indent(1)),
    });
    lines
}

pub fn print_render_output(output: &ExportOutput, path: &Path) {
    for line in format_render_output(output, path) {
        println!("{}", line);
    }
}

// ============================================================================
// Palette
// ============================================================================

pub fn format_palette(palette: &Palette) -> Vec<String> {
    let mut lines = vec![format!("Dominant {}", palette.dominant.to_hex())];
    lines.push("Palette".to_string());
    for (i, color) in palette.colors.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), color.to_hex()));
    }
    lines.push("Gradient".to_string());
    lines.push(format!("{}top    {}", indent(1), palette.gradient.top.to_hex()));
    lines.push(format!("{}bottom {}", indent(1), palette.gradient.bottom.to_hex()));
    lines
}

pub fn print_palette(palette: &Palette) {
    for line in format_palette(palette) {
        println!("{}", line);
    }
}

// ============================================================================
// Presets
// ============================================================================

pub fn format_presets() -> Vec<String> {
    let mut lines = vec!["Gradients".to_string()];
    for (i, preset) in GRADIENT_PRESETS.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), preset.name));
        lines.push(format!("{}{}", indent(1), preset.value));
    }
    lines.push(String::new());
    lines.push("Aspect ratios".to_string());
    for (i, (label, value)) in RATIO_PRESETS.iter().enumerate() {
        lines.push(format!("{} {} ({})", format_index(i + 1), label, value));
    }
    lines
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

// ============================================================================
// Preview
// ============================================================================

pub fn format_preview(style: &PreviewStyle) -> Vec<String> {
    style.to_css().lines().map(str::to_string).collect()
}

pub fn print_preview(style: &PreviewStyle) {
    for line in format_preview(style) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
