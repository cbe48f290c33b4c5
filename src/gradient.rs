//! Parser for CSS `linear-gradient(...)` backgrounds.
//!
//! Accepted direction forms: `<n>deg`, `<n>turn`, `<n>rad`, `to <side>` and
//! `to <corner>`. Without a direction the gradient runs top to bottom
//! (180°). Stops are `<color> [<n>%]`; a stop without a position sits at
//! `index / (count − 1)`, counting every stop token including ones whose
//! color failed to parse. Unparseable stops are dropped, never fatal.
//!
//! Angles follow CSS: 0° points up and angles grow clockwise.

use crate::color::Color;
use crate::layout::Point;
use log::debug;
use serde::Serialize;

const DEFAULT_ANGLE: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradientStop {
    /// Position along the gradient line, `0.0..=1.0`.
    pub offset: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradientSpec {
    /// CSS angle in degrees.
    pub angle: f64,
    /// Sorted by offset.
    pub stops: Vec<GradientStop>,
}

impl LinearGradientSpec {
    /// Start and end of the gradient line on a `width × height` surface.
    ///
    /// Both points are reflections through the surface center along the
    /// direction vector, scaled to the half width and half height.
    pub fn endpoints(&self, width: f64, height: f64) -> (Point, Point) {
        let rad = (self.angle - 90.0).to_radians();
        let dx = rad.cos() * width / 2.0;
        let dy = rad.sin() * height / 2.0;
        let cx = width / 2.0;
        let cy = height / 2.0;
        (Point::new(cx - dx, cy - dy), Point::new(cx + dx, cy + dy))
    }
}

/// Parse a `linear-gradient(...)` string.
///
/// Returns `None` when the input is not a linear gradient or no stop parses.
pub fn parse_linear_gradient(input: &str) -> Option<LinearGradientSpec> {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();
    let body = lower
        .strip_prefix("linear-gradient")?
        .trim_start()
        .strip_prefix('(')?;
    let close = matching_paren(body)?;
    let parts = split_top_level(&body[..close]);

    let (angle, stop_tokens) = match parts.first().and_then(|p| parse_direction(p)) {
        Some(angle) => (angle, &parts[1..]),
        None => (DEFAULT_ANGLE, &parts[..]),
    };

    let count = stop_tokens.len();
    let mut stops: Vec<GradientStop> = stop_tokens
        .iter()
        .enumerate()
        .filter_map(|(index, token)| {
            let stop = parse_stop(token, index, count);
            if stop.is_none() {
                debug!("skipping unparseable gradient stop {token:?}");
            }
            stop
        })
        .collect();
    if stops.is_empty() {
        return None;
    }
    stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));

    Some(LinearGradientSpec { angle, stops })
}

/// Index of the `)` closing the already-consumed `(`.
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Split on commas that are not inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn parse_direction(token: &str) -> Option<f64> {
    if let Some(side) = token.strip_prefix("to ") {
        let mut words: Vec<&str> = side.split_whitespace().collect();
        words.sort_unstable();
        return match words.as_slice() {
            ["top"] => Some(0.0),
            ["right"] => Some(90.0),
            ["bottom"] => Some(180.0),
            ["left"] => Some(270.0),
            ["right", "top"] => Some(45.0),
            ["bottom", "right"] => Some(135.0),
            ["bottom", "left"] => Some(225.0),
            ["left", "top"] => Some(315.0),
            _ => None,
        };
    }
    let units: [(&str, f64); 4] = [
        ("deg", 1.0),
        ("grad", 0.9),
        ("rad", 180.0 / std::f64::consts::PI),
        ("turn", 360.0),
    ];
    units.iter().find_map(|(suffix, factor)| {
        let value: f64 = token.strip_suffix(suffix)?.trim().parse().ok()?;
        value.is_finite().then_some(value * factor)
    })
}

fn parse_stop(token: &str, index: usize, count: usize) -> Option<GradientStop> {
    let (color_part, position) = match token.rsplit_once(char::is_whitespace) {
        Some((head, tail)) if tail.ends_with('%') => {
            let pct: f64 = tail.trim_end_matches('%').parse().ok()?;
            (head.trim(), Some(pct / 100.0))
        }
        _ => (token, None),
    };
    let color = Color::parse(color_part)?;
    let offset = position.unwrap_or_else(|| {
        if count > 1 {
            index as f64 / (count - 1) as f64
        } else {
            0.0
        }
    });
    Some(GradientStop {
        offset: offset.clamp(0.0, 1.0),
        color,
    })
}
