//! RGBA colors and the CSS color syntax accepted in backgrounds and gradient stops.
//!
//! Accepted forms:
//! - `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)` with `a` in `0.0..=1.0`
//! - a handful of CSS named colors, including `transparent`
//!
//! Colors serialize as lowercase hex (`#rrggbb`, or `#rrggbbaa` when not opaque).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 8-bit sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse any accepted CSS color form. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim();
        if s.is_empty() {
            return None;
        }

        let lower = s.to_ascii_lowercase();
        if let Some(args) = function_args(&lower, "rgba").or_else(|| function_args(&lower, "rgb")) {
            return parse_rgb_args(args);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }

        lookup_named(&lower)
    }

    /// Lowercase hex: `#rrggbb` for opaque colors, `#rrggbbaa` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// CSS form used by the declarative renderer: hex when opaque, `rgba()` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            self.to_hex()
        } else {
            format!(
                "rgba({},{},{},{})",
                self.r,
                self.g,
                self.b,
                trim_float(self.a as f64 / 255.0, 3)
            )
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Same color with alpha multiplied by `factor` (clamped to `0..=1`).
    pub fn with_opacity(self, factor: f64) -> Self {
        let a = (self.a as f64 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Linear per-channel mix; `ratio` 0 is `self`, 1 is `other`.
    pub fn mix(self, other: Color, ratio: f64) -> Self {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * ratio).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s).ok_or_else(|| format!("invalid color: {s:?}"))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Normalize a user-typed color the way the color field does before use.
///
/// `#abc` becomes `#aabbcc`, a bare `aabbcc` gains its `#`, and the
/// all-zero `rgba(0,0,0,0)` collapses to `transparent`. Anything else is
/// returned trimmed.
pub fn normalize_color_input(input: &str) -> String {
    let val = input.trim();
    if val.is_empty() || val == "transparent" || val.replace(' ', "") == "rgba(0,0,0,0)" {
        return "transparent".to_string();
    }
    if val.starts_with("url") {
        return val.to_string();
    }
    if let Some(short) = val.strip_prefix('#') {
        if short.len() == 3 && short.bytes().all(|b| b.is_ascii_hexdigit()) {
            let doubled: String = short.chars().flat_map(|c| [c, c]).collect();
            return format!("#{doubled}");
        }
    }
    if !val.starts_with('#')
        && !val.starts_with("rgb")
        && (3..=8).contains(&val.len())
        && val.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return format!("#{val}");
    }
    val.to_string()
}

/// Format a float with at most `places` decimals and no trailing zeros.
pub(crate) fn trim_float(value: f64, places: usize) -> String {
    let s = format!("{value:.places$}");
    if s.contains('.') {
        let s = s.trim_end_matches('0').trim_end_matches('.');
        if s == "-0" { "0".to_string() } else { s.to_string() }
    } else {
        s
    }
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        let v = match p.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => p.parse::<f64>().ok()?,
        };
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(p) => {
            let v = match p.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                None => p.parse::<f64>().ok()?,
            };
            if !v.is_finite() {
                return None;
            }
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(Color::rgba(r, g, b, a))
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex.as_bytes();
    match hex.len() {
        3 | 4 => {
            let r = expand_nibble(bytes[0])?;
            let g = expand_nibble(bytes[1])?;
            let b = expand_nibble(bytes[2])?;
            let a = match bytes.get(3) {
                Some(&ch) => expand_nibble(ch)?,
                None => 255,
            };
            Some(Color::rgba(r, g, b, a))
        }
        6 | 8 => {
            let r = parse_byte(&hex[0..2])?;
            let g = parse_byte(&hex[2..4])?;
            let b = parse_byte(&hex[4..6])?;
            let a = if hex.len() == 8 {
                parse_byte(&hex[6..8])?
            } else {
                255
            };
            Some(Color::rgba(r, g, b, a))
        }
        _ => None,
    }
}

fn expand_nibble(ch: u8) -> Option<u8> {
    let n = (ch as char).to_digit(16)? as u8;
    Some(n << 4 | n)
}

fn parse_byte(s: &str) -> Option<u8> {
    u8::from_str_radix(s, 16).ok()
}

fn lookup_named(name: &str) -> Option<Color> {
    let c = match name {
        "transparent" => Color::TRANSPARENT,
        "white" => Color::WHITE,
        "black" => Color::BLACK,
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "lime" => Color::rgb(0, 255, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "orange" => Color::rgb(255, 165, 0),
        "purple" => Color::rgb(128, 0, 128),
        "pink" => Color::rgb(255, 192, 203),
        "cyan" | "aqua" => Color::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        "silver" => Color::rgb(192, 192, 192),
        "navy" => Color::rgb(0, 0, 128),
        "teal" => Color::rgb(0, 128, 128),
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn parse_six_digit_hex() {
        assert_eq!(Color::parse("#336699"), Some(Color::rgb(0x33, 0x66, 0x99)));
        assert_eq!(Color::parse("#FECFEF"), Some(Color::rgb(0xfe, 0xcf, 0xef)));
    }

    #[test]
    fn parse_requires_the_hash_for_hex() {
        for word in ["FECFEF", "bad", "cafe", "add"] {
            assert_eq!(Color::parse(word), None, "{word}");
        }
        // the color field adds it first
        assert_eq!(
            Color::parse(&normalize_color_input("cafe")),
            Some(Color::rgba(0xcc, 0xaa, 0xff, 0xee))
        );
    }

    #[test]
    fn parse_short_hex_expands_nibbles() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#f008"), Some(Color::rgba(255, 0, 0, 0x88)));
    }

    #[test]
    fn parse_eight_digit_hex_keeps_alpha() {
        assert_eq!(
            Color::parse("#11223380"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x80))
        );
    }

    #[test]
    fn parse_rgb_and_rgba_functions() {
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(
            Color::parse("rgba(0,0,0,0.5)"),
            Some(Color::rgba(0, 0, 0, 128))
        );
        assert_eq!(Color::parse("RGB(300, 0, 0)"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Color::parse(""), None);
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("#zzzzzz"), None);
        assert_eq!(Color::parse("rgb(1,2)"), None);
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    // =========================================================================
    // Formatting and arithmetic
    // =========================================================================

    #[test]
    fn to_hex_is_lowercase_and_drops_opaque_alpha() {
        assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_hex(), "#abcdef");
        assert_eq!(Color::rgba(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn to_css_uses_rgba_for_translucent() {
        assert_eq!(Color::rgba(0, 0, 0, 51).to_css(), "rgba(0,0,0,0.2)");
        assert_eq!(Color::WHITE.to_css(), "#ffffff");
    }

    #[test]
    fn mix_quarter_between_fallback_stops() {
        let top = Color::parse("#e6e8ec").unwrap();
        let bottom = Color::parse("#c6cad4").unwrap();
        assert_eq!(top.mix(bottom, 0.0), top);
        assert_eq!(top.mix(bottom, 1.0), bottom);
        assert_eq!(top.mix(bottom, 0.5).to_hex(), "#d6d9e0");
    }

    #[test]
    fn with_opacity_scales_alpha() {
        assert_eq!(Color::WHITE.with_opacity(0.3).a, 77);
        assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
    }

    #[test]
    fn serde_roundtrips_through_hex_string() {
        let json = serde_json::to_string(&Color::rgb(0x33, 0x66, 0x99)).unwrap();
        assert_eq!(json, "\"#336699\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Color::rgb(0x33, 0x66, 0x99));
    }

    // =========================================================================
    // normalize_color_input
    // =========================================================================

    #[test]
    fn normalize_expands_short_hex() {
        assert_eq!(normalize_color_input(" #abc "), "#aabbcc");
    }

    #[test]
    fn normalize_adds_missing_hash() {
        assert_eq!(normalize_color_input("336699"), "#336699");
    }

    #[test]
    fn normalize_collapses_zero_rgba_to_transparent() {
        assert_eq!(normalize_color_input("rgba(0, 0, 0, 0)"), "transparent");
        assert_eq!(normalize_color_input(""), "transparent");
    }

    #[test]
    fn normalize_passes_gradients_through() {
        let g = "linear-gradient(120deg, #84fab0 0%, #8fd3f4 100%)";
        assert_eq!(normalize_color_input(g), g);
    }

    #[test]
    fn trim_float_drops_trailing_zeros() {
        assert_eq!(trim_float(0.5, 3), "0.5");
        assert_eq!(trim_float(2.0, 2), "2");
        assert_eq!(trim_float(-0.0001, 2), "0");
    }
}
