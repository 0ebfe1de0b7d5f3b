//! Hex color parsing and display-P3 conversion.
//!
//! sRGB hex colors are converted to the `color(display-p3 r g b)` form used in
//! the progressive-enhancement block of the CSS output:
//!
//! 1. decode the sRGB transfer curve to linear light;
//! 2. map linear sRGB to linear display-P3 (both D65);
//! 3. re-encode with the display-P3 transfer curve (the same curve as sRGB).
//!
//! Channels are rounded to four decimals.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Hex color literals (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`).
static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[0-9a-fA-F]{3,8}\b").expect("hex color regex must compile"));

/// Linear sRGB → linear display-P3.
const SRGB_TO_P3: [[f64; 3]; 3] = [
    [0.822_462_1, 0.177_538_0, 0.000_000_0],
    [0.033_194_1, 0.966_805_8, 0.000_000_0],
    [0.017_082_7, 0.072_397_4, 0.910_519_9],
];

/// An sRGB color with straight alpha, channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// Parse a hex color (with or without the leading `#`).
///
/// Returns `None` for any length other than 3, 4, 6 or 8 digits.
#[must_use]
pub fn parse_hex(hex: &str) -> Option<Rgba> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| f64::from(v) / 255.0);
    let short = |i: usize| channel(&hex[i..=i].repeat(2));
    let long = |i: usize| channel(&hex[i * 2..i * 2 + 2]);
    let (r, g, b, a) = match hex.len() {
        3 => (short(0)?, short(1)?, short(2)?, 1.0),
        4 => (short(0)?, short(1)?, short(2)?, short(3)?),
        6 => (long(0)?, long(1)?, long(2)?, 1.0),
        8 => (long(0)?, long(1)?, long(2)?, long(3)?),
        _ => return None,
    };
    Some(Rgba { r, g, b, a })
}

/// Decode an sRGB channel (0.0–1.0) to linear light.
fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Encode linear light (0.0–1.0) with the sRGB/display-P3 transfer curve, clamped.
fn linear_to_gamma(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Round to four decimals and print without trailing zeros (`1`, `0.5`, `0.9175`).
fn format_channel(v: f64) -> String {
    // Adding 0.0 folds -0.0 into 0.0.
    let rounded = (v * 10_000.0).round() / 10_000.0 + 0.0;
    format!("{rounded}")
}

impl Rgba {
    /// Channels in display-P3, gamma-encoded.
    #[must_use]
    pub fn to_display_p3(self) -> [f64; 3] {
        let lin = [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ];
        SRGB_TO_P3.map(|row| linear_to_gamma(row[0] * lin[0] + row[1] * lin[1] + row[2] * lin[2]))
    }

    /// CSS `color(display-p3 ...)` function, with `/ alpha` when not opaque.
    #[must_use]
    pub fn to_css_p3(self) -> String {
        let [r, g, b] = self.to_display_p3();
        let mut out = format!(
            "color(display-p3 {} {} {}",
            format_channel(r),
            format_channel(g),
            format_channel(b)
        );
        if self.a < 1.0 {
            out.push_str(" / ");
            out.push_str(&format_channel(self.a));
        }
        out.push(')');
        out
    }
}

/// Returns `true` if `line` contains a hex color literal.
#[must_use]
pub fn contains_hex(line: &str) -> bool {
    HEX_RE.is_match(line)
}

/// Rewrite every hex color literal in `line` to its display-P3 form.
///
/// Literals of an invalid length (5 or 7 digits) are left as they are.
#[must_use]
pub fn rewrite_hex_to_p3(line: &str) -> String {
    HEX_RE
        .replace_all(line, |caps: &Captures| {
            let literal = &caps[0];
            parse_hex(literal).map_or_else(|| literal.to_string(), Rgba::to_css_p3)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_6_digit() {
        let c = parse_hex("#ff0000").unwrap();
        assert_eq!((c.r, c.g, c.b, c.a), (1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn parse_hex_3_digit_expands() {
        assert_eq!(parse_hex("#f00"), parse_hex("#ff0000"));
    }

    #[test]
    fn parse_hex_alpha() {
        let c = parse_hex("#00000080").unwrap();
        assert!((c.a - 128.0 / 255.0).abs() < 1e-9);
        let short = parse_hex("#0008").unwrap();
        assert!((short.a - 136.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn parse_hex_without_hash() {
        assert!(parse_hex("abcdef").is_some());
    }

    #[test]
    fn parse_hex_invalid() {
        assert!(parse_hex("#12345").is_none());
        assert!(parse_hex("#gg0000").is_none());
        assert!(parse_hex("#").is_none());
    }

    #[test]
    fn black_and_white_are_exact() {
        assert_eq!(parse_hex("#000").unwrap().to_css_p3(), "color(display-p3 0 0 0)");
        assert_eq!(parse_hex("#fff").unwrap().to_css_p3(), "color(display-p3 1 1 1)");
    }

    #[test]
    fn red_is_inside_p3() {
        let [r, g, b] = parse_hex("#ff0000").unwrap().to_display_p3();
        assert!((r - 0.9175).abs() < 1e-3, "r = {r}");
        assert!((g - 0.2003).abs() < 1e-3, "g = {g}");
        assert!((b - 0.1386).abs() < 1e-3, "b = {b}");
    }

    #[test]
    fn translucent_color_keeps_alpha() {
        let css = parse_hex("#00000080").unwrap().to_css_p3();
        assert_eq!(css, "color(display-p3 0 0 0 / 0.502)");
    }

    #[test]
    fn rewrite_replaces_every_literal() {
        let line = "  --gradient: #000 0%, #ffffff 100%;";
        assert_eq!(
            rewrite_hex_to_p3(line),
            "  --gradient: color(display-p3 0 0 0) 0%, color(display-p3 1 1 1) 100%;"
        );
    }

    #[test]
    fn rewrite_leaves_plain_lines() {
        let line = "  --space-sm: 4px;";
        assert_eq!(rewrite_hex_to_p3(line), line);
        assert!(!contains_hex(line));
    }

    #[test]
    fn rewrite_skips_invalid_length() {
        let line = "  --odd: #12345;";
        assert_eq!(rewrite_hex_to_p3(line), line);
    }
}
