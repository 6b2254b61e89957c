//! Color values and conversions between hex, RGB and HSL representations.

pub mod palette;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub use palette::{default_palette, parse_palette, MAX_PALETTE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid hex color {value:?}: expected #RRGGBB or RRGGBB")]
    InvalidHex { value: String },
}

pub type ColorResult<T> = std::result::Result<T, ColorError>;

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    pub fn from_hex(value: &str) -> ColorResult<Self> {
        hex_to_rgb(value)
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self)
    }

    pub fn hsl(self) -> Hsl {
        rgb_to_hsl(self)
    }

    pub fn from_hsl(hsl: Hsl) -> Self {
        hsl_to_rgb(hsl)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(value: &str) -> ColorResult<Self> {
        hex_to_rgb(value)
    }
}

/// Hue in degrees `[0, 360)`, saturation and lightness as percentages `[0, 100]`.
///
/// Components are kept fractional so that RGB -> HSL -> RGB stays within one
/// unit per channel; use [`Hsl::rounded`] for integer display values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Builds a value with every component forced into its domain.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }.clamped()
    }

    pub fn clamped(self) -> Self {
        let finite_or_zero = |value: f64| if value.is_finite() { value } else { 0.0 };
        let h = finite_or_zero(self.h).rem_euclid(360.0);
        Self {
            // rem_euclid can round up to exactly 360.0 for tiny negative inputs
            h: if h >= 360.0 { 0.0 } else { h },
            s: finite_or_zero(self.s).clamp(0.0, 100.0),
            l: finite_or_zero(self.l).clamp(0.0, 100.0),
        }
    }

    pub fn rounded(self) -> (u16, u8, u8) {
        let hsl = self.clamped();
        let h = hsl.h.round() as u16 % 360;
        (h, hsl.s.round() as u8, hsl.l.round() as u8)
    }
}

pub fn hex_to_rgb(value: &str) -> ColorResult<Color> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidHex {
            value: value.to_string(),
        });
    }

    let channel = |index: usize| {
        u8::from_str_radix(&digits[index..index + 2], 16).map_err(|_| ColorError::InvalidHex {
            value: value.to_string(),
        })
    };
    Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
}

pub fn rgb_to_hex(color: Color) -> String {
    color.to_string()
}

pub fn rgb_to_hsl(color: Color) -> Hsl {
    let r = f64::from(color.r) / 255.0;
    let g = f64::from(color.g) / 255.0;
    let b = f64::from(color.b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if color.r == color.g && color.g == color.b {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let sector = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl {
        h: sector * 60.0,
        s: s * 100.0,
        l: l * 100.0,
    }
    .clamped()
}

pub fn hsl_to_rgb(hsl: Hsl) -> Color {
    let hsl = hsl.clamped();
    let h = hsl.h / 360.0;
    let s = hsl.s / 100.0;
    let l = hsl.l / 100.0;

    if s == 0.0 {
        let gray = unit_to_channel(l);
        return Color::new(gray, gray, gray);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    Color::new(
        unit_to_channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        unit_to_channel(hue_to_rgb(p, q, h)),
        unit_to_channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

fn unit_to_channel(value: f64) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_to_rgb_accepts_hash_or_plain_six_digit_hex() {
        assert_eq!(hex_to_rgb("#12ab34"), Ok(Color::new(0x12, 0xab, 0x34)));
        assert_eq!(hex_to_rgb("12AB34"), Ok(Color::new(0x12, 0xab, 0x34)));
        assert_eq!(hex_to_rgb("  #ff0000 "), Ok(Color::new(0xff, 0, 0)));
    }

    #[test]
    fn hex_to_rgb_rejects_malformed_values() {
        for value in ["#fff", "#zzzzzz", "", "#1234567", "##123456", "12345é"] {
            assert!(
                matches!(hex_to_rgb(value), Err(ColorError::InvalidHex { .. })),
                "{value:?} should be rejected"
            );
        }
    }

    #[test]
    fn rgb_to_hex_zero_pads_and_uppercases() {
        assert_eq!(rgb_to_hex(Color::new(0, 10, 255)), "#000AFF");
        assert_eq!(Color::new(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn hex_round_trip_is_exact_after_case_normalisation() {
        for value in 0..=0xFF_u32 {
            let hex = format!("#{:02x}{:02X}{:02x}", value, 255 - value, (value * 7) % 256);
            let color = hex_to_rgb(&hex).expect("generated hex should parse");
            assert_eq!(rgb_to_hex(color), hex.to_ascii_uppercase());
        }
    }

    #[test]
    fn rgb_to_hsl_matches_known_primaries() {
        let red = rgb_to_hsl(Color::new(255, 0, 0));
        assert_eq!(red.rounded(), (0, 100, 50));

        let green = rgb_to_hsl(Color::new(0, 255, 0));
        assert_eq!(green.rounded(), (120, 100, 50));

        let blue = rgb_to_hsl(Color::new(0, 0, 255));
        assert_eq!(blue.rounded(), (240, 100, 50));

        let magenta_ish = rgb_to_hsl(Color::new(255, 0, 128));
        assert_eq!(magenta_ish.rounded().0, 330);
    }

    #[test]
    fn rgb_to_hsl_treats_grays_as_zero_hue_and_saturation() {
        let gray = rgb_to_hsl(Color::new(128, 128, 128));
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert_eq!(gray.rounded().2, 50);
        assert_eq!(rgb_to_hsl(Color::WHITE).rounded(), (0, 0, 100));
        assert_eq!(rgb_to_hsl(Color::BLACK).rounded(), (0, 0, 0));
    }

    #[test]
    fn hsl_to_rgb_zero_saturation_yields_lightness_gray() {
        assert_eq!(hsl_to_rgb(Hsl::new(200.0, 0.0, 50.0)), Color::new(128, 128, 128));
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 0.0, 100.0)), Color::WHITE);
    }

    #[test]
    fn hsl_to_rgb_matches_random_pattern_palette() {
        assert_eq!(hsl_to_rgb(Hsl::new(0.0, 70.0, 50.0)), Color::new(217, 38, 38));
        assert_eq!(hsl_to_rgb(Hsl::new(120.0, 70.0, 50.0)), Color::new(38, 217, 38));
    }

    #[test]
    fn hsl_components_are_clamped_into_domain() {
        let hsl = Hsl::new(-30.0, 140.0, -5.0);
        assert_eq!(hsl.h, 330.0);
        assert_eq!(hsl.s, 100.0);
        assert_eq!(hsl.l, 0.0);

        let wrapped = Hsl::new(720.0, f64::NAN, 50.0);
        assert_eq!(wrapped.h, 0.0);
        assert_eq!(wrapped.s, 0.0);
    }

    #[test]
    fn rgb_hsl_round_trip_stays_within_one_unit_for_every_color() {
        let diff = |a: u8, b: u8| (i16::from(a) - i16::from(b)).abs();
        for r in 0..=u8::MAX {
            for g in 0..=u8::MAX {
                for b in 0..=u8::MAX {
                    let original = Color::new(r, g, b);
                    let back = hsl_to_rgb(rgb_to_hsl(original));
                    assert!(
                        diff(original.r, back.r) <= 1
                            && diff(original.g, back.g) <= 1
                            && diff(original.b, back.b) <= 1,
                        "{original} round-tripped to {back}"
                    );
                }
            }
        }
    }

    #[test]
    fn hex_to_hsl_to_hex_recovers_palette_colors() {
        for color in default_palette() {
            let back = Color::from_hsl(color.hsl());
            let diff = |a: u8, b: u8| (i16::from(a) - i16::from(b)).abs();
            assert!(diff(color.r, back.r) <= 1);
            assert!(diff(color.g, back.g) <= 1);
            assert!(diff(color.b, back.b) <= 1);
        }
    }
}
