use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An immutable 8-bit RGBA color.
///
/// Stored packed as `0xRRGGBBAA`: red in the most significant byte, alpha in
/// the least significant one. Every constructor either clamps or validates
/// its input, so a component can never wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),
    #[error("expected 3, 4, 6 or 8 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0x0000_00ff);
    pub const WHITE: Color = Color(0xffff_ffff);

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 0xff)
    }

    /// Build a color from a packed `0xRRGGBBAA` value.
    pub const fn from_rgba_u32(rgba: u32) -> Self {
        Self(rgba)
    }

    pub const fn to_rgba_u32(self) -> u32 {
        self.0
    }

    /// Legacy name. Despite the name the value is read as `0xRRGGBBAA`.
    #[deprecated(note = "the value is RGBA, not ARGB; use `from_rgba_u32`")]
    pub const fn from_argb_u32(rgba: u32) -> Self {
        Self(rgba)
    }

    /// Legacy name. Despite the name the value is returned as `0xRRGGBBAA`.
    #[deprecated(note = "the value is RGBA, not ARGB; use `to_rgba_u32`")]
    pub const fn to_argb_u32(self) -> u32 {
        self.0
    }

    /// Build a color from floating point components in `[0, 1]`.
    ///
    /// Out-of-range components are clamped, NaN becomes 0.
    pub fn from_unit(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::from_rgba(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b), unit_to_byte(a))
    }

    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    pub const fn is_opaque(self) -> bool {
        self.a() == 0xff
    }

    pub const fn is_transparent(self) -> bool {
        self.a() == 0
    }

    /// Same color with its alpha replaced.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xffff_ff00) | a as u32)
    }

    /// Same color with its alpha multiplied by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        let a = (f32::from(self.a()) * opacity).round() as u8;
        self.with_alpha(a)
    }

    /// Components scaled by alpha, in `[r, g, b, a]` order.
    pub fn premultiplied(self) -> [u8; 4] {
        let a = u32::from(self.a());
        let mul = |c: u8| ((u32::from(c) * a + 127) / 255) as u8;
        [mul(self.r()), mul(self.g()), mul(self.b()), self.a()]
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }
}

fn unit_to_byte(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
        } else {
            write!(f, "#{:08x}", self.0)
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError::MissingHash(s.to_string()))?;
        if !matches!(hex.len(), 3 | 4 | 6 | 8) {
            return Err(ParseColorError::BadLength(hex.len()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::BadDigit(s.to_string()));
        }
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| ParseColorError::BadDigit(s.to_string()))?;

        // Short forms repeat each nibble: #abc -> #aabbcc.
        let expand = |v: u32, count: u32| -> u32 {
            (0..count).rev().fold(0, |acc, i| {
                let nibble = (v >> (i * 4)) & 0xf;
                (acc << 8) | (nibble << 4) | nibble
            })
        };

        let rgba = match hex.len() {
            3 => (expand(value, 3) << 8) | 0xff,
            4 => expand(value, 4),
            6 => (value << 8) | 0xff,
            _ => value,
        };
        Ok(Self(rgba))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn packed_order_is_rgba() {
        let c = Color::from_rgba(0x11, 0x22, 0x33, 0x44);
        assert_eq!(c.to_rgba_u32(), 0x1122_3344);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (0x11, 0x22, 0x33, 0x44));
        assert_eq!(Color::from_rgba_u32(0x1122_3344), c);
    }

    #[test]
    #[allow(deprecated)]
    fn legacy_argb_aliases_are_rgba() {
        let c = Color::from_argb_u32(0xff00_00ff);
        assert_eq!(c.r(), 0xff);
        assert_eq!(c.a(), 0xff);
        assert_eq!(c.to_argb_u32(), 0xff00_00ff);
    }

    #[test]
    fn with_alpha_leaves_source_untouched() {
        let c = Color::from_rgb(10, 20, 30);
        let faded = c.with_alpha(0x80);
        assert_eq!(c.a(), 0xff);
        assert_eq!(faded.a(), 0x80);
        assert_eq!(faded.r(), 10);
    }

    #[test]
    fn opacity_is_clamped() {
        let c = Color::from_rgb(1, 2, 3);
        assert_eq!(c.with_opacity(2.0).a(), 255);
        assert_eq!(c.with_opacity(-1.0).a(), 0);
        assert_eq!(c.with_opacity(f32::NAN).a(), 0);
        assert_eq!(c.with_opacity(0.5).a(), 128);
    }

    #[test]
    fn unit_construction_clamps() {
        let c = Color::from_unit(1.5, -0.2, 0.5, f32::NAN);
        assert_eq!((c.r(), c.g(), c.b(), c.a()), (255, 0, 128, 0));
    }

    #[test]
    fn premultiply() {
        assert_eq!(Color::from_rgba(255, 128, 0, 128).premultiplied(), [128, 64, 0, 128]);
        assert_eq!(Color::from_rgba(200, 100, 50, 0).premultiplied(), [0, 0, 0, 0]);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("#000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#ffffff".parse::<Color>(), Ok(Color::WHITE));
        assert_eq!("#1234".parse::<Color>(), Ok(Color::from_rgba(0x11, 0x22, 0x33, 0x44)));
        assert_eq!("#11223380".parse::<Color>().map(|c| c.a()), Ok(0x80));
        assert_eq!(Color::from_rgb(0xab, 0xcd, 0xef).to_string(), "#abcdef");
        assert_eq!(Color::from_rgba(0xab, 0xcd, 0xef, 0x10).to_string(), "#abcdef10");
        assert!("123456".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert!("#+12345".parse::<Color>().is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Color::from_rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
        let back: Color = serde_json::from_str("\"#00ff0080\"").unwrap();
        assert_eq!(back, Color::from_rgba(0, 255, 0, 0x80));
    }

    proptest! {
        #[test]
        fn components_round_trip(r: u8, g: u8, b: u8, a: u8) {
            let c = Color::from_rgba(r, g, b, a);
            prop_assert_eq!((c.r(), c.g(), c.b(), c.a()), (r, g, b, a));
            prop_assert_eq!(c.to_string().parse::<Color>(), Ok(c));
        }

        #[test]
        fn opacity_never_raises_alpha(a: u8, opacity in -10.0f32..10.0) {
            let c = Color::from_rgba(0, 0, 0, a);
            prop_assert!(c.with_opacity(opacity).a() <= a);
        }
    }
}
