//! Fixed drawing palette and the `Color` value type
//!
//! The palette is a static table of 64 RGB entries. A `Color` is an index
//! into that table and is only constructible for indices that exist, so
//! every `Color` in the program is valid by construction.
//!
//! Table order is significant: it is the order colors are listed in a
//! picker. The table is the 4x4x4 RGB cube with channel levels
//! `00, 55, AA, FF`, so index `r * 16 + g * 4 + b` selects the levels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of entries in the palette table.
pub const PALETTE_SIZE: usize = 64;

/// The palette table, indexed by color index.
#[rustfmt::skip]
const PALETTE: [[u8; 3]; PALETTE_SIZE] = [
    [0x00, 0x00, 0x00], [0x00, 0x00, 0x55], [0x00, 0x00, 0xAA], [0x00, 0x00, 0xFF],
    [0x00, 0x55, 0x00], [0x00, 0x55, 0x55], [0x00, 0x55, 0xAA], [0x00, 0x55, 0xFF],
    [0x00, 0xAA, 0x00], [0x00, 0xAA, 0x55], [0x00, 0xAA, 0xAA], [0x00, 0xAA, 0xFF],
    [0x00, 0xFF, 0x00], [0x00, 0xFF, 0x55], [0x00, 0xFF, 0xAA], [0x00, 0xFF, 0xFF],
    [0x55, 0x00, 0x00], [0x55, 0x00, 0x55], [0x55, 0x00, 0xAA], [0x55, 0x00, 0xFF],
    [0x55, 0x55, 0x00], [0x55, 0x55, 0x55], [0x55, 0x55, 0xAA], [0x55, 0x55, 0xFF],
    [0x55, 0xAA, 0x00], [0x55, 0xAA, 0x55], [0x55, 0xAA, 0xAA], [0x55, 0xAA, 0xFF],
    [0x55, 0xFF, 0x00], [0x55, 0xFF, 0x55], [0x55, 0xFF, 0xAA], [0x55, 0xFF, 0xFF],
    [0xAA, 0x00, 0x00], [0xAA, 0x00, 0x55], [0xAA, 0x00, 0xAA], [0xAA, 0x00, 0xFF],
    [0xAA, 0x55, 0x00], [0xAA, 0x55, 0x55], [0xAA, 0x55, 0xAA], [0xAA, 0x55, 0xFF],
    [0xAA, 0xAA, 0x00], [0xAA, 0xAA, 0x55], [0xAA, 0xAA, 0xAA], [0xAA, 0xAA, 0xFF],
    [0xAA, 0xFF, 0x00], [0xAA, 0xFF, 0x55], [0xAA, 0xFF, 0xAA], [0xAA, 0xFF, 0xFF],
    [0xFF, 0x00, 0x00], [0xFF, 0x00, 0x55], [0xFF, 0x00, 0xAA], [0xFF, 0x00, 0xFF],
    [0xFF, 0x55, 0x00], [0xFF, 0x55, 0x55], [0xFF, 0x55, 0xAA], [0xFF, 0x55, 0xFF],
    [0xFF, 0xAA, 0x00], [0xFF, 0xAA, 0x55], [0xFF, 0xAA, 0xAA], [0xFF, 0xAA, 0xFF],
    [0xFF, 0xFF, 0x00], [0xFF, 0xFF, 0x55], [0xFF, 0xFF, 0xAA], [0xFF, 0xFF, 0xFF],
];

/// Error type for color parsing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Index is not an entry of the palette table
    #[error("color index {0} out of range, expected 0 to 63")]
    OutOfRange(i64),
}

/// A palette color, stored as its table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Color(u8);

impl Color {
    /// First table entry, pure black.
    pub const BLACK: Color = Color(0);
    /// Last table entry, pure white.
    pub const WHITE: Color = Color(63);
    /// Color of a pixel nobody has painted yet.
    pub const BACKGROUND: Color = Color::WHITE;

    /// Parse a wire-format palette index.
    ///
    /// # Errors
    ///
    /// Returns `ColorError::OutOfRange` unless `0 <= index < PALETTE_SIZE`.
    pub fn parse(index: i64) -> Result<Color, ColorError> {
        if index >= 0 && index < PALETTE_SIZE as i64 {
            Ok(Color(index as u8))
        } else {
            Err(ColorError::OutOfRange(index))
        }
    }

    /// Build a color from the low six bits of a packed value.
    ///
    /// Six bits address the whole table, so this cannot fail.
    pub(crate) const fn from_bits(bits: u8) -> Color {
        Color(bits & 0x3F)
    }

    /// Palette index of this color.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// RGB channels from the palette table.
    pub const fn rgb(self) -> [u8; 3] {
        PALETTE[self.0 as usize]
    }

    /// Render as `#RRGGBB` (uppercase).
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Reverse lookup: the palette color with exactly these channels.
    pub fn from_rgb(rgb: [u8; 3]) -> Option<Color> {
        PALETTE.iter().position(|entry| *entry == rgb).map(|i| Color(i as u8))
    }

    /// All palette colors in table order.
    pub fn palette() -> impl Iterator<Item = Color> {
        (0..PALETTE_SIZE as u8).map(Color)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BACKGROUND
    }
}

impl TryFrom<i64> for Color {
    type Error = ColorError;

    fn try_from(index: i64) -> Result<Self, Self::Error> {
        Color::parse(index)
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> u8 {
        color.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_table_range() {
        assert_eq!(Color::parse(0), Ok(Color::BLACK));
        assert_eq!(Color::parse(63), Ok(Color::WHITE));
        assert_eq!(Color::parse(3).map(Color::index), Ok(3));
    }

    #[test]
    fn test_parse_rejects_one_past_table() {
        assert_eq!(Color::parse(64), Err(ColorError::OutOfRange(64)));
        assert_eq!(Color::parse(-1), Err(ColorError::OutOfRange(-1)));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::BLACK.to_hex(), "#000000");
        assert_eq!(Color::WHITE.to_hex(), "#FFFFFF");
        assert_eq!(Color::parse(48).unwrap().to_hex(), "#FF0000");
    }

    #[test]
    fn test_palette_order_and_uniqueness() {
        let colors: Vec<Color> = Color::palette().collect();
        assert_eq!(colors.len(), PALETTE_SIZE);
        assert_eq!(colors.first(), Some(&Color::BLACK));
        assert_eq!(colors.last(), Some(&Color::WHITE));

        let mut hexes: Vec<String> = colors.iter().map(|c| c.to_hex()).collect();
        hexes.sort();
        hexes.dedup();
        assert_eq!(hexes.len(), PALETTE_SIZE);
    }

    #[test]
    fn test_from_rgb_round_trip() {
        for color in Color::palette() {
            assert_eq!(Color::from_rgb(color.rgb()), Some(color));
        }
        assert_eq!(Color::from_rgb([1, 2, 3]), None);
    }

    #[test]
    fn test_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Color::WHITE).unwrap(), "63");
        let color: Color = serde_json::from_str("12").unwrap();
        assert_eq!(color.index(), 12);
        assert!(serde_json::from_str::<Color>("64").is_err());
        assert!(serde_json::from_str::<Color>("-3").is_err());
    }
}
