//! Canonical DNA encoding of a grid
//!
//! DNA is the grid packed to six bits per pixel, in row-major pixel order,
//! least significant bit first, into exactly 3072 bytes, then base64
//! encoded with the standard alphabet and padding. Every 3072-byte payload
//! is a valid grid because six bits address the whole palette, so the
//! mapping is a bijection and encoding is deterministic.
//!
//! The same bit sequence also feeds the on-chain payload, see [`tree`].

pub mod boc;
pub mod cell;
pub mod tree;

use base64::Engine;
use bitvec::field::BitField;
use bitvec::order::Lsb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use bitvec::view::BitView;
use std::str::FromStr;
use thiserror::Error;

use crate::grid::{Grid, GRID_CELLS};
use crate::palette::Color;

/// Bits used per pixel.
pub const BITS_PER_PIXEL: usize = 6;

/// Length of a DNA bit sequence.
pub const DNA_BITS: usize = GRID_CELLS * BITS_PER_PIXEL;

/// Length of a DNA payload in bytes.
pub const DNA_BYTES: usize = DNA_BITS / 8;

/// Bit order used throughout the DNA codec.
pub type DnaBits = BitSlice<u8, Lsb0>;

/// Error type for DNA decoding failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnaError {
    /// Not valid base64
    #[error("DNA is not valid base64: {0}")]
    Base64(String),
    /// Decoded payload has the wrong size
    #[error("DNA payload is {0} bytes, expected {expected}", expected = DNA_BYTES)]
    Length(usize),
    /// Bit sequence has the wrong size
    #[error("DNA bit sequence is {0} bits, expected {expected}", expected = DNA_BITS)]
    BitLength(usize),
}

/// The packed bit form of one grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dna(BitVec<u8, Lsb0>);

impl Dna {
    /// Pack a grid.
    pub fn from_grid(grid: &Grid) -> Dna {
        let mut bits = BitVec::<u8, Lsb0>::with_capacity(DNA_BITS);
        for color in grid.colors() {
            let index = color.index();
            bits.extend_from_bitslice(&index.view_bits::<Lsb0>()[..BITS_PER_PIXEL]);
        }
        Dna(bits)
    }

    /// Unpack to a grid.
    pub fn to_grid(&self) -> Grid {
        let colors = self.0.chunks(BITS_PER_PIXEL).map(|chunk| Color::from_bits(chunk.load_le::<u8>()));
        // Length is fixed at construction, so this always yields a full grid.
        Grid::from_colors(colors).unwrap_or_default()
    }

    /// Decode a DNA string, `None` if it isn't one.
    ///
    /// Surrounding whitespace is ignored, so pasted text works as-is.
    pub fn from_base64(text: &str) -> Option<Dna> {
        Self::try_from_base64(text).ok()
    }

    /// Decode a DNA string, reporting why it was rejected.
    pub fn try_from_base64(text: &str) -> Result<Dna, DnaError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| DnaError::Base64(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Wrap a raw 3072-byte payload.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Dna, DnaError> {
        if bytes.len() != DNA_BYTES {
            return Err(DnaError::Length(bytes.len()));
        }
        Ok(Dna(BitVec::from_vec(bytes)))
    }

    /// Wrap a bit sequence of exactly `DNA_BITS` bits.
    pub fn from_bits(bits: &DnaBits) -> Result<Dna, DnaError> {
        if bits.len() != DNA_BITS {
            return Err(DnaError::BitLength(bits.len()));
        }
        Ok(Dna(bits.to_bitvec()))
    }

    /// Encode as a DNA string.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.as_bytes())
    }

    /// The raw payload.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_raw_slice()
    }

    /// The bit sequence.
    pub fn bits(&self) -> &DnaBits {
        &self.0
    }
}

impl From<&Grid> for Dna {
    fn from(grid: &Grid) -> Self {
        Dna::from_grid(grid)
    }
}

impl FromStr for Dna {
    type Err = DnaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dna::try_from_base64(s)
    }
}

impl std::fmt::Display for Dna {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Grid to DNA string.
pub fn encode(grid: &Grid) -> String {
    Dna::from_grid(grid).to_base64()
}

/// DNA string to grid, `None` for anything that isn't valid DNA.
pub fn decode(text: &str) -> Option<Grid> {
    Dna::from_base64(text).map(|dna| dna.to_grid())
}
