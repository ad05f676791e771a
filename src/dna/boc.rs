//! Bag-of-cells serialization of the payload
//!
//! The cell tree travels as a standard bag of cells (`b5ee9c72` magic,
//! single root, CRC32-C trailer), as text in base64.

use thiserror::Error;
use tonlib_core::tlb_types::tlb::TLB;

use super::cell::{ArcCell, Cell, TonCellError};

/// Error type for payload serialization
#[derive(Debug, Error)]
pub enum BocError {
    #[error("{0}")]
    Cell(#[from] TonCellError),
}

/// Serialize a cell tree.
pub fn to_bytes(root: &Cell) -> Result<Vec<u8>, BocError> {
    Ok(root.to_boc(true)?)
}

/// Serialize a cell tree as base64.
pub fn to_base64(root: &Cell) -> Result<String, BocError> {
    Ok(root.to_boc_b64(true)?)
}

/// Parse a single-root bag of cells.
pub fn from_bytes(bytes: &[u8]) -> Result<ArcCell, BocError> {
    Ok(ArcCell::from_boc(bytes)?)
}

/// Parse a base64 bag of cells.
pub fn from_base64(text: &str) -> Result<ArcCell, BocError> {
    Ok(ArcCell::from_boc_b64(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::{tree, Dna};
    use crate::grid::{Grid, Point};
    use crate::palette::Color;

    fn sample_tree() -> (Grid, Cell) {
        let mut grid = Grid::new();
        for (i, point) in Point::all().enumerate().step_by(3) {
            grid.set(point, Color::parse((i % 64) as i64).unwrap());
        }
        let root = tree::encode(&Dna::from_grid(&grid)).unwrap();
        (grid, root)
    }

    #[test]
    fn test_standard_boc_header() {
        let (_, root) = sample_tree();
        let bytes = to_bytes(&root).unwrap();
        assert_eq!(&bytes[..4], &[0xb5, 0xee, 0x9c, 0x72]);
    }

    #[test]
    fn test_base64_matches_bytes() {
        use base64::Engine;

        let (_, root) = sample_tree();
        let text = to_base64(&root).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(&text).unwrap();
        assert_eq!(bytes, to_bytes(&root).unwrap());
    }

    #[test]
    fn test_dna_tree_round_trip() {
        let (grid, root) = sample_tree();
        let parsed = from_base64(&to_base64(&root).unwrap()).unwrap();
        assert_eq!(*parsed, root);
        assert_eq!(tree::decode(&parsed).map(|d| d.to_grid()), Ok(grid));
    }

    #[test]
    fn test_bytes_round_trip() {
        let (_, root) = sample_tree();
        let parsed = from_bytes(&to_bytes(&root).unwrap()).unwrap();
        assert_eq!(tree::validate(&parsed), Ok(()));
    }

    #[test]
    fn test_surrounding_whitespace_ignored() {
        let (_, root) = sample_tree();
        let text = format!("  {}\n", to_base64(&root).unwrap());
        assert!(from_base64(&text).is_ok());
    }

    #[test]
    fn test_rejects_truncated() {
        let (_, root) = sample_tree();
        let bytes = to_bytes(&root).unwrap();
        assert!(from_bytes(&bytes[..bytes.len() / 2]).is_err());
        assert!(from_bytes(&[]).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(from_bytes(b"not a bag of cells").is_err());
        assert!(from_base64("!!!").is_err());
    }
}
