//! Cells of the on-chain payload
//!
//! Cells are `tonlib_core` cells: at most 1023 data bits, read most
//! significant bit first, and at most 4 references. DNA runs go into a
//! cell byte by byte, so every whole byte keeps its DNA byte value. The
//! bits left over after the last whole byte are stored one at a time in
//! DNA order.

use bitvec::order::{Lsb0, Msb0};
use bitvec::vec::BitVec;
use bitvec::view::BitView;

pub use tonlib_core::cell::{ArcCell, Cell, CellBuilder, TonCellError};

use super::DnaBits;

/// Maximum data bits per cell.
pub const MAX_CELL_BITS: usize = 1023;

/// Maximum child references per cell.
pub const MAX_CELL_REFS: usize = 4;

/// Append a run of DNA bits to `builder`.
pub fn store_dna_bits(builder: &mut CellBuilder, bits: &DnaBits) -> Result<(), TonCellError> {
    let whole = bits.len() / 8 * 8;
    if whole > 0 {
        let mut packed = BitVec::<u8, Lsb0>::with_capacity(whole);
        packed.extend_from_bitslice(&bits[..whole]);
        builder.store_bits(whole, packed.as_raw_slice())?;
    }
    for bit in bits[whole..].iter().by_vals() {
        builder.store_bit(bit)?;
    }
    Ok(())
}

/// Data bits of `cell` in DNA order. Inverse of [`store_dna_bits`].
pub fn dna_bits(cell: &Cell) -> BitVec<u8, Lsb0> {
    let len = cell.bit_len();
    let whole = len / 8;
    let data = cell.data();

    let mut bits = BitVec::<u8, Lsb0>::with_capacity(len);
    bits.extend_from_bitslice(data[..whole].view_bits::<Lsb0>());
    bits.extend_from_bitslice(&data.view_bits::<Msb0>()[whole * 8..len]);
    bits
}

/// Build a cell holding `bits` with `children`.
pub fn build_cell(bits: &DnaBits, children: &[ArcCell]) -> Result<Cell, TonCellError> {
    let mut builder = CellBuilder::new();
    store_dna_bits(&mut builder, bits)?;
    for child in children {
        builder.store_reference(child)?;
    }
    builder.build()
}
