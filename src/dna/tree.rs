//! Bit-tree layout of DNA for on-chain validation
//!
//! The 24576 DNA bits are laid out over a four-level cell tree and read
//! back in depth-first pre-order (a cell's own bits, then its children
//! left to right):
//!
//! ```text
//! level 0   root                 1023 bits, 4 children
//! level 1   4 cells              1023 bits, 4 children each
//! level 2   16 cells             1023 bits; only the first one in
//!                                pre-order has children (4 of them)
//! level 3   4 cells under the    1023 bits, except the last which
//!           first level-2 cell   holds the remaining 24 bits
//! ```
//!
//! 24 cells carry 1023 bits and one carries 24: `24 * 1023 + 24 = 24576`.
//! Every cell except the last leaf is completely full, so the shape alone
//! pins down which bit lives where.
//!
//! Validation fails fast: cells are checked in the same pre-order walk,
//! data width first and then child count, and the first broken rule is
//! returned.

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;
use thiserror::Error;

use super::cell::{
    dna_bits, store_dna_bits, Cell, CellBuilder, TonCellError, MAX_CELL_BITS, MAX_CELL_REFS,
};
use super::{Dna, DnaBits, DNA_BITS};

/// Data bits in the single partial leaf.
pub const RIGHTMOST_LEAF_BITS: usize = DNA_BITS - 24 * MAX_CELL_BITS;

/// Children of each branching cell.
const FANOUT: usize = MAX_CELL_REFS;

/// A structural rule the bit-tree broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A cell that must be full holds fewer (or more) bits
    #[error("level {level} cell has {found} bits, expected {expected}", expected = MAX_CELL_BITS)]
    NonFullCell { level: u8, found: usize },
    /// A branching cell lacks some of its children
    #[error("missing level {level} cell: expected {expected} references, found {found}")]
    MissingCell { level: u8, expected: usize, found: usize },
    /// A cell carries children it must not have
    #[error("extraneous level {level} cell: expected {expected} references, found {found}")]
    ExtraneousCell { level: u8, expected: usize, found: usize },
    /// The final leaf doesn't hold exactly the leftover bits
    #[error("rightmost level 3 cell has {found} bits, expected {expected}", expected = RIGHTMOST_LEAF_BITS)]
    RightmostLeafWidth { found: usize },
}

impl ShapeError {
    /// Stable identifier of the broken rule.
    pub fn rule(&self) -> &'static str {
        match self {
            ShapeError::NonFullCell { .. } => "non_full_cell",
            ShapeError::MissingCell { .. } => "missing_cell",
            ShapeError::ExtraneousCell { .. } => "extraneous_cell",
            ShapeError::RightmostLeafWidth { .. } => "rightmost_leaf_width",
        }
    }

    /// Tree level of the offending cell.
    pub fn level(&self) -> u8 {
        match self {
            ShapeError::NonFullCell { level, .. }
            | ShapeError::MissingCell { level, .. }
            | ShapeError::ExtraneousCell { level, .. } => *level,
            ShapeError::RightmostLeafWidth { .. } => 3,
        }
    }
}

/// Where a cell sits in the layout, which decides its rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    Branch,
    /// First level-2 cell in pre-order; carries the level-3 leaves
    LeafParent,
    /// Any other level-2 cell
    Terminal,
    FullLeaf,
    RightmostLeaf,
}

impl Slot {
    fn level(self) -> u8 {
        match self {
            Slot::Root => 0,
            Slot::Branch => 1,
            Slot::LeafParent | Slot::Terminal => 2,
            Slot::FullLeaf | Slot::RightmostLeaf => 3,
        }
    }

    fn bit_width(self) -> usize {
        match self {
            Slot::RightmostLeaf => RIGHTMOST_LEAF_BITS,
            _ => MAX_CELL_BITS,
        }
    }

    fn child_count(self) -> usize {
        match self {
            Slot::Root | Slot::Branch | Slot::LeafParent => FANOUT,
            Slot::Terminal | Slot::FullLeaf | Slot::RightmostLeaf => 0,
        }
    }

    /// Slot of child `index` given whether the first level-2 cell has
    /// already been visited.
    fn child(self, index: usize, leaf_parent_seen: bool) -> Slot {
        match self {
            Slot::Root => Slot::Branch,
            Slot::Branch if !leaf_parent_seen && index == 0 => Slot::LeafParent,
            Slot::Branch => Slot::Terminal,
            Slot::LeafParent if index == FANOUT - 1 => Slot::RightmostLeaf,
            _ => Slot::FullLeaf,
        }
    }
}

/// Pre-order walk state shared by encode and decode.
struct Walk {
    leaf_parent_seen: bool,
}

impl Walk {
    fn new() -> Self {
        Walk { leaf_parent_seen: false }
    }

    /// Slots of the children of `slot`, updating the walk state.
    fn enter(&mut self, slot: Slot, index: usize) -> Slot {
        let child = slot.child(index, self.leaf_parent_seen);
        if child == Slot::LeafParent {
            self.leaf_parent_seen = true;
        }
        child
    }
}

/// Sequential reader over the DNA bits.
struct BitCursor<'a> {
    bits: &'a DnaBits,
    pos: usize,
}

impl<'a> BitCursor<'a> {
    fn take(&mut self, n: usize) -> &'a DnaBits {
        let bits: &'a DnaBits = self.bits;
        let run = &bits[self.pos..self.pos + n];
        self.pos += n;
        run
    }
}

/// Lay out DNA bits as a cell tree.
pub fn encode(dna: &Dna) -> Result<Cell, TonCellError> {
    let mut cursor = BitCursor { bits: dna.bits(), pos: 0 };
    let mut walk = Walk::new();
    build(Slot::Root, &mut cursor, &mut walk)
}

fn build(slot: Slot, cursor: &mut BitCursor<'_>, walk: &mut Walk) -> Result<Cell, TonCellError> {
    let mut builder = CellBuilder::new();
    store_dna_bits(&mut builder, cursor.take(slot.bit_width()))?;
    for index in 0..slot.child_count() {
        let child = walk.enter(slot, index);
        builder.store_reference(&build(child, cursor, walk)?.to_arc())?;
    }
    builder.build()
}

/// Check the tree shape without collecting bits.
pub fn validate(root: &Cell) -> Result<(), ShapeError> {
    visit(root, Slot::Root, &mut Walk::new(), &mut |_: &Cell| {})
}

/// Validate the tree and read its DNA back.
pub fn decode(root: &Cell) -> Result<Dna, ShapeError> {
    let mut bits = BitVec::<u8, Lsb0>::with_capacity(DNA_BITS);
    visit(root, Slot::Root, &mut Walk::new(), &mut |cell: &Cell| {
        bits.extend_from_bitslice(dna_bits(cell).as_bitslice())
    })?;
    // A tree that passed validation carries exactly DNA_BITS bits.
    Dna::from_bits(&bits).map_err(|_| ShapeError::NonFullCell { level: 0, found: bits.len() })
}

fn visit(
    cell: &Cell,
    slot: Slot,
    walk: &mut Walk,
    sink: &mut dyn FnMut(&Cell),
) -> Result<(), ShapeError> {
    let level = slot.level();
    let width = cell.bit_len();
    if width != slot.bit_width() {
        return Err(match slot {
            Slot::RightmostLeaf => ShapeError::RightmostLeafWidth { found: width },
            _ => ShapeError::NonFullCell { level, found: width },
        });
    }

    let expected = slot.child_count();
    let found = cell.references().len();
    if found < expected {
        return Err(ShapeError::MissingCell { level: level + 1, expected, found });
    }
    if found > expected {
        return Err(ShapeError::ExtraneousCell { level: level + 1, expected, found });
    }

    sink(cell);
    for (index, child) in cell.references().iter().enumerate() {
        let child_slot = walk.enter(slot, index);
        visit(child, child_slot, walk, sink)?;
    }
    Ok(())
}
