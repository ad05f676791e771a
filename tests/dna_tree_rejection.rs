//! Bit-tree shape validation against malformed payloads.
//!
//! Every test starts from a correctly encoded tree, breaks exactly one
//! cell, and checks that validation names the broken rule and level.

use std::collections::HashSet;

use pixel_canvas::dna::cell::{build_cell, dna_bits, ArcCell, Cell, CellBuilder};
use pixel_canvas::dna::tree::{self, ShapeError};
use pixel_canvas::dna::{boc, Dna};
use pixel_canvas::grid::{Grid, Point};
use pixel_canvas::palette::Color;

fn valid_tree() -> Cell {
    let mut grid = Grid::new();
    for (i, point) in Point::all().enumerate().step_by(7) {
        grid.set(point, Color::parse((i % 64) as i64).unwrap());
    }
    tree::encode(&Dna::from_grid(&grid)).unwrap()
}

fn rebuild(cell: &Cell, refs: &[ArcCell]) -> Cell {
    build_cell(dna_bits(cell).as_bitslice(), refs).unwrap()
}

/// Same cell with its data resized to `len` bits.
fn resized(cell: &Cell, len: usize) -> Cell {
    let mut bits = dna_bits(cell);
    bits.resize(len, false);
    build_cell(&bits, cell.references()).unwrap()
}

/// Same cell without its last reference.
fn dropped_last_ref(cell: &Cell) -> Cell {
    let refs = cell.references();
    rebuild(cell, &refs[..refs.len() - 1])
}

/// Same cell with an extra empty child.
fn with_extra_ref(cell: &Cell) -> Cell {
    let mut refs = cell.references().to_vec();
    refs.push(CellBuilder::new().build().unwrap().to_arc());
    rebuild(cell, &refs)
}

/// Rebuild `root` with the cell at `path` replaced by `f(cell)`.
fn replace_at(root: &Cell, path: &[usize], f: &dyn Fn(&Cell) -> Cell) -> Cell {
    match path.split_first() {
        None => f(root),
        Some((&index, rest)) => {
            let mut refs = root.references().to_vec();
            refs[index] = replace_at(&refs[index], rest, f).to_arc();
            rebuild(root, &refs)
        }
    }
}

fn check(path: &[usize], f: &dyn Fn(&Cell) -> Cell) -> ShapeError {
    let broken = replace_at(&valid_tree(), path, f);
    let err = tree::validate(&broken).unwrap_err();
    assert_eq!(tree::decode(&broken).unwrap_err(), err);
    err
}

#[test]
fn test_valid_tree_passes() {
    let root = valid_tree();
    assert_eq!(tree::validate(&root), Ok(()));
    // Rebuilding without changes keeps it valid.
    assert_eq!(tree::validate(&replace_at(&root, &[0, 0, 3], &|c| resized(c, 24))), Ok(()));
}

// ============================================================================
// Non-full cells
// ============================================================================

#[test]
fn test_non_full_root() {
    let err = check(&[], &|c| resized(c, 1022));
    assert_eq!(err, ShapeError::NonFullCell { level: 0, found: 1022 });
    assert_eq!(err.rule(), "non_full_cell");
}

#[test]
fn test_non_full_level1() {
    let err = check(&[2], &|c| resized(c, 0));
    assert_eq!(err, ShapeError::NonFullCell { level: 1, found: 0 });
}

#[test]
fn test_non_full_level2() {
    let err = check(&[1, 3], &|c| resized(c, 1000));
    assert_eq!(err, ShapeError::NonFullCell { level: 2, found: 1000 });
}

#[test]
fn test_non_full_leaf_parent() {
    let err = check(&[0, 0], &|c| resized(c, 1));
    assert_eq!(err, ShapeError::NonFullCell { level: 2, found: 1 });
}

#[test]
fn test_non_full_level3() {
    let err = check(&[0, 0, 2], &|c| resized(c, 24));
    assert_eq!(err, ShapeError::NonFullCell { level: 3, found: 24 });
}

#[test]
fn test_rightmost_leaf_too_wide() {
    let err = check(&[0, 0, 3], &|c| resized(c, 25));
    assert_eq!(err, ShapeError::RightmostLeafWidth { found: 25 });
    assert_eq!(err.rule(), "rightmost_leaf_width");
    assert_eq!(err.level(), 3);
}

#[test]
fn test_rightmost_leaf_full() {
    let err = check(&[0, 0, 3], &|c| resized(c, 1023));
    assert_eq!(err, ShapeError::RightmostLeafWidth { found: 1023 });
}

// ============================================================================
// Missing cells
// ============================================================================

#[test]
fn test_missing_level1() {
    let err = check(&[], &dropped_last_ref);
    assert_eq!(err, ShapeError::MissingCell { level: 1, expected: 4, found: 3 });
    assert_eq!(err.rule(), "missing_cell");
}

#[test]
fn test_missing_level2() {
    let err = check(&[3], &dropped_last_ref);
    assert_eq!(err, ShapeError::MissingCell { level: 2, expected: 4, found: 3 });
}

#[test]
fn test_missing_level3() {
    let err = check(&[0, 0], &dropped_last_ref);
    assert_eq!(err, ShapeError::MissingCell { level: 3, expected: 4, found: 3 });
}

// ============================================================================
// Extraneous cells
// ============================================================================

#[test]
fn test_extraneous_level3_under_terminal() {
    let err = check(&[0, 1], &with_extra_ref);
    assert_eq!(err, ShapeError::ExtraneousCell { level: 3, expected: 0, found: 1 });
    assert_eq!(err.rule(), "extraneous_cell");
}

#[test]
fn test_extraneous_level3_under_first_cell_of_later_branch() {
    // Only the very first level-2 cell in pre-order may have children.
    let err = check(&[2, 0], &with_extra_ref);
    assert_eq!(err, ShapeError::ExtraneousCell { level: 3, expected: 0, found: 1 });
}

#[test]
fn test_extraneous_level4_under_full_leaf() {
    let err = check(&[0, 0, 0], &with_extra_ref);
    assert_eq!(err, ShapeError::ExtraneousCell { level: 4, expected: 0, found: 1 });
}

#[test]
fn test_extraneous_level4_under_rightmost_leaf() {
    let err = check(&[0, 0, 3], &with_extra_ref);
    assert_eq!(err, ShapeError::ExtraneousCell { level: 4, expected: 0, found: 1 });
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_first_violation_in_pre_order_wins() {
    let root = valid_tree();
    let broken = replace_at(&root, &[3, 3], &|c| resized(c, 10));
    let broken = replace_at(&broken, &[1, 0], &with_extra_ref);
    assert_eq!(
        tree::validate(&broken),
        Err(ShapeError::ExtraneousCell { level: 3, expected: 0, found: 1 })
    );
}

#[test]
fn test_rules_are_distinct() {
    let errors = [
        check(&[], &|c| resized(c, 5)),
        check(&[], &dropped_last_ref),
        check(&[0, 1], &with_extra_ref),
        check(&[0, 0, 3], &|c| resized(c, 23)),
    ];
    let rules: HashSet<&str> = errors.iter().map(|e| e.rule()).collect();
    assert_eq!(rules.len(), 4);
}

#[test]
fn test_violation_survives_serialization() {
    let broken = replace_at(&valid_tree(), &[0, 0], &dropped_last_ref);
    let parsed = boc::from_bytes(&boc::to_bytes(&broken).unwrap()).unwrap();
    assert_eq!(
        tree::validate(&parsed),
        Err(ShapeError::MissingCell { level: 3, expected: 4, found: 3 })
    );
}
