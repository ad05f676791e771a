//! Square brush geometry

use crate::grid::{Point, GRID_SIZE};

/// Largest brush size the editor offers (a 15x15 square).
pub const MAX_BRUSH_SIZE: u8 = 7;

/// Points of the `(2 * size + 1)`-wide square centered on `center`.
///
/// The square is clipped to the grid, so a brush near an edge yields
/// fewer points. Points come column by column: all `y` for the leftmost
/// `x`, then the next column.
pub fn square_around(center: Point, size: u8) -> impl Iterator<Item = Point> {
    let size = i64::from(size);
    let max = GRID_SIZE as i64 - 1;
    let (cx, cy) = (i64::from(center.x()), i64::from(center.y()));

    let xs = (cx - size).max(0)..=(cx + size).min(max);
    let ys = (cy - size).max(0)..=(cy + size).min(max);

    xs.flat_map(move |x| ys.clone().filter_map(move |y| Point::new(x, y).ok()))
}
