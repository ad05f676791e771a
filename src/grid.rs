//! The 64x64 pixel grid and its immutable snapshots
//!
//! `Grid` is dense and row-major: `y` selects the row and `x` the column,
//! both in `0..GRID_SIZE`. Cells live behind an `Arc`, so taking a
//! `Snapshot` is a pointer copy; the next write through the grid clones
//! the cells if a snapshot still holds them.

use serde::{Deserialize, Serialize, Serializer};
use std::ops::Index;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::palette::{Color, ColorError};

/// Width and height of the grid.
pub const GRID_SIZE: usize = 64;

/// Number of pixels in the grid.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

type Cells = [Color; GRID_CELLS];

/// Error type for grid construction and coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Coordinate outside `0..64` on either axis
    #[error("point ({x}, {y}) out of bounds for {size}x{size} grid", size = GRID_SIZE)]
    OutOfBounds { x: i64, y: i64 },
    /// Rows or columns don't add up to a 64x64 grid
    #[error("expected {size}x{size} grid, got {rows} rows with a row of {cols} columns", size = GRID_SIZE)]
    Dimensions { rows: usize, cols: usize },
    /// A pixel value isn't a palette index
    #[error("invalid pixel at ({x}, {y}): {source}")]
    Color {
        x: usize,
        y: usize,
        #[source]
        source: ColorError,
    },
    /// Text form of a point couldn't be read
    #[error("invalid point '{0}', expected 'x,y'")]
    Syntax(String),
}

/// A coordinate on the grid, always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    x: u8,
    y: u8,
}

#[derive(Deserialize)]
struct RawPoint {
    x: i64,
    y: i64,
}

impl TryFrom<RawPoint> for Point {
    type Error = GridError;

    fn try_from(raw: RawPoint) -> Result<Self, Self::Error> {
        Point::new(raw.x, raw.y)
    }
}

impl Point {
    /// Create a point, checking both axes against the grid size.
    pub fn new(x: i64, y: i64) -> Result<Point, GridError> {
        let size = GRID_SIZE as i64;
        if x < 0 || x >= size || y < 0 || y >= size {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(Point { x: x as u8, y: y as u8 })
    }

    /// Point at a row-major cell offset.
    pub(crate) const fn from_offset(offset: usize) -> Point {
        Point { x: (offset % GRID_SIZE) as u8, y: (offset / GRID_SIZE) as u8 }
    }

    /// Column.
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Row.
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Row-major cell offset.
    pub const fn offset(self) -> usize {
        self.y as usize * GRID_SIZE + self.x as usize
    }

    /// Every point in row-major order.
    pub fn all() -> impl Iterator<Item = Point> {
        (0..GRID_CELLS).map(Point::from_offset)
    }
}

impl FromStr for Point {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or_else(|| GridError::Syntax(s.to_string()))?;
        let x = x.trim().parse::<i64>().map_err(|_| GridError::Syntax(s.to_string()))?;
        let y = y.trim().parse::<i64>().map_err(|_| GridError::Syntax(s.to_string()))?;
        Point::new(x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Mutable 64x64 grid of palette colors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<Vec<Color>>")]
pub struct Grid {
    cells: Arc<Cells>,
}

impl Grid {
    /// A grid filled with the background color.
    pub fn new() -> Self {
        Self::filled(Color::BACKGROUND)
    }

    /// A grid with every pixel set to `color`.
    pub fn filled(color: Color) -> Self {
        Grid { cells: Arc::new([color; GRID_CELLS]) }
    }

    /// Color at `point`.
    pub fn get(&self, point: Point) -> Color {
        self.cells[point.offset()]
    }

    /// Overwrite the color at `point`.
    ///
    /// Snapshots taken earlier keep the old value.
    pub fn set(&mut self, point: Point, color: Color) {
        Arc::make_mut(&mut self.cells)[point.offset()] = color;
    }

    /// Immutable view of the current contents.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { cells: Arc::clone(&self.cells) }
    }

    /// True when every pixel is the background color.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| *c == Color::BACKGROUND)
    }

    /// Colors in row-major order.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        self.cells.iter().copied()
    }

    /// Build a grid from colors in row-major order.
    pub fn from_colors(colors: impl IntoIterator<Item = Color>) -> Result<Grid, GridError> {
        let mut cells = [Color::BACKGROUND; GRID_CELLS];
        let mut count = 0;
        for color in colors {
            if count == GRID_CELLS {
                return Err(GridError::Dimensions { rows: GRID_SIZE + 1, cols: GRID_SIZE });
            }
            cells[count] = color;
            count += 1;
        }
        if count != GRID_CELLS {
            return Err(GridError::Dimensions {
                rows: count / GRID_SIZE,
                cols: count % GRID_SIZE,
            });
        }
        Ok(Grid { cells: Arc::new(cells) })
    }

    /// Build a grid from rows of raw palette indices (`rows[y][x]`).
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Grid, GridError> {
        check_dimensions(rows.iter().map(|r| r.as_ref().len()), rows.len())?;
        let mut cells = [Color::BACKGROUND; GRID_CELLS];
        for (y, row) in rows.iter().enumerate() {
            for (x, value) in row.as_ref().iter().enumerate() {
                cells[y * GRID_SIZE + x] = Color::parse(i64::from(*value))
                    .map_err(|source| GridError::Color { x, y, source })?;
            }
        }
        Ok(Grid { cells: Arc::new(cells) })
    }

    /// Rows of raw palette indices (`rows[y][x]`).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        rows_of(&self.cells)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Point> for Grid {
    type Output = Color;

    fn index(&self, point: Point) -> &Color {
        &self.cells[point.offset()]
    }
}

impl TryFrom<Vec<Vec<Color>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Color>>) -> Result<Self, Self::Error> {
        check_dimensions(rows.iter().map(Vec::len), rows.len())?;
        Grid::from_colors(rows.into_iter().flatten())
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.chunks(GRID_SIZE))
    }
}

/// Read-only view of a grid at one point in time.
///
/// Cheap to clone and safe to hand to other threads; later edits to the
/// grid it came from are never visible through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    cells: Arc<Cells>,
}

impl Snapshot {
    /// Color at `point`.
    pub fn get(&self, point: Point) -> Color {
        self.cells[point.offset()]
    }

    /// Rows of raw palette indices (`rows[y][x]`).
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        rows_of(&self.cells)
    }

    /// An editable grid starting from this snapshot.
    pub fn to_grid(&self) -> Grid {
        Grid { cells: Arc::clone(&self.cells) }
    }
}

impl Index<Point> for Snapshot {
    type Output = Color;

    fn index(&self, point: Point) -> &Color {
        &self.cells[point.offset()]
    }
}

fn check_dimensions(
    mut row_lengths: impl Iterator<Item = usize>,
    rows: usize,
) -> Result<(), GridError> {
    if rows != GRID_SIZE {
        return Err(GridError::Dimensions { rows, cols: GRID_SIZE });
    }
    match row_lengths.find(|len| *len != GRID_SIZE) {
        Some(cols) => Err(GridError::Dimensions { rows, cols }),
        None => Ok(()),
    }
}

fn rows_of(cells: &Cells) -> Vec<Vec<u8>> {
    cells.chunks(GRID_SIZE).map(|row| row.iter().map(|c| c.index()).collect()).collect()
}
