//! Geometry helpers shared by both simulation variants.
//!
//! Two notions of "same place" coexist in the engine and must not be mixed:
//!
//! - **Exact cell equality** ([`same_position`]) is used by the turn reducer,
//!   where every unit and settlement sits on an integer grid cell.
//! - **Euclidean proximity** ([`distance`] compared against a threshold) is
//!   used by the realtime executor, where positions are continuous and a unit
//!   only ever gets "close enough" to its target.
//!
//! Continuous positions are plain [`glam::Vec2`] values in world units.
//!
//! # Example
//!
//! ```
//! use wavefront_core::geometry::{add, distance, Cell, Direction};
//! use glam::Vec2;
//!
//! assert_eq!(distance(Vec2::ZERO, Vec2::new(3.0, 4.0)), 5.0);
//!
//! let north_east = Direction::new(-1, 1).unwrap();
//! assert_eq!(add(Cell::new(4, 2), north_east.into()), Cell::new(3, 3));
//! ```

use std::fmt;
use std::ops::{Add, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Euclidean distance between two continuous positions.
#[must_use]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Component-wise sum of two grid cells.
#[must_use]
pub fn add(a: Cell, b: Cell) -> Cell {
    Cell::new(a.row + b.row, a.column + b.column)
}

/// Component-wise difference of two grid cells.
#[must_use]
pub fn subtract(a: Cell, b: Cell) -> Cell {
    Cell::new(a.row - b.row, a.column - b.column)
}

/// Exact equality on both components.
#[must_use]
pub fn same_position(a: Cell, b: Cell) -> bool {
    a.row == b.row && a.column == b.column
}

/// Returns true if `b` is one of the 8 Moore neighbours of `a`.
#[must_use]
pub fn is_adjacent(a: Cell, b: Cell) -> bool {
    let delta = subtract(b, a);
    !same_position(a, b) && delta.row.abs() <= 1 && delta.column.abs() <= 1
}

// =============================================================================
// Cell
// =============================================================================

/// A grid cell addressed by row and column.
///
/// Cells are signed so that applying a direction to an edge cell yields an
/// off-board cell which [`Cell::within`] can reject, instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Row index, 0 at the top of the board.
    pub row: i32,
    /// Column index, 0 at the left of the board.
    pub column: i32,
}

impl Cell {
    /// Creates a cell at `(row, column)`.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Returns true if the cell lies in `[0, height) x [0, width)`.
    #[must_use]
    pub fn within(self, width: u32, height: u32) -> bool {
        self.row >= 0
            && self.column >= 0
            && i64::from(self.row) < i64::from(height)
            && i64::from(self.column) < i64::from(width)
    }

    /// Applies a direction, returning the neighbouring cell.
    #[must_use]
    pub fn step(self, direction: Direction) -> Self {
        add(self, direction.into())
    }
}

impl Add for Cell {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        add(self, rhs)
    }
}

impl Sub for Cell {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        subtract(self, rhs)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

// =============================================================================
// Direction
// =============================================================================

/// One of the 8 Moore-neighbour unit steps.
///
/// Each component is in `{-1, 0, 1}` and the two are never both zero. The
/// only way to build a `Direction` is [`Direction::new`] (or deserializing,
/// which goes through the same check), so every value upholds this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Cell", into = "Cell")]
pub struct Direction {
    row: i8,
    column: i8,
}

impl Direction {
    /// All 8 directions, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self { row: -1, column: 0 },
        Self { row: -1, column: 1 },
        Self { row: 0, column: 1 },
        Self { row: 1, column: 1 },
        Self { row: 1, column: 0 },
        Self { row: 1, column: -1 },
        Self { row: 0, column: -1 },
        Self { row: -1, column: -1 },
    ];

    /// Creates a direction, or `None` if the components are out of range or
    /// both zero.
    #[must_use]
    pub fn new(row: i32, column: i32) -> Option<Self> {
        let in_range = (-1..=1).contains(&row) && (-1..=1).contains(&column);
        if !in_range || (row == 0 && column == 0) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        Some(Self {
            row: row as i8,
            column: column as i8,
        })
    }

    /// Row component.
    #[must_use]
    pub const fn row(self) -> i32 {
        self.row as i32
    }

    /// Column component.
    #[must_use]
    pub const fn column(self) -> i32 {
        self.column as i32
    }
}

impl From<Direction> for Cell {
    fn from(direction: Direction) -> Self {
        Cell::new(direction.row(), direction.column())
    }
}

impl TryFrom<Cell> for Direction {
    type Error = SimError;

    fn try_from(cell: Cell) -> Result<Self, Self::Error> {
        Self::new(cell.row, cell.column).ok_or(SimError::InvalidDirection {
            row: cell.row,
            column: cell.column,
        })
    }
}
