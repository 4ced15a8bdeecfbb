use std::fmt;

use serde::{Deserialize, Serialize};

/// Side length of the square board.
pub const BOARD_SIZE: usize = 8;

/// Total number of cells on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// The eight compass directions as `(d_row, d_col)` steps.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A cell coordinate on the board.
///
/// Both components are guaranteed to lie in `0..BOARD_SIZE`; positions can only be
/// constructed through checked constructors. Ordering is row-major, which is also the
/// order in which legal moves are enumerated.
///
/// # Example
///
/// ```
/// use reversi_engine::{BOARD_SIZE, Position};
///
/// let pos = Position::new(0, 0).unwrap();
/// assert!(pos.is_corner());
/// assert_eq!(pos.neighbors().count(), 3);
/// assert!(Position::new(BOARD_SIZE, 0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPosition {
    row: usize,
    col: usize,
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
            .ok_or_else(|| format!("position ({}, {}) is outside the board", raw.row, raw.col))
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        Self {
            row: pos.row(),
            col: pos.col(),
        }
    }
}

impl Position {
    /// Returns the position at `(row, col)`, or `None` if it is off the board.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    #[must_use]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[must_use]
    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// Returns the position shifted by `(d_row, d_col)` if it stays on the board.
    #[must_use]
    pub fn offset(self, d_row: isize, d_col: isize) -> Option<Self> {
        let row = self.row().checked_add_signed(d_row)?;
        let col = self.col().checked_add_signed(d_col)?;
        Self::new(row, col)
    }

    /// Iterates over every board position in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).filter_map(move |col| Self::new(row, col))
        })
    }

    /// Iterates over the (up to eight) positions adjacent to this one.
    pub fn neighbors(self) -> impl Iterator<Item = Self> {
        DIRECTIONS
            .into_iter()
            .filter_map(move |(d_row, d_col)| self.offset(d_row, d_col))
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        is_border(self.row()) && is_border(self.col())
    }

    /// Returns `true` for cells on the outer ring, corners included.
    #[must_use]
    pub fn is_edge(self) -> bool {
        is_border(self.row()) || is_border(self.col())
    }
}

fn is_border(index: usize) -> bool {
    index == 0 || index == BOARD_SIZE - 1
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_off_board() {
        assert!(Position::new(BOARD_SIZE - 1, BOARD_SIZE - 1).is_some());
        assert!(Position::new(BOARD_SIZE, 0).is_none());
        assert!(Position::new(0, BOARD_SIZE).is_none());
    }

    #[test]
    fn test_all_is_row_major() {
        let all = Position::all().collect::<Vec<_>>();
        assert_eq!(all.len(), CELL_COUNT);
        assert!(all.is_sorted());
        assert_eq!(all[1], Position::new(0, 1).unwrap());
    }

    #[test]
    fn test_offset_stays_on_board() {
        let origin = Position::new(0, 0).unwrap();
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(1, 1), Position::new(1, 1));
    }

    #[test]
    fn test_neighbor_counts() {
        let corner = Position::new(0, BOARD_SIZE - 1).unwrap();
        let edge = Position::new(0, 3).unwrap();
        let inner = Position::new(3, 3).unwrap();
        assert_eq!(corner.neighbors().count(), 3);
        assert_eq!(edge.neighbors().count(), 5);
        assert_eq!(inner.neighbors().count(), 8);
    }

    #[test]
    fn test_corner_and_edge_classification() {
        let corner = Position::new(BOARD_SIZE - 1, 0).unwrap();
        let edge = Position::new(4, BOARD_SIZE - 1).unwrap();
        let inner = Position::new(1, 1).unwrap();
        assert!(corner.is_corner() && corner.is_edge());
        assert!(!edge.is_corner() && edge.is_edge());
        assert!(!inner.is_corner() && !inner.is_edge());
    }

    #[test]
    fn test_deserialize_rejects_off_board() {
        let ok: Position = serde_json::from_str(r#"{"row":2,"col":5}"#).unwrap();
        assert_eq!(ok, Position::new(2, 5).unwrap());
        assert!(serde_json::from_str::<Position>(r#"{"row":9,"col":0}"#).is_err());
    }
}
