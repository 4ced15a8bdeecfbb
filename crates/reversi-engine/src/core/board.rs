use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use super::{
    player::Player,
    position::{BOARD_SIZE, DIRECTIONS, Position},
};

/// Contents of a single cell: the owning player, or `None` when empty.
pub type Cell = Option<Player>;

/// Upper bound on the number of discs a single move can flip.
///
/// A move captures along at most four lines through the placed disc (row, column
/// and both diagonals), each holding at most `BOARD_SIZE - 1` other cells.
pub const MAX_FLIPS: usize = 4 * (BOARD_SIZE - 1);

/// Discs that would change owner if a move were played.
pub type FlipList = ArrayVec<Position, MAX_FLIPS>;

/// Legal moves for one player, each mapped to its flip-list.
pub type LegalMoves = BTreeMap<Position, FlipList>;

/// The `BOARD_SIZE` × `BOARD_SIZE` grid of cells.
///
/// `Board` is a plain value; it knows how to compute captures but not whose turn it
/// is. Turn handling lives in [`GameState`](crate::GameState).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const EMPTY: Self = Self {
        cells: [[None; BOARD_SIZE]; BOARD_SIZE],
    };

    /// Returns the standard starting position: Black on the main diagonal of the
    /// centre square, White on the anti-diagonal.
    #[must_use]
    pub fn initial() -> Self {
        let middle = BOARD_SIZE / 2 - 1;
        let mut board = Self::EMPTY;
        board.cells[middle][middle] = Some(Player::Black);
        board.cells[middle + 1][middle + 1] = Some(Player::Black);
        board.cells[middle + 1][middle] = Some(Player::White);
        board.cells[middle][middle + 1] = Some(Player::White);
        board
    }

    #[must_use]
    pub fn from_rows(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    #[must_use]
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row()][pos.col()]
    }

    /// Stores `cell` at `pos` and returns the previous contents.
    pub fn set(&mut self, pos: Position, cell: Cell) -> Cell {
        std::mem::replace(&mut self.cells[pos.row()][pos.col()], cell)
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        Position::all().map(|pos| (pos, self.get(pos)))
    }

    #[must_use]
    pub fn count(&self, player: Player) -> usize {
        self.cells().filter(|(_, cell)| *cell == Some(player)).count()
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells().filter(|(_, cell)| cell.is_none()).count()
    }

    /// Returns the discs `player` would capture by playing at `pos`.
    ///
    /// The result is empty when `pos` is occupied or captures nothing, i.e. when the
    /// move is illegal.
    #[must_use]
    pub fn flips_for(&self, pos: Position, player: Player) -> FlipList {
        let mut flips = FlipList::new();
        if self.get(pos).is_some() {
            return flips;
        }
        for (d_row, d_col) in DIRECTIONS {
            self.collect_run(pos, d_row, d_col, player, &mut flips);
        }
        flips
    }

    /// Walks from `origin` in one direction, appending the opponent discs that end in
    /// one of `player`'s discs. Runs that reach an empty cell or the edge are dropped.
    fn collect_run(
        &self,
        origin: Position,
        d_row: isize,
        d_col: isize,
        player: Player,
        flips: &mut FlipList,
    ) {
        let start = flips.len();
        let mut current = origin;
        loop {
            let Some(next) = current.offset(d_row, d_col) else {
                flips.truncate(start);
                return;
            };
            match self.get(next) {
                None => {
                    flips.truncate(start);
                    return;
                }
                Some(owner) if owner == player => return,
                Some(_) => flips.push(next),
            }
            current = next;
        }
    }

    /// Computes every legal move for `player` together with its flip-list.
    #[must_use]
    pub fn legal_moves_for(&self, player: Player) -> LegalMoves {
        Position::all()
            .filter_map(|pos| {
                let flips = self.flips_for(pos, player);
                (!flips.is_empty()).then_some((pos, flips))
            })
            .collect()
    }

    /// Counts legal moves for `player` without keeping the flip-lists.
    #[must_use]
    pub fn legal_move_count_for(&self, player: Player) -> usize {
        Position::all()
            .filter(|pos| !self.flips_for(*pos, player).is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> Position {
        Position::new(row, col).unwrap()
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();
        assert_eq!(board.count(Player::Black), 2);
        assert_eq!(board.count(Player::White), 2);
        assert_eq!(board.empty_count(), BOARD_SIZE * BOARD_SIZE - 4);
        assert_eq!(board.get(pos(3, 3)), Some(Player::Black));
        assert_eq!(board.get(pos(4, 4)), Some(Player::Black));
        assert_eq!(board.get(pos(3, 4)), Some(Player::White));
        assert_eq!(board.get(pos(4, 3)), Some(Player::White));
    }

    #[test]
    fn test_initial_legal_moves() {
        let board = Board::initial();
        let moves = board.legal_moves_for(Player::Black);
        let keys = moves.keys().copied().collect::<Vec<_>>();
        assert_eq!(keys, vec![pos(2, 4), pos(3, 5), pos(4, 2), pos(5, 3)]);
        for flips in moves.values() {
            assert_eq!(flips.len(), 1);
        }
        assert_eq!(board.legal_move_count_for(Player::White), 4);
    }

    #[test]
    fn test_run_reaching_edge_is_discarded() {
        let mut board = Board::EMPTY;
        board.set(pos(0, 0), Some(Player::White));
        board.set(pos(0, 1), Some(Player::White));
        board.set(pos(0, 2), Some(Player::White));
        assert!(board.flips_for(pos(0, 3), Player::Black).is_empty());
        board.set(pos(0, 0), Some(Player::Black));
        assert_eq!(
            board.flips_for(pos(0, 3), Player::Black).as_slice(),
            &[pos(0, 2), pos(0, 1)]
        );
    }

    #[test]
    fn test_run_reaching_empty_is_discarded() {
        let mut board = Board::EMPTY;
        board.set(pos(2, 2), Some(Player::White));
        board.set(pos(4, 4), Some(Player::Black));
        // (3, 3) is empty, so the diagonal run is broken.
        assert!(board.flips_for(pos(1, 1), Player::Black).is_empty());
    }

    #[test]
    fn test_flips_union_over_directions() {
        let mut board = Board::EMPTY;
        let center = pos(3, 3);
        for (d_row, d_col) in DIRECTIONS {
            let near = center.offset(d_row, d_col).unwrap();
            let far = near.offset(d_row, d_col).unwrap();
            board.set(near, Some(Player::White));
            board.set(far, Some(Player::Black));
        }
        let flips = board.flips_for(center, Player::Black);
        assert_eq!(flips.len(), DIRECTIONS.len());
        assert!(board.flips_for(center, Player::White).is_empty());
    }

    #[test]
    fn test_occupied_cell_is_never_legal() {
        let board = Board::initial();
        assert!(board.flips_for(pos(3, 3), Player::White).is_empty());
    }
}
