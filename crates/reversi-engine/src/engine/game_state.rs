use std::fmt;

use crate::{
    InvalidMove, SnapshotError,
    core::{BOARD_SIZE, Board, FlipList, LegalMoves, Player, Position},
};

use super::{
    observer::{GameObserver, NoopObserver},
    snapshot::Snapshot,
};

/// What happened to the turn after a move was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TurnOutcome {
    /// The opponent has a legal move and is now to move.
    NormalMove { next: Player },
    /// The opponent has no legal move; the mover moves again.
    PlayerCannotMove { skipped: Player },
    /// Neither player can move.
    GameOver,
}

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameResult {
    Winner(Player),
    Draw,
}

/// A board together with the player to move and that player's legal moves.
///
/// The legal-move cache is recomputed on every mutation, so
/// [`is_terminal`](Self::is_terminal) is simply "the cache is empty". The only way
/// to change a state is [`apply_move`](Self::apply_move) (or its observed
/// variant); a rejected move leaves the state untouched.
///
/// When the game ends, `current_player` keeps naming the player who made the last
/// move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    legal_moves: LegalMoves,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new_initial()
    }
}

impl GameState {
    /// Returns the standard opening position with Black to move.
    #[must_use]
    pub fn new_initial() -> Self {
        Self::from_board(Board::initial(), Player::Black)
    }

    #[must_use]
    pub fn from_board(board: Board, current_player: Player) -> Self {
        let legal_moves = board.legal_moves_for(current_player);
        Self {
            board,
            current_player,
            legal_moves,
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, SnapshotError> {
        let board = snapshot.to_board()?;
        Ok(Self::from_board(board, snapshot.player))
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_board(self.current_player, &self.board)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Iterates over the current player's legal moves in row-major order.
    pub fn legal_moves(&self) -> impl Iterator<Item = Position> + '_ {
        self.legal_moves.keys().copied()
    }

    /// Legal moves with their flip-lists.
    #[must_use]
    pub fn legal_move_map(&self) -> &LegalMoves {
        &self.legal_moves
    }

    /// Returns the discs that playing `pos` would flip, or `None` if it is illegal.
    #[must_use]
    pub fn flips(&self, pos: Position) -> Option<&FlipList> {
        self.legal_moves.get(&pos)
    }

    #[must_use]
    pub fn is_legal(&self, pos: Position) -> bool {
        self.legal_moves.contains_key(&pos)
    }

    #[must_use]
    pub fn legal_move_count(&self) -> usize {
        self.legal_moves.len()
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.legal_moves.is_empty()
    }

    /// Disc counts as `(black, white)`.
    #[must_use]
    pub fn scores(&self) -> (usize, usize) {
        (
            self.board.count(Player::Black),
            self.board.count(Player::White),
        )
    }

    /// The player with more discs once the game is over; `None` while the game is
    /// running or on a draw.
    #[must_use]
    pub fn winner(&self) -> Option<Player> {
        match self.result()? {
            GameResult::Winner(player) => Some(player),
            GameResult::Draw => None,
        }
    }

    /// `None` while the game is still running.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        if !self.is_terminal() {
            return None;
        }
        let (black, white) = self.scores();
        let result = match black.cmp(&white) {
            std::cmp::Ordering::Greater => GameResult::Winner(Player::Black),
            std::cmp::Ordering::Less => GameResult::Winner(Player::White),
            std::cmp::Ordering::Equal => GameResult::Draw,
        };
        Some(result)
    }

    pub fn apply_move(&mut self, pos: Position) -> Result<TurnOutcome, InvalidMove> {
        self.apply_move_observed(pos, &mut NoopObserver)
    }

    /// Applies a move, reporting cell changes and the turn outcome to `observer`.
    ///
    /// The mover's disc is placed and every disc in its flip-list changes owner.
    /// If the opponent then has a legal move the turn passes; otherwise, if the mover
    /// still has one, the opponent is skipped; otherwise the game is over.
    pub fn apply_move_observed<O>(
        &mut self,
        pos: Position,
        observer: &mut O,
    ) -> Result<TurnOutcome, InvalidMove>
    where
        O: GameObserver + ?Sized,
    {
        let flips = self
            .legal_moves
            .remove(&pos)
            .ok_or(InvalidMove { position: pos })?;
        let mover = self.current_player;

        let previous = self.board.set(pos, Some(mover));
        observer.on_cell_change(pos, mover, previous);
        for flipped in flips {
            let previous = self.board.set(flipped, Some(mover));
            observer.on_cell_change(flipped, mover, previous);
        }

        let opponent = mover.opposite();
        let opponent_moves = self.board.legal_moves_for(opponent);
        if !opponent_moves.is_empty() {
            self.current_player = opponent;
            self.legal_moves = opponent_moves;
            observer.on_normal_move(opponent);
            return Ok(TurnOutcome::NormalMove { next: opponent });
        }

        self.legal_moves = self.board.legal_moves_for(mover);
        if self.legal_moves.is_empty() {
            observer.on_game_over();
            Ok(TurnOutcome::GameOver)
        } else {
            observer.on_player_cannot_move(opponent);
            Ok(TurnOutcome::PlayerCannotMove { skipped: opponent })
        }
    }

    /// Returns a copy of this state with `pos` applied, leaving `self` untouched.
    pub fn with_move(&self, pos: Position) -> Result<(Self, TurnOutcome), InvalidMove> {
        let mut next = self.clone();
        let outcome = next.apply_move(pos)?;
        Ok((next, outcome))
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self.current_player.as_char();
        let border = "-".repeat(2 * BOARD_SIZE + 1);
        writeln!(f, "{token}{border}{token}")?;
        for row in self.board.rows() {
            write!(f, "|")?;
            for cell in row {
                write!(f, " {}", cell.map_or('*', Player::as_char))?;
            }
            writeln!(f, " |")?;
        }
        write!(f, "{token}{border}{token}")
    }
}

/// A [`GameState`] bound to an observer that receives every event it raises.
///
/// # Example
///
/// ```
/// use reversi_engine::{EventLog, GameState, ObservedGame, Position};
///
/// let mut game = ObservedGame::new(GameState::new_initial(), EventLog::default());
/// game.apply_move(Position::new(2, 4).unwrap()).unwrap();
/// assert!(game.observer().events().last().unwrap().is_normal_move());
/// ```
#[derive(Debug, Clone)]
pub struct ObservedGame<O> {
    state: GameState,
    observer: O,
}

impl<O> ObservedGame<O>
where
    O: GameObserver,
{
    pub fn new(state: GameState, observer: O) -> Self {
        Self { state, observer }
    }

    pub fn apply_move(&mut self, pos: Position) -> Result<TurnOutcome, InvalidMove> {
        self.state.apply_move_observed(pos, &mut self.observer)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_parts(self) -> (GameState, O) {
        (self.state, self.observer)
    }
}
