use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    SnapshotError,
    core::{BOARD_SIZE, Board, Cell, Player, Position},
};

const EMPTY_TOKEN: char = '*';

/// Serializable capture of a game position: the player to move and the grid.
///
/// The JSON form is `{"player": "b", "field": [["*", "b", ...], ...]}`. The text
/// form is a header line with the player token followed by one line per row of
/// space-separated cell tokens; blank lines and surrounding whitespace are ignored
/// when parsing.
///
/// Dimensions are not checked on deserialization; they are validated when the
/// snapshot is turned back into a [`Board`].
///
/// # Example
///
/// ```
/// use reversi_engine::{GameState, Snapshot};
///
/// let text = GameState::new_initial().snapshot().to_string();
/// let snapshot = text.parse::<Snapshot>().unwrap();
/// let state = GameState::from_snapshot(&snapshot).unwrap();
/// assert_eq!(state, GameState::new_initial());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub player: Player,
    pub field: Vec<Vec<CellToken>>,
}

/// A single cell in a snapshot, serialized as `"*"`, `"b"` or `"w"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellToken(pub Cell);

impl CellToken {
    #[must_use]
    pub fn as_char(self) -> char {
        self.0.map_or(EMPTY_TOKEN, Player::as_char)
    }

    fn parse(token: &str) -> Result<Self, SnapshotError> {
        let mut chars = token.chars();
        let cell = match (chars.next(), chars.next()) {
            (Some(EMPTY_TOKEN), None) => None,
            (Some(c), None) => match Player::from_char(c) {
                Some(player) => Some(player),
                None => return Err(unknown_token(token)),
            },
            _ => return Err(unknown_token(token)),
        };
        Ok(Self(cell))
    }
}

fn unknown_token(token: &str) -> SnapshotError {
    SnapshotError::UnknownToken {
        token: token.to_owned(),
    }
}

impl TryFrom<String> for CellToken {
    type Error = SnapshotError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::parse(&token)
    }
}

impl From<CellToken> for String {
    fn from(token: CellToken) -> Self {
        token.as_char().to_string()
    }
}

impl Snapshot {
    #[must_use]
    pub fn from_board(player: Player, board: &Board) -> Self {
        let field = board
            .rows()
            .iter()
            .map(|row| row.iter().copied().map(CellToken).collect())
            .collect();
        Self { player, field }
    }

    /// Validates the grid dimensions and builds the board.
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        if self.field.len() != BOARD_SIZE {
            return Err(SnapshotError::RowCount {
                expected: BOARD_SIZE,
                actual: self.field.len(),
            });
        }
        let mut board = Board::EMPTY;
        for (row, tokens) in self.field.iter().enumerate() {
            if tokens.len() != BOARD_SIZE {
                return Err(SnapshotError::ColumnCount {
                    row,
                    expected: BOARD_SIZE,
                    actual: tokens.len(),
                });
            }
            for (col, token) in tokens.iter().enumerate() {
                if let Some(pos) = Position::new(row, col) {
                    board.set(pos, token.0);
                }
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.player.as_char())?;
        for row in &self.field {
            let mut sep = "";
            for token in row {
                write!(f, "{sep}{}", token.as_char())?;
                sep = " ";
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Snapshot {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|line| !line.is_empty());

        let header = lines.next().ok_or(SnapshotError::MissingHeader)?;
        let player = match header.chars().collect::<Vec<_>>().as_slice() {
            [c] => Player::from_char(*c),
            _ => None,
        }
        .ok_or_else(|| SnapshotError::InvalidHeader {
            token: header.to_owned(),
        })?;

        let field = lines
            .map(|line| {
                line.split_whitespace()
                    .map(CellToken::parse)
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { player, field })
    }
}
