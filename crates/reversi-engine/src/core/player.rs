use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two sides of a game.
///
/// Serialized as its single-character token: `"b"` for Black, `"w"` for White.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    #[serde(rename = "b")]
    Black,
    #[serde(rename = "w")]
    White,
}

impl Player {
    pub const ALL: [Self; 2] = [Self::Black, Self::White];

    /// Returns the other player. Applying it twice yields the original player.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Black => 'b',
            Self::White => 'w',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(Self::Black),
            'w' => Some(Self::White),
            _ => None,
        }
    }

    /// Index usable for per-player arrays (`Black = 0`, `White = 1`).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Black => 0,
            Self::White => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Black => "Black",
            Self::White => "White",
        };
        f.pad(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involutive() {
        for player in Player::ALL {
            assert_ne!(player.opposite(), player);
            assert_eq!(player.opposite().opposite(), player);
        }
    }

    #[test]
    fn test_char_tokens() {
        for player in Player::ALL {
            assert_eq!(Player::from_char(player.as_char()), Some(player));
        }
        assert_eq!(Player::from_char('*'), None);
    }

    #[test]
    fn test_serde_uses_tokens() {
        assert_eq!(serde_json::to_string(&Player::Black).unwrap(), r#""b""#);
        let white: Player = serde_json::from_str(r#""w""#).unwrap();
        assert_eq!(white, Player::White);
    }
}
