//! Rules engine for Reversi (Othello) on an 8×8 board.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - Plain data: [`Player`], [`Position`] and [`Board`] with capture
//!   computation
//! - [`engine`] - [`GameState`] with turn passing, terminal detection, observers and
//!   snapshots
//!
//! A [`GameState`] is a cheap-to-clone value. Search code clones it freely; only the
//! state handed to [`GameState::apply_move_observed`] or wrapped in an
//! [`ObservedGame`] reports events.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("illegal move at {position}")]
pub struct InvalidMove {
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SnapshotError {
    #[display("snapshot is missing the player header")]
    MissingHeader,
    #[display("invalid player token in header: {token:?}")]
    InvalidHeader { token: String },
    #[display("unknown cell token: {token:?}")]
    UnknownToken { token: String },
    #[display("expected {expected} rows, found {actual}")]
    RowCount { expected: usize, actual: usize },
    #[display("row {row}: expected {expected} cells, found {actual}")]
    ColumnCount {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
