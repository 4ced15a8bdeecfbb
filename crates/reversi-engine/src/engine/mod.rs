//! Turn handling on top of the [`core`](crate::core) board types.
//!
//! - [`GameState`] - Board, player to move and the cached legal moves
//! - [`GameObserver`] - Synchronous notifications raised while a move is applied
//! - [`ObservedGame`] - A game state bound to an observer
//! - [`Snapshot`] - JSON and plain-text capture of a position
//!
//! # Example
//!
//! ```
//! use reversi_engine::GameState;
//!
//! let mut state = GameState::new_initial();
//! loop {
//!     let Some(mv) = state.legal_moves().next() else {
//!         break;
//!     };
//!     if state.apply_move(mv).unwrap().is_game_over() {
//!         break;
//!     }
//! }
//!
//! assert!(state.is_terminal());
//! let (black, white) = state.scores();
//! assert!(black + white <= 64);
//! ```

pub use self::{game_state::*, observer::*, snapshot::*};

mod game_state;
mod observer;
mod snapshot;
