use crate::core::{Player, Position};

/// Receives notifications raised synchronously by
/// [`GameState::apply_move_observed`](crate::GameState::apply_move_observed).
///
/// Every method defaults to a no-op, so implementors only override the events they
/// care about. Observers are notified; they never influence the game.
pub trait GameObserver {
    /// A cell was placed or flipped. `previous` is `None` for the newly placed disc.
    fn on_cell_change(&mut self, _position: Position, _owner: Player, _previous: Option<Player>) {}

    /// `skipped` had no legal move, so the other player moves again.
    fn on_player_cannot_move(&mut self, _skipped: Player) {}

    /// The turn passed normally; `next` is now to move.
    fn on_normal_move(&mut self, _next: Player) {}

    /// Neither player can move.
    fn on_game_over(&mut self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl GameObserver for NoopObserver {}

impl<O> GameObserver for &mut O
where
    O: GameObserver + ?Sized,
{
    fn on_cell_change(&mut self, position: Position, owner: Player, previous: Option<Player>) {
        (**self).on_cell_change(position, owner, previous);
    }

    fn on_player_cannot_move(&mut self, skipped: Player) {
        (**self).on_player_cannot_move(skipped);
    }

    fn on_normal_move(&mut self, next: Player) {
        (**self).on_normal_move(next);
    }

    fn on_game_over(&mut self) {
        (**self).on_game_over();
    }
}

/// A recorded game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GameEvent {
    CellOwnerChange {
        position: Position,
        owner: Player,
        previous: Option<Player>,
    },
    PlayerCannotMove {
        skipped: Player,
    },
    NormalMove {
        next: Player,
    },
    GameOver,
}

/// Observer that records every event in order.
///
/// # Example
///
/// ```
/// use reversi_engine::{EventLog, GameState};
///
/// let mut state = GameState::new_initial();
/// let mut log = EventLog::default();
/// let mv = state.legal_moves().next().unwrap();
/// state.apply_move_observed(mv, &mut log).unwrap();
///
/// // One placed disc, one flipped disc, one turn change.
/// assert_eq!(log.events().len(), 3);
/// assert!(log.events()[2].is_normal_move());
/// ```
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
}

impl EventLog {
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }
}

impl GameObserver for EventLog {
    fn on_cell_change(&mut self, position: Position, owner: Player, previous: Option<Player>) {
        self.events.push(GameEvent::CellOwnerChange {
            position,
            owner,
            previous,
        });
    }

    fn on_player_cannot_move(&mut self, skipped: Player) {
        self.events.push(GameEvent::PlayerCannotMove { skipped });
    }

    fn on_normal_move(&mut self, next: Player) {
        self.events.push(GameEvent::NormalMove { next });
    }

    fn on_game_over(&mut self) {
        self.events.push(GameEvent::GameOver);
    }
}
