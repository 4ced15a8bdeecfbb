pub use self::{board::*, player::*, position::*};

pub(crate) mod board;
pub(crate) mod player;
pub(crate) mod position;
