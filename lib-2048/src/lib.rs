pub use core_2048::*;

pub mod direction;
pub mod game;
pub mod logic;

pub use direction::Direction;
pub use game::{Game, GameError, Phase, Turn};
