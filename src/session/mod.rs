pub mod game;
pub mod peek;

pub use game::{GameError, GameSession};
pub use peek::PeekReveal;
