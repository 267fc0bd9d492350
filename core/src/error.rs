use thiserror::Error;

/// Construction-time failures. Gameplay actions never error: invalid input
/// during play is silently ignored and reported as a `NoChange` outcome.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many mines")]
    TooManyMines,
}

pub type Result<T> = core::result::Result<T, GameError>;
