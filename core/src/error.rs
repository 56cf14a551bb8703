use thiserror::Error;

use crate::CellCount;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] MoveError),
    /// Bookkeeping disagrees with the grid. Indicates an engine bug, not a user error.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(&'static str),
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid needs at least one row and one column")]
    EmptyGrid,
    #[error("grid exceeds {max}x{max} cells")]
    GridTooLarge { max: usize },
    #[error("{mines} mines requested, must be fewer than {limit}")]
    TooManyMines { mines: CellCount, limit: CellCount },
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("coordinates out of range")]
    OutOfBounds,
    #[error("game already ended, no new moves are accepted")]
    GameOver,
    #[error("flagged cells cannot be dug")]
    Flagged,
    #[error("no hidden cell left to pick")]
    NoCandidate,
}

pub type Result<T> = core::result::Result<T, GameError>;
