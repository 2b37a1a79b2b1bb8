use thiserror::Error;

use crate::types::{CellCount, Coord};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("coordinates are outside the board")]
    InvalidCoordinate,
    #[error("operation not allowed in the current game state")]
    IllegalStateTransition,
    #[error("{mines} mines do not fit a {width}x{height} board")]
    InvalidConfiguration {
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    #[error("malformed board file: {0}")]
    MalformedBoardFile(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
