//! Error types for the simulation.

use crate::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid world bounds: {width}x{height} (both dimensions must be positive)")]
    InvalidBounds { width: i32, height: i32 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Position {0} is outside the world")]
    OutOfBounds(Position),

    #[error("Position {0} is already occupied")]
    Occupied(Position),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
