//! Error types for the dance analysis crates.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Keypoint count mismatch: expected {expected}, got {actual}")]
    KeypointCount { expected: usize, actual: usize },

    #[error("Unknown position: {0}")]
    UnknownPosition(String),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Move {0} has no positions")]
    EmptyMove(String),

    #[error("Insufficient data: need {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
