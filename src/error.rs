use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EloError {
    #[error("game result must be 0, 0.5 or 1, got {0}")]
    InvalidResult(f64),
    #[error("a game needs at least two players, got {0}")]
    NotEnoughPlayers(usize),
    #[error("no rating for player {0:?}")]
    UnknownPlayer(String),
    #[error("player {0:?} is ranked more than once")]
    DuplicatePlayer(String),
    #[error("defective observation: {0}")]
    DefectiveObservation(String),
    #[error("invalid model parameters: {0}")]
    InvalidParams(String),
}

pub type Result<T> = std::result::Result<T, EloError>;
