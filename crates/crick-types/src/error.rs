use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid match id: {0}")]
    InvalidMatchId(String),

    #[error("invalid innings slot label: {0}")]
    InvalidSlot(String),

    #[error("invalid overs notation: {0}")]
    InvalidOvers(String),

    #[error("player id must not be blank")]
    BlankPlayerId,

    #[error("player {0} appears more than once in the playing eleven")]
    DuplicatePlayer(String),

    #[error("playing eleven too small: need at least {min}, got {actual}")]
    LineupTooSmall { min: usize, actual: usize },
}
