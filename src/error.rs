use thiserror::Error;

use crate::types::{MAX_BRACKET_SIZE, MIN_BRACKET_SIZE};

/// Construction-time failures. In-play invalid input is deliberately not an
/// error: `select_winner` with a bad winner is a no-op returning the
/// unchanged tournament, and an undo with nothing to revert yields `None`.
#[derive(Error, Debug)]
pub enum BracketError {
    #[error("a bracket needs at least two real items, got {got}")]
    TooFewItems { got: usize },

    #[error(
        "bracket size {size} must be a power of two between {} and {}",
        MIN_BRACKET_SIZE,
        MAX_BRACKET_SIZE
    )]
    InvalidBracketSize { size: usize },

    #[error("bracket size {size} cannot hold {got} items")]
    UndersizedBracket { size: usize, got: usize },

    #[error("{real} real items cannot fill a bracket of {size} without a bye-vs-bye pairing")]
    DegenerateBracket { real: usize, size: usize },

    #[error("parse bracket options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
