//! Grid error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Scale must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("Grid size must be greater than 1, got {0}")]
    InvalidGridSize(f64),

    #[error("At least one grid level is required, got {0}")]
    InvalidNumGrids(usize),

    #[error("Minimum spacing must be positive and finite, got {0}")]
    InvalidMinSpacing(f64),

    #[error("Element id already in use by another owner: {0}")]
    IdCollision(String),

    #[error("Patterns have not been set")]
    PatternsNotSet,

    #[error("Draw failed: {0}")]
    Draw(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
