//! Error types for reshape-core.

use thiserror::Error;

/// Error type for analysis and sound operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid range: low={low}, high={high}")]
    InvalidRange { low: f32, high: f32 },

    #[error("Empty or invalid sound: {0}")]
    EmptyOrInvalidSound(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
