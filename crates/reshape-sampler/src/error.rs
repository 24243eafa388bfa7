//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The pack has no instrument with this name.
    #[error("{0} is not a valid instrument")]
    UnknownInstrument(String),

    /// No pack (or an empty one) was given.
    #[error("No pack provided")]
    NoPackProvided,

    /// Time stretch or pitch shift failed.
    #[error("Resample error: {0}")]
    Resample(String),

    /// A sample could not be loaded.
    #[error("Sample loading error: {0}")]
    Load(String),

    /// Analysis or sound error.
    #[error(transparent)]
    Core(#[from] reshape_core::Error),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
