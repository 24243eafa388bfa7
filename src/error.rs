//! Unified error type for the reshape umbrella crate

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] reshape_core::Error),

    #[cfg(feature = "sampler")]
    #[error(transparent)]
    Sampler(#[from] reshape_sampler::Error),
}

impl Error {
    /// The underlying analysis error, whichever subsystem raised it.
    pub fn as_core(&self) -> Option<&reshape_core::Error> {
        match self {
            Error::Core(err) => Some(err),
            #[cfg(feature = "sampler")]
            Error::Sampler(reshape_sampler::Error::Core(err)) => Some(err),
            #[cfg(feature = "sampler")]
            Error::Sampler(_) => None,
        }
    }
}
