//! # Reshape Core
//!
//! Shared building blocks for the reshape subsystems:
//! - [`Sound`] - one channel of integer samples with its format
//! - [`AnalysisConfig`] - frame steps and frequency guards
//! - [`Error`] - error kinds shared by analysis and resynthesis

pub mod config;
pub mod error;
pub mod sound;

pub use config::{AnalysisConfig, DEFAULT_ADSR_HOP, DEFAULT_HOP};
pub use error::{Error, Result};
pub use sound::{max_amplitude, Sound};
