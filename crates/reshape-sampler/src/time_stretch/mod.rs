//! Time-stretching and pitch-shifting of note phases.
//!
//! Note phases are adapted offline: the whole phase is available up front,
//! and the result must have an exact length so consecutive phases line up
//! in the rendered output.
//!
//! # Example
//!
//! ```rust
//! use reshape_core::Sound;
//! use reshape_sampler::time_stretch::{Resampler, VocoderResampler};
//!
//! let sound = Sound::new(vec![0; 4096], 2, 8000, 0).unwrap();
//! let resampler = VocoderResampler::default();
//!
//! // Half a second, a fifth higher
//! let adapted = resampler.resample(&sound, 0.5, 1.5).unwrap();
//! assert_eq!(adapted.len(), 4000);
//! ```

mod phase_vocoder;
mod resampler;
mod types;
mod varispeed;

pub use phase_vocoder::PhaseVocoderProcessor;
pub use resampler::{InterpolatingResampler, Resampler, VocoderResampler};
pub use types::FftSize;
pub use varispeed::{resize, varispeed};
