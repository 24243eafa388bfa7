//! # Reshape Analysis
//!
//! Spectral analysis of integer-sample sounds.
//!
//! This crate provides:
//! - **Frame engine**: sliding FFT windows driven by a [`FrameStrategy`]
//! - **Pitch tracking**: Harmonic Product Spectrum estimates, one per hop
//! - **Envelope segmentation**: attack/decay/sustain/release boundaries from
//!   a magnitude profile
//! - **Pitch-track editing**: octave shifts, note snapping, range folding
//! - **Spectrum split/join**: per-frame spectra and their resynthesis
//!
//! ## Example
//!
//! ```rust
//! use reshape_analysis::{freqs, segment_envelope, track_pitch};
//! use reshape_core::Sound;
//!
//! let samples: Vec<i32> = (0..8000)
//!     .map(|i| ((i as f64 * 0.2).sin() * 8000.0) as i32)
//!     .collect();
//! let sound = Sound::new(samples, 2, 8000, 0).unwrap();
//!
//! let track = track_pitch(&sound, 100).unwrap();
//! assert_eq!(track.len(), 80);
//!
//! let envelope = segment_envelope(&sound, 100).unwrap();
//! assert!(envelope.release() <= sound.len());
//!
//! let higher = freqs::octave_up(track.frequencies());
//! assert_eq!(higher.len(), track.len());
//! ```

pub mod envelope;
pub mod frame;
pub mod freqs;
pub mod hps;
pub mod pitch;
pub mod spectrum;
pub mod spectrums;

pub use envelope::{
    find_decay, find_release, find_sustain, magnitude_profile, segment_envelope,
    EnvelopeBoundaries, MagnitudeProfiler,
};
pub use frame::{padded_window_length, FrameEngine, FrameInfo, FrameOutput, FrameStrategy};
pub use hps::estimate_f0;
pub use pitch::{
    note_frequency, track_pitch, PitchTrack, PitchTracker,
    ProgressSink,
};
pub use spectrum::Spectrum;
pub use spectrums::{map_spectrums, split_into_spectrums, spectrums_to_sound};
