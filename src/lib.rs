//! # Reshape - Pitch Tracking and Instrument Resynthesis
//!
//! Turns a recording (a hummed melody, a voice) into the same melody played
//! by recorded instrument notes.
//!
//! ## Architecture
//!
//! Reshape is an umbrella crate that coordinates:
//! - **reshape-core** - Sound buffers, analysis configuration, error kinds
//! - **reshape-analysis** - Spectral frame engine, HPS pitch tracking,
//!   envelope segmentation, pitch-track editing
//! - **reshape-sampler** - Reference notes, instrument packs, phase-vocoder
//!   time-stretching, pitch-track resynthesis
//!
//! ## Quick Start
//!
//! ```rust
//! use reshape::prelude::*;
//!
//! // A 200 Hz reference note for the "organ" instrument
//! let recording = Sound::new(vec![1000; 400], 2, 8000, 0).unwrap();
//! let details = NoteDetails { frequency: 200.0, attack: 0, decay: 100, sustain: 200, release: 300 };
//! let mut pack = Pack::new();
//! pack.insert("organ", [Note::from_details(&[recording], &details).unwrap()].into_iter().collect());
//!
//! let reshaper = Reshaper::builder().hop(100).pack(pack).build().unwrap();
//!
//! // Silence, a held 200 Hz note, silence
//! let track = PitchTrack::new(vec![0.0, 0.0, 200.0, 200.0, 200.0, 200.0, 200.0, 0.0, 0.0], 100);
//! let channels = reshaper.shape(&track, "organ", OutputFormat::new(2, 2, 8000)).unwrap();
//! assert_eq!(channels[0].len(), 900);
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Everything enabled (`full`)
//! - `analysis` - Pitch tracking, envelopes, pitch-track editing
//! - `sampler` - Notes, packs, resynthesis (enables `analysis`)
//! - `serialization` - Serde derives on configuration and data types

/// Re-export of reshape-core for direct access
pub use reshape_core as core;

pub use reshape_core::{max_amplitude, AnalysisConfig, Sound, DEFAULT_ADSR_HOP, DEFAULT_HOP};

// Analysis subsystem
#[cfg(feature = "analysis")]
pub use reshape_analysis as analysis;

#[cfg(feature = "analysis")]
pub use reshape_analysis::{
    EnvelopeBoundaries, FrameEngine, FrameInfo, FrameStrategy, PitchTrack, PitchTracker,
    ProgressSink, Spectrum,
};

// Sampler subsystem
#[cfg(feature = "sampler")]
pub use reshape_sampler as sampler;

#[cfg(feature = "sampler")]
pub use reshape_sampler::{
    Instrument, InstrumentSource, InterpolatingResampler, Note, NoteDetails, NoteSource,
    OutputFormat, Pack, Resampler, SampleLoader, VocoderResampler,
};

mod builder;
mod engine;
mod error;

pub use builder::ReshaperBuilder;
pub use engine::Reshaper;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Reshaper, ReshaperBuilder};

    pub use crate::core::{AnalysisConfig, Sound};

    #[cfg(feature = "analysis")]
    pub use crate::analysis::{EnvelopeBoundaries, PitchTrack, ProgressSink};

    #[cfg(feature = "sampler")]
    pub use crate::sampler::{Instrument, Note, NoteDetails, OutputFormat, Pack, Resampler};
}
