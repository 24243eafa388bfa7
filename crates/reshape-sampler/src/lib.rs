//! Reference notes, instrument packs and pitch-track resynthesis.
//!
//! Provides the note model and the rendering engine that plays a pitch track
//! with recorded instrument notes.
//!
//! # Features
//!
//! - **Notes**: recordings sliced into attack, decay, sustain and release phases
//! - **Packs**: instruments of notes with nearest-frequency lookup, loadable
//!   through a [`SampleLoader`]
//! - **Time-stretching**: offline phase vocoder and varispeed behind the
//!   [`Resampler`] trait
//! - **Resynthesis**: pitch-track segmentation and parallel per-channel rendering
//!
//! # Example
//!
//! ```rust
//! use reshape_core::Sound;
//! use reshape_sampler::{shape, Instrument, Note, NoteDetails, OutputFormat, Pack, VocoderResampler};
//!
//! let recording = Sound::new(vec![1000; 4000], 2, 8000, 0).unwrap();
//! let details = NoteDetails { frequency: 220.0, attack: 0, decay: 400, sustain: 3000, release: 3600 };
//! let note = Note::from_details(&[recording], &details).unwrap();
//!
//! let mut pack = Pack::new();
//! pack.insert("pad", [note].into_iter().collect::<Instrument>());
//!
//! let track = [0.0, 0.0, 220.0, 220.0, 220.0, 220.0, 220.0, 0.0, 0.0];
//! let format = OutputFormat::new(2, 2, 8000);
//! let channels = shape(&track, 100, Some(&pack), "pad", format, &VocoderResampler::default()).unwrap();
//! assert_eq!(channels.len(), 2);
//! assert_eq!(channels[0].len(), 900);
//! ```

// Error types
pub mod error;
pub use error::{Error, Result};

pub mod note;
pub mod pack;
pub mod shape;
pub mod time_stretch;

pub use note::{Note, NoteDetails, NotePhases};
pub use pack::{Instrument, InstrumentSource, NoteSource, Pack, SampleLoader};
pub use shape::{segment_track, shape, NoteShaper, OutputFormat, Segment};
pub use time_stretch::{FftSize, InterpolatingResampler, Resampler, VocoderResampler};
