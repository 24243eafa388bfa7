//! Reshaper that wires analysis and resynthesis together

use crate::core::{AnalysisConfig, Sound};
use crate::Result;

#[cfg(feature = "analysis")]
use crate::analysis::{EnvelopeBoundaries, PitchTrack, PitchTracker, ProgressSink};

#[cfg(feature = "sampler")]
use std::sync::Arc;

#[cfg(feature = "sampler")]
use crate::sampler::{Error as SamplerError, Note, NoteShaper, OutputFormat, Pack, Resampler};

/// Entry point for pitch tracking, envelope segmentation, note building and
/// resynthesis with a shared configuration.
///
/// Subsystems follow the enabled Cargo features:
/// - Analysis (feature "analysis") - pitch tracks and envelopes
/// - Resynthesis (feature "sampler") - notes, the pack and `shape`
///
/// A `Reshaper` holds no mutable state; clones share the pack and resampler.
///
/// # Example
///
/// ```ignore
/// use reshape::prelude::*;
///
/// let reshaper = Reshaper::builder().pack(pack).build()?;
///
/// // Hum into a microphone, play it back on a cello
/// let cello = reshaper.reshape(&[hum], "cello")?;
/// ```
#[derive(Clone)]
pub struct Reshaper {
    config: AnalysisConfig,

    #[cfg(feature = "sampler")]
    pack: Option<Arc<Pack>>,

    #[cfg(feature = "sampler")]
    resampler: Arc<dyn Resampler>,
}

impl Reshaper {
    pub fn builder() -> crate::ReshaperBuilder {
        crate::ReshaperBuilder::default()
    }

    pub(crate) fn from_parts(
        config: AnalysisConfig,
        #[cfg(feature = "sampler")] pack: Option<Arc<Pack>>,
        #[cfg(feature = "sampler")] resampler: Arc<dyn Resampler>,
    ) -> Self {
        Self {
            config,
            #[cfg(feature = "sampler")]
            pack,
            #[cfg(feature = "sampler")]
            resampler,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Pitch track of `sound`, one estimate every `config().hop` samples.
    #[cfg(feature = "analysis")]
    pub fn track_pitch(&self, sound: &Sound) -> Result<PitchTrack> {
        Ok(PitchTracker::new(self.config.hop).track(sound)?)
    }

    /// Like [`track_pitch`](Self::track_pitch), reporting each new
    /// completion percentage to `sink`.
    #[cfg(feature = "analysis")]
    pub fn track_pitch_with_progress(
        &self,
        sound: &Sound,
        sink: &dyn ProgressSink,
    ) -> Result<PitchTrack> {
        Ok(PitchTracker::new(self.config.hop)
            .with_progress(sink)
            .track(sound)?)
    }

    /// Intrinsic frequency of an isolated note.
    #[cfg(feature = "analysis")]
    pub fn note_frequency(&self, sound: &Sound) -> Result<f32> {
        Ok(crate::analysis::note_frequency(sound)?)
    }

    /// Attack, decay, sustain and release boundaries of `sound`, profiled
    /// every `config().adsr_hop` samples.
    #[cfg(feature = "analysis")]
    pub fn segment_envelope(&self, sound: &Sound) -> Result<EnvelopeBoundaries> {
        Ok(crate::analysis::segment_envelope(sound, self.config.adsr_hop)?)
    }

    #[cfg(feature = "sampler")]
    pub fn pack(&self) -> Option<&Pack> {
        self.pack.as_deref()
    }

    /// Build a reference note from a multi-channel recording.
    #[cfg(feature = "sampler")]
    pub fn build_note(&self, frequency: f32, channels: &[Sound]) -> Result<Note> {
        Ok(Note::build(frequency, channels, self.config.adsr_hop)?)
    }

    /// Render `track` with `instrument` from the configured pack.
    ///
    /// # Errors
    /// - `NoPackProvided` when the reshaper was built without a pack
    /// - `UnknownInstrument` when the pack has no such instrument
    #[cfg(feature = "sampler")]
    pub fn shape(
        &self,
        track: &PitchTrack,
        instrument: &str,
        format: OutputFormat,
    ) -> Result<Vec<Sound>> {
        let pack = self.pack.as_deref().ok_or(SamplerError::NoPackProvided)?;
        let sounds = NoteShaper::new(pack, &*self.resampler)
            .with_config(&self.config)
            .shape(track.frequencies(), track.hop(), instrument, format)?;
        Ok(sounds)
    }

    /// Track the pitch of the first channel and render it with `instrument`
    /// in the format of the input, one output channel per input channel.
    #[cfg(feature = "sampler")]
    pub fn reshape(&self, channels: &[Sound], instrument: &str) -> Result<Vec<Sound>> {
        let first = channels.first().ok_or_else(|| {
            crate::core::Error::EmptyOrInvalidSound("nothing to reshape".into())
        })?;
        let track = self.track_pitch(first)?;
        tracing::debug!(
            "reshaping {} frames into {} channels of {}",
            track.len(),
            channels.len(),
            instrument
        );
        self.shape(&track, instrument, OutputFormat::of(first, channels.len()))
    }
}
