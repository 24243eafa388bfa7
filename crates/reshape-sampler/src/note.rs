//! Reference notes sliced into attack, decay, sustain and release phases.

use reshape_analysis::{note_frequency, segment_envelope, EnvelopeBoundaries};
use reshape_core::Sound;

use crate::error::Result;

/// The four phases of one channel of a note.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePhases {
    pub attack: Sound,
    pub decay: Sound,
    pub sustain: Sound,
    pub release: Sound,
}

impl NotePhases {
    fn slice(channel: &Sound, boundaries: &EnvelopeBoundaries) -> Self {
        let [attack, decay, sustain, release] = boundaries
            .phase_ranges(channel.len())
            .map(|(start, end)| channel.sub_sound(start, end));
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Phases in playing order.
    pub fn phases(&self) -> [&Sound; 4] {
        [&self.attack, &self.decay, &self.sustain, &self.release]
    }

    /// Total length in samples.
    pub fn len(&self) -> usize {
        self.phases().iter().map(|p| p.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Frequency and envelope of a recorded note, known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NoteDetails {
    pub frequency: f32,
    pub attack: usize,
    pub decay: usize,
    pub sustain: usize,
    pub release: usize,
}

/// A recorded reference note.
///
/// Built once from a multi-channel recording and never modified, so it can
/// be shared freely between rendering threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    frequency: f32,
    boundaries: EnvelopeBoundaries,
    channels: Vec<NotePhases>,
}

impl Note {
    /// Segment the first channel of `channels` and slice every channel at
    /// the same boundaries.
    ///
    /// # Errors
    /// `EmptyOrInvalidSound` for a non-positive frequency, no channels, or a
    /// zero hop.
    pub fn build(frequency: f32, channels: &[Sound], hop: usize) -> Result<Self> {
        let first = first_channel(channels)?;
        let boundaries = segment_envelope(first, hop)?;
        tracing::debug!(
            "note {} Hz: attack {}, decay {}, sustain {}, release {} of {} samples",
            frequency,
            boundaries.attack(),
            boundaries.decay(),
            boundaries.sustain(),
            boundaries.release(),
            first.len()
        );
        Self::from_boundaries(frequency, channels, boundaries)
    }

    /// Build a note whose frequency is detected from its first channel.
    pub fn build_detecting_frequency(channels: &[Sound], hop: usize) -> Result<Self> {
        let frequency = note_frequency(first_channel(channels)?)?;
        Self::build(frequency, channels, hop)
    }

    /// Build a note from known details, skipping the segmentation.
    ///
    /// # Errors
    /// `EmptyOrInvalidSound` when the boundaries do not fit the first channel.
    pub fn from_details(channels: &[Sound], details: &NoteDetails) -> Result<Self> {
        let first = first_channel(channels)?;
        let boundaries = EnvelopeBoundaries::new(
            details.attack,
            details.decay,
            details.sustain,
            details.release,
            first.len(),
        )?;
        Self::from_boundaries(details.frequency, channels, boundaries)
    }

    fn from_boundaries(
        frequency: f32,
        channels: &[Sound],
        boundaries: EnvelopeBoundaries,
    ) -> Result<Self> {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(reshape_core::Error::EmptyOrInvalidSound(format!(
                "note frequency must be positive, got {}",
                frequency
            ))
            .into());
        }
        Ok(Self {
            frequency,
            boundaries,
            channels: channels
                .iter()
                .map(|channel| NotePhases::slice(channel, &boundaries))
                .collect(),
        })
    }

    /// Intrinsic frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn boundaries(&self) -> &EnvelopeBoundaries {
        &self.boundaries
    }

    pub fn details(&self) -> NoteDetails {
        NoteDetails {
            frequency: self.frequency,
            attack: self.boundaries.attack(),
            decay: self.boundaries.decay(),
            sustain: self.boundaries.sustain(),
            release: self.boundaries.release(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&NotePhases> {
        self.channels.get(index)
    }

    pub fn channels(&self) -> &[NotePhases] {
        &self.channels
    }
}

fn first_channel(channels: &[Sound]) -> Result<&Sound> {
    channels.first().ok_or_else(|| {
        reshape_core::Error::EmptyOrInvalidSound("a note needs at least one channel".into())
            .into()
    })
}
