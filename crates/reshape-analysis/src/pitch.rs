//! Pitch tracking with the Harmonic Product Spectrum
//!
//! Drives the [`FrameEngine`] across a whole sound and records one
//! fundamental estimate per hop. Frames that fall under the magnitude gate
//! are recorded as `0.0` so the track stays aligned with the source: index
//! `k` always covers samples `[k * hop, (k + 1) * hop)`.
//!
//! Two window policies are available:
//! - **General audio** - window is the next power of two at or above the
//!   sample rate (about one second of context per frame)
//! - **Note mode** - one frame spanning the whole sound, used to find the
//!   intrinsic frequency of an isolated instrument note

use crate::frame::{FrameEngine, FrameInfo, FrameStrategy};
use crate::hps::estimate_f0;
use crate::spectrum::Spectrum;
use reshape_core::{Error, Result, Sound};

/// Receives completion percentages while a pitch track is computed.
pub trait ProgressSink {
    fn on_progress(&self, percent: usize, frame: usize, frame_count: usize);
}

impl<F: Fn(usize, usize, usize)> ProgressSink for F {
    fn on_progress(&self, percent: usize, frame: usize, frame_count: usize) {
        self(percent, frame, frame_count)
    }
}

/// Fundamental-frequency estimates, one per hop.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchTrack {
    frequencies: Vec<f32>,
    hop: usize,
}

impl PitchTrack {
    pub fn new(frequencies: Vec<f32>, hop: usize) -> Self {
        Self { frequencies, hop }
    }

    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn into_frequencies(self) -> Vec<f32> {
        self.frequencies
    }

    /// Samples between consecutive estimates
    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Number of source samples covered by the track.
    pub fn sample_span(&self) -> usize {
        self.frequencies.len() * self.hop
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WindowPolicy {
    SampleRate,
    WholeSound(usize),
    Fixed(usize),
}

/// Frame strategy recording one HPS estimate per frame.
pub struct PitchTracker<'a> {
    threshold: f64,
    window: WindowPolicy,
    progress: Option<&'a dyn ProgressSink>,
}

/// Accumulator of a [`PitchTracker`] run.
#[derive(Debug, Default)]
pub struct PitchAccumulator {
    frequencies: Vec<f32>,
    last_percent: Option<usize>,
}

impl<'a> PitchTracker<'a> {
    /// Tracker for general audio with the given hop.
    pub fn new(hop: usize) -> Self {
        Self {
            threshold: hop as f64,
            window: WindowPolicy::SampleRate,
            progress: None,
        }
    }

    /// Single-frame tracker for an isolated note of `sound_length` samples.
    pub fn note(sound_length: usize) -> Self {
        Self {
            threshold: sound_length as f64,
            window: WindowPolicy::WholeSound(sound_length),
            progress: None,
        }
    }

    /// Override the analysis window length (rounded up to a power of two).
    pub fn with_window_length(mut self, window_length: usize) -> Self {
        self.window = WindowPolicy::Fixed(window_length);
        self
    }

    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Run the tracker over `sound`.
    pub fn track(&self, sound: &Sound) -> Result<PitchTrack> {
        let output = FrameEngine::new().run(sound, self)?;
        Ok(PitchTrack::new(
            output.accumulator.frequencies,
            self.threshold as usize,
        ))
    }

    fn report_progress(&self, accumulator: &mut PitchAccumulator, frame: &FrameInfo) {
        let percent = frame.index * 100 / frame.count.max(1);
        if accumulator.last_percent == Some(percent) {
            return;
        }
        accumulator.last_percent = Some(percent);
        tracing::trace!(
            "Iteration {} / {}, {}%",
            frame.index,
            frame.count,
            percent
        );
        if let Some(sink) = self.progress {
            sink.on_progress(percent, frame.index, frame.count);
        }
    }
}

impl FrameStrategy for PitchTracker<'_> {
    type Accumulator = PitchAccumulator;

    fn init_sound(&self, sound: &Sound) -> Result<Self::Accumulator> {
        if sound.is_empty() {
            return Err(Error::EmptyOrInvalidSound(
                "cannot track the pitch of an empty sound".into(),
            ));
        }
        let frames = sound.len().div_ceil(self.threshold.max(1.0) as usize);
        Ok(PitchAccumulator {
            frequencies: Vec::with_capacity(frames),
            last_percent: None,
        })
    }

    fn window_length(&self, freq_limit: f64) -> usize {
        match self.window {
            WindowPolicy::SampleRate => freq_limit.ceil() as usize,
            WindowPolicy::WholeSound(len) | WindowPolicy::Fixed(len) => len,
        }
    }

    fn low_threshold(&self, _default_value: f64) -> f64 {
        self.threshold
    }

    fn transform_frame(
        &self,
        accumulator: &mut Self::Accumulator,
        spectrum: Spectrum,
        frame: FrameInfo,
    ) -> Spectrum {
        self.report_progress(accumulator, &frame);

        let f0 = if frame.sound_detected {
            estimate_f0(&spectrum)
        } else {
            0.0
        };
        accumulator.frequencies.push(f0);
        spectrum
    }
}

/// Pitch track of `sound` with one estimate every `hop` samples.
///
/// # Errors
/// `EmptyOrInvalidSound` for an empty sound or a zero hop.
pub fn track_pitch(sound: &Sound, hop: usize) -> Result<PitchTrack> {
    if hop == 0 {
        return Err(Error::EmptyOrInvalidSound("hop must be positive".into()));
    }
    PitchTracker::new(hop).track(sound)
}

/// Intrinsic frequency of an isolated note, from a single whole-sound frame.
pub fn note_frequency(sound: &Sound) -> Result<f32> {
    let track = PitchTracker::note(sound.len()).track(sound)?;
    Ok(track.frequencies().first().copied().unwrap_or(0.0))
}
