//! ADSR envelope segmentation
//!
//! A recorded note is expected to rise in loudness (attack), then fall
//! through decay and sustain, and the transitions show up as breaks in the
//! monotonic runs of its magnitude profile. The profile holds the mean
//! spectral magnitude of every hop, computed by the [`FrameEngine`].
//!
//! Boundary rules, for a profile `p` and hop `H`:
//! - decay: first break of the non-decreasing run starting at `attack / H`
//! - sustain: first break of the non-increasing run starting at `decay / H`
//! - release: first break of the non-decreasing run of the *reversed*
//!   sound's profile, measured back from the end of the sound
//!
//! A run that never breaks collapses its phase to zero length and is
//! reported with `tracing::warn!`.

use crate::frame::{FrameEngine, FrameInfo, FrameStrategy};
use crate::spectrum::Spectrum;
use reshape_core::{Error, Result, Sound};

/// Sample indices splitting a single-channel sound into four phases.
///
/// `0 <= attack <= decay <= sustain <= release <= length`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct EnvelopeBoundaries {
    attack: usize,
    decay: usize,
    sustain: usize,
    release: usize,
}

impl EnvelopeBoundaries {
    /// Validated boundaries for a sound of `length` samples.
    ///
    /// # Errors
    /// `EmptyOrInvalidSound` when the indices decrease or pass `length`.
    pub fn new(
        attack: usize,
        decay: usize,
        sustain: usize,
        release: usize,
        length: usize,
    ) -> Result<Self> {
        if !(attack <= decay && decay <= sustain && sustain <= release && release <= length) {
            return Err(Error::EmptyOrInvalidSound(format!(
                "envelope boundaries ({}, {}, {}, {}) do not fit a sound of {} samples",
                attack, decay, sustain, release, length
            )));
        }
        Ok(Self {
            attack,
            decay,
            sustain,
            release,
        })
    }

    pub fn attack(&self) -> usize {
        self.attack
    }

    pub fn decay(&self) -> usize {
        self.decay
    }

    pub fn sustain(&self) -> usize {
        self.sustain
    }

    pub fn release(&self) -> usize {
        self.release
    }

    /// Sample ranges of the attack, decay, sustain and release phases.
    pub fn phase_ranges(&self, length: usize) -> [(usize, usize); 4] {
        [
            (self.attack, self.decay),
            (self.decay, self.sustain),
            (self.sustain, self.release),
            (self.release, length.max(self.release)),
        ]
    }
}

/// Records the mean bin magnitude of every frame.
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeProfiler {
    hop: usize,
}

impl MagnitudeProfiler {
    pub fn new(hop: usize) -> Self {
        Self { hop }
    }
}

impl FrameStrategy for MagnitudeProfiler {
    type Accumulator = Vec<f64>;

    fn init_sound(&self, sound: &Sound) -> Result<Self::Accumulator> {
        Ok(Vec::with_capacity(sound.len() / self.hop.max(1) + 1))
    }

    fn window_length(&self, _freq_limit: f64) -> usize {
        self.hop
    }

    fn low_threshold(&self, _default_value: f64) -> f64 {
        self.hop as f64
    }

    fn transform_frame(
        &self,
        accumulator: &mut Self::Accumulator,
        spectrum: Spectrum,
        _frame: FrameInfo,
    ) -> Spectrum {
        accumulator.push(spectrum.mean_magnitude());
        spectrum
    }
}

/// Mean spectral magnitude of every `hop` samples of `sound`.
///
/// # Errors
/// `EmptyOrInvalidSound` for an empty sound or a zero hop.
pub fn magnitude_profile(sound: &Sound, hop: usize) -> Result<Vec<f64>> {
    if hop == 0 {
        return Err(Error::EmptyOrInvalidSound("hop must be positive".into()));
    }
    if sound.is_empty() {
        return Err(Error::EmptyOrInvalidSound(
            "cannot profile the magnitude of an empty sound".into(),
        ));
    }
    Ok(FrameEngine::new()
        .run(sound, &MagnitudeProfiler::new(hop))?
        .accumulator)
}

/// Index (relative to `values`) of the first point breaking a monotonic run.
fn first_break(values: &[f64], rising: bool) -> Option<usize> {
    values.windows(2).position(|pair| {
        if rising {
            pair[1] < pair[0]
        } else {
            pair[1] > pair[0]
        }
    })
    .map(|i| i + 1)
}

/// Sample index where the attack rise ends.
///
/// `None` when the profile keeps rising from `attack` to its end.
pub fn find_decay(profile: &[f64], attack: usize, hop: usize) -> Option<usize> {
    let start = (attack / hop.max(1)).min(profile.len());
    first_break(&profile[start..], true).map(|k| (start + k - 1) * hop)
}

/// Sample index where the post-decay fall ends.
///
/// `None` when the profile keeps falling from `decay` to its end.
pub fn find_sustain(profile: &[f64], decay: usize, hop: usize) -> Option<usize> {
    let start = (decay / hop.max(1)).min(profile.len());
    first_break(&profile[start..], false).map(|k| (start + k - 1) * hop)
}

/// Sample index where the release starts, from the profile of the reversed sound.
///
/// `None` when the reversed profile rises all the way.
pub fn find_release(reversed_profile: &[f64], total_samples: usize, hop: usize) -> Option<usize> {
    first_break(reversed_profile, true).map(|k| total_samples.saturating_sub((k - 1) * hop))
}

/// Attack, decay, sustain and release boundaries of `sound` (attack fixed at 0).
///
/// # Errors
/// `EmptyOrInvalidSound` for an empty sound or a zero hop.
pub fn segment_envelope(sound: &Sound, hop: usize) -> Result<EnvelopeBoundaries> {
    let length = sound.len();
    let profile = magnitude_profile(sound, hop)?;

    let attack = 0;
    let decay = find_decay(&profile, attack, hop)
        .unwrap_or_else(|| {
            tracing::warn!("magnitude never stops rising, empty attack phase");
            attack
        })
        .min(length);

    let sustain = find_sustain(&profile, decay, hop)
        .unwrap_or_else(|| {
            tracing::warn!("magnitude never stops falling after decay, empty decay phase");
            decay
        })
        .clamp(decay, length);

    let reversed_profile = magnitude_profile(&sound.reversed(), hop)?;
    let release = find_release(&reversed_profile, length, hop)
        .unwrap_or_else(|| {
            tracing::warn!("no release detected, empty release phase");
            length
        })
        .clamp(sustain, length);

    tracing::debug!(
        "envelope of {} samples: decay {}, sustain {}, release {}",
        length,
        decay,
        sustain,
        release
    );
    EnvelopeBoundaries::new(attack, decay, sustain, release, length)
}
