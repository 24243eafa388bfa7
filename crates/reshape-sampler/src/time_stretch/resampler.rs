//! Time and pitch adaptation of note phases.

use reshape_core::Sound;

use super::phase_vocoder::PhaseVocoderProcessor;
use super::types::FftSize;
use super::varispeed::{resize, varispeed};
use crate::error::{Error, Result};

/// Changes the duration and pitch of a sound.
///
/// Implementations are shared across rendering threads.
pub trait Resampler: Send + Sync {
    /// Resample `sound` to last `duration_secs` with its pitch multiplied by
    /// `pitch_ratio`. The result has exactly `round(duration_secs * sample_rate)`
    /// samples and the format of `sound`.
    fn resample(&self, sound: &Sound, duration_secs: f64, pitch_ratio: f64) -> Result<Sound>;
}

fn target_length(sound: &Sound, duration_secs: f64, pitch_ratio: f64) -> Result<usize> {
    if !(pitch_ratio.is_finite() && pitch_ratio > 0.0) {
        return Err(Error::Resample(format!(
            "pitch ratio must be positive, got {}",
            pitch_ratio
        )));
    }
    if !(duration_secs.is_finite() && duration_secs >= 0.0) {
        return Err(Error::Resample(format!(
            "duration must be non-negative, got {}",
            duration_secs
        )));
    }
    Ok((duration_secs * sound.sample_rate() as f64).round() as usize)
}

fn to_sound(template: &Sound, samples: &[f64]) -> Sound {
    template.with_samples(samples.iter().map(|&s| template.clamp_sample(s)).collect())
}

/// Varispeed by the pitch ratio, then phase-vocoder stretch to the target length.
///
/// Sounds shorter than one FFT frame are resized by interpolation alone.
pub struct VocoderResampler {
    vocoder: PhaseVocoderProcessor,
}

impl VocoderResampler {
    pub fn new(fft_size: FftSize) -> Self {
        Self {
            vocoder: PhaseVocoderProcessor::new(fft_size),
        }
    }

    pub fn fft_size(&self) -> usize {
        self.vocoder.fft_size()
    }
}

impl Default for VocoderResampler {
    fn default() -> Self {
        Self::new(FftSize::default())
    }
}

impl Resampler for VocoderResampler {
    fn resample(&self, sound: &Sound, duration_secs: f64, pitch_ratio: f64) -> Result<Sound> {
        let target = target_length(sound, duration_secs, pitch_ratio)?;
        let input: Vec<f64> = sound.samples().iter().map(|&s| s as f64).collect();

        let pitched = varispeed(&input, pitch_ratio);
        let output = if pitched.len() < self.vocoder.fft_size() {
            tracing::trace!(
                "{} samples is under one frame, resizing without the vocoder",
                pitched.len()
            );
            resize(&input, target)
        } else {
            self.vocoder.stretch(&pitched, target)
        };
        Ok(to_sound(sound, &output))
    }
}

/// Plain interpolation to the target length (pitch follows the speed change).
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolatingResampler;

impl Resampler for InterpolatingResampler {
    fn resample(&self, sound: &Sound, duration_secs: f64, pitch_ratio: f64) -> Result<Sound> {
        let target = target_length(sound, duration_secs, pitch_ratio)?;
        let input: Vec<f64> = sound.samples().iter().map(|&s| s as f64).collect();
        Ok(to_sound(sound, &resize(&input, target)))
    }
}
