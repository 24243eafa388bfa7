//! Spectral frame engine
//!
//! Slides a window across a [`Sound`], transforms each window into a
//! [`Spectrum`] and hands it to a [`FrameStrategy`]. Strategies either
//! accumulate per-frame results (pitch tracking, magnitude profiles) or
//! return modified spectra that the engine transforms back into audio.
//!
//! ## Frame loop
//!
//! 1. `init_sound` creates the accumulator for this run
//! 2. The window length is the next power of two at or above
//!    `window_length(sample_rate)`
//! 3. The offset advances in hops of `low_threshold`, which is also the
//!    magnitude gate: a frame is "sound" when `Σ|sample| >= low_threshold`
//! 4. Each window is zero-padded at the tail, transformed and passed to
//!    `transform_frame`
//! 5. Resynthesizing strategies get the inverse transform of their returned
//!    spectrum written back at the frame offset

use crate::spectrum::{FftPlans, Spectrum};
use reshape_core::{Error, Result, Sound};

/// Position and gating information for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// First sample of the window in the source sound
    pub offset: usize,
    /// Analysis window length (power of two)
    pub padded_length: usize,
    /// Samples actually read from the sound (the rest is zero padding)
    pub frame_length: usize,
    /// Whether the window magnitude reached the low threshold
    pub sound_detected: bool,
    /// Zero-based frame number
    pub index: usize,
    /// Total number of frames in this run
    pub count: usize,
}

/// Per-frame capability plugged into [`FrameEngine`].
///
/// The strategy itself is read-only during a run; everything it collects
/// lives in its [`Accumulator`](FrameStrategy::Accumulator), which the
/// engine creates through `init_sound` and returns when the run finishes.
pub trait FrameStrategy {
    type Accumulator;

    /// Whether the engine should inverse-transform each returned spectrum
    /// into an output sound.
    const RESYNTHESIZES: bool = false;

    /// Create the accumulator for a run over `sound`.
    fn init_sound(&self, sound: &Sound) -> Result<Self::Accumulator>;

    /// Minimum analysis window length. The engine rounds it up to a power of two.
    fn window_length(&self, freq_limit: f64) -> usize {
        freq_limit.max(1.0).ceil() as usize
    }

    /// Frame hop and magnitude gate.
    fn low_threshold(&self, default_value: f64) -> f64 {
        default_value
    }

    fn transform_frame(
        &self,
        accumulator: &mut Self::Accumulator,
        spectrum: Spectrum,
        frame: FrameInfo,
    ) -> Spectrum;
}

/// Result of a frame engine run.
#[derive(Debug)]
pub struct FrameOutput<A> {
    pub accumulator: A,
    /// Resynthesized sound, for strategies with `RESYNTHESIZES = true`
    pub sound: Option<Sound>,
}

/// Drives a [`FrameStrategy`] over a sound.
#[derive(Debug, Clone, Copy)]
pub struct FrameEngine {
    default_threshold: f64,
}

impl Default for FrameEngine {
    fn default() -> Self {
        Self {
            default_threshold: reshape_core::DEFAULT_HOP as f64,
        }
    }
}

impl FrameEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default passed to [`FrameStrategy::low_threshold`].
    pub fn with_default_threshold(default_threshold: f64) -> Self {
        Self { default_threshold }
    }

    /// Run `strategy` over every frame of `sound`.
    ///
    /// # Errors
    /// `EmptyOrInvalidSound` when the strategy asks for a zero window or a
    /// non-positive hop, or when `init_sound` rejects the input.
    pub fn run<S: FrameStrategy>(
        &self,
        sound: &Sound,
        strategy: &S,
    ) -> Result<FrameOutput<S::Accumulator>> {
        let mut accumulator = strategy.init_sound(sound)?;

        let threshold = strategy.low_threshold(self.default_threshold);
        if !threshold.is_finite() || threshold < 1.0 {
            return Err(Error::EmptyOrInvalidSound(format!(
                "frame hop must be at least one sample, got {}",
                threshold
            )));
        }
        let hop = threshold as usize;

        let window_length = padded_window_length(strategy.window_length(sound.sample_rate() as f64))?;
        let plans = FftPlans::new(window_length);

        let samples = sound.samples();
        let count = samples.len().div_ceil(hop);
        let mut output = if S::RESYNTHESIZES {
            Some(vec![0i32; samples.len()])
        } else {
            None
        };

        let mut window = Vec::with_capacity(window_length);
        for index in 0..count {
            let offset = index * hop;
            let end = (offset + window_length).min(samples.len());

            window.clear();
            window.extend(samples[offset..end].iter().map(|&s| s as f64));
            let magnitude_sum: f64 = window.iter().map(|s| s.abs()).sum();

            let frame = FrameInfo {
                offset,
                padded_length: window_length,
                frame_length: end - offset,
                sound_detected: magnitude_sum >= threshold,
                index,
                count,
            };

            let spectrum = Spectrum::new(
                plans.forward(&window),
                sound.sample_rate(),
                sound.bytes_per_sample(),
            );
            let result = strategy.transform_frame(&mut accumulator, spectrum, frame);

            if let Some(out) = output.as_mut() {
                let restored = plans.inverse(result.bins());
                for (slot, value) in out[offset..end].iter_mut().zip(restored) {
                    *slot = sound.clamp_sample(value);
                }
            }
        }

        Ok(FrameOutput {
            accumulator,
            sound: output.map(|samples| sound.with_samples(samples)),
        })
    }
}

/// Next power of two at or above `limit`.
///
/// # Errors
/// `EmptyOrInvalidSound` for a zero limit (the logarithm would be undefined).
pub fn padded_window_length(limit: usize) -> Result<usize> {
    if limit == 0 {
        return Err(Error::EmptyOrInvalidSound(
            "window length limit must be positive".into(),
        ));
    }
    limit.checked_next_power_of_two().ok_or_else(|| {
        Error::EmptyOrInvalidSound(format!("window length {} is too large", limit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records the frame info of every frame.
    struct Recorder {
        hop: f64,
        window: usize,
    }

    impl FrameStrategy for Recorder {
        type Accumulator = Vec<FrameInfo>;

        fn init_sound(&self, _sound: &Sound) -> Result<Self::Accumulator> {
            Ok(Vec::new())
        }

        fn window_length(&self, _freq_limit: f64) -> usize {
            self.window
        }

        fn low_threshold(&self, _default_value: f64) -> f64 {
            self.hop
        }

        fn transform_frame(
            &self,
            accumulator: &mut Self::Accumulator,
            spectrum: Spectrum,
            frame: FrameInfo,
        ) -> Spectrum {
            accumulator.push(frame);
            spectrum
        }
    }

    /// Returns every spectrum unchanged and asks for resynthesis.
    struct Identity;

    impl FrameStrategy for Identity {
        type Accumulator = usize;
        const RESYNTHESIZES: bool = true;

        fn init_sound(&self, _sound: &Sound) -> Result<Self::Accumulator> {
            Ok(0)
        }

        fn window_length(&self, _freq_limit: f64) -> usize {
            64
        }

        fn low_threshold(&self, _default_value: f64) -> f64 {
            50.0
        }

        fn transform_frame(
            &self,
            accumulator: &mut Self::Accumulator,
            spectrum: Spectrum,
            _frame: FrameInfo,
        ) -> Spectrum {
            *accumulator += 1;
            spectrum
        }
    }

    #[test]
    fn test_padded_window_length() {
        assert_eq!(padded_window_length(1).unwrap(), 1);
        assert_eq!(padded_window_length(100).unwrap(), 128);
        assert_eq!(padded_window_length(44100).unwrap(), 65536);
        assert_eq!(padded_window_length(4096).unwrap(), 4096);
        assert!(matches!(
            padded_window_length(0),
            Err(Error::EmptyOrInvalidSound(_))
        ));
    }

    #[test]
    fn test_frames_cover_sound_with_padding() {
        let sound = Sound::new(vec![1000; 250], 2, 8000, 0).unwrap();
        let output = FrameEngine::new()
            .run(&sound, &Recorder { hop: 100.0, window: 100 })
            .unwrap();
        let frames = output.accumulator;

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].offset, 0);
        assert_eq!(frames[2].offset, 200);
        assert_eq!(frames[0].padded_length, 128);
        assert_eq!(frames[0].frame_length, 128);
        assert_eq!(frames[2].frame_length, 50);
        assert!(frames.iter().all(|f| f.sound_detected && f.count == 3));
        assert!(output.sound.is_none());
    }

    #[test]
    fn test_silent_frames_still_advance() {
        let mut samples = vec![0; 300];
        samples[250] = 500;
        let sound = Sound::new(samples, 2, 8000, 0).unwrap();
        let frames = FrameEngine::new()
            .run(&sound, &Recorder { hop: 100.0, window: 64 })
            .unwrap()
            .accumulator;

        assert_eq!(frames.len(), 3);
        assert!(!frames[0].sound_detected);
        assert!(!frames[1].sound_detected);
        assert!(frames[2].sound_detected);
    }

    #[test]
    fn test_empty_sound_yields_no_frames() {
        let sound = Sound::new(Vec::new(), 2, 8000, 0).unwrap();
        let frames = FrameEngine::new()
            .run(&sound, &Recorder { hop: 10.0, window: 16 })
            .unwrap()
            .accumulator;
        assert!(frames.is_empty());
    }

    #[test]
    fn test_invalid_hop_and_window() {
        let sound = Sound::new(vec![1; 10], 2, 8000, 0).unwrap();
        assert!(FrameEngine::new()
            .run(&sound, &Recorder { hop: 0.0, window: 16 })
            .is_err());
        assert!(FrameEngine::new()
            .run(&sound, &Recorder { hop: 5.0, window: 0 })
            .is_err());
    }

    #[test]
    fn test_identity_resynthesis_restores_samples() {
        let samples: Vec<i32> = (0..500).map(|i| ((i * 37) % 2000) - 1000).collect();
        let sound = Sound::new(samples.clone(), 2, 8000, 1).unwrap();
        let output = FrameEngine::new().run(&sound, &Identity).unwrap();

        assert_eq!(output.accumulator, 10);
        let restored = output.sound.unwrap();
        assert_eq!(restored.channel(), 1);
        assert_eq!(restored.samples(), samples.as_slice());
    }
}
