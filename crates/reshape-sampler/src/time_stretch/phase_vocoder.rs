//! Offline phase vocoder for time-stretching
//!
//! Stretches a whole buffer to an exact length without changing its pitch.
//!
//! ## Algorithm Overview
//!
//! 1. **Analysis**: Hann-windowed frames every `hop_analysis` input samples
//! 2. **Phase Unwrapping**: Instantaneous frequency from frame-to-frame phase differences
//! 3. **Phase Accumulation**: Advance each bin by its true frequency over the synthesis hop
//! 4. **Synthesis**: IFFT and overlap-add at `hop_analysis * stretch` output samples,
//!    normalized by the summed squared window
//!
//! The analysis hop shrinks for large stretch factors so the synthesis hop never
//! exceeds a quarter frame. Past a stretch of one quarter frame per input sample
//! no analysis hop fits, and the buffer is resized by interpolation instead.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

use super::types::FftSize;
use super::varispeed::resize;

/// Window-sum level under which an output sample is left unnormalized.
const WINDOW_SUM_EPSILON: f64 = 1e-6;

/// Phase vocoder with pre-planned transforms for one FFT size.
pub struct PhaseVocoderProcessor {
    preset: FftSize,
    fft_size: usize,
    window: Vec<f64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl PhaseVocoderProcessor {
    /// Create a new phase vocoder processor
    pub fn new(fft_size: FftSize) -> Self {
        let size = fft_size.size();
        let mut planner = FftPlanner::new();
        Self {
            preset: fft_size,
            fft_size: size,
            window: Self::create_hann_window(size),
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    /// Periodic Hann window
    fn create_hann_window(size: usize) -> Vec<f64> {
        (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
            .collect()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Analysis hop for a stretch factor.
    fn analysis_hop(&self, stretch_factor: f64) -> usize {
        let quarter = self.preset.hop_size();
        let hop = if stretch_factor > 1.0 {
            (quarter as f64 / stretch_factor).floor() as usize
        } else {
            quarter
        };
        hop.max(1)
    }

    /// Stretch `input` to exactly `target_len` samples.
    ///
    /// Stretches beyond [`FftSize::hop_size`] fall back to [`resize`].
    ///
    /// Frames are centered on their analysis positions, so the first and
    /// last input samples are covered by full windows.
    pub fn stretch(&self, input: &[f64], target_len: usize) -> Vec<f64> {
        if input.is_empty() || target_len == 0 {
            return vec![0.0; target_len];
        }

        let size = self.fft_size;
        let half = size / 2;
        let num_bins = size / 2 + 1;
        let stretch_factor = target_len as f64 / input.len() as f64;
        if stretch_factor > self.preset.hop_size() as f64 {
            return resize(input, target_len);
        }
        let hop_analysis = self.analysis_hop(stretch_factor);
        let hop_synthesis = hop_analysis as f64 * stretch_factor;

        let expected_phase_diff: Vec<f64> = (0..num_bins)
            .map(|k| 2.0 * PI * k as f64 * hop_analysis as f64 / size as f64)
            .collect();

        let mut output = vec![0.0; target_len];
        let mut window_sum = vec![0.0; target_len];
        let mut last_phase = vec![0.0; num_bins];
        let mut phase_accumulator = vec![0.0; num_bins];
        let mut buffer = vec![Complex::new(0.0, 0.0); size];

        let frame_count = input.len().div_ceil(hop_analysis) + 1;
        for frame in 0..frame_count {
            let synthesis_center = (frame as f64 * hop_synthesis).round() as usize;
            if synthesis_center >= target_len + half {
                break;
            }

            // 1. Windowed analysis frame centered on frame * hop_analysis
            let analysis_center = frame * hop_analysis;
            for (i, slot) in buffer.iter_mut().enumerate() {
                let sample = (analysis_center + i)
                    .checked_sub(half)
                    .and_then(|index| input.get(index))
                    .copied()
                    .unwrap_or(0.0);
                *slot = Complex::new(sample * self.window[i], 0.0);
            }
            self.forward.process(&mut buffer);

            // 2-3. Phase unwrapping and accumulation
            for k in 0..num_bins {
                let magnitude = buffer[k].norm();
                let phase = buffer[k].arg();

                if frame == 0 {
                    phase_accumulator[k] = phase;
                } else {
                    let expected = expected_phase_diff[k];
                    let deviation = Self::wrap_phase(phase - last_phase[k] - expected);
                    let true_freq = expected + deviation;
                    phase_accumulator[k] = Self::wrap_phase(
                        phase_accumulator[k] + true_freq * (hop_synthesis / hop_analysis as f64),
                    );
                }
                last_phase[k] = phase;
                buffer[k] = Complex::from_polar(magnitude, phase_accumulator[k]);
            }

            // Mirror for real-valued output (conjugate symmetry)
            for i in 1..num_bins - 1 {
                buffer[size - i] = buffer[i].conj();
            }

            // 4. Inverse FFT, synthesis window and overlap-add
            self.inverse.process(&mut buffer);
            let scale = 1.0 / size as f64;
            for (i, bin) in buffer.iter().enumerate() {
                let Some(index) = (synthesis_center + i).checked_sub(half) else {
                    continue;
                };
                if index >= target_len {
                    break;
                }
                let w = self.window[i];
                output[index] += bin.re * scale * w;
                window_sum[index] += w * w;
            }
        }

        for (sample, &sum) in output.iter_mut().zip(&window_sum) {
            if sum > WINDOW_SUM_EPSILON {
                *sample /= sum;
            }
        }
        output
    }

    /// Wrap phase to [-PI, PI]
    #[inline]
    fn wrap_phase(phase: f64) -> f64 {
        let mut p = phase;
        while p > PI {
            p -= 2.0 * PI;
        }
        while p < -PI {
            p += 2.0 * PI;
        }
        p
    }
}
