//! Frequency-domain frames and the FFT plans that produce them.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// One frequency-domain frame.
///
/// Holds the full complex FFT of a (zero-padded) window, so bin `i`
/// corresponds to `i * sample_rate / len()` Hz and bins above `len() / 2`
/// mirror the lower half.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    bins: Vec<Complex<f64>>,
    sample_rate: u32,
    bytes_per_sample: u8,
}

impl Spectrum {
    pub fn new(bins: Vec<Complex<f64>>, sample_rate: u32, bytes_per_sample: u8) -> Self {
        Self {
            bins,
            sample_rate,
            bytes_per_sample,
        }
    }

    /// Build a spectrum from magnitudes only (zero phase).
    pub fn from_magnitudes(magnitudes: &[f64], sample_rate: u32, bytes_per_sample: u8) -> Self {
        let bins = magnitudes.iter().map(|&m| Complex::new(m, 0.0)).collect();
        Self::new(bins, sample_rate, bytes_per_sample)
    }

    pub fn bins(&self) -> &[Complex<f64>] {
        &self.bins
    }

    pub fn bins_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.bins
    }

    pub fn into_bins(self) -> Vec<Complex<f64>> {
        self.bins
    }

    /// Number of bins, equal to the analysis window length.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bytes_per_sample(&self) -> u8 {
        self.bytes_per_sample
    }

    /// Magnitude of bin `index` (0.0 past the end).
    #[inline]
    pub fn magnitude(&self, index: usize) -> f64 {
        self.bins.get(index).map_or(0.0, |c| c.norm())
    }

    /// Mean magnitude over all bins.
    pub fn mean_magnitude(&self) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        self.bins.iter().map(|c| c.norm()).sum::<f64>() / self.bins.len() as f64
    }

    /// Index of the Nyquist bin.
    pub fn nyquist_index(&self) -> usize {
        self.bins.len() / 2
    }

    /// Center frequency of bin `index` in Hz.
    pub fn bin_frequency(&self, index: usize) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        index as f64 * self.sample_rate as f64 / self.bins.len() as f64
    }
}

/// Forward and inverse FFT plans for one window length.
pub(crate) struct FftPlans {
    len: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl FftPlans {
    pub(crate) fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Forward transform of `window`, zero-padded to the plan length.
    pub(crate) fn forward(&self, window: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> = window
            .iter()
            .take(self.len)
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        buffer.resize(self.len, Complex::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        buffer
    }

    /// Normalized inverse transform, returning the real part.
    ///
    /// Spectra of another length are truncated or zero-padded to the plan length.
    pub(crate) fn inverse(&self, bins: &[Complex<f64>]) -> Vec<f64> {
        let mut buffer: Vec<Complex<f64>> = bins.iter().take(self.len).copied().collect();
        buffer.resize(self.len, Complex::new(0.0, 0.0));
        self.inverse.process(&mut buffer);
        let scale = 1.0 / self.len as f64;
        buffer.iter().map(|c| c.re * scale).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_frequency() {
        let spectrum = Spectrum::from_magnitudes(&[0.0; 1024], 44100, 2);
        assert_eq!(spectrum.len(), 1024);
        assert_eq!(spectrum.nyquist_index(), 512);
        assert!((spectrum.bin_frequency(512) - 22050.0).abs() < 1e-9);
        assert!((spectrum.bin_frequency(1) - 43.06640625).abs() < 1e-9);
    }

    #[test]
    fn test_mean_magnitude() {
        let spectrum = Spectrum::new(
            vec![Complex::new(3.0, 4.0), Complex::new(0.0, 1.0)],
            8000,
            1,
        );
        assert!((spectrum.mean_magnitude() - 3.0).abs() < 1e-12);
        assert_eq!(spectrum.magnitude(5), 0.0);
    }

    #[test]
    fn test_forward_inverse_identity() {
        let plans = FftPlans::new(8);
        let window = [1.0, -2.0, 3.0, 0.5, 0.0, 7.0, -1.0, 2.0];
        let spectrum = plans.forward(&window);
        let restored = plans.inverse(&spectrum);
        for (a, b) in window.iter().zip(restored.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forward_zero_pads() {
        let plans = FftPlans::new(4);
        let spectrum = plans.forward(&[1.0]);
        assert_eq!(spectrum.len(), 4);
        // An impulse has a flat spectrum
        for bin in &spectrum {
            assert!((bin.norm() - 1.0).abs() < 1e-12);
        }
    }
}
