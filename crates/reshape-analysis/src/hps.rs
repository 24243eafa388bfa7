//! Harmonic Product Spectrum (HPS) fundamental estimation
//!
//! For each harmonic factor `h` the magnitude spectrum is multiplied with its
//! copies downsampled by 2..=h. Harmonics of the fundamental line up on the
//! fundamental's bin, so the product peaks there. Running factors 1..=10
//! yields ten candidates; voiced frames cluster them around the fundamental
//! while noise scatters them, which [`best_candidate`] exploits.

use crate::spectrum::Spectrum;
use std::ops::RangeInclusive;

/// Harmonic factors tried for every frame.
pub const HARMONIC_FACTORS: RangeInclusive<usize> = 1..=10;

/// Candidates at or below this frequency are treated as noise.
pub const SUB_AUDIBLE_HZ: f32 = 30.0;

/// Maximum relative spread (percent) between candidates of one consensus run.
pub const CONSENSUS_SPREAD_PERCENT: f32 = 10.0;

/// One entry of a harmonic product array.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicProduct {
    /// Product of the contributing bin magnitudes
    pub value: f64,
    /// Number of bins multiplied into `value`
    pub terms: u32,
}

/// Harmonic product array for one factor.
///
/// Entry `i` multiplies `|bin[i * j]|` for `j` in `1..=factor`, skipping terms
/// at or past the Nyquist bin. The array has `spectrum.len() / factor` entries.
pub fn harmonic_product(spectrum: &Spectrum, factor: usize) -> Vec<HarmonicProduct> {
    let factor = factor.max(1);
    let len = spectrum.len() / factor;
    let nyquist = spectrum.nyquist_index().max(1);

    (0..len)
        .map(|i| {
            let mut value = 1.0;
            let mut terms = 0;
            for j in 1..=factor {
                let index = i * j;
                if index >= nyquist || index >= spectrum.len() {
                    break;
                }
                value *= spectrum.magnitude(index);
                terms += 1;
            }
            if terms == 0 {
                value = 0.0;
            }
            HarmonicProduct { value, terms }
        })
        .collect()
}

/// Noise floor for a sample depth: `256^bytes_per_sample`.
pub fn noise_floor(bytes_per_sample: u8) -> f64 {
    256f64.powi(bytes_per_sample as i32)
}

/// Index of the loudest harmonic product above the noise floor.
///
/// Index 0 (DC) is never returned; 0 means "nothing above the floor". A
/// product of `n` terms has to exceed `floor^n`, i.e. its geometric mean has
/// to clear the floor.
pub fn loudest_index(products: &[HarmonicProduct], bytes_per_sample: u8) -> usize {
    let floor = noise_floor(bytes_per_sample);
    let mut max = 0.0;
    let mut max_index = 0;

    for (i, product) in products.iter().enumerate().skip(1) {
        if product.terms == 0 {
            continue;
        }
        let gate = floor.powi(product.terms as i32);
        if product.value > max && product.value > gate {
            max = product.value;
            max_index = i;
        }
    }
    max_index
}

/// Fundamental candidate (Hz) for one harmonic factor.
pub fn f0_candidate(spectrum: &Spectrum, factor: usize) -> f32 {
    let products = harmonic_product(spectrum, factor);
    let index = loudest_index(&products, spectrum.bytes_per_sample());
    spectrum.bin_frequency(index) as f32
}

/// Estimate the fundamental frequency of one frame in Hz (0.0 when unvoiced).
pub fn estimate_f0(spectrum: &Spectrum) -> f32 {
    let mut candidates: Vec<f32> = HARMONIC_FACTORS
        .map(|factor| f0_candidate(spectrum, factor))
        .collect();
    candidates.sort_by(f32::total_cmp);
    best_candidate(&candidates)
}

/// Consensus of ascending-sorted candidates.
///
/// Skips the leading candidates at or below [`SUB_AUDIBLE_HZ`], then extends
/// a run from the first remaining candidate while each candidate stays within
/// [`CONSENSUS_SPREAD_PERCENT`] of it, and returns the run's mean.
pub fn best_candidate(sorted: &[f32]) -> f32 {
    let left = sorted
        .iter()
        .position(|&c| c > SUB_AUDIBLE_HZ)
        .unwrap_or(sorted.len());
    if left == sorted.len() {
        return 0.0;
    }

    let anchor = sorted[left];
    let run = sorted[left..]
        .iter()
        .take_while(|&&c| ((c - anchor) / c).abs() * 100.0 < CONSENSUS_SPREAD_PERCENT)
        .count();

    let run = &sorted[left..left + run.max(1)];
    run.iter().sum::<f32>() / run.len() as f32
}
