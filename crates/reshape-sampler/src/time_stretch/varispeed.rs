//! Varispeed: change speed and pitch together by reading at a fractional rate.

/// Read `input` at `speed` samples per output sample with linear interpolation.
///
/// 1.0 = unchanged, 2.0 = twice as fast (an octave up, half the length),
/// 0.5 = half speed. The output has `floor(len / speed)` samples.
pub fn varispeed(input: &[f64], speed: f64) -> Vec<f64> {
    if input.is_empty() || !(speed.is_finite() && speed > 0.0) {
        return Vec::new();
    }
    let len = (input.len() as f64 / speed).floor() as usize;
    (0..len).map(|i| sample_at(input, i as f64 * speed)).collect()
}

/// Stretch or squeeze `input` to exactly `target_len` samples.
///
/// The first and last input samples map onto the first and last output samples.
pub fn resize(input: &[f64], target_len: usize) -> Vec<f64> {
    match (input.len(), target_len) {
        (_, 0) => Vec::new(),
        (0, n) => vec![0.0; n],
        (_, 1) => vec![input[0]],
        (len, n) => {
            let step = (len - 1) as f64 / (n - 1) as f64;
            (0..n).map(|i| sample_at(input, i as f64 * step)).collect()
        }
    }
}

/// Linear interpolation at a fractional position (clamped to the last sample).
#[inline]
fn sample_at(input: &[f64], position: f64) -> f64 {
    let index = position.floor() as usize;
    let Some(&current) = input.get(index) else {
        return input.last().copied().unwrap_or(0.0);
    };
    let next = input.get(index + 1).copied().unwrap_or(current);
    let frac = position - index as f64;
    current + (next - current) * frac
}
