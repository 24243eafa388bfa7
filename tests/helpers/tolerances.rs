//! Tolerance constants for analysis and resynthesis tests.

/// HPS estimates on an 8192-sample window at 8 kHz (bin width ~0.98 Hz,
/// plus the interpolation of the harmonic product).
pub const PITCH_TOLERANCE_HZ: f32 = 3.0;

/// Relative tolerance for pitch-track editing (f32 arithmetic on Hz values).
pub const FREQ_RELATIVE_EPSILON: f32 = 1e-4;
