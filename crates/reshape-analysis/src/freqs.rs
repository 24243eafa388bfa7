//! Pitch-track editing
//!
//! Value-level operations on pitch tracks (`&[f32]` in Hz, `0.0` = silence).
//! Every operation returns a new track.

use reshape_core::{Error, Result};

/// Pitch classes of the natural notes (C D E F G A B).
const WHITE_KEYS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Ratio applied to values that fit no octave of the target range.
const FIFTH: f32 = 1.5;

/// Longest track an edit may produce (about a week of audio at a 100-sample hop).
pub const MAX_TRACK_LEN: usize = 1 << 28;

/// One octave up.
pub fn octave_up(track: &[f32]) -> Vec<f32> {
    track.iter().map(|f| f * 2.0).collect()
}

/// One octave down.
pub fn octave_down(track: &[f32]) -> Vec<f32> {
    track.iter().map(|f| f / 2.0).collect()
}

/// Equal-tempered frequency of a note number (69 = A4 = 440 Hz).
fn note_to_freq(note: i32) -> f64 {
    440.0 * 2.0f64.powf((note - 69) as f64 / 12.0)
}

fn is_white_key(note: i32) -> bool {
    WHITE_KEYS.contains(&note.rem_euclid(12))
}

/// Nearest natural note (A4 = 440 Hz), or `freq` itself when it is not positive.
pub fn nearest_natural_note(freq: f32) -> f32 {
    if freq <= 0.0 || !freq.is_finite() {
        return freq;
    }
    let semitones = 69.0 + 12.0 * (freq as f64 / 440.0).log2();
    let base = semitones.floor() as i32;

    let nearest = (base - 1..=base + 2)
        .filter(|&n| is_white_key(n))
        .min_by(|&a, &b| {
            let da = (a as f64 - semitones).abs();
            let db = (b as f64 - semitones).abs();
            da.total_cmp(&db)
        })
        .unwrap_or(base);
    note_to_freq(nearest) as f32
}

/// Snap every voiced value to the nearest natural note.
pub fn adjust(track: &[f32]) -> Vec<f32> {
    track.iter().map(|&f| nearest_natural_note(f)).collect()
}

/// Time-scale the track by `factor` (> 1 shortens it).
///
/// # Errors
/// `InvalidRange` when `factor` is not a positive finite number, or is so
/// small that the result would exceed [`MAX_TRACK_LEN`] (`low` is then the
/// smallest accepted factor).
pub fn compress(track: &[f32], factor: f32) -> Result<Vec<f32>> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(Error::InvalidRange {
            low: 0.0,
            high: factor,
        });
    }
    let factor = factor as f64;
    let len = (track.len() as f64 / factor).floor();
    if len > MAX_TRACK_LEN as f64 {
        return Err(Error::InvalidRange {
            low: (track.len() as f64 / MAX_TRACK_LEN as f64) as f32,
            high: factor as f32,
        });
    }
    let len = len as usize;
    Ok((0..len)
        .filter_map(|i| track.get((i as f64 * factor).floor() as usize).copied())
        .collect())
}

/// Silence every value inside `[low, high]`.
///
/// # Errors
/// `InvalidRange` when `low >= high`.
pub fn filter_range(track: &[f32], low: f32, high: f32) -> Result<Vec<f32>> {
    check_range(low, high)?;
    Ok(track
        .iter()
        .map(|&f| if (low..=high).contains(&f) { 0.0 } else { f })
        .collect())
}

/// Insert `sub` before index `start` (clamped to the track length).
pub fn insert_part(track: &[f32], sub: &[f32], start: usize) -> Vec<f32> {
    let start = start.min(track.len());
    let mut out = Vec::with_capacity(track.len() + sub.len());
    out.extend_from_slice(&track[..start]);
    out.extend_from_slice(sub);
    out.extend_from_slice(&track[start..]);
    out
}

/// Overwrite the track with `sub` from index `start`, growing it when needed.
///
/// A gap between the end of the track and `start` is filled with silence.
///
/// # Errors
/// `InvalidRange` when the result would exceed [`MAX_TRACK_LEN`].
pub fn replace_part(track: &[f32], sub: &[f32], start: usize) -> Result<Vec<f32>> {
    let end = match start.checked_add(sub.len()) {
        Some(end) if end <= MAX_TRACK_LEN => end,
        _ => {
            return Err(Error::InvalidRange {
                low: start as f32,
                high: MAX_TRACK_LEN as f32,
            })
        }
    };
    let mut out = track.to_vec();
    if out.len() < end {
        out.resize(end, 0.0);
    }
    out[start..end].copy_from_slice(sub);
    Ok(out)
}

/// Fold every value into `[low, high]` by octaves.
///
/// Values whose octaves straddle the range (below `low` with the next octave
/// above `high`) are raised by fifths until they reach `low`. Silence is kept.
///
/// # Errors
/// `InvalidRange` when `low >= high`.
pub fn surround_in_range(track: &[f32], low: f32, high: f32) -> Result<Vec<f32>> {
    check_range(low, high)?;
    Ok(track
        .iter()
        .map(|&f| surround_value(f, low, high))
        .collect())
}

fn surround_value(value: f32, low: f32, high: f32) -> f32 {
    if value <= 0.0 || !value.is_finite() {
        return value;
    }
    let mut result = value;
    while result < low {
        result *= 2.0;
    }
    while result > high {
        result /= 2.0;
    }
    while result < low && result * 2.0 > high {
        result *= FIFTH;
    }
    result
}

fn check_range(low: f32, high: f32) -> Result<()> {
    // Also rejects NaN bounds
    if !(low < high) {
        return Err(Error::InvalidRange { low, high });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const TRACK: [f32; 7] = [225.32, 799.2, 146.11, 332.74, 55.0, 139.0, 1010.0];

    fn assert_track_eq(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_relative_eq!(*a, *e, epsilon = 1e-2);
        }
    }

    #[test]
    fn test_octaves() {
        assert_eq!(octave_up(&[100.0, 0.0]), vec![200.0, 0.0]);
        assert_eq!(octave_down(&[100.0, 0.0]), vec![50.0, 0.0]);
    }

    #[test]
    fn test_adjust_to_natural_notes() {
        assert_track_eq(
            &adjust(&TRACK),
            &[220.0, 783.991, 146.832, 329.628, 55.0, 146.832, 987.767],
        );
        assert_eq!(adjust(&[0.0, -1.0]), vec![0.0, -1.0]);
    }

    #[test]
    fn test_surround_in_range() {
        let out = surround_in_range(&TRACK, 130.81, 246.94).unwrap();
        assert_track_eq(
            &out,
            &[225.32, 199.8, 146.11, 166.37, 220.0, 139.0, 189.375],
        );
        assert!(out.iter().all(|&f| (130.81..=246.94).contains(&f)));
        assert_eq!(surround_in_range(&[0.0], 100.0, 200.0).unwrap(), vec![0.0]);
    }

    #[test]
    fn test_invalid_ranges() {
        assert_eq!(
            surround_in_range(&TRACK, 200.0, 100.0),
            Err(Error::InvalidRange {
                low: 200.0,
                high: 100.0
            })
        );
        assert!(filter_range(&TRACK, 5.0, 5.0).is_err());
        assert!(compress(&TRACK, 0.0).is_err());
        assert!(compress(&TRACK, -2.0).is_err());
    }

    #[test]
    fn test_compress() {
        let track = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(compress(&track, 2.0).unwrap(), vec![1.0, 3.0, 5.0]);
        assert_eq!(
            compress(&track[..3], 0.5).unwrap(),
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]
        );
        assert_eq!(compress(&track, 1.0).unwrap(), track.to_vec());
    }

    #[test]
    fn test_compress_rejects_runaway_stretch() {
        let track = [1.0, 2.0, 3.0];
        assert!(matches!(
            compress(&track, 1e-30),
            Err(Error::InvalidRange { high, .. }) if high == 1e-30
        ));
        let smallest = track.len() as f32 / MAX_TRACK_LEN as f32;
        assert!(matches!(
            compress(&track, smallest / 4.0),
            Err(Error::InvalidRange { low, .. }) if low == smallest
        ));
    }

    #[test]
    fn test_filter_range() {
        let out = filter_range(&TRACK, 140.0, 400.0).unwrap();
        assert_eq!(out, vec![0.0, 799.2, 0.0, 0.0, 55.0, 139.0, 1010.0]);
    }

    #[test]
    fn test_insert_and_replace_parts() {
        let track = [1.0, 2.0, 3.0];
        assert_eq!(insert_part(&track, &[9.0, 9.0], 1), vec![1.0, 9.0, 9.0, 2.0, 3.0]);
        assert_eq!(insert_part(&track, &[9.0], 10), vec![1.0, 2.0, 3.0, 9.0]);

        assert_eq!(replace_part(&track, &[9.0], 1).unwrap(), vec![1.0, 9.0, 3.0]);
        assert_eq!(
            replace_part(&track, &[9.0, 8.0], 2).unwrap(),
            vec![1.0, 2.0, 9.0, 8.0]
        );
        assert_eq!(
            replace_part(&track, &[9.0], 5).unwrap(),
            vec![1.0, 2.0, 3.0, 0.0, 0.0, 9.0]
        );
    }

    #[test]
    fn test_replace_part_far_past_the_end() {
        let track = [1.0, 2.0, 3.0];
        assert!(matches!(
            replace_part(&track, &[9.0, 8.0], usize::MAX),
            Err(Error::InvalidRange { .. })
        ));
        assert!(replace_part(&track, &[9.0], MAX_TRACK_LEN).is_err());
    }

    proptest! {
        #[test]
        fn octave_down_then_up_is_identity(
            track in prop::collection::vec(1e-3f32..1e6, 0..64),
            times in 1usize..8,
        ) {
            let mut shifted = track.clone();
            for _ in 0..times {
                shifted = octave_down(&shifted);
            }
            for _ in 0..times {
                shifted = octave_up(&shifted);
            }
            prop_assert_eq!(shifted, track);
        }
    }
}
