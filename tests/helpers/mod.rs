//! Test helpers and fixtures for reshape integration tests
//!
//! Signals are generated as integer PCM [`Sound`]s at [`TEST_SAMPLE_RATE`]
//! with 16-bit samples, so every test runs without audio files.

#![allow(dead_code)]

pub mod tolerances;

use reshape::prelude::*;

/// Low sample rate keeps the one-second analysis windows small
pub const TEST_SAMPLE_RATE: u32 = 8000;

pub const TEST_BYTES_PER_SAMPLE: u8 = 2;

/// Route `tracing` output to the test harness (`RUST_LOG=reshape_analysis=debug`).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sine wave at `frequency` for `num_samples` samples on `channel`.
pub fn generate_sine(frequency: f64, amplitude: f64, num_samples: usize, channel: usize) -> Sound {
    let samples = (0..num_samples)
        .map(|i| {
            let t = i as f64 / TEST_SAMPLE_RATE as f64;
            (amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()).round() as i32
        })
        .collect();
    Sound::new(samples, TEST_BYTES_PER_SAMPLE, TEST_SAMPLE_RATE, channel)
        .expect("valid test sound")
}

/// Alternating-sign samples following a linear attack then a linear decay.
pub fn generate_swell(num_samples: usize, peak_at: usize, amplitude: f64) -> Sound {
    let samples = (0..num_samples)
        .map(|i| {
            let level = if i < peak_at {
                i as f64 / peak_at as f64
            } else {
                (num_samples - i) as f64 / (num_samples - peak_at) as f64
            };
            let value = (level * amplitude) as i32;
            if i % 2 == 0 {
                value
            } else {
                -value
            }
        })
        .collect();
    Sound::new(samples, TEST_BYTES_PER_SAMPLE, TEST_SAMPLE_RATE, 0).expect("valid test sound")
}

/// Constant-valued recording, handy for checking where notes land in the output.
pub fn generate_constant(value: i32, num_samples: usize) -> Sound {
    Sound::new(
        vec![value; num_samples],
        TEST_BYTES_PER_SAMPLE,
        TEST_SAMPLE_RATE,
        0,
    )
    .expect("valid test sound")
}

/// Reproducible noise in `-amplitude..amplitude`.
pub fn generate_noise(num_samples: usize, amplitude: i32, seed: u64) -> Sound {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    let samples = (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            let unit = (rng >> 33) as f64 / (1u64 << 31) as f64;
            ((unit * 2.0 - 1.0) * amplitude as f64) as i32
        })
        .collect();
    Sound::new(samples, TEST_BYTES_PER_SAMPLE, TEST_SAMPLE_RATE, 0).expect("valid test sound")
}

/// Single-note instrument pack built from known details.
#[cfg(feature = "sampler")]
pub fn single_note_pack(instrument: &str, recording: Sound, details: NoteDetails) -> Pack {
    let note = Note::from_details(&[recording], &details).expect("valid note details");
    let mut pack = Pack::new();
    pack.insert(instrument, [note].into_iter().collect::<Instrument>());
    pack
}

/// Check the ordering every segmented envelope must satisfy.
pub fn assert_envelope_ordered(boundaries: &EnvelopeBoundaries, len: usize) {
    assert!(
        boundaries.attack() <= boundaries.decay()
            && boundaries.decay() <= boundaries.sustain()
            && boundaries.sustain() <= boundaries.release()
            && boundaries.release() <= len,
        "unordered envelope {:?} for {} samples",
        boundaries,
        len
    );
}
