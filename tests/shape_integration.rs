//! Resynthesis integration tests (requires "sampler" feature)
//!
//! Tests pack loading, note building and rendering pitch tracks with
//! instrument notes, end to end.
//!
//! Run with:
//! ```bash
//! cargo test -p reshape --test shape_integration --features "sampler"
//! ```

#![cfg(feature = "sampler")]

#[path = "helpers/mod.rs"]
mod helpers;

use std::collections::HashMap;

use helpers::tolerances::PITCH_TOLERANCE_HZ;
use helpers::{
    assert_envelope_ordered, generate_constant, generate_sine, generate_swell,
    single_note_pack, TEST_SAMPLE_RATE,
};
use reshape::prelude::*;
use reshape::sampler::{Error as SamplerError, FftSize};
use reshape::{InstrumentSource, InterpolatingResampler, NoteSource, VocoderResampler};

const SCENARIO: [f32; 9] = [0.0, 0.0, 200.0, 200.0, 200.0, 200.0, 200.0, 0.0, 0.0];

fn organ_details() -> NoteDetails {
    NoteDetails {
        frequency: 200.0,
        attack: 0,
        decay: 100,
        sustain: 200,
        release: 300,
    }
}

fn organ_reshaper() -> Reshaper {
    Reshaper::builder()
        .hop(100)
        .pack(single_note_pack(
            "organ",
            generate_constant(1000, 400),
            organ_details(),
        ))
        .resampler(InterpolatingResampler)
        .build()
        .unwrap()
}

// =============================================================================
// End-to-end Shape Tests
// =============================================================================

#[test]
fn test_scenario_silence_note_silence() {
    let reshaper = organ_reshaper();
    let track = PitchTrack::new(SCENARIO.to_vec(), 100);
    let channels = reshaper
        .shape(&track, "organ", OutputFormat::new(1, 2, TEST_SAMPLE_RATE))
        .unwrap();

    assert_eq!(channels.len(), 1);
    let samples = channels[0].samples();
    assert_eq!(samples.len(), 900);
    assert!(samples[..100].iter().all(|&s| s == 0));
    assert!(samples[100..500].iter().all(|&s| s == 1000));
    assert!(samples[500..].iter().all(|&s| s == 0));
}

#[test]
fn test_output_follows_format() {
    let reshaper = organ_reshaper();
    let track = PitchTrack::new(SCENARIO.to_vec(), 100);
    let format = OutputFormat::new(2, 2, TEST_SAMPLE_RATE);
    let channels = reshaper.shape(&track, "organ", format).unwrap();

    assert_eq!(channels.len(), 2);
    for (index, channel) in channels.iter().enumerate() {
        assert_eq!(channel.channel(), index);
        assert_eq!(channel.sample_rate(), TEST_SAMPLE_RATE);
        assert_eq!(channel.bytes_per_sample(), 2);
        assert_eq!(channel.len(), track.sample_span());
    }
}

#[test]
fn test_vocoder_output_length() {
    helpers::init_tracing();
    let reshaper = Reshaper::builder()
        .hop(100)
        .fft_size(FftSize::Tiny)
        .pack(single_note_pack(
            "flute",
            generate_sine(200.0, 8000.0, 4000, 0),
            NoteDetails {
                frequency: 200.0,
                attack: 0,
                decay: 800,
                sustain: 3000,
                release: 3600,
            },
        ))
        .build()
        .unwrap();

    let mut frequencies = vec![0.0; 2];
    frequencies.extend([300.0; 30]);
    frequencies.extend([0.0; 8]);
    let track = PitchTrack::new(frequencies, 100);
    let channels = reshaper
        .shape(&track, "flute", OutputFormat::new(1, 2, TEST_SAMPLE_RATE))
        .unwrap();

    assert_eq!(channels[0].len(), 4000);
    assert!(channels[0].samples()[100..3000].iter().any(|&s| s != 0));
}

#[test]
fn test_shape_errors() {
    let track = PitchTrack::new(SCENARIO.to_vec(), 100);
    let format = OutputFormat::new(1, 2, TEST_SAMPLE_RATE);

    let without_pack = Reshaper::builder().build().unwrap();
    assert_eq!(
        without_pack.shape(&track, "organ", format).err(),
        Some(reshape::Error::Sampler(SamplerError::NoPackProvided))
    );

    let reshaper = organ_reshaper();
    assert_eq!(
        reshaper.shape(&track, "tuba", format).err(),
        Some(reshape::Error::Sampler(SamplerError::UnknownInstrument(
            "tuba".into()
        )))
    );

    let free = reshape::sampler::shape(
        &SCENARIO,
        100,
        None,
        "organ",
        format,
        &VocoderResampler::default(),
    );
    assert_eq!(free.err(), Some(SamplerError::NoPackProvided));
}

#[test]
fn test_reshape_keeps_input_format() {
    let reshaper = Reshaper::builder()
        .hop(4096)
        .pack(single_note_pack(
            "organ",
            generate_constant(1000, 400),
            organ_details(),
        ))
        .resampler(InterpolatingResampler)
        .build()
        .unwrap();
    let hum = [
        generate_sine(250.0, 12000.0, 16384, 0),
        generate_sine(250.0, 12000.0, 16384, 1),
    ];
    let channels = reshaper.reshape(&hum, "organ").unwrap();

    assert_eq!(channels.len(), 2);
    for channel in &channels {
        assert_eq!(channel.len(), 16384);
        assert_eq!(channel.sample_rate(), TEST_SAMPLE_RATE);
    }
}

// =============================================================================
// Note and Pack Tests
// =============================================================================

#[test]
fn test_build_note_slices_phases() {
    let reshaper = Reshaper::builder().adsr_hop(100).build().unwrap();
    let recording = generate_swell(3000, 600, 9000.0);
    let note = reshaper.build_note(330.0, &[recording.clone()]).unwrap();

    assert_eq!(note.frequency(), 330.0);
    assert_envelope_ordered(note.boundaries(), recording.len());
    let phases = note.channel(0).unwrap();
    assert_eq!(phases.len(), recording.len());
}

#[test]
fn test_pack_loaded_from_manifest() {
    let mut samples = HashMap::new();
    samples.insert(
        "a3.raw".to_string(),
        vec![generate_sine(250.0, 12000.0, 8192, 0)],
    );
    samples.insert("pad.raw".to_string(), vec![generate_constant(800, 1000)]);

    let manifest = vec![
        InstrumentSource {
            name: "sine".into(),
            notes: vec![NoteSource {
                sample: "a3.raw".into(),
                details: None,
            }],
        },
        InstrumentSource {
            name: "pad".into(),
            notes: vec![NoteSource {
                sample: "pad.raw".into(),
                details: Some(NoteDetails {
                    frequency: 110.0,
                    attack: 0,
                    decay: 100,
                    sustain: 800,
                    release: 900,
                }),
            }],
        },
    ];
    let pack = Pack::load(&manifest, &samples, 100).unwrap();
    assert_eq!(pack.len(), 2);

    let detected = pack.require("sine").unwrap().notes()[0].frequency();
    assert!(
        (detected - 250.0).abs() < PITCH_TOLERANCE_HZ,
        "expected ~250 Hz, got {}",
        detected
    );

    let reshaper = Reshaper::builder()
        .pack(pack)
        .resampler(InterpolatingResampler)
        .build()
        .unwrap();
    let pad = reshaper.pack().unwrap().require("pad").unwrap();
    assert_eq!(pad.nearest_note(440.0).unwrap().frequency(), 110.0);
}
