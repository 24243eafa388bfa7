//! Pitch-track resynthesis
//!
//! Turns a pitch track into audio played by an instrument of a [`Pack`].
//!
//! ## Segmentation
//!
//! Two frequencies differ when `|a - b| > a * 5%`. A note boundary is
//! declared at frame `i` when:
//! - frames `i-3..=i` are stable (three unchanged comparisons), and
//! - frame `i-4` differs from frame `i-3` (a real transition four frames ago), and
//! - the new frequency differs from the previous note (or no note was emitted yet).
//!
//! The segment closes at the lagged boundary `i-4`. The end of the track
//! closes the pending segment, split at the start of the trailing stable run
//! when that run begins after the segment start.
//!
//! ## Rendering
//!
//! Each segment picks the instrument note nearest to its frequency (or
//! silence for frequencies at or under the voicing floor, or too close to
//! the sample rate). The note's four phases share the segment duration in
//! proportion to their recorded lengths, are pitch-shifted by
//! `target / intrinsic` and time-scaled through a [`Resampler`], then written
//! one after the other from the segment start. Channels render in parallel.

use rayon::prelude::*;
use reshape_core::{max_amplitude, AnalysisConfig, Sound};

use crate::error::{Error, Result};
use crate::note::Note;
use crate::pack::{Instrument, Pack};
use crate::time_stretch::Resampler;

/// Relative difference above which two frequencies count as different.
const CHANGE_RATIO: f32 = 0.05;

/// Frames looked back before a note boundary is trusted.
const BOUNDARY_LAG: usize = 4;

/// Format of the rendered sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct OutputFormat {
    pub channels: usize,
    pub bytes_per_sample: u8,
    pub sample_rate: u32,
}

impl OutputFormat {
    pub fn new(channels: usize, bytes_per_sample: u8, sample_rate: u32) -> Self {
        Self {
            channels,
            bytes_per_sample,
            sample_rate,
        }
    }

    /// Format of `sound`, with `channels` channels.
    pub fn of(sound: &Sound, channels: usize) -> Self {
        Self::new(channels, sound.bytes_per_sample(), sound.sample_rate())
    }
}

/// One note (or rest) of a segmented pitch track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// First pitch-track frame
    pub start: usize,
    /// Closing pitch-track frame
    pub end: usize,
    /// Frequency at the closing frame
    pub frequency: f32,
    /// Rendered duration
    pub duration_secs: f64,
}

fn changed(a: f32, b: f32) -> bool {
    (a - b).abs() > a * CHANGE_RATIO
}

fn segment_duration(start: usize, end: usize, hop: usize, sample_rate: u32) -> f64 {
    let frames = if end < start + 1 {
        end
    } else {
        end - 1 - start
    };
    (frames * hop) as f64 / sample_rate as f64
}

/// Split a pitch track into note segments.
pub fn segment_track(track: &[f32], hop: usize, sample_rate: u32) -> Vec<Segment> {
    let mut segments = Vec::new();
    let Some(last) = track.len().checked_sub(1) else {
        return segments;
    };

    let emit = |start: usize, end: usize, segments: &mut Vec<Segment>| {
        segments.push(Segment {
            start,
            end,
            frequency: track[end],
            duration_secs: segment_duration(start, end, hop, sample_rate),
        });
    };

    let mut last_start = 0;
    let mut last_frequency = 0.0;
    let mut first_note = true;

    for i in BOUNDARY_LAG..track.len() {
        let stable = !changed(track[i - 1], track[i])
            && !changed(track[i - 2], track[i - 1])
            && !changed(track[i - 3], track[i - 2]);
        let transition = changed(track[i - 4], track[i - 3]);
        let new_note = stable && transition && (first_note || changed(track[i], last_frequency));

        if new_note {
            let end = i - BOUNDARY_LAG;
            emit(last_start, end, &mut segments);
            last_start = end;
            last_frequency = track[end];
            first_note = false;
        }
    }

    // Close the pending segment at the end of the track
    let run_start = (1..=last)
        .rev()
        .find(|&k| changed(track[k - 1], track[k]))
        .unwrap_or(0);
    if run_start > last_start + 1 {
        emit(last_start, run_start - 1, &mut segments);
        emit(run_start - 1, last, &mut segments);
    } else {
        emit(last_start, last, &mut segments);
    }

    segments
}

/// Renders pitch tracks with the notes of a pack.
pub struct NoteShaper<'a> {
    pack: &'a Pack,
    resampler: &'a dyn Resampler,
    min_voiced_hz: f32,
    nyquist_guard_hz: f32,
}

impl<'a> NoteShaper<'a> {
    pub fn new(pack: &'a Pack, resampler: &'a dyn Resampler) -> Self {
        let config = AnalysisConfig::default();
        Self {
            pack,
            resampler,
            min_voiced_hz: config.min_voiced_hz,
            nyquist_guard_hz: config.nyquist_guard_hz,
        }
    }

    /// Take the voicing guards from `config`.
    pub fn with_config(mut self, config: &AnalysisConfig) -> Self {
        self.min_voiced_hz = config.min_voiced_hz;
        self.nyquist_guard_hz = config.nyquist_guard_hz;
        self
    }

    fn is_silent(&self, frequency: f32, sample_rate: u32) -> bool {
        frequency <= self.min_voiced_hz
            || (sample_rate as f32 - frequency).abs() <= self.nyquist_guard_hz
    }

    /// Render `track` (one frequency every `hop` samples) with `instrument`.
    ///
    /// Returns one sound of `track.len() * hop` samples per output channel.
    ///
    /// # Errors
    /// - `NoPackProvided` when the pack is empty
    /// - `UnknownInstrument` when the pack has no such instrument
    /// - `EmptyOrInvalidSound` for a zero hop, an invalid format or a note
    ///   without samples
    pub fn shape(
        &self,
        track: &[f32],
        hop: usize,
        instrument: &str,
        format: OutputFormat,
    ) -> Result<Vec<Sound>> {
        if self.pack.is_empty() {
            return Err(Error::NoPackProvided);
        }
        let instrument = self.pack.require(instrument)?;
        if hop == 0 || format.channels == 0 {
            return Err(reshape_core::Error::EmptyOrInvalidSound(format!(
                "cannot render {} channels with a hop of {}",
                format.channels, hop
            ))
            .into());
        }

        let segments = segment_track(track, hop, format.sample_rate);
        tracing::debug!(
            "rendering {} segments over {} frames on {} channels",
            segments.len(),
            track.len(),
            format.channels
        );

        (0..format.channels)
            .into_par_iter()
            .map(|channel| self.render_channel(&segments, instrument, hop, track.len() * hop, format, channel))
            .collect()
    }

    fn render_channel(
        &self,
        segments: &[Segment],
        instrument: &Instrument,
        hop: usize,
        length: usize,
        format: OutputFormat,
        channel: usize,
    ) -> Result<Sound> {
        let output = Sound::silence(length, format.bytes_per_sample, format.sample_rate, channel)?;
        let mut samples = output.samples().to_vec();

        for segment in segments {
            let start = segment.start * hop;
            let note = if self.is_silent(segment.frequency, format.sample_rate) {
                None
            } else {
                instrument.nearest_note(segment.frequency)
            };

            match note {
                Some(note) => {
                    tracing::debug!(
                        "channel {}: {} Hz ({} s) from frame {} with the {} Hz note",
                        channel,
                        segment.frequency,
                        segment.duration_secs,
                        segment.start,
                        note.frequency()
                    );
                    self.render_note(&mut samples, start, note, segment, &output)?;
                }
                None => {
                    let rest = (segment.duration_secs * format.sample_rate as f64).round() as usize;
                    write_at(&mut samples, start, std::iter::repeat(0).take(rest));
                }
            }
        }
        Ok(output.with_samples(samples))
    }

    fn render_note(
        &self,
        samples: &mut [i32],
        start: usize,
        note: &Note,
        segment: &Segment,
        output: &Sound,
    ) -> Result<()> {
        let phases = note
            .channel(output.channel() % note.channel_count().max(1))
            .filter(|phases| !phases.is_empty())
            .ok_or_else(|| {
                reshape_core::Error::EmptyOrInvalidSound(format!(
                    "the {} Hz note has no samples",
                    note.frequency()
                ))
            })?;

        let total = phases.len() as f64;
        let mut position = start;
        for phase in phases.phases() {
            let share = phase.len() as f64 / total;
            // Durations are set in output samples, pitch is corrected for the
            // note's own sample rate
            let out_len = (segment.duration_secs * share * output.sample_rate() as f64).round();
            let duration = out_len / phase.sample_rate() as f64;
            let pitch_ratio = segment.frequency as f64 / note.frequency() as f64
                * phase.sample_rate() as f64
                / output.sample_rate() as f64;

            let adapted = self.resampler.resample(phase, duration, pitch_ratio)?;
            let scale = output.max_amplitude() as f64 / max_amplitude(phase.bytes_per_sample()) as f64;
            let written = adapted.len();
            write_at(
                samples,
                position,
                adapted
                    .samples()
                    .iter()
                    .map(|&s| output.clamp_sample(s as f64 * scale)),
            );
            position += written;
        }
        Ok(())
    }
}

/// Overwrite `samples` from `start`, dropping what falls past the end.
fn write_at(samples: &mut [i32], start: usize, values: impl Iterator<Item = i32>) {
    if let Some(tail) = samples.get_mut(start..) {
        for (slot, value) in tail.iter_mut().zip(values) {
            *slot = value;
        }
    }
}

/// Render `track` with `instrument` from `pack`.
///
/// # Errors
/// `NoPackProvided` when `pack` is `None` or empty; see [`NoteShaper::shape`].
pub fn shape(
    track: &[f32],
    hop: usize,
    pack: Option<&Pack>,
    instrument: &str,
    format: OutputFormat,
    resampler: &dyn Resampler,
) -> Result<Vec<Sound>> {
    let pack = pack.ok_or(Error::NoPackProvided)?;
    NoteShaper::new(pack, resampler).shape(track, hop, instrument, format)
}
