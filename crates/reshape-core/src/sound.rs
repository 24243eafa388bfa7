//! Single-channel integer sample buffer.

use crate::{Error, Result};

/// One channel of digitized audio.
///
/// A `Sound` owns its samples and never changes after construction; every
/// transform produces a new instance. Samples are signed integers whose range
/// is given by `bytes_per_sample` (1 to 4 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Sound {
    samples: Vec<i32>,
    bytes_per_sample: u8,
    sample_rate: u32,
    channel: usize,
}

impl Sound {
    /// Create a sound, validating its format.
    ///
    /// # Errors
    /// `EmptyOrInvalidSound` when the sample rate is zero or the sample depth
    /// is outside 1..=4 bytes.
    pub fn new(
        samples: Vec<i32>,
        bytes_per_sample: u8,
        sample_rate: u32,
        channel: usize,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::EmptyOrInvalidSound(
                "sample rate must be positive".into(),
            ));
        }
        if !(1..=4).contains(&bytes_per_sample) {
            return Err(Error::EmptyOrInvalidSound(format!(
                "unsupported sample depth: {} bytes",
                bytes_per_sample
            )));
        }
        Ok(Self {
            samples,
            bytes_per_sample,
            sample_rate,
            channel,
        })
    }

    /// Create a silent sound of `len` samples.
    pub fn silence(len: usize, bytes_per_sample: u8, sample_rate: u32, channel: usize) -> Result<Self> {
        Self::new(vec![0; len], bytes_per_sample, sample_rate, channel)
    }

    /// New sound with the same format and channel, holding `samples`.
    pub fn with_samples(&self, samples: Vec<i32>) -> Self {
        Self {
            samples,
            bytes_per_sample: self.bytes_per_sample,
            sample_rate: self.sample_rate,
            channel: self.channel,
        }
    }

    /// New sound with the same format, assigned to another channel index.
    pub fn with_channel(&self, channel: usize) -> Self {
        Self {
            channel,
            ..self.clone()
        }
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn bytes_per_sample(&self) -> u8 {
        self.bytes_per_sample
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Largest positive sample value representable at this depth.
    pub fn max_amplitude(&self) -> i32 {
        max_amplitude(self.bytes_per_sample)
    }

    /// Copy of the samples in `[start, end)`.
    ///
    /// Bounds are clamped to the sound; an inverted range yields an empty sound.
    pub fn sub_sound(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.samples.len());
        let start = start.min(end);
        self.with_samples(self.samples[start..end].to_vec())
    }

    /// Copy of the sound played backwards.
    pub fn reversed(&self) -> Self {
        self.with_samples(self.samples.iter().rev().copied().collect())
    }

    /// Clamp a floating-point value into this sound's sample range.
    pub fn clamp_sample(&self, value: f64) -> i32 {
        let max = self.max_amplitude() as f64;
        value.round().clamp(-max - 1.0, max) as i32
    }
}

/// Largest positive sample value for a sample depth in bytes.
pub fn max_amplitude(bytes_per_sample: u8) -> i32 {
    match bytes_per_sample {
        0 => 0,
        1..=3 => (1i32 << (8 * bytes_per_sample as u32 - 1)) - 1,
        _ => i32::MAX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Sound {
        Sound::new((0..len as i32).collect(), 2, 8000, 0).unwrap()
    }

    #[test]
    fn test_invalid_format() {
        assert!(matches!(
            Sound::new(vec![0; 4], 2, 0, 0),
            Err(Error::EmptyOrInvalidSound(_))
        ));
        assert!(Sound::new(vec![0; 4], 0, 44100, 0).is_err());
        assert!(Sound::new(vec![0; 4], 5, 44100, 0).is_err());
        assert!(Sound::new(Vec::new(), 1, 44100, 0).is_ok());
    }

    #[test]
    fn test_sub_sound_copies_and_clamps() {
        let sound = ramp(10);
        let sub = sound.sub_sound(2, 5);
        assert_eq!(sub.samples(), &[2, 3, 4]);
        assert_eq!(sub.sample_rate(), 8000);

        assert_eq!(sound.sub_sound(8, 100).samples(), &[8, 9]);
        assert!(sound.sub_sound(7, 3).is_empty());
    }

    #[test]
    fn test_reversed() {
        let sound = ramp(4);
        assert_eq!(sound.reversed().samples(), &[3, 2, 1, 0]);
        assert_eq!(sound.samples(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_max_amplitude() {
        assert_eq!(max_amplitude(1), 127);
        assert_eq!(max_amplitude(2), 32767);
        assert_eq!(max_amplitude(3), 8_388_607);
        assert_eq!(max_amplitude(4), i32::MAX);
    }

    #[test]
    fn test_clamp_sample() {
        let sound = Sound::silence(1, 1, 8000, 0).unwrap();
        assert_eq!(sound.clamp_sample(500.0), 127);
        assert_eq!(sound.clamp_sample(-500.0), -128);
        assert_eq!(sound.clamp_sample(12.4), 12);
    }

    #[test]
    fn test_duration() {
        let sound = Sound::silence(4000, 2, 8000, 1).unwrap();
        assert!((sound.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(sound.channel(), 1);
        assert_eq!(sound.with_channel(3).channel(), 3);
    }
}
