//! Time-stretching types.

/// FFT size presets for the phase vocoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum FftSize {
    /// 512-point FFT, for very short note phases
    Tiny = 512,

    /// 1024-point FFT - Default
    #[default]
    Small = 1024,

    /// 2048-point FFT
    Medium = 2048,

    /// 4096-point FFT
    Large = 4096,
}

impl FftSize {
    pub fn size(&self) -> usize {
        *self as usize
    }

    /// Largest analysis hop (a quarter frame, 75% overlap)
    pub fn hop_size(&self) -> usize {
        self.size() / 4
    }
}
