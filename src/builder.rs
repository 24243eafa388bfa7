//! Builder for configuring and constructing a `Reshaper`.

use crate::core::AnalysisConfig;
use crate::{Reshaper, Result};

#[cfg(feature = "sampler")]
use std::sync::Arc;

#[cfg(feature = "sampler")]
use crate::sampler::{FftSize, Pack, Resampler, VocoderResampler};

/// The pack is optional at build time; shaping without one fails with
/// `NoPackProvided`. When no resampler is given a [`VocoderResampler`] with
/// the configured FFT size is used.
///
/// # Example
///
/// ```ignore
/// use reshape::prelude::*;
///
/// let reshaper = Reshaper::builder()
///     .hop(200)
///     .pack(pack)
///     .build()?;
///
/// let track = reshaper.track_pitch(&voice)?;
/// let channels = reshaper.shape(&track, "piano", OutputFormat::of(&voice, 2))?;
/// ```
pub struct ReshaperBuilder {
    config: AnalysisConfig,

    #[cfg(feature = "sampler")]
    pack: Option<Arc<Pack>>,

    #[cfg(feature = "sampler")]
    resampler: Option<Arc<dyn Resampler>>,

    #[cfg(feature = "sampler")]
    fft_size: FftSize,
}

impl Default for ReshaperBuilder {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),

            #[cfg(feature = "sampler")]
            pack: None,

            #[cfg(feature = "sampler")]
            resampler: None,

            #[cfg(feature = "sampler")]
            fft_size: FftSize::default(),
        }
    }
}

impl ReshaperBuilder {
    /// Replace the whole analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 100
    pub fn hop(mut self, hop: usize) -> Self {
        self.config.hop = hop;
        self
    }

    /// Default: 100
    pub fn adsr_hop(mut self, hop: usize) -> Self {
        self.config.adsr_hop = hop;
        self
    }

    /// Default: 50 Hz
    pub fn min_voiced_hz(mut self, hz: f32) -> Self {
        self.config.min_voiced_hz = hz;
        self
    }

    #[cfg(feature = "sampler")]
    pub fn pack(mut self, pack: impl Into<Arc<Pack>>) -> Self {
        self.pack = Some(pack.into());
        self
    }

    /// Overrides the default phase-vocoder resampler.
    #[cfg(feature = "sampler")]
    pub fn resampler<R: Resampler + 'static>(mut self, resampler: R) -> Self {
        self.resampler = Some(Arc::new(resampler));
        self
    }

    /// FFT size of the default resampler. Ignored when a resampler is set.
    #[cfg(feature = "sampler")]
    pub fn fft_size(mut self, size: FftSize) -> Self {
        self.fft_size = size;
        self
    }

    pub fn build(self) -> Result<Reshaper> {
        self.config.validate()?;

        #[cfg(feature = "sampler")]
        let resampler = self
            .resampler
            .unwrap_or_else(|| Arc::new(VocoderResampler::new(self.fft_size)));

        #[cfg(feature = "sampler")]
        match &self.pack {
            Some(pack) => tracing::debug!("reshaper built with {} instruments", pack.len()),
            None => tracing::debug!("reshaper built without a pack"),
        }

        Ok(Reshaper::from_parts(
            self.config,
            #[cfg(feature = "sampler")]
            self.pack,
            #[cfg(feature = "sampler")]
            resampler,
        ))
    }
}
