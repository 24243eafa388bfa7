//! Splitting sounds into spectra and putting them back together.

use crate::frame::{FrameEngine, FrameInfo, FrameStrategy};
use crate::spectrum::{FftPlans, Spectrum};
use reshape_core::{Error, Result, Sound};

/// Collects the forward spectrum of every frame.
struct SpectrumCollector {
    hop: usize,
}

impl FrameStrategy for SpectrumCollector {
    type Accumulator = Vec<Spectrum>;

    fn init_sound(&self, sound: &Sound) -> Result<Self::Accumulator> {
        Ok(Vec::with_capacity(sound.len().div_ceil(self.hop.max(1))))
    }

    fn window_length(&self, _freq_limit: f64) -> usize {
        self.hop
    }

    fn low_threshold(&self, _default_value: f64) -> f64 {
        self.hop as f64
    }

    fn transform_frame(
        &self,
        accumulator: &mut Self::Accumulator,
        spectrum: Spectrum,
        _frame: FrameInfo,
    ) -> Spectrum {
        accumulator.push(spectrum.clone());
        spectrum
    }
}

/// Applies a closure to every frame and resynthesizes the result.
struct SpectrumMap<F> {
    hop: usize,
    map: F,
}

impl<F> FrameStrategy for SpectrumMap<F>
where
    F: Fn(Spectrum, &FrameInfo) -> Spectrum,
{
    type Accumulator = ();
    const RESYNTHESIZES: bool = true;

    fn init_sound(&self, _sound: &Sound) -> Result<Self::Accumulator> {
        Ok(())
    }

    fn window_length(&self, _freq_limit: f64) -> usize {
        self.hop
    }

    fn low_threshold(&self, _default_value: f64) -> f64 {
        self.hop as f64
    }

    fn transform_frame(
        &self,
        _accumulator: &mut Self::Accumulator,
        spectrum: Spectrum,
        frame: FrameInfo,
    ) -> Spectrum {
        (self.map)(spectrum, &frame)
    }
}

fn check_hop(hop: usize) -> Result<()> {
    if hop == 0 {
        return Err(Error::EmptyOrInvalidSound("hop must be positive".into()));
    }
    Ok(())
}

/// Spectrum of every `hop` samples of `sound`, each over a window of the
/// next power of two at or above `hop`.
pub fn split_into_spectrums(sound: &Sound, hop: usize) -> Result<Vec<Spectrum>> {
    check_hop(hop)?;
    Ok(FrameEngine::new()
        .run(sound, &SpectrumCollector { hop })?
        .accumulator)
}

/// Inverse of [`split_into_spectrums`].
///
/// Spectrum `k` is inverse-transformed and written from sample `k * hop`,
/// later frames overwriting earlier ones. The result has `spectra.len() * hop`
/// samples and the format of `template`.
pub fn spectrums_to_sound(spectra: &[Spectrum], hop: usize, template: &Sound) -> Result<Sound> {
    check_hop(hop)?;
    let length = spectra.len() * hop;
    let mut samples = vec![0i32; length];
    let mut plans: Option<FftPlans> = None;

    for (k, spectrum) in spectra.iter().enumerate() {
        if spectrum.is_empty() {
            continue;
        }
        let plan = match plans.take() {
            Some(p) if p.len() == spectrum.len() => p,
            _ => FftPlans::new(spectrum.len()),
        };
        let restored = plan.inverse(spectrum.bins());
        let offset = k * hop;
        for (slot, value) in samples[offset..].iter_mut().zip(restored) {
            *slot = template.clamp_sample(value);
        }
        plans = Some(plan);
    }
    Ok(template.with_samples(samples))
}

/// Transform every frame of `sound` with `map` and resynthesize.
pub fn map_spectrums<F>(sound: &Sound, hop: usize, map: F) -> Result<Sound>
where
    F: Fn(Spectrum, &FrameInfo) -> Spectrum,
{
    check_hop(hop)?;
    FrameEngine::new()
        .run(sound, &SpectrumMap { hop, map })?
        .sound
        .ok_or_else(|| Error::EmptyOrInvalidSound("no resynthesized output".into()))
}
