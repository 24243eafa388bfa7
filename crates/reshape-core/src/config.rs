//! Analysis and resynthesis configuration.

use crate::{Error, Result};

/// Samples between two pitch-track frames.
pub const DEFAULT_HOP: usize = 100;

/// Samples between two magnitude-profile frames used for envelope segmentation.
pub const DEFAULT_ADSR_HOP: usize = 100;

/// Configuration shared by the analysis and resynthesis stages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct AnalysisConfig {
    /// Pitch-track frame step in samples
    pub hop: usize,
    /// Magnitude-profile frame step in samples
    pub adsr_hop: usize,
    /// Segments at or below this frequency are rendered as silence
    pub min_voiced_hz: f32,
    /// Segments closer than this to the sample rate are rendered as silence
    pub nyquist_guard_hz: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hop: DEFAULT_HOP,
            adsr_hop: DEFAULT_ADSR_HOP,
            min_voiced_hz: 50.0,
            nyquist_guard_hz: 100.0,
        }
    }
}

impl AnalysisConfig {
    pub fn hop(mut self, hop: usize) -> Self {
        self.hop = hop;
        self
    }

    pub fn adsr_hop(mut self, hop: usize) -> Self {
        self.adsr_hop = hop;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.hop == 0 {
            return Err(Error::InvalidConfig("hop must be at least 1 sample".into()));
        }
        if self.adsr_hop == 0 {
            return Err(Error::InvalidConfig(
                "adsr_hop must be at least 1 sample".into(),
            ));
        }
        let guards_valid = [self.min_voiced_hz, self.nyquist_guard_hz]
            .iter()
            .all(|hz| hz.is_finite() && *hz >= 0.0);
        if !guards_valid {
            return Err(Error::InvalidConfig(format!(
                "frequency guards must be non-negative (min_voiced_hz={}, nyquist_guard_hz={})",
                self.min_voiced_hz, self.nyquist_guard_hz
            )));
        }
        Ok(())
    }
}
