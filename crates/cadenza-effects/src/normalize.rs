//! Peak normalization.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{db_to_linear, peak_abs};
use serde::{Deserialize, Serialize};

/// Peaks below this are treated as silence and left alone.
pub const SILENCE_FLOOR: f32 = 1e-9;

/// Normalization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeParams {
    /// Target peak in dBFS, [-96, 0].
    pub target_level: f32,
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self { target_level: -1.0 }
    }
}

impl ParamSet for NormalizeParams {
    const KIND: EffectKind = EffectKind::Normalize;
    const FIELDS: &'static [FieldInfo] = &[FieldInfo {
        name: "target_level",
        unit: "dB",
        bounds: Bounds::closed(-96.0, 0.0),
        description: "Target peak level",
    }];

    param_access!(target_level);
}

/// Scales a buffer so its absolute peak lands on the target level.
#[derive(Debug, Clone)]
pub struct Normalizer {
    sample_rate: f32,
}

impl Normalizer {
    /// Creates a normalizer.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl EffectProcessor for Normalizer {
    type Params = NormalizeParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &NormalizeParams) -> Vec<f32> {
        let peak = peak_abs(samples);
        if peak < SILENCE_FLOOR {
            return samples.to_vec();
        }
        let gain = db_to_linear(params.target_level) / peak;
        samples.iter().map(|s| s * gain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_hits_target() {
        let norm = Normalizer::new(44100.0);
        let input = vec![0.1, -0.25, 0.05];
        let out = norm.process(&input, &NormalizeParams { target_level: -6.0 });
        assert!((peak_abs(&out) - db_to_linear(-6.0)).abs() < 1e-5);
        // shape preserved
        assert!((out[0] / out[1] - input[0] / input[1]).abs() < 1e-5);
    }

    #[test]
    fn test_silence_unchanged() {
        let norm = Normalizer::new(44100.0);
        let out = norm.process(&[0.0; 16], &NormalizeParams::default());
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_positive_target_rejected() {
        let norm = Normalizer::new(44100.0);
        assert!(norm.apply(&[0.5], &NormalizeParams { target_level: 3.0 }).is_err());
    }
}
