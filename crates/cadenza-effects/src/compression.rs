//! Feed-forward compressor.
//!
//! A peak [`EnvelopeFollower`] drives a hard-knee gain computer:
//!
//! ```text
//! over   = level_db - threshold_db
//! gain_db = -over * (1 - 1/ratio)    for over > 0, else 0
//! ```

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Effect, EnvelopeFollower, db_to_linear, linear_to_db};
use serde::{Deserialize, Serialize};

/// Compressor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionParams {
    /// Level above which gain reduction starts, dBFS.
    pub threshold_db: f32,
    /// Input:output ratio above the threshold.
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack: 0.01,
            release: 0.1,
        }
    }
}

impl ParamSet for CompressionParams {
    const KIND: EffectKind = EffectKind::Compression;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "threshold_db",
            unit: "dB",
            bounds: Bounds::below(0.0),
            description: "Compression threshold",
        },
        FieldInfo {
            name: "ratio",
            unit: "",
            bounds: Bounds::closed(1.0, 100.0),
            description: "Compression ratio",
        },
        FieldInfo {
            name: "attack",
            unit: "s",
            bounds: Bounds::positive(1.0),
            description: "Envelope attack time",
        },
        FieldInfo {
            name: "release",
            unit: "s",
            bounds: Bounds::positive(5.0),
            description: "Envelope release time",
        },
    ];

    param_access!(threshold_db, ratio, attack, release);
}

struct CompressorVoice {
    envelope: EnvelopeFollower,
    threshold_db: f32,
    slope: f32,
}

impl CompressorVoice {
    #[inline]
    fn gain_for(&self, level: f32) -> f32 {
        let over = linear_to_db(level) - self.threshold_db;
        if over > 0.0 {
            db_to_linear(-over * self.slope)
        } else {
            1.0
        }
    }
}

impl Effect for CompressorVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let level = self.envelope.process(input);
        input * self.gain_for(level)
    }

    fn reset(&mut self) {
        self.envelope.reset();
    }
}

/// Dynamic range compressor.
#[derive(Debug, Clone)]
pub struct Compressor {
    sample_rate: f32,
}

impl Compressor {
    /// Creates a compressor for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl EffectProcessor for Compressor {
    type Params = CompressionParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &CompressionParams) -> Vec<f32> {
        render(
            CompressorVoice {
                envelope: EnvelopeFollower::new(self.sample_rate, params.attack, params.release),
                threshold_db: params.threshold_db,
                slope: 1.0 - 1.0 / params.ratio,
            },
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_signal_untouched() {
        let comp = Compressor::new(44100.0);
        let input = vec![0.01; 1000];
        let out = comp.process(&input, &CompressionParams::default());
        for (a, b) in input.iter().zip(&out) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_loud_signal_reduced() {
        let comp = Compressor::new(44100.0);
        let input = vec![0.9; 44100];
        let out = comp.process(&input, &CompressionParams::default());
        // -0.9 dBFS against a -20 dB threshold at 4:1 settles near -15.2 dBFS
        let settled = linear_to_db(out[44099]);
        assert!((settled - -15.2).abs() < 0.5, "settled at {} dB", settled);
    }

    #[test]
    fn test_unity_ratio_is_transparent() {
        let comp = Compressor::new(44100.0);
        let params = CompressionParams {
            ratio: 1.0,
            ..CompressionParams::default()
        };
        let input = vec![0.8; 500];
        let out = comp.process(&input, &params);
        assert!((out[499] - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_threshold_zero_rejected() {
        let params = CompressionParams {
            threshold_db: 0.0,
            ..CompressionParams::default()
        };
        assert!(params.validate(44100.0).is_err());
    }

    #[test]
    fn test_threshold_has_no_floor() {
        let params = CompressionParams {
            threshold_db: -120.0,
            ..CompressionParams::default()
        };
        params.validate(44100.0).unwrap();

        // -60 dBFS sits 60 dB over the threshold and is pulled down
        let comp = Compressor::new(44100.0);
        let out = comp.process(&[0.001; 2000], &params);
        assert!(out[1999] < 0.001 * 0.5, "{}", out[1999]);
    }
}
