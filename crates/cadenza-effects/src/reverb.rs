//! Convolution reverb.
//!
//! The room is modelled as an exponentially decaying, unit-sum impulse
//! response whose length follows `room_size` and whose decay rate follows
//! `damping`:
//!
//! ```text
//! len  = max(1, room_size * MAX_ROOM_SECONDS * sample_rate)
//! h[k] = exp(-(1 + 20 * damping) * k / sample_rate) / sum
//! y    = (1 - wet_level) * x + wet_level * (x * h)[0..len(x)]
//! ```
//!
//! Convolution runs through zero-padded FFTs.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::{EffectKind, EffectProcessor};
use cadenza_analysis::fft_convolve_truncated;
use libm::expf;
use serde::{Deserialize, Serialize};

/// Longest room, in seconds of impulse response.
pub const MAX_ROOM_SECONDS: f32 = 1.0;

/// Decay rate added per unit of damping, in 1/s.
const DAMPING_DECAY_SCALE: f32 = 20.0;

/// Reverb parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReverbParams {
    /// Room size in [0, 1]; scales the impulse length.
    pub room_size: f32,
    /// Damping in [0, 1]; faster decay when higher.
    pub damping: f32,
    /// Wet share of the output in [0, 1].
    pub wet_level: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
        }
    }
}

impl ParamSet for ReverbParams {
    const KIND: EffectKind = EffectKind::Reverb;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "room_size",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Impulse length as a fraction of one second",
        },
        FieldInfo {
            name: "damping",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Decay speed of the tail",
        },
        FieldInfo {
            name: "wet_level",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Wet/dry balance",
        },
    ];

    param_access!(room_size, damping, wet_level);
}

/// Convolution reverb processor.
#[derive(Debug, Clone)]
pub struct Reverb {
    sample_rate: f32,
}

impl Reverb {
    /// Creates a reverb for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Builds the normalised room impulse response.
    pub fn impulse_response(&self, params: &ReverbParams) -> Vec<f32> {
        let len = ((params.room_size * MAX_ROOM_SECONDS * self.sample_rate) as usize).max(1);
        let rate = 1.0 + DAMPING_DECAY_SCALE * params.damping;

        let mut ir: Vec<f32> = (0..len)
            .map(|k| expf(-rate * k as f32 / self.sample_rate))
            .collect();
        let sum: f32 = ir.iter().sum();
        for tap in &mut ir {
            *tap /= sum;
        }
        ir
    }
}

impl EffectProcessor for Reverb {
    type Params = ReverbParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &ReverbParams) -> Vec<f32> {
        if samples.is_empty() {
            return Vec::new();
        }
        let ir = self.impulse_response(params);
        let wet = fft_convolve_truncated(samples, &ir);
        let dry_gain = 1.0 - params.wet_level;

        samples
            .iter()
            .zip(wet.iter())
            .map(|(&x, &w)| dry_gain * x + params.wet_level * w)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impulse_response_unit_sum() {
        let reverb = Reverb::new(8000.0);
        let ir = reverb.impulse_response(&ReverbParams::default());
        assert_eq!(ir.len(), 4000);
        let sum: f32 = ir.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
        assert!(ir[0] > ir[ir.len() - 1]);
    }

    #[test]
    fn test_zero_room_is_single_tap() {
        let reverb = Reverb::new(44100.0);
        let params = ReverbParams {
            room_size: 0.0,
            ..ReverbParams::default()
        };
        let ir = reverb.impulse_response(&params);
        assert_eq!(ir, vec![1.0]);

        // A single unit tap is the identity, whatever the mix.
        let input = [0.5, -0.25, 0.125];
        let out = reverb.process(&input, &params);
        for (a, b) in out.iter().zip(input.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn test_dry_only() {
        let reverb = Reverb::new(8000.0);
        let params = ReverbParams {
            wet_level: 0.0,
            ..ReverbParams::default()
        };
        let input: Vec<f32> = (0..100).map(|i| (i as f32 * 0.1).sin()).collect();
        let out = reverb.process(&input, &params);
        assert_eq!(out.len(), input.len());
        for (a, b) in out.iter().zip(input.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_tail_spreads_impulse() {
        let reverb = Reverb::new(8000.0);
        let params = ReverbParams {
            wet_level: 1.0,
            ..ReverbParams::default()
        };
        let mut input = vec![0.0; 800];
        input[0] = 1.0;
        let out = reverb.process(&input, &params);
        assert!(out[100] > 0.0);
        assert!(out[0] < 1.0);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let reverb = Reverb::new(44100.0);
        let params = ReverbParams {
            damping: 1.5,
            ..ReverbParams::default()
        };
        assert!(reverb.apply(&[0.0; 4], &params).is_err());
    }
}
