//! Flanger: a short modulated delay with feedback.
//!
//! ```text
//! d[n]  = 1 ms + depth * 5 ms * lfo_unipolar
//! w[n]  = x[n] + feedback * delayed
//! y[n]  = 0.5 * (x[n] + delayed)
//! ```

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Effect, InterpolatedDelay, Lfo, flush_denormal};
use serde::{Deserialize, Serialize};

const MIN_DELAY_S: f32 = 0.001;
const SWEEP_S: f32 = 0.005;

/// Flanger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlangerParams {
    /// Sweep rate in Hz.
    pub rate: f32,
    /// Sweep depth, [0, 1].
    pub depth: f32,
    /// Regeneration, [0, 1).
    pub feedback: f32,
}

impl Default for FlangerParams {
    fn default() -> Self {
        Self {
            rate: 0.5,
            depth: 0.5,
            feedback: 0.3,
        }
    }
}

impl ParamSet for FlangerParams {
    const KIND: EffectKind = EffectKind::Flanger;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "rate",
            unit: "Hz",
            bounds: Bounds::positive(20.0),
            description: "Sweep rate",
        },
        FieldInfo {
            name: "depth",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Sweep depth",
        },
        FieldInfo {
            name: "feedback",
            unit: "",
            bounds: Bounds::half_open(0.0, 1.0),
            description: "Regeneration amount",
        },
    ];

    param_access!(rate, depth, feedback);
}

struct FlangerVoice {
    delay: InterpolatedDelay,
    lfo: Lfo,
    min: f32,
    sweep: f32,
    feedback: f32,
}

impl Effect for FlangerVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let delayed = self.delay.read(self.min + self.sweep * self.lfo.next_unipolar());
        self.delay.write(flush_denormal(input + self.feedback * delayed));
        0.5 * (input + delayed)
    }

    fn reset(&mut self) {
        self.delay.clear();
        self.lfo.set_phase(0.0);
    }
}

/// Flanger processor.
#[derive(Debug, Clone)]
pub struct Flanger {
    sample_rate: f32,
}

impl Flanger {
    /// Creates a flanger for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl EffectProcessor for Flanger {
    type Params = FlangerParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &FlangerParams) -> Vec<f32> {
        let sr = self.sample_rate;
        render(
            FlangerVoice {
                delay: InterpolatedDelay::from_time(sr, MIN_DELAY_S + SWEEP_S + 0.001),
                lfo: Lfo::new(sr, params.rate),
                min: MIN_DELAY_S * sr,
                sweep: params.depth * SWEEP_S * sr,
                feedback: params.feedback,
            },
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_finite_with_high_feedback() {
        let flanger = Flanger::new(44100.0);
        let params = FlangerParams {
            feedback: 0.95,
            ..FlangerParams::default()
        };
        let input: Vec<f32> = (0..20000).map(|i| (i as f32 * 0.03).sin()).collect();
        let out = flanger.process(&input, &params);
        assert!(out.iter().all(|s| s.is_finite() && s.abs() < 50.0));
    }

    #[test]
    fn test_feedback_one_rejected() {
        let params = FlangerParams {
            feedback: 1.0,
            ..FlangerParams::default()
        };
        assert!(params.validate(44100.0).is_err());
    }
}
