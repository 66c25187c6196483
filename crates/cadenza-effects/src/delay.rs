//! Feedback echo.
//!
//! ```text
//! y[n]   = x[n] + feedback * y[n - D],   D = round(delay_time * sample_rate)
//! out[n] = (1 - wet_level) * x[n] + wet_level * y[n]
//! ```
//!
//! The recursion runs through a [`CombFilter`] with no damping.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{CombFilter, Effect, wet_dry_mix};
use serde::{Deserialize, Serialize};

/// Longest supported delay time in seconds.
pub const MAX_DELAY_SECONDS: f32 = 5.0;

/// Delay parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelayParams {
    /// Echo spacing in seconds, (0, 5].
    pub delay_time: f32,
    /// Loop gain, [0, 1).
    pub feedback: f32,
    /// Wet share of the output, [0, 1].
    pub wet_level: f32,
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            delay_time: 0.3,
            feedback: 0.3,
            wet_level: 0.5,
        }
    }
}

impl ParamSet for DelayParams {
    const KIND: EffectKind = EffectKind::Delay;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "delay_time",
            unit: "s",
            bounds: Bounds::positive(MAX_DELAY_SECONDS),
            description: "Time between echoes",
        },
        FieldInfo {
            name: "feedback",
            unit: "",
            bounds: Bounds::half_open(0.0, 1.0),
            description: "Echo regeneration",
        },
        FieldInfo {
            name: "wet_level",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Wet/dry balance",
        },
    ];

    param_access!(delay_time, feedback, wet_level);
}

struct EchoVoice {
    comb: CombFilter,
    feedback: f32,
    wet_level: f32,
}

impl Effect for EchoVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        // comb returns y[n - D] and stores x[n] + g * y[n - D] = y[n]
        let delayed = self.comb.process(input);
        let echoed = input + self.feedback * delayed;
        wet_dry_mix(input, echoed, self.wet_level)
    }

    fn reset(&mut self) {
        self.comb.clear();
    }
}

/// Feedback echo processor.
#[derive(Debug, Clone)]
pub struct Delay {
    sample_rate: f32,
}

impl Delay {
    /// Creates a delay for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Echo spacing in whole samples, at least 1.
    pub fn delay_samples(&self, params: &DelayParams) -> usize {
        ((params.delay_time * self.sample_rate).round() as usize).max(1)
    }
}

impl EffectProcessor for Delay {
    type Params = DelayParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &DelayParams) -> Vec<f32> {
        let mut comb = CombFilter::new(self.delay_samples(params));
        comb.set_feedback(params.feedback);
        render(
            EchoVoice {
                comb,
                feedback: params.feedback,
                wet_level: params.wet_level,
            },
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_recursion() {
        let delay = Delay::new(10.0);
        let params = DelayParams {
            delay_time: 0.3,
            feedback: 0.5,
            wet_level: 1.0,
        };
        let mut input = vec![0.0; 10];
        input[0] = 1.0;
        let out = delay.process(&input, &params);

        assert_eq!(out[0], 1.0);
        assert!((out[3] - 0.5).abs() < 1e-6);
        assert!((out[6] - 0.25).abs() < 1e-6);
        assert!((out[9] - 0.125).abs() < 1e-6);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn test_mix_half() {
        let delay = Delay::new(10.0);
        let params = DelayParams {
            delay_time: 0.2,
            feedback: 0.5,
            wet_level: 0.5,
        };
        let out = delay.process(&[1.0, 0.0, 0.0], &params);
        assert_eq!(out[0], 1.0);
        assert!((out[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_feedback_one_rejected() {
        let delay = Delay::new(44100.0);
        let params = DelayParams {
            feedback: 1.0,
            ..DelayParams::default()
        };
        assert!(delay.apply(&[0.0; 8], &params).is_err());
    }

    #[test]
    fn test_zero_time_rejected() {
        let delay = Delay::new(44100.0);
        let params = DelayParams {
            delay_time: 0.0,
            ..DelayParams::default()
        };
        assert!(delay.apply(&[0.0; 8], &params).is_err());
    }
}
