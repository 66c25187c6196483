//! Two-voice chorus.
//!
//! Each voice reads a delay line at `15 ms + depth * 5 ms * lfo`, with the
//! two LFOs a quarter turn apart. Output is an equal blend of the dry
//! signal and the voice average.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Effect, InterpolatedDelay, Interpolation, Lfo};
use serde::{Deserialize, Serialize};

const BASE_DELAY_S: f32 = 0.015;
const MOD_DEPTH_S: f32 = 0.005;

/// Chorus parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChorusParams {
    /// LFO rate in Hz.
    pub rate: f32,
    /// Modulation depth, [0, 1].
    pub depth: f32,
}

impl Default for ChorusParams {
    fn default() -> Self {
        Self {
            rate: 1.5,
            depth: 0.5,
        }
    }
}

impl ParamSet for ChorusParams {
    const KIND: EffectKind = EffectKind::Chorus;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "rate",
            unit: "Hz",
            bounds: Bounds::positive(20.0),
            description: "Modulation rate",
        },
        FieldInfo {
            name: "depth",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Modulation depth",
        },
    ];

    param_access!(rate, depth);
}

struct ChorusVoice {
    delay: InterpolatedDelay,
    lfos: [Lfo; 2],
    base: f32,
    swing: f32,
}

impl Effect for ChorusVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.delay.write(input);
        let mut wet = 0.0;
        for lfo in &mut self.lfos {
            wet += self.delay.read(self.base + self.swing * lfo.next());
        }
        0.5 * input + 0.25 * wet
    }

    fn reset(&mut self) {
        self.delay.clear();
        self.lfos[0].set_phase(0.0);
        self.lfos[1].set_phase(0.25);
    }
}

/// Modulated-delay chorus.
#[derive(Debug, Clone)]
pub struct Chorus {
    sample_rate: f32,
}

impl Chorus {
    /// Creates a chorus for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl EffectProcessor for Chorus {
    type Params = ChorusParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &ChorusParams) -> Vec<f32> {
        let sr = self.sample_rate;
        let mut second = Lfo::new(sr, params.rate);
        second.set_phase(0.25);
        let mut delay = InterpolatedDelay::from_time(sr, BASE_DELAY_S + MOD_DEPTH_S + 0.001);
        delay.set_interpolation(Interpolation::Cubic);
        render(
            ChorusVoice {
                delay,
                lfos: [Lfo::new(sr, params.rate), second],
                base: BASE_DELAY_S * sr,
                swing: params.depth * MOD_DEPTH_S * sr,
            },
            samples,
        )
    }
}
