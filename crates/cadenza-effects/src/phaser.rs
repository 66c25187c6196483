//! Six-stage phaser.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Effect, FirstOrderAllpass, Lfo, flush_denormal};
use libm::powf;
use serde::{Deserialize, Serialize};

const STAGES: usize = 6;
const MIN_FREQ_HZ: f32 = 200.0;
const SWEEP_RATIO: f32 = 20.0;

/// Phaser parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaserParams {
    /// Sweep rate in Hz.
    pub rate: f32,
    /// Sweep width, [0, 1].
    pub depth: f32,
    /// Resonance, [0, 1).
    pub feedback: f32,
}

impl Default for PhaserParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            depth: 0.5,
            feedback: 0.3,
        }
    }
}

impl ParamSet for PhaserParams {
    const KIND: EffectKind = EffectKind::Phaser;
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
            description: "Sweep width",
        },
        FieldInfo {
            name: "feedback",
            unit: "",
            bounds: Bounds::half_open(0.0, 1.0),
            description: "Resonance",
        },
    ];

    param_access!(rate, depth, feedback);
}

struct PhaserVoice {
    stages: [FirstOrderAllpass; STAGES],
    lfo: Lfo,
    depth: f32,
    feedback: f32,
    last: f32,
    sample_rate: f32,
}

impl Effect for PhaserVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let sweep = MIN_FREQ_HZ * powf(SWEEP_RATIO, self.lfo.next_unipolar() * self.depth);
        let mut wet = input + self.feedback * self.last;
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.set_frequency(sweep * (1.0 + 0.1 * i as f32), self.sample_rate);
            wet = stage.process(wet);
        }
        self.last = flush_denormal(wet);
        0.5 * (input + wet)
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
        self.last = 0.0;
        self.lfo.set_phase(0.0);
    }
}

/// Allpass-cascade phaser.
#[derive(Debug, Clone)]
pub struct Phaser {
    sample_rate: f32,
}

impl Phaser {
    /// Creates a phaser for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl EffectProcessor for Phaser {
    type Params = PhaserParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &PhaserParams) -> Vec<f32> {
        render(
            PhaserVoice {
                stages: Default::default(),
                lfo: Lfo::new(self.sample_rate, params.rate),
                depth: params.depth,
                feedback: params.feedback,
                last: 0.0,
                sample_rate: self.sample_rate,
            },
            samples,
        )
    }
}
