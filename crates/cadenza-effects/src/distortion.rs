//! Soft-clipping distortion.
//!
//! Signal flow: drive gain -> tanh waveshaper -> one-pole tone filter.
//!
//! `drive` in [0, 1] maps to a pre-gain of `1 + 10 * drive`; `tone` in
//! [0, 1] sweeps the post filter exponentially from 500 Hz (dark) to
//! 20 kHz, capped below Nyquist.

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Effect, OnePole, soft_clip};
use libm::powf;
use serde::{Deserialize, Serialize};

const TONE_MIN_HZ: f32 = 500.0;
const TONE_MAX_HZ: f32 = 20000.0;
const MAX_DRIVE_GAIN: f32 = 10.0;

/// Distortion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistortionParams {
    /// Pre-gain amount, [0, 1].
    pub drive: f32,
    /// Brightness of the post filter, [0, 1].
    pub tone: f32,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            drive: 0.5,
            tone: 0.5,
        }
    }
}

impl ParamSet for DistortionParams {
    const KIND: EffectKind = EffectKind::Distortion;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "drive",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Gain into the waveshaper",
        },
        FieldInfo {
            name: "tone",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Post-shaping brightness",
        },
    ];

    param_access!(drive, tone);
}

struct ShaperVoice {
    gain: f32,
    tone: OnePole,
}

impl Effect for ShaperVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.tone.process(soft_clip(input * self.gain))
    }

    fn reset(&mut self) {
        self.tone.reset();
    }
}

/// Waveshaping distortion processor.
#[derive(Debug, Clone)]
pub struct Distortion {
    sample_rate: f32,
}

impl Distortion {
    /// Creates a distortion for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Post filter cutoff in Hz for a tone setting.
    pub fn tone_frequency(&self, tone: f32) -> f32 {
        let hz = TONE_MIN_HZ * powf(TONE_MAX_HZ / TONE_MIN_HZ, tone);
        hz.min(self.sample_rate * 0.45)
    }
}

impl EffectProcessor for Distortion {
    type Params = DistortionParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &DistortionParams) -> Vec<f32> {
        render(
            ShaperVoice {
                gain: 1.0 + MAX_DRIVE_GAIN * params.drive,
                tone: OnePole::new(self.sample_rate, self.tone_frequency(params.tone)),
            },
            samples,
        )
    }
}
