//! Three-band peaking equalizer (100 Hz, 1 kHz, 5 kHz).

use crate::params::{Bounds, FieldInfo, ParamSet};
use crate::processor::render;
use crate::{EffectKind, EffectProcessor};
use cadenza_core::{Biquad, BiquadCoefficients, Effect};
use serde::{Deserialize, Serialize};

const BAND_CENTERS_HZ: [f32; 3] = [100.0, 1000.0, 5000.0];
const BAND_Q: f32 = 1.0;
const GAIN_RANGE: Bounds = Bounds::closed(-24.0, 24.0);

/// Equalizer parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EqualizerParams {
    /// Gain at 100 Hz in dB.
    pub low_gain_db: f32,
    /// Gain at 1 kHz in dB.
    pub mid_gain_db: f32,
    /// Gain at 5 kHz in dB.
    pub high_gain_db: f32,
}

impl ParamSet for EqualizerParams {
    const KIND: EffectKind = EffectKind::Equalizer;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "low_gain_db",
            unit: "dB",
            bounds: GAIN_RANGE,
            description: "Low band gain",
        },
        FieldInfo {
            name: "mid_gain_db",
            unit: "dB",
            bounds: GAIN_RANGE,
            description: "Mid band gain",
        },
        FieldInfo {
            name: "high_gain_db",
            unit: "dB",
            bounds: GAIN_RANGE,
            description: "High band gain",
        },
    ];

    param_access!(low_gain_db, mid_gain_db, high_gain_db);
}

struct EqVoice([Biquad; 3]);

impl Effect for EqVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.0.iter_mut().fold(input, |x, band| band.process(x))
    }

    fn reset(&mut self) {
        for band in &mut self.0 {
            band.clear();
        }
    }
}

/// Three-band equalizer processor.
#[derive(Debug, Clone)]
pub struct Equalizer {
    sample_rate: f32,
}

impl Equalizer {
    /// Creates an equalizer for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    fn band(&self, index: usize, gain_db: f32) -> Biquad {
        let center = BAND_CENTERS_HZ[index].min(self.sample_rate * 0.45);
        Biquad::with_coefficients(BiquadCoefficients::peaking(
            center,
            BAND_Q,
            gain_db,
            self.sample_rate,
        ))
    }
}

impl EffectProcessor for Equalizer {
    type Params = EqualizerParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &EqualizerParams) -> Vec<f32> {
        render(
            EqVoice([
                self.band(0, params.low_gain_db),
                self.band(1, params.mid_gain_db),
                self.band(2, params.high_gain_db),
            ]),
            samples,
        )
    }
}
