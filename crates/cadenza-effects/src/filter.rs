//! Resonant biquad filter.
//!
//! `resonance` in [0, 1] maps linearly to Q in [0.707, 5.0]; 0 gives a
//! Butterworth response.

use crate::params::{Bounds, FieldInfo, ParamSet, set_numeric_text};
use crate::processor::render;
use crate::{EffectError, EffectKind, EffectProcessor};
use cadenza_core::{Biquad, BiquadCoefficients, Effect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MIN_Q: f32 = core::f32::consts::FRAC_1_SQRT_2;
const MAX_Q: f32 = 5.0;

/// Filter response shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Pass below cutoff
    #[default]
    Lowpass,
    /// Pass above cutoff
    Highpass,
    /// Pass around cutoff
    Bandpass,
    /// Reject around cutoff
    Notch,
}

impl FilterType {
    fn name(self) -> &'static str {
        match self {
            FilterType::Lowpass => "lowpass",
            FilterType::Highpass => "highpass",
            FilterType::Bandpass => "bandpass",
            FilterType::Notch => "notch",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterType {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lowpass" | "lp" => Ok(FilterType::Lowpass),
            "highpass" | "hp" => Ok(FilterType::Highpass),
            "bandpass" | "bp" => Ok(FilterType::Bandpass),
            "notch" => Ok(FilterType::Notch),
            _ => Err(EffectError::MalformedValue {
                param: "filter_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Filter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterParams {
    /// Cutoff or centre frequency in Hz, above 0 and below Nyquist.
    pub cutoff: f32,
    /// Emphasis at the cutoff, [0, 1].
    pub resonance: f32,
    /// Response shape.
    pub filter_type: FilterType,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff: 1000.0,
            resonance: 0.0,
            filter_type: FilterType::Lowpass,
        }
    }
}

impl FilterParams {
    /// Q derived from `resonance`.
    pub fn q(&self) -> f32 {
        MIN_Q + (MAX_Q - MIN_Q) * self.resonance
    }
}

impl ParamSet for FilterParams {
    const KIND: EffectKind = EffectKind::Filter;
    const FIELDS: &'static [FieldInfo] = &[
        FieldInfo {
            name: "cutoff",
            unit: "Hz",
            bounds: Bounds::positive(96000.0),
            description: "Cutoff frequency, below Nyquist",
        },
        FieldInfo {
            name: "resonance",
            unit: "",
            bounds: Bounds::closed(0.0, 1.0),
            description: "Emphasis at the cutoff",
        },
    ];

    param_access!(cutoff, resonance);

    fn set_text(&mut self, name: &str, text: &str) -> Result<(), EffectError> {
        if name == "filter_type" || name == "type" {
            self.filter_type = text.parse()?;
            return Ok(());
        }
        set_numeric_text(self, name, text)
    }

    fn validate_extra(&self, sample_rate: f32) -> Result<(), EffectError> {
        let nyquist = sample_rate / 2.0;
        if self.cutoff >= nyquist {
            return Err(EffectError::invalid(
                Self::KIND.name(),
                "cutoff",
                self.cutoff,
                format!("must be below Nyquist ({} Hz)", nyquist),
            ));
        }
        Ok(())
    }
}

struct BiquadVoice(Biquad);

impl Effect for BiquadVoice {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.0.process(input)
    }

    fn reset(&mut self) {
        self.0.clear();
    }
}

/// Biquad filter processor.
#[derive(Debug, Clone)]
pub struct Filter {
    sample_rate: f32,
}

impl Filter {
    /// Creates a filter for `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }

    /// Coefficients for `params`.
    pub fn design(&self, params: &FilterParams) -> BiquadCoefficients {
        let (f, q, sr) = (params.cutoff, params.q(), self.sample_rate);
        match params.filter_type {
            FilterType::Lowpass => BiquadCoefficients::lowpass(f, q, sr),
            FilterType::Highpass => BiquadCoefficients::highpass(f, q, sr),
            FilterType::Bandpass => BiquadCoefficients::bandpass(f, q, sr),
            FilterType::Notch => BiquadCoefficients::notch(f, q, sr),
        }
    }
}

impl EffectProcessor for Filter {
    type Params = FilterParams;

    fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    fn process(&self, samples: &[f32], params: &FilterParams) -> Vec<f32> {
        render(BiquadVoice(Biquad::with_coefficients(self.design(params))), samples)
    }
}
