//! Tagged effect specifications.
//!
//! An [`EffectSpec`] names one effect kind together with its fully typed
//! parameters. In TOML and JSON the kind is the `type` key and the
//! parameters sit beside it:
//!
//! ```toml
//! type = "delay"
//! delay_time = 0.25
//! feedback = 0.4
//! ```
//!
//! Unknown keys are rejected during deserialization; missing keys take
//! the parameter struct's default.

use crate::params::{FieldInfo, ParamSet};
use crate::{
    ChorusParams, Chorus, CompressionParams, Compressor, Delay, DelayParams, Distortion,
    DistortionParams, EffectDefaults, EffectError, EffectKind, EffectProcessor, Equalizer,
    EqualizerParams, Filter, FilterParams, Flanger, FlangerParams, NormalizeParams, Normalizer,
    Phaser, PhaserParams, Reverb, ReverbParams,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One effect with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectSpec {
    /// Convolution reverb.
    Reverb(ReverbParams),
    /// Feedback echo.
    Delay(DelayParams),
    /// Waveshaper.
    Distortion(DistortionParams),
    /// Biquad filter.
    Filter(FilterParams),
    /// Compressor.
    Compression(CompressionParams),
    /// Chorus.
    Chorus(ChorusParams),
    /// Flanger.
    Flanger(FlangerParams),
    /// Phaser.
    Phaser(PhaserParams),
    /// Peak normalization.
    Normalize(NormalizeParams),
    /// Three-band equalizer.
    Equalizer(EqualizerParams),
}

/// Runs `$body` with `$p` bound to the variant's parameter struct.
macro_rules! with_params {
    ($spec:expr, $p:ident => $body:expr) => {
        match $spec {
            EffectSpec::Reverb($p) => $body,
            EffectSpec::Delay($p) => $body,
            EffectSpec::Distortion($p) => $body,
            EffectSpec::Filter($p) => $body,
            EffectSpec::Compression($p) => $body,
            EffectSpec::Chorus($p) => $body,
            EffectSpec::Flanger($p) => $body,
            EffectSpec::Phaser($p) => $body,
            EffectSpec::Normalize($p) => $body,
            EffectSpec::Equalizer($p) => $body,
        }
    };
}

fn fields_of<P: ParamSet>(_: &P) -> &'static [FieldInfo] {
    P::FIELDS
}

impl EffectSpec {
    /// The kind this spec applies.
    pub fn kind(&self) -> EffectKind {
        with_params!(self, p => kind_of(p))
    }

    /// Default parameters for `kind`, taken from `defaults`.
    pub fn default_for(kind: EffectKind, defaults: &EffectDefaults) -> Self {
        defaults.spec(kind)
    }

    /// Builds a spec from textual `key=value` pairs on top of `defaults`.
    ///
    /// Values may carry units (`"250ms"`, `"-6dB"`, `"50%"`, `"2kHz"`).
    /// Unknown keys are rejected; range checks are left to
    /// [`validate`](Self::validate).
    pub fn from_params<I, K, V>(
        kind: EffectKind,
        params: I,
        defaults: &EffectDefaults,
    ) -> Result<Self, EffectError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = defaults.spec(kind);
        for (key, value) in params {
            spec.set_text(key.as_ref().trim(), value.as_ref().trim())?;
        }
        Ok(spec)
    }

    /// Assigns one parameter from text.
    pub fn set_text(&mut self, name: &str, text: &str) -> Result<(), EffectError> {
        with_params!(self, p => p.set_text(name, text))
    }

    /// Writes a numeric parameter. Returns `false` for unknown keys.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        with_params!(self, p => p.set(name, value))
    }

    /// Reads a numeric parameter.
    pub fn get(&self, name: &str) -> Option<f32> {
        with_params!(self, p => p.get(name))
    }

    /// Numeric parameter table for this kind.
    pub fn fields(&self) -> &'static [FieldInfo] {
        with_params!(self, p => fields_of(p))
    }

    /// Checks every parameter against its documented range.
    pub fn validate(&self, sample_rate: f32) -> Result<(), EffectError> {
        with_params!(self, p => p.validate(sample_rate))
    }

    /// Validates, then processes `samples`. The input is never modified and
    /// nothing is computed when validation fails.
    pub fn apply(&self, samples: &[f32], sample_rate: f32) -> Result<Vec<f32>, EffectError> {
        self.validate(sample_rate)?;
        Ok(self.render(samples, sample_rate))
    }

    /// Processes `samples` without validating. Callers must have validated
    /// the spec at this sample rate.
    pub fn render(&self, samples: &[f32], sample_rate: f32) -> Vec<f32> {
        let sr = sample_rate;
        match self {
            EffectSpec::Reverb(p) => Reverb::new(sr).process(samples, p),
            EffectSpec::Delay(p) => Delay::new(sr).process(samples, p),
            EffectSpec::Distortion(p) => Distortion::new(sr).process(samples, p),
            EffectSpec::Filter(p) => Filter::new(sr).process(samples, p),
            EffectSpec::Compression(p) => Compressor::new(sr).process(samples, p),
            EffectSpec::Chorus(p) => Chorus::new(sr).process(samples, p),
            EffectSpec::Flanger(p) => Flanger::new(sr).process(samples, p),
            EffectSpec::Phaser(p) => Phaser::new(sr).process(samples, p),
            EffectSpec::Normalize(p) => Normalizer::new(sr).process(samples, p),
            EffectSpec::Equalizer(p) => Equalizer::new(sr).process(samples, p),
        }
    }
}

fn kind_of<P: ParamSet>(_: &P) -> EffectKind {
    P::KIND
}

impl fmt::Display for EffectSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        for (i, field) in self.fields().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(value) = self.get(field.name) {
                write!(f, "{}={}", field.name, value)?;
            }
        }
        if let EffectSpec::Filter(p) = self {
            write!(f, ", filter_type={}", p.filter_type)?;
        }
        f.write_str(")")
    }
}

macro_rules! spec_from {
    ($($params:ident => $variant:ident),* $(,)?) => {
        $(impl From<$params> for EffectSpec {
            fn from(params: $params) -> Self {
                EffectSpec::$variant(params)
            }
        })*
    };
}

spec_from!(
    ReverbParams => Reverb,
    DelayParams => Delay,
    DistortionParams => Distortion,
    FilterParams => Filter,
    CompressionParams => Compression,
    ChorusParams => Chorus,
    FlangerParams => Flanger,
    PhaserParams => Phaser,
    NormalizeParams => Normalize,
    EqualizerParams => Equalizer,
);
