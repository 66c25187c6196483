//! Per-kind default parameters, loaded from the `[effects]` config table.

use crate::params::ParamSet;
use crate::{
    ChorusParams, CompressionParams, DelayParams, DistortionParams, EffectError, EffectKind,
    EffectSpec, EqualizerParams, FilterParams, FlangerParams, NormalizeParams, PhaserParams,
    ReverbParams,
};
use serde::{Deserialize, Serialize};

/// Default parameter set for every effect kind.
///
/// ```toml
/// [effects.reverb]
/// room_size = 0.7
///
/// [effects.compression]
/// threshold_db = -18.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(missing_docs)]
pub struct EffectDefaults {
    pub reverb: ReverbParams,
    pub delay: DelayParams,
    pub distortion: DistortionParams,
    pub filter: FilterParams,
    pub compression: CompressionParams,
    pub chorus: ChorusParams,
    pub flanger: FlangerParams,
    pub phaser: PhaserParams,
    pub normalize: NormalizeParams,
    pub equalizer: EqualizerParams,
}

impl EffectDefaults {
    /// The configured spec for `kind`.
    pub fn spec(&self, kind: EffectKind) -> EffectSpec {
        match kind {
            EffectKind::Reverb => EffectSpec::Reverb(self.reverb.clone()),
            EffectKind::Delay => EffectSpec::Delay(self.delay.clone()),
            EffectKind::Distortion => EffectSpec::Distortion(self.distortion.clone()),
            EffectKind::Filter => EffectSpec::Filter(self.filter.clone()),
            EffectKind::Compression => EffectSpec::Compression(self.compression.clone()),
            EffectKind::Chorus => EffectSpec::Chorus(self.chorus.clone()),
            EffectKind::Flanger => EffectSpec::Flanger(self.flanger.clone()),
            EffectKind::Phaser => EffectSpec::Phaser(self.phaser.clone()),
            EffectKind::Normalize => EffectSpec::Normalize(self.normalize.clone()),
            EffectKind::Equalizer => EffectSpec::Equalizer(self.equalizer.clone()),
        }
    }

    /// Validates every table at `sample_rate`.
    pub fn validate(&self, sample_rate: f32) -> Result<(), EffectError> {
        self.reverb.validate(sample_rate)?;
        self.delay.validate(sample_rate)?;
        self.distortion.validate(sample_rate)?;
        self.filter.validate(sample_rate)?;
        self.compression.validate(sample_rate)?;
        self.chorus.validate(sample_rate)?;
        self.flanger.validate(sample_rate)?;
        self.phaser.validate(sample_rate)?;
        self.normalize.validate(sample_rate)?;
        self.equalizer.validate(sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_defaults_are_valid() {
        EffectDefaults::default().validate(44100.0).unwrap();
        EffectDefaults::default().validate(8000.0).unwrap();
    }

    #[test]
    fn test_partial_table() {
        let defaults: EffectDefaults = toml::from_str("[delay]\nfeedback = 0.6\n").unwrap();
        assert_eq!(defaults.delay.feedback, 0.6);
        assert_eq!(defaults.delay.delay_time, DelayParams::default().delay_time);
        assert_eq!(defaults.reverb, ReverbParams::default());
    }

    #[test]
    fn test_unknown_table_rejected() {
        let result: Result<EffectDefaults, _> = toml::from_str("[tremolo]\nrate = 2.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_default_reported() {
        let mut defaults = EffectDefaults::default();
        defaults.filter.cutoff = 30000.0;
        assert!(defaults.validate(44100.0).is_err());
    }
}
