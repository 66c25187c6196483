//! Effect kind tags.

use crate::EffectError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The algorithms an [`EffectSpec`](crate::EffectSpec) can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Convolution reverb
    Reverb,
    /// Feedback echo
    Delay,
    /// Soft-clipping waveshaper
    Distortion,
    /// Biquad filter
    Filter,
    /// Dynamics compressor
    Compression,
    /// Dual-voice modulated delay
    Chorus,
    /// Short modulated delay with feedback
    Flanger,
    /// Swept allpass chain
    Phaser,
    /// Peak normalisation
    Normalize,
    /// Three-band peaking equalizer
    Equalizer,
}

impl EffectKind {
    /// Every kind, in catalog order.
    pub const ALL: [EffectKind; 10] = [
        EffectKind::Reverb,
        EffectKind::Delay,
        EffectKind::Distortion,
        EffectKind::Filter,
        EffectKind::Compression,
        EffectKind::Chorus,
        EffectKind::Flanger,
        EffectKind::Phaser,
        EffectKind::Normalize,
        EffectKind::Equalizer,
    ];

    /// Lowercase identifier used in configs, CLIs and file names.
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Reverb => "reverb",
            EffectKind::Delay => "delay",
            EffectKind::Distortion => "distortion",
            EffectKind::Filter => "filter",
            EffectKind::Compression => "compression",
            EffectKind::Chorus => "chorus",
            EffectKind::Flanger => "flanger",
            EffectKind::Phaser => "phaser",
            EffectKind::Normalize => "normalize",
            EffectKind::Equalizer => "equalizer",
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            EffectKind::Reverb => "Convolution with an exponentially decaying room response",
            EffectKind::Delay => "Feedback echo mixed with the dry signal",
            EffectKind::Distortion => "tanh waveshaper with post-shaping tone control",
            EffectKind::Filter => "Resonant biquad (lowpass, highpass, bandpass, notch)",
            EffectKind::Compression => "Envelope-driven gain reduction above a threshold",
            EffectKind::Chorus => "Two LFO-swept delay voices in quadrature",
            EffectKind::Flanger => "Short swept delay with feedback",
            EffectKind::Phaser => "Six allpass stages with an LFO-swept break frequency",
            EffectKind::Normalize => "Single gain bringing the peak to a target level",
            EffectKind::Equalizer => "Peaking bands at 100 Hz, 1 kHz and 5 kHz",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = EffectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let kind = match lower.as_str() {
            "reverb" => EffectKind::Reverb,
            "delay" | "echo" => EffectKind::Delay,
            "distortion" => EffectKind::Distortion,
            "filter" => EffectKind::Filter,
            "compression" | "compressor" => EffectKind::Compression,
            "chorus" => EffectKind::Chorus,
            "flanger" => EffectKind::Flanger,
            "phaser" => EffectKind::Phaser,
            "normalize" | "normalise" => EffectKind::Normalize,
            "equalizer" | "eq" => EffectKind::Equalizer,
            _ => return Err(EffectError::UnknownEffect(s.to_string())),
        };
        Ok(kind)
    }
}
