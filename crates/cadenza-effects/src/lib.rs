//! Cadenza Effects - validated effect specifications and block processors.
//!
//! Every effect is described twice: as a typed parameter struct with
//! documented ranges (collected in the [`EffectSpec`] tagged enum), and as
//! an [`EffectProcessor`] that renders a whole buffer from those
//! parameters.
//!
//! - [`Reverb`] - FFT convolution with a decaying room response
//! - [`Delay`] - feedback echo
//! - [`Distortion`] - tanh waveshaper with tone control
//! - [`Filter`] - resonant biquad (lowpass, highpass, bandpass, notch)
//! - [`Compressor`] - envelope-driven gain reduction
//! - [`Chorus`], [`Flanger`], [`Phaser`] - LFO-modulated effects
//! - [`Normalizer`] - peak normalization
//! - [`Equalizer`] - three-band peaking EQ
//!
//! ## Example
//!
//! ```rust
//! use cadenza_effects::{EffectDefaults, EffectKind, EffectSpec};
//!
//! let spec = EffectSpec::from_params(
//!     EffectKind::Normalize,
//!     [("target_level", "-3dB")],
//!     &EffectDefaults::default(),
//! )
//! .unwrap();
//!
//! let out = spec.apply(&[0.1, -0.05], 44100.0).unwrap();
//! assert_eq!(out.len(), 2);
//! ```
//!
//! Validation always runs before processing; a rejected spec never touches
//! the samples.

#[macro_use]
mod params;

mod catalog;
mod chain;
mod chorus;
mod compression;
mod defaults;
mod delay;
mod distortion;
mod equalizer;
mod error;
mod filter;
mod flanger;
mod kind;
mod normalize;
mod phaser;
mod processor;
mod reverb;
mod spec;

pub use catalog::{EffectInfo, ParamInfo, catalog, effect_info};
pub use chain::{
    DEFAULT_MAX_CHAIN_LEN, apply_chain, parse_chain, parse_effect, parse_pairs, validate_chain,
};
pub use chorus::{Chorus, ChorusParams};
pub use compression::{CompressionParams, Compressor};
pub use defaults::EffectDefaults;
pub use delay::{Delay, DelayParams};
pub use distortion::{Distortion, DistortionParams};
pub use equalizer::{Equalizer, EqualizerParams};
pub use error::EffectError;
pub use filter::{Filter, FilterParams, FilterType};
pub use flanger::{Flanger, FlangerParams};
pub use kind::EffectKind;
pub use normalize::{NormalizeParams, Normalizer};
pub use params::{Bounds, FieldInfo, ParamSet, parse_param_value};
pub use phaser::{Phaser, PhaserParams};
pub use processor::EffectProcessor;
pub use reverb::{Reverb, ReverbParams};
pub use spec::EffectSpec;
