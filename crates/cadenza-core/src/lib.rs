//! Cadenza Core - sample storage and DSP primitives
//!
//! This crate holds the pieces every other cadenza crate builds on: the
//! per-session circular [`SampleBuffer`] and the small DSP building blocks the
//! effect processors are assembled from.
//!
//! # Sample Storage
//!
//! - [`SampleBuffer`] - Fixed-capacity FIFO that never overwrites unread data
//! - [`BufferStatus`] - Counters snapshot for status queries
//!
//! # Processing
//!
//! - [`Effect`] - Object-safe per-sample processing trait
//!
//! ## Filters
//!
//! - [`Biquad`] / [`BiquadCoefficients`] - RBJ cookbook second-order sections
//! - [`OnePole`] - 6 dB/oct lowpass for tone controls
//! - [`FirstOrderAllpass`] - Phase-shifting section for phasers
//! - [`CombFilter`] - Feedback comb for echoes
//!
//! ## Delay, Modulation & Dynamics
//!
//! - [`InterpolatedDelay`] - Fractional-read delay line
//! - [`Lfo`] - Sine low frequency oscillator
//! - [`EnvelopeFollower`] - Attack/release peak detector
//!
//! ## Utilities
//!
//! [`db_to_linear`], [`linear_to_db`], [`soft_clip`], [`flush_denormal`],
//! [`wet_dry_mix`], [`peak_abs`].

pub mod allpass;
pub mod biquad;
pub mod comb;
pub mod delay;
pub mod effect;
pub mod envelope;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod sample_buffer;

pub use allpass::FirstOrderAllpass;
pub use biquad::{Biquad, BiquadCoefficients};
pub use comb::CombFilter;
pub use delay::{InterpolatedDelay, Interpolation};
pub use effect::Effect;
pub use envelope::EnvelopeFollower;
pub use lfo::Lfo;
pub use math::{db_to_linear, flush_denormal, linear_to_db, peak_abs, soft_clip, wet_dry_mix};
pub use one_pole::OnePole;
pub use sample_buffer::{BufferStatus, SampleBuffer};
