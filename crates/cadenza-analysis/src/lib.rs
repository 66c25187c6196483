//! Cadenza Analysis - FFT convolution and signal measurements
//!
//! - [`fft`] - Planned forward/inverse FFT over `rustfft`
//! - [`convolve`] - Zero-padded FFT convolution, used by the reverb
//! - [`dynamics`] - RMS, peak, crest factor, zero-crossing rate
//! - [`spectrum`] - Magnitude spectrum, spectral centroid, rolloff and bandwidth
//! - [`spectrogram`] - Short-time Fourier frames
//! - [`mel`] - Mel filterbank and MFCCs
//! - [`chroma`] - Pitch class profiles
//! - [`tempo`] - Onset envelope, tempo and beats
//! - [`features`] - Grouped feature extraction over a spectrogram
//!
//! [`AudioAnalysis::of`] bundles the scalar measurements for one buffer.
//!
//! ```rust
//! use cadenza_analysis::AudioAnalysis;
//!
//! let tone: Vec<f32> = (0..4410)
//!     .map(|i| (2.0 * std::f32::consts::PI * 441.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! let analysis = AudioAnalysis::of(&tone, 44100);
//! assert!((analysis.peak - 1.0).abs() < 1e-3);
//! ```

pub mod chroma;
pub mod convolve;
pub mod dynamics;
pub mod features;
pub mod fft;
pub mod mel;
pub mod spectrogram;
pub mod spectrum;
pub mod tempo;

pub use convolve::{fft_convolve, fft_convolve_truncated};
pub use dynamics::{crest_factor, peak, rms, zero_crossing_rate};
pub use features::{FeatureKind, FeatureSet, UnknownFeatureKind, extract_features};
pub use fft::Fft;
pub use spectrogram::Spectrogram;
pub use spectrum::{magnitude_spectrum, spectral_bandwidth, spectral_centroid, spectral_rolloff};
pub use tempo::TempoEstimate;

use serde::Serialize;

/// Fraction of spectral energy used for [`AudioAnalysis::spectral_rolloff`].
pub const ROLLOFF_FRACTION: f32 = 0.85;

/// Largest FFT used for the spectral measurements.
const MAX_ANALYSIS_FFT: usize = 1 << 16;

/// Scalar measurements of one mono buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AudioAnalysis {
    /// Root mean square level, linear.
    pub rms: f32,
    /// Largest absolute sample.
    pub peak: f32,
    /// `peak / rms`, 0 for silence.
    pub crest_factor: f32,
    /// Sign changes per sample.
    pub zero_crossing_rate: f32,
    /// Magnitude-weighted mean frequency in Hz.
    pub spectral_centroid: f32,
    /// Frequency below which 85% of the energy lies, in Hz.
    pub spectral_rolloff: f32,
    /// Length in seconds.
    pub duration_seconds: f64,
}

impl AudioAnalysis {
    /// Measures `samples` interpreted at `sample_rate`.
    pub fn of(samples: &[f32], sample_rate: u32) -> Self {
        let sr = sample_rate.max(1) as f32;

        let (spectral_centroid, spectral_rolloff) = if samples.is_empty() {
            (0.0, 0.0)
        } else {
            let fft_size = samples.len().next_power_of_two().clamp(2, MAX_ANALYSIS_FFT);
            let spectrum = magnitude_spectrum(samples, fft_size);
            (
                spectral_centroid(&spectrum, sr),
                spectral_rolloff(&spectrum, sr, ROLLOFF_FRACTION),
            )
        };

        Self {
            rms: rms(samples),
            peak: peak(samples),
            crest_factor: crest_factor(samples),
            zero_crossing_rate: zero_crossing_rate(samples),
            spectral_centroid,
            spectral_rolloff,
            duration_seconds: samples.len() as f64 / f64::from(sample_rate.max(1)),
        }
    }
}
