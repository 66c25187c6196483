//! Frame-based feature extraction.
//!
//! [`extract_features`] computes one or all of the feature groups named by
//! [`FeatureKind`] over a shared default-sized spectrogram. Groups that were
//! not requested are left out of the serialized result.

use crate::chroma::{PITCH_CLASSES, chromagram, mean_chroma};
use crate::mel::{MEL_BANDS, MFCC_COEFFS, deltas, mfcc};
use crate::spectrogram::Spectrogram;
use crate::spectrum::{spectral_bandwidth, spectral_centroid, spectral_rolloff};
use crate::tempo::{TempoEstimate, estimate_tempo};
use crate::ROLLOFF_FRACTION;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Feature group names accepted by [`FeatureKind::from_str`].
pub const FEATURE_KINDS: [&str; 5] = ["all", "mfcc", "spectral", "rhythm", "chroma"];

/// Returned when a feature group name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown feature set '{0}', expected one of: all, mfcc, spectral, rhythm, chroma")]
pub struct UnknownFeatureKind(pub String);

/// Which feature groups to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Every group.
    #[default]
    All,
    /// Mel-frequency cepstral coefficients.
    Mfcc,
    /// Centroid, rolloff and bandwidth per frame.
    Spectral,
    /// Tempo and beat grid.
    Rhythm,
    /// Pitch class profile.
    Chroma,
}

impl FeatureKind {
    fn name(self) -> &'static str {
        match self {
            FeatureKind::All => "all",
            FeatureKind::Mfcc => "mfcc",
            FeatureKind::Spectral => "spectral",
            FeatureKind::Rhythm => "rhythm",
            FeatureKind::Chroma => "chroma",
        }
    }

    fn includes(self, group: FeatureKind) -> bool {
        self == FeatureKind::All || self == group
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FeatureKind {
    type Err = UnknownFeatureKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(FeatureKind::All),
            "mfcc" => Ok(FeatureKind::Mfcc),
            "spectral" => Ok(FeatureKind::Spectral),
            "rhythm" | "tempo" => Ok(FeatureKind::Rhythm),
            "chroma" => Ok(FeatureKind::Chroma),
            _ => Err(UnknownFeatureKind(s.to_string())),
        }
    }
}

/// Mean and standard deviation of a per-frame quantity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Mean over frames.
    pub mean: f32,
    /// Population standard deviation over frames.
    pub std: f32,
}

impl Summary {
    fn of(values: impl IntoIterator<Item = f32>) -> Self {
        let values: Vec<f32> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Cepstral statistics, one entry per coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MfccFeatures {
    /// Mean of each coefficient.
    pub mean: Vec<f32>,
    /// Standard deviation of each coefficient.
    pub std: Vec<f32>,
    /// Mean of each coefficient's frame-to-frame delta.
    pub delta_mean: Vec<f32>,
}

/// Spectral shape statistics in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralFeatures {
    /// Magnitude-weighted mean frequency.
    pub centroid: Summary,
    /// Frequency below the rolloff fraction of the energy.
    pub rolloff: Summary,
    /// Spread around the centroid.
    pub bandwidth: Summary,
}

/// Mean pitch class profile, index 0 is C.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChromaFeatures {
    /// Per-class mean of the frame-normalized chroma.
    pub mean: [f32; PITCH_CLASSES],
}

/// Extracted features for one buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSet {
    /// Group requested.
    pub kind: FeatureKind,
    /// Buffer length in seconds.
    pub duration_seconds: f64,
    /// Frames analyzed.
    pub frames: usize,
    /// Present for `all` and `mfcc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfcc: Option<MfccFeatures>,
    /// Present for `all` and `spectral`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectral: Option<SpectralFeatures>,
    /// Present for `all` and `rhythm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhythm: Option<TempoEstimate>,
    /// Present for `all` and `chroma`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chroma: Option<ChromaFeatures>,
}

/// Per-coefficient statistic over frames.
fn per_coefficient(frames: &[Vec<f32>], num_coeffs: usize) -> Vec<Summary> {
    (0..num_coeffs)
        .map(|k| Summary::of(frames.iter().map(|f| f[k])))
        .collect()
}

fn mfcc_features(spectrogram: &Spectrogram) -> MfccFeatures {
    let coeffs = mfcc(spectrogram, MEL_BANDS, MFCC_COEFFS);
    let stats = per_coefficient(&coeffs, MFCC_COEFFS);
    let delta_stats = per_coefficient(&deltas(&coeffs), MFCC_COEFFS);
    MfccFeatures {
        mean: stats.iter().map(|s| s.mean).collect(),
        std: stats.iter().map(|s| s.std).collect(),
        delta_mean: delta_stats.iter().map(|s| s.mean).collect(),
    }
}

fn spectral_features(spectrogram: &Spectrogram) -> SpectralFeatures {
    let sr = spectrogram.sample_rate;
    let frames = &spectrogram.data;
    SpectralFeatures {
        centroid: Summary::of(frames.iter().map(|f| spectral_centroid(f, sr))),
        rolloff: Summary::of(frames.iter().map(|f| spectral_rolloff(f, sr, ROLLOFF_FRACTION))),
        bandwidth: Summary::of(frames.iter().map(|f| spectral_bandwidth(f, sr))),
    }
}

/// Extracts the `kind` feature groups from `samples` at `sample_rate`.
///
/// An empty buffer yields zeroed statistics and no beats.
pub fn extract_features(samples: &[f32], sample_rate: u32, kind: FeatureKind) -> FeatureSet {
    let spectrogram = Spectrogram::with_defaults(samples, sample_rate.max(1) as f32);

    FeatureSet {
        kind,
        duration_seconds: samples.len() as f64 / f64::from(sample_rate.max(1)),
        frames: spectrogram.num_frames(),
        mfcc: kind
            .includes(FeatureKind::Mfcc)
            .then(|| mfcc_features(&spectrogram)),
        spectral: kind
            .includes(FeatureKind::Spectral)
            .then(|| spectral_features(&spectrogram)),
        rhythm: kind
            .includes(FeatureKind::Rhythm)
            .then(|| estimate_tempo(&spectrogram)),
        chroma: kind.includes(FeatureKind::Chroma).then(|| ChromaFeatures {
            mean: mean_chroma(&chromagram(&spectrogram)),
        }),
    }
}
