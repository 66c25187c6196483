//! Mel filterbank and cepstral coefficients.

use crate::spectrogram::Spectrogram;
use std::f32::consts::PI;

/// Triangular bands in the default filterbank.
pub const MEL_BANDS: usize = 40;

/// Cepstral coefficients kept per frame.
pub const MFCC_COEFFS: usize = 13;

/// Converts Hz to mel (HTK scale).
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

/// Converts mel (HTK scale) to Hz.
pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters spaced evenly on the mel scale, `filters[band][bin]`.
#[derive(Debug, Clone)]
pub struct MelFilterbank {
    filters: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Builds `num_bands` filters over `fft_size / 2 + 1` bins between
    /// `fmin` and `fmax` Hz.
    pub fn new(num_bands: usize, fft_size: usize, sample_rate: f32, fmin: f32, fmax: f32) -> Self {
        let num_bins = fft_size / 2 + 1;
        let fmax = fmax.min(sample_rate / 2.0);
        let mel_lo = hz_to_mel(fmin.max(0.0));
        let mel_hi = hz_to_mel(fmax);

        let edges: Vec<f32> = (0..num_bands + 2)
            .map(|i| mel_to_hz(mel_lo + (mel_hi - mel_lo) * i as f32 / (num_bands + 1) as f32))
            .collect();

        let filters = edges
            .windows(3)
            .map(|w| {
                let (lower, center, upper) = (w[0], w[1], w[2]);
                (0..num_bins)
                    .map(|bin| {
                        let f = bin as f32 * sample_rate / fft_size as f32;
                        if f > lower && f <= center {
                            (f - lower) / (center - lower)
                        } else if f > center && f < upper {
                            (upper - f) / (upper - center)
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();

        Self { filters }
    }

    /// Filterbank matching a spectrogram's frame size and sample rate.
    pub fn for_spectrogram(spectrogram: &Spectrogram, num_bands: usize) -> Self {
        Self::new(
            num_bands,
            spectrogram.fft_size,
            spectrogram.sample_rate,
            0.0,
            spectrogram.sample_rate / 2.0,
        )
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.filters.len()
    }

    /// Band energies of one power spectrum.
    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| filter.iter().zip(power).map(|(w, p)| w * p).sum())
            .collect()
    }
}

/// Orthonormal DCT-II of `input`, first `num_coeffs` outputs.
fn dct2(input: &[f32], num_coeffs: usize) -> Vec<f32> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; num_coeffs];
    }
    (0..num_coeffs)
        .map(|k| {
            let sum: f32 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI * k as f32 * (i as f32 + 0.5) / n as f32).cos())
                .sum();
            let scale = if k == 0 { (1.0 / n as f32).sqrt() } else { (2.0 / n as f32).sqrt() };
            sum * scale
        })
        .collect()
}

/// MFCCs per frame, `result[frame][coeff]`.
pub fn mfcc(spectrogram: &Spectrogram, num_bands: usize, num_coeffs: usize) -> Vec<Vec<f32>> {
    let bank = MelFilterbank::for_spectrogram(spectrogram, num_bands);
    spectrogram
        .data
        .iter()
        .map(|frame| {
            let power: Vec<f32> = frame.iter().map(|m| m * m).collect();
            let log_mel: Vec<f32> = bank.apply(&power).iter().map(|e| (e + 1e-10).ln()).collect();
            dct2(&log_mel, num_coeffs)
        })
        .collect()
}

/// Central differences along time, `result[frame][coeff]`.
///
/// Edge frames use one-sided differences; a single frame yields zeros.
pub fn deltas(frames: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let n = frames.len();
    (0..n)
        .map(|t| {
            let prev = &frames[t.saturating_sub(1)];
            let next = &frames[(t + 1).min(n - 1)];
            let span = ((t + 1).min(n - 1) - t.saturating_sub(1)).max(1) as f32;
            next.iter().zip(prev).map(|(a, b)| (a - b) / span).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_roundtrip() {
        for hz in [0.0, 440.0, 1000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 0.5);
        }
        assert!((hz_to_mel(1000.0) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_filters_peak_at_one_and_stay_in_range() {
        let bank = MelFilterbank::new(20, 1024, 16000.0, 0.0, 8000.0);
        assert_eq!(bank.num_bands(), 20);
        for filter in &bank.filters {
            assert_eq!(filter.len(), 513);
            let max = filter.iter().copied().fold(0.0f32, f32::max);
            assert!(max > 0.5 && max <= 1.0, "max {}", max);
            assert!(filter.iter().all(|&w| w >= 0.0));
        }
    }

    #[test]
    fn test_dct_of_constant_has_only_dc() {
        let out = dct2(&[2.0; 8], 4);
        assert!((out[0] - 2.0 * 8f32.sqrt()).abs() < 1e-4);
        for c in &out[1..] {
            assert!(c.abs() < 1e-4);
        }
    }

    #[test]
    fn test_mfcc_shape() {
        let signal: Vec<f32> = (0..8192).map(|i| (i as f32 * 0.05).sin()).collect();
        let s = Spectrogram::analyze(&signal, 22050.0, 1024, 512);
        let coeffs = mfcc(&s, MEL_BANDS, MFCC_COEFFS);
        assert_eq!(coeffs.len(), s.num_frames());
        assert!(coeffs.iter().all(|f| f.len() == MFCC_COEFFS));
        assert!(coeffs.iter().flatten().all(|c| c.is_finite()));
    }

    #[test]
    fn test_deltas_of_ramp() {
        let frames: Vec<Vec<f32>> = (0..5).map(|t| vec![t as f32 * 2.0]).collect();
        let d = deltas(&frames);
        assert!(d.iter().all(|f| (f[0] - 2.0).abs() < 1e-6));
        assert_eq!(deltas(&[vec![1.0]]), vec![vec![0.0]]);
    }
}
