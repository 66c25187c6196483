//! Spectral shape measurements.

use crate::fft::{Fft, apply_hann};

/// Hann-windowed magnitude spectrum, `fft_size / 2 + 1` bins (DC to Nyquist).
///
/// The signal is truncated or zero-padded to `fft_size`.
pub fn magnitude_spectrum(signal: &[f32], fft_size: usize) -> Vec<f32> {
    let used = signal.len().min(fft_size);
    let mut windowed = signal[..used].to_vec();
    apply_hann(&mut windowed);

    let fft = Fft::new(fft_size);
    fft.forward_real(&windowed)
        .iter()
        .take(fft_size / 2 + 1)
        .map(|c| c.norm())
        .collect()
}

fn bin_width(spectrum: &[f32], sample_rate: f32) -> f32 {
    let fft_size = (spectrum.len().max(2) - 1) * 2;
    sample_rate / fft_size as f32
}

/// Magnitude-weighted mean frequency in Hz, 0 for a silent spectrum.
pub fn spectral_centroid(spectrum: &[f32], sample_rate: f32) -> f32 {
    let width = bin_width(spectrum, sample_rate);

    let mut weighted_sum = 0.0;
    let mut magnitude_sum = 0.0;
    for (i, &mag) in spectrum.iter().enumerate() {
        weighted_sum += i as f32 * width * mag;
        magnitude_sum += mag;
    }

    if magnitude_sum > 1e-10 {
        weighted_sum / magnitude_sum
    } else {
        0.0
    }
}

/// Frequency below which `fraction` of the spectral energy lies.
///
/// Returns 0 for a silent spectrum.
pub fn spectral_rolloff(spectrum: &[f32], sample_rate: f32, fraction: f32) -> f32 {
    let width = bin_width(spectrum, sample_rate);

    let total_energy: f32 = spectrum.iter().map(|&m| m * m).sum();
    if total_energy <= 1e-20 {
        return 0.0;
    }
    let threshold = total_energy * fraction;

    let mut cumulative = 0.0;
    for (i, &mag) in spectrum.iter().enumerate() {
        cumulative += mag * mag;
        if cumulative >= threshold {
            return i as f32 * width;
        }
    }
    sample_rate / 2.0
}

/// Magnitude-weighted spread around the centroid in Hz, 0 for silence.
pub fn spectral_bandwidth(spectrum: &[f32], sample_rate: f32) -> f32 {
    let width = bin_width(spectrum, sample_rate);
    let magnitude_sum: f32 = spectrum.iter().sum();
    if magnitude_sum <= 1e-10 {
        return 0.0;
    }

    let centroid = spectral_centroid(spectrum, sample_rate);
    let variance: f32 = spectrum
        .iter()
        .enumerate()
        .map(|(i, &mag)| {
            let d = i as f32 * width - centroid;
            mag * d * d
        })
        .sum::<f32>()
        / magnitude_sum;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_length() {
        let spectrum = magnitude_spectrum(&[0.5; 100], 256);
        assert_eq!(spectrum.len(), 129);
    }

    #[test]
    fn test_centroid_weights_bins() {
        // Bins at 0 Hz and 1000 Hz with equal weight.
        let mut spectrum = vec![0.0; 5];
        spectrum[0] = 1.0;
        spectrum[4] = 1.0;
        assert!((spectral_centroid(&spectrum, 2000.0) - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_rolloff_low_energy_concentration() {
        let mut spectrum = vec![0.0; 9];
        spectrum[1] = 1.0;
        let rolloff = spectral_rolloff(&spectrum, 1600.0, 0.85);
        assert!((rolloff - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_bandwidth_of_two_bins() {
        let mut spectrum = vec![0.0; 5];
        spectrum[0] = 1.0;
        spectrum[4] = 1.0;
        assert!((spectral_bandwidth(&spectrum, 2000.0) - 500.0).abs() < 1e-3);

        let mut single = vec![0.0; 5];
        single[2] = 3.0;
        assert!(spectral_bandwidth(&single, 2000.0) < 1e-3);
        assert_eq!(spectral_bandwidth(&[0.0; 5], 2000.0), 0.0);
    }

    #[test]
    fn test_rolloff_silence() {
        assert_eq!(spectral_rolloff(&[0.0; 9], 1600.0, 0.85), 0.0);
    }
}
