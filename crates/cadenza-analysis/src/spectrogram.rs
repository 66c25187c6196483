//! Short-time Fourier analysis.
//!
//! Frames are Hann-windowed and advanced by a fixed hop. A signal shorter
//! than one frame yields a single zero-padded frame so that every
//! non-empty buffer has at least one spectrum to measure.

use crate::fft::{Fft, apply_hann};

/// Default frame length for feature extraction.
pub const FRAME_SIZE: usize = 2048;

/// Default hop between frames.
pub const HOP_SIZE: usize = 512;

/// Magnitude spectrogram, `data[frame][bin]`.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Magnitudes per frame, `fft_size / 2 + 1` bins each.
    pub data: Vec<Vec<f32>>,
    /// Frame length in samples.
    pub fft_size: usize,
    /// Samples between frame starts.
    pub hop_size: usize,
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl Spectrogram {
    /// Analyzes `signal` with frames of `fft_size` every `hop_size` samples.
    pub fn analyze(signal: &[f32], sample_rate: f32, fft_size: usize, hop_size: usize) -> Self {
        let fft_size = fft_size.max(2);
        let hop_size = hop_size.max(1);

        let num_frames = match signal.len() {
            0 => 0,
            n if n <= fft_size => 1,
            n => (n - fft_size) / hop_size + 1,
        };

        let fft = Fft::new(fft_size);
        let num_bins = fft_size / 2 + 1;
        let mut data = Vec::with_capacity(num_frames);
        let mut frame = vec![0.0f32; fft_size];

        for frame_idx in 0..num_frames {
            let start = frame_idx * hop_size;
            let end = (start + fft_size).min(signal.len());

            frame.fill(0.0);
            frame[..end - start].copy_from_slice(&signal[start..end]);
            apply_hann(&mut frame);

            let spectrum = fft.forward_real(&frame);
            data.push(spectrum.iter().take(num_bins).map(|c| c.norm()).collect());
        }

        Self {
            data,
            fft_size,
            hop_size,
            sample_rate,
        }
    }

    /// Analyzes with [`FRAME_SIZE`] and [`HOP_SIZE`].
    pub fn with_defaults(signal: &[f32], sample_rate: f32) -> Self {
        Self::analyze(signal, sample_rate, FRAME_SIZE, HOP_SIZE)
    }

    /// Number of frames.
    pub fn num_frames(&self) -> usize {
        self.data.len()
    }

    /// Bins per frame.
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_to_freq(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / self.fft_size as f32
    }

    /// Start time of `frame` in seconds.
    pub fn frame_to_time(&self, frame: usize) -> f32 {
        (frame * self.hop_size) as f32 / self.sample_rate
    }

    /// Frames analyzed per second.
    pub fn frame_rate(&self) -> f32 {
        self.sample_rate / self.hop_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_frame_count() {
        let s = Spectrogram::analyze(&[0.0; 4096], 44100.0, 1024, 256);
        assert_eq!(s.num_frames(), (4096 - 1024) / 256 + 1);
        assert_eq!(s.data[0].len(), 513);
    }

    #[test]
    fn test_short_signal_has_one_frame() {
        let s = Spectrogram::with_defaults(&[0.5; 100], 44100.0);
        assert_eq!(s.num_frames(), 1);
        assert_eq!(Spectrogram::with_defaults(&[], 44100.0).num_frames(), 0);
    }

    #[test]
    fn test_peak_bin_matches_tone() {
        let sr = 8192.0;
        let tone: Vec<f32> = (0..8192).map(|i| (2.0 * PI * 1000.0 * i as f32 / sr).sin()).collect();
        let s = Spectrogram::analyze(&tone, sr, 1024, 512);
        let frame = &s.data[3];
        let peak = frame
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!((s.bin_to_freq(peak) - 1000.0).abs() <= 8.0);
        assert!((s.frame_to_time(2) - 1024.0 / sr).abs() < 1e-6);
    }
}
