//! Onset strength, tempo and beat estimation.
//!
//! Tempo is the autocorrelation peak of the spectral-flux onset envelope
//! between [`MIN_BPM`] and [`MAX_BPM`]. Beats are placed on the lag grid at
//! the phase that collects the most onset strength.

use crate::spectrogram::Spectrogram;
use serde::Serialize;

/// Slowest tempo considered.
pub const MIN_BPM: f32 = 60.0;

/// Fastest tempo considered.
pub const MAX_BPM: f32 = 200.0;

/// Estimated tempo and beat grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TempoEstimate {
    /// Beats per minute, 0 when no periodicity was found.
    pub bpm: f32,
    /// Frame index of each beat.
    pub beat_frames: Vec<usize>,
    /// Start time of each beat in seconds.
    pub beat_times: Vec<f32>,
}

/// Positive log-magnitude flux per frame; frame 0 is 0.
pub fn onset_envelope(spectrogram: &Spectrogram) -> Vec<f32> {
    let mut envelope = Vec::with_capacity(spectrogram.num_frames());
    let mut previous: Option<Vec<f32>> = None;

    for frame in &spectrogram.data {
        let current: Vec<f32> = frame.iter().map(|m| m.ln_1p()).collect();
        let flux = previous.as_ref().map_or(0.0, |prev| {
            current
                .iter()
                .zip(prev)
                .map(|(c, p)| (c - p).max(0.0))
                .sum()
        });
        envelope.push(flux);
        previous = Some(current);
    }
    envelope
}

/// Tempo and beats of a spectrogram.
pub fn estimate_tempo(spectrogram: &Spectrogram) -> TempoEstimate {
    let envelope = onset_envelope(spectrogram);
    let frame_rate = spectrogram.frame_rate();

    let min_lag = ((60.0 * frame_rate / MAX_BPM).round() as usize).max(1);
    let max_lag = (60.0 * frame_rate / MIN_BPM).round() as usize;
    if envelope.len() <= min_lag {
        return TempoEstimate::default();
    }

    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let centred: Vec<f32> = envelope.iter().map(|e| e - mean).collect();

    let mut best: Option<(usize, f32)> = None;
    for lag in min_lag..=max_lag.min(centred.len() - 1) {
        let score: f32 = centred[lag..]
            .iter()
            .zip(&centred)
            .map(|(a, b)| a * b)
            .sum();
        if score > 0.0 && best.is_none_or(|(_, s)| score > s) {
            best = Some((lag, score));
        }
    }

    let Some((lag, _)) = best else {
        return TempoEstimate::default();
    };

    let phase = (0..lag)
        .map(|p| (p, envelope[p..].iter().step_by(lag).sum::<f32>()))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(p, _)| p);

    let beat_frames: Vec<usize> = (phase..envelope.len()).step_by(lag).collect();
    let beat_times = beat_frames
        .iter()
        .map(|&f| spectrogram.frame_to_time(f))
        .collect();

    TempoEstimate {
        bpm: 60.0 * frame_rate / lag as f32,
        beat_frames,
        beat_times,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Short bursts every `period` samples, starting at `offset`.
    fn click_track(len: usize, period: usize, offset: usize) -> Vec<f32> {
        let mut signal = vec![0.0f32; len];
        let mut start = offset;
        while start + 64 < len {
            for (i, s) in signal[start..start + 64].iter_mut().enumerate() {
                *s = if i % 2 == 0 { 0.8 } else { -0.8 };
            }
            start += period;
        }
        signal
    }

    #[test]
    fn test_click_track_at_120_bpm() {
        // 40 frames per second, one click every 20 frames.
        let sr = 20480.0;
        let signal = click_track(20480 * 10, 10240, 5120);
        let s = Spectrogram::analyze(&signal, sr, 2048, 512);

        let tempo = estimate_tempo(&s);
        assert!((tempo.bpm - 120.0).abs() < 1.0, "bpm {}", tempo.bpm);
        assert!(tempo.beat_times.len() >= 15);
        for pair in tempo.beat_times.windows(2) {
            assert!((pair[1] - pair[0] - 0.5).abs() < 1e-3);
        }
    }

    #[test]
    fn test_silence_has_no_tempo() {
        let s = Spectrogram::analyze(&vec![0.0; 44100], 44100.0, 2048, 512);
        assert_eq!(estimate_tempo(&s), TempoEstimate::default());
    }

    #[test]
    fn test_too_short_for_tempo() {
        let s = Spectrogram::analyze(&[0.3; 1000], 44100.0, 2048, 512);
        let tempo = estimate_tempo(&s);
        assert_eq!(tempo.bpm, 0.0);
        assert!(tempo.beat_frames.is_empty());
    }

    #[test]
    fn test_onset_envelope_rises_on_click() {
        let signal = click_track(8192, 100_000, 4096);
        let s = Spectrogram::analyze(&signal, 44100.0, 1024, 512);
        let env = onset_envelope(&s);
        assert_eq!(env[0], 0.0);
        assert!(env.iter().copied().fold(0.0f32, f32::max) > 1.0);
    }
}
