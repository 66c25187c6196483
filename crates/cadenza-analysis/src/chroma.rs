//! Pitch class profiles from a magnitude spectrogram.

use crate::spectrogram::Spectrogram;

/// Pitch classes per octave.
pub const PITCH_CLASSES: usize = 12;

/// Lowest frequency folded into a pitch class (A0).
const MIN_FREQ: f32 = 27.5;

/// Pitch class names, index 0 is C.
pub const PITCH_NAMES: [&str; PITCH_CLASSES] =
    ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Pitch class of `freq` Hz, C = 0, tuned to A4 = 440 Hz.
pub fn pitch_class(freq: f32) -> usize {
    let midi = 69.0 + 12.0 * (freq / 440.0).log2();
    (midi.round() as i64).rem_euclid(PITCH_CLASSES as i64) as usize
}

/// Chroma vectors per frame, each normalized to a maximum of 1.
///
/// Silent frames stay all zero.
pub fn chromagram(spectrogram: &Spectrogram) -> Vec<[f32; PITCH_CLASSES]> {
    let classes: Vec<Option<usize>> = (0..spectrogram.num_bins())
        .map(|bin| {
            let f = spectrogram.bin_to_freq(bin);
            (f >= MIN_FREQ).then(|| pitch_class(f))
        })
        .collect();

    spectrogram
        .data
        .iter()
        .map(|frame| {
            let mut chroma = [0.0f32; PITCH_CLASSES];
            for (mag, class) in frame.iter().zip(&classes) {
                if let Some(pc) = class {
                    chroma[*pc] += mag * mag;
                }
            }
            let max = chroma.iter().copied().fold(0.0f32, f32::max);
            if max > 1e-12 {
                for c in &mut chroma {
                    *c /= max;
                }
            }
            chroma
        })
        .collect()
}

/// Mean chroma vector over all frames, zeros when there are none.
pub fn mean_chroma(frames: &[[f32; PITCH_CLASSES]]) -> [f32; PITCH_CLASSES] {
    let mut mean = [0.0f32; PITCH_CLASSES];
    if frames.is_empty() {
        return mean;
    }
    for frame in frames {
        for (m, c) in mean.iter_mut().zip(frame) {
            *m += c;
        }
    }
    for m in &mut mean {
        *m /= frames.len() as f32;
    }
    mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_pitch_class() {
        assert_eq!(pitch_class(440.0), 9);
        assert_eq!(pitch_class(261.63), 0);
        assert_eq!(pitch_class(880.0), 9);
        assert_eq!(pitch_class(30.87), 11);
    }

    #[test]
    fn test_a440_dominates() {
        let sr = 22050.0;
        let tone: Vec<f32> = (0..22050).map(|i| (2.0 * PI * 440.0 * i as f32 / sr).sin()).collect();
        let s = Spectrogram::analyze(&tone, sr, 4096, 1024);
        let mean = mean_chroma(&chromagram(&s));
        let best = mean
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(PITCH_NAMES[best], "A");
        assert!((mean[9] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_silence_is_zero() {
        let s = Spectrogram::analyze(&[0.0; 4096], 22050.0, 1024, 512);
        assert!(chromagram(&s).iter().flatten().all(|&c| c == 0.0));
        assert_eq!(mean_chroma(&[]), [0.0; PITCH_CLASSES]);
    }
}
