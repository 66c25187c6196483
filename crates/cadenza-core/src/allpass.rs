//! First-order allpass section for phasers.
//!
//! ```text
//! a = (tan(pi*fc/fs) - 1) / (tan(pi*fc/fs) + 1)
//! y[n] = a*x[n] + x[n-1] - a*y[n-1]
//! ```
//!
//! Unity magnitude at every frequency, 90 degrees of phase shift at `fc`.

use crate::flush_denormal;
use core::f32::consts::PI;
use libm::tanf;

/// First-order allpass with a movable break frequency.
#[derive(Debug, Clone, Default)]
pub struct FirstOrderAllpass {
    a: f32,
    x1: f32,
    y1: f32,
}

impl FirstOrderAllpass {
    /// Creates a section with coefficient 0 (one-sample delay).
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the 90 degree point to `freq_hz`.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32, sample_rate: f32) {
        let fc = freq_hz.clamp(1.0, sample_rate * 0.49);
        let t = tanf(PI * fc / sample_rate);
        self.a = (t - 1.0) / (t + 1.0);
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.a * input + self.x1 - self.a * self.y1;
        self.x1 = input;
        self.y1 = flush_denormal(output);
        output
    }

    /// Clears history.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_energy() {
        let mut ap = FirstOrderAllpass::new();
        ap.set_frequency(1000.0, 48000.0);

        let mut energy = 0.0;
        for i in 0..48000 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            energy += ap.process(x).powi(2);
        }
        assert!((energy - 1.0).abs() < 1e-3, "allpass energy {}", energy);
    }

    #[test]
    fn test_dc_passes() {
        let mut ap = FirstOrderAllpass::new();
        ap.set_frequency(500.0, 44100.0);
        let mut out = 0.0;
        for _ in 0..5000 {
            out = ap.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-3);
    }
}
