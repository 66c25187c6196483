//! Low frequency oscillator for the modulation effects.

use core::f32::consts::PI;
use libm::sinf;

/// Phase-accumulating sine LFO.
///
/// ```rust
/// use cadenza_core::Lfo;
///
/// let mut lfo = Lfo::new(44100.0, 2.0);
/// let value = lfo.next();
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
}

impl Lfo {
    /// Creates an LFO at `freq_hz`, starting at phase 0.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
        }
    }

    /// Sets the phase in turns, 0.25 = 90 degrees.
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(1.0);
    }

    /// Current phase in turns.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Next bipolar value in [-1, 1].
    #[inline]
    pub fn next(&mut self) -> f32 {
        let out = sinf(self.phase * 2.0 * PI);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    /// Next unipolar value in [0, 1].
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        (self.next() + 1.0) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let mut lfo = Lfo::new(1000.0, 3.0);
        for _ in 0..2000 {
            let v = lfo.next();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_unipolar_range() {
        let mut lfo = Lfo::new(1000.0, 7.0);
        for _ in 0..2000 {
            let v = lfo.next_unipolar();
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_phase_offset() {
        let mut lfo = Lfo::new(1000.0, 1.0);
        lfo.set_phase(0.25);
        assert!((lfo.next() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_period() {
        let mut lfo = Lfo::new(100.0, 1.0);
        for _ in 0..100 {
            lfo.next();
        }
        assert!(lfo.phase() < 1e-3 || lfo.phase() > 0.999);
    }
}
