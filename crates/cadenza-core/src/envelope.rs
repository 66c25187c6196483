//! Peak envelope follower.
//!
//! Tracks `|x|` with separate attack and release time constants:
//!
//! ```text
//! coeff = exp(-1 / (time_s * sample_rate))
//! env   = coeff * env + (1 - coeff) * |x|
//! ```

use libm::expf;

/// Amplitude envelope detector for dynamics processing.
///
/// ```rust
/// use cadenza_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(48000.0, 0.01, 0.1);
/// let level = env.process(0.5);
/// assert!(level > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl EnvelopeFollower {
    /// Creates a follower with attack and release given in seconds.
    pub fn new(sample_rate: f32, attack_s: f32, release_s: f32) -> Self {
        Self {
            envelope: 0.0,
            attack_coeff: time_coeff(attack_s, sample_rate),
            release_coeff: time_coeff(release_s, sample_rate),
        }
    }

    /// Feeds one sample and returns the updated envelope.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let input_abs = input.abs();
        let coeff = if input_abs > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * input_abs;
        self.envelope
    }

    /// Current envelope without advancing.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drops the envelope to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

fn time_coeff(seconds: f32, sample_rate: f32) -> f32 {
    let samples = (seconds * sample_rate).max(1e-3);
    expf(-1.0 / samples)
}
