//! One-pole (6 dB/oct) lowpass.
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n]),   coeff = exp(-2*pi*freq / sample_rate)
//! ```

use crate::flush_denormal;
use core::f32::consts::PI;
use libm::expf;

/// One-pole lowpass used for tone shaping.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
}

impl OnePole {
    /// Creates a lowpass with its -3 dB point at `freq_hz`.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            state: 0.0,
            coeff: expf(-2.0 * PI * freq_hz / sample_rate),
        }
    }

    /// Processes one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Clears the state.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}
