//! Feedback comb filter with optional damping.
//!
//! The line stores `w[n] = x[n] + feedback * lp(w[n - D])` and the filter
//! returns `w[n - D]`, where `lp` is a one-pole lowpass controlled by the
//! damping amount. With zero damping this is the textbook echo recursion
//! `y[n] = x[n] + g * y[n - D]`.

use crate::{InterpolatedDelay, flush_denormal};

/// Feedback comb filter of fixed length.
///
/// ```rust
/// use cadenza_core::CombFilter;
///
/// let mut comb = CombFilter::new(3);
/// comb.set_feedback(0.5);
/// assert_eq!(comb.process(1.0), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct CombFilter {
    delay: InterpolatedDelay,
    feedback: f32,
    damp1: f32,
    damp2: f32,
    filterstore: f32,
}

impl CombFilter {
    /// Creates a comb with a loop of `delay_samples` samples.
    pub fn new(delay_samples: usize) -> Self {
        Self {
            delay: InterpolatedDelay::new(delay_samples),
            feedback: 0.5,
            damp1: 0.0,
            damp2: 1.0,
            filterstore: 0.0,
        }
    }

    /// Loop gain, clamped to [0, 0.999].
    #[inline]
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.999);
    }

    /// Current loop gain.
    #[inline]
    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Damping in [0, 1]: 0 leaves the loop bright, 1 darkens it fully.
    #[inline]
    pub fn set_damp(&mut self, damp: f32) {
        self.damp1 = damp.clamp(0.0, 1.0);
        self.damp2 = 1.0 - self.damp1;
    }

    /// Returns the sample that entered the loop `delay_samples` steps ago and
    /// feeds `input` plus the filtered feedback back in.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.delay.read((self.delay.capacity() - 1) as f32);

        self.filterstore = flush_denormal(output * self.damp2 + self.filterstore * self.damp1);
        self.delay.write(input + self.filterstore * self.feedback);

        output
    }

    /// Clears the loop.
    pub fn clear(&mut self) {
        self.delay.clear();
        self.filterstore = 0.0;
    }

    /// Loop length in samples.
    pub fn capacity(&self) -> usize {
        self.delay.capacity()
    }
}
