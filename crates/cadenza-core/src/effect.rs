//! Per-sample processing trait.
//!
//! [`Effect`] is implemented by the stateful DSP voices that effect
//! processors build for a single pass over a buffer. A voice is created with
//! fixed parameters, fed every sample in order, and then dropped, so the
//! trait has no parameter setters.
//!
//! The trait is object-safe; `Box<dyn Effect>` works when the concrete voice
//! type is only known at runtime.

/// Stateful mono sample processor.
///
/// # Example
///
/// ```rust
/// use cadenza_core::Effect;
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn process(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
///
///     fn reset(&mut self) {}
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut buffer = [1.0, -1.0];
/// gain.process_block_inplace(&mut buffer);
/// assert_eq!(buffer, [0.5, -0.5]);
/// ```
pub trait Effect {
    /// Process a single sample, advancing internal state by one step.
    fn process(&mut self, input: f32) -> f32;

    /// Process `input` into `output`.
    ///
    /// Both slices must have the same length.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a buffer in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear delay lines, filter history and envelopes.
    fn reset(&mut self);
}

impl<E: Effect + ?Sized> Effect for Box<E> {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        (**self).process(input)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}
