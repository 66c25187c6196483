//! The block-processing trait shared by every effect.

use crate::{EffectError, ParamSet};

/// One DSP algorithm applied to a whole buffer.
///
/// Processors are stateless between calls: every call to
/// [`process`](Self::process) starts from silence (empty delay lines, zeroed
/// filter history), so the same input and parameters always give the same
/// output. Output length always equals input length.
pub trait EffectProcessor {
    /// Typed parameters this processor consumes.
    type Params: ParamSet;

    /// Sample rate the processor was built for.
    fn sample_rate(&self) -> f32;

    /// Runs the algorithm over `samples`. Parameters must already be valid.
    fn process(&self, samples: &[f32], params: &Self::Params) -> Vec<f32>;

    /// Validates `params`, then processes. Nothing is computed on failure.
    fn apply(&self, samples: &[f32], params: &Self::Params) -> Result<Vec<f32>, EffectError> {
        params.validate(self.sample_rate())?;
        Ok(self.process(samples, params))
    }
}

/// Runs `voice` over a copy of `samples`.
pub(crate) fn render<E: cadenza_core::Effect>(mut voice: E, samples: &[f32]) -> Vec<f32> {
    let mut out = samples.to_vec();
    voice.process_block_inplace(&mut out);
    out
}
