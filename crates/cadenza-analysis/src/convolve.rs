//! Linear convolution through zero-padded FFTs.
//!
//! Both operands are padded to the next power of two at or above
//! `signal.len() + kernel.len() - 1`, which rules out circular wrap-around.

use crate::fft::Fft;
use rustfft::num_complex::Complex;

/// Full linear convolution, `signal.len() + kernel.len() - 1` samples long.
///
/// Returns an empty vector when either input is empty.
pub fn fft_convolve(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let out_len = signal.len() + kernel.len() - 1;
    let fft_size = out_len.next_power_of_two().max(2);
    let fft = Fft::new(fft_size);

    let mut buf_x = fft.forward_real(signal);
    let buf_h = fft.forward_real(kernel);

    for (x, h) in buf_x.iter_mut().zip(buf_h.iter()) {
        *x *= h;
    }
    fft.inverse_complex(&mut buf_x);

    buf_x.iter().take(out_len).map(|c: &Complex<f32>| c.re).collect()
}

/// Convolution truncated to the signal's length (the causal "same start" part).
pub fn fft_convolve_truncated(signal: &[f32], kernel: &[f32]) -> Vec<f32> {
    let mut out = fft_convolve(signal, kernel);
    out.resize(signal.len(), 0.0);
    out
}
