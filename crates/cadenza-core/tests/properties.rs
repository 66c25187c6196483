//! Property-based tests for cadenza-core.
//!
//! Drives `SampleBuffer` with random write/read sequences and checks the
//! counter invariants against a `VecDeque` model, plus filter stability.

use std::collections::VecDeque;

use cadenza_core::{Biquad, BiquadCoefficients, InterpolatedDelay, SampleBuffer};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Write(Vec<f32>),
    Read(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        prop::collection::vec(-1.0f32..=1.0f32, 0..80).prop_map(Op::Write),
        (0usize..80).prop_map(Op::Read),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Any interleaving of writes and reads keeps `available` within
    /// `[0, capacity]`, reconciles counts, and returns data in FIFO order
    /// without loss beyond the reported shortfall.
    #[test]
    fn buffer_matches_fifo_model(
        capacity in 1usize..64,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut buffer = SampleBuffer::new(capacity, 44100);
        let mut model: VecDeque<f32> = VecDeque::new();

        for op in ops {
            let before = buffer.available();
            match op {
                Op::Write(samples) => {
                    let free = capacity - before;
                    let written = buffer.write(&samples);
                    prop_assert_eq!(written, samples.len().min(free));
                    prop_assert_eq!(buffer.available(), before + written);
                    model.extend(samples.iter().take(written));
                }
                Op::Read(n) => {
                    let out = buffer.read(n);
                    prop_assert_eq!(out.len(), n.min(before));
                    prop_assert_eq!(buffer.available(), before - out.len());
                    for got in out {
                        prop_assert_eq!(Some(got), model.pop_front());
                    }
                }
            }
            prop_assert!(buffer.available() <= capacity);
            prop_assert_eq!(buffer.available(), model.len());

            let status = buffer.status();
            prop_assert!(status.read_pos < capacity);
            prop_assert!(status.write_pos < capacity);
            prop_assert_eq!(
                status.total_written - status.total_read,
                status.available as u64
            );
        }
    }

    /// Filling to capacity then writing more reports exactly the free space,
    /// and a read of K frees exactly K slots.
    #[test]
    fn overflow_shortfall_is_reported(
        capacity in 1usize..256,
        extra in 1usize..200,
        k in 0usize..256,
    ) {
        let mut buffer = SampleBuffer::new(capacity, 44100);
        prop_assert_eq!(buffer.write(&vec![0.1; capacity]), capacity);
        prop_assert_eq!(buffer.write(&vec![0.2; extra]), 0);

        let k = k.min(capacity);
        let _ = buffer.read(k);
        prop_assert_eq!(buffer.write(&vec![0.3; k + extra]), k);
        prop_assert!(buffer.is_full());
    }

    /// Lowpass biquads stay finite for any cutoff below Nyquist.
    #[test]
    fn biquad_lowpass_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.1f32..10.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut biquad = Biquad::with_coefficients(BiquadCoefficients::lowpass(freq, q, 48000.0));
        for &sample in input.iter().cycle().take(1024) {
            let out = biquad.process(sample);
            prop_assert!(out.is_finite(), "freq={} q={} out={}", freq, q, out);
        }
    }

    /// Reads at integer delays return exactly what was written.
    #[test]
    fn delay_line_integrity(samples in prop::collection::vec(-1.0f32..=1.0f32, 1..=64)) {
        let mut delay = InterpolatedDelay::new(samples.len() + 1);
        for &s in &samples {
            delay.write(s);
        }
        for (i, &expected) in samples.iter().rev().enumerate() {
            prop_assert!((delay.read(i as f32) - expected).abs() < 1e-6);
        }
    }
}
