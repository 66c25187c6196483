//! Property-based tests across every effect kind.
//!
//! Parameters are drawn from each field's documented range, so every
//! generated spec must validate and every render must preserve length.

use cadenza_core::{db_to_linear, peak_abs};
use cadenza_effects::{
    EffectDefaults, EffectKind, EffectSpec, NormalizeParams, apply_chain, validate_chain,
};
use proptest::prelude::*;

const SAMPLE_RATE: f32 = 16000.0;

/// Maps `t` in [0, 1) onto every field's range, staying off open ends.
fn spec_at(kind: EffectKind, t: &[f32; 8]) -> EffectSpec {
    let mut spec = EffectDefaults::default().spec(kind);
    for (i, field) in spec.fields().iter().enumerate() {
        let b = field.bounds;
        // open-ended below: sample the 120 units under the top
        let min = if b.min.is_finite() { b.min } else { b.max - 120.0 };
        let span = b.max - min;
        let mut value = min + t[i % t.len()] * span;
        if !b.min_inclusive {
            value = value.max(min + span * 1e-3);
        }
        if !b.max_inclusive {
            value = value.min(b.max - span * 1e-3);
        }
        if field.name == "cutoff" {
            value = value.min(SAMPLE_RATE * 0.45);
        }
        spec.set(field.name, value);
    }
    spec
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(120))]

    #[test]
    fn every_effect_preserves_length(
        kind_idx in 0usize..EffectKind::ALL.len(),
        t in prop::array::uniform8(0.0f32..0.999f32),
        input in prop::collection::vec(-1.0f32..=1.0f32, 0..300),
    ) {
        let kind = EffectKind::ALL[kind_idx];
        let spec = spec_at(kind, &t);
        prop_assert!(spec.validate(SAMPLE_RATE).is_ok(), "{} should validate", spec);

        let out = spec.apply(&input, SAMPLE_RATE).unwrap();
        prop_assert_eq!(out.len(), input.len());
        prop_assert!(out.iter().all(|s| s.is_finite()), "{} produced non-finite output", spec);
    }

    #[test]
    fn invalid_spec_never_renders(
        kind_idx in 0usize..EffectKind::ALL.len(),
        excess in 1.0f32..100.0f32,
    ) {
        let kind = EffectKind::ALL[kind_idx];
        let mut spec = EffectDefaults::default().spec(kind);
        let field = spec.fields()[0];
        spec.set(field.name, field.bounds.max + excess);
        prop_assert!(spec.apply(&[0.25; 8], SAMPLE_RATE).is_err());
    }

    #[test]
    fn chains_preserve_length(
        kinds in prop::collection::vec(0usize..EffectKind::ALL.len(), 1..=4),
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..200),
    ) {
        let defaults = EffectDefaults::default();
        let chain: Vec<EffectSpec> = kinds.iter().map(|&i| defaults.spec(EffectKind::ALL[i])).collect();
        prop_assert!(validate_chain(&chain, SAMPLE_RATE, 10).is_ok());
        let out = apply_chain(&chain, &input, SAMPLE_RATE, 10).unwrap();
        prop_assert_eq!(out.len(), input.len());
    }
}

#[test]
fn normalize_minus_three_db_scales_peak() {
    let input = vec![0.05, -0.1, 0.02, 0.08];
    let spec = EffectSpec::Normalize(NormalizeParams { target_level: -3.0 });
    let out = spec.apply(&input, 44100.0).unwrap();

    let target = db_to_linear(-3.0);
    let scale = target / 0.1;
    assert!((scale - 7.08).abs() < 0.01);
    for (x, y) in input.iter().zip(&out) {
        assert!((y - x * scale).abs() < 1e-5);
    }
    assert!((peak_abs(&out) - 0.708).abs() < 1e-3);
}
