//! Ordered effect chains.
//!
//! Text form, as accepted by the CLI:
//!
//! ```text
//! reverb:room_size=0.8,wet_level=0.4|delay:delay_time=250ms|normalize
//! ```

use crate::{EffectDefaults, EffectError, EffectKind, EffectSpec};

/// Longest chain accepted unless configured otherwise.
pub const DEFAULT_MAX_CHAIN_LEN: usize = 10;

/// Checks chain length and every member's parameters.
///
/// Runs before any processing, so a bad entry anywhere in the chain
/// rejects the whole chain.
pub fn validate_chain(
    specs: &[EffectSpec],
    sample_rate: f32,
    max_len: usize,
) -> Result<(), EffectError> {
    if specs.is_empty() {
        return Err(EffectError::EmptyChain);
    }
    if specs.len() > max_len {
        return Err(EffectError::ChainTooLong {
            len: specs.len(),
            max: max_len,
        });
    }
    specs.iter().try_for_each(|spec| spec.validate(sample_rate))
}

/// Validates the whole chain, then runs each effect in order.
pub fn apply_chain(
    specs: &[EffectSpec],
    samples: &[f32],
    sample_rate: f32,
    max_len: usize,
) -> Result<Vec<f32>, EffectError> {
    validate_chain(specs, sample_rate, max_len)?;
    let mut current = samples.to_vec();
    for spec in specs {
        current = spec.render(&current, sample_rate);
    }
    Ok(current)
}

/// Parses `"kind:key=value,key=value|kind"` into specs, starting each entry
/// from `defaults`.
pub fn parse_chain(text: &str, defaults: &EffectDefaults) -> Result<Vec<EffectSpec>, EffectError> {
    let mut specs = Vec::new();
    for entry in text.split('|') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        specs.push(parse_effect(entry, defaults)?);
    }
    Ok(specs)
}

/// Parses one `"kind:key=value,..."` entry.
pub fn parse_effect(entry: &str, defaults: &EffectDefaults) -> Result<EffectSpec, EffectError> {
    let (name, params) = match entry.split_once(':') {
        Some((name, params)) => (name, params),
        None => (entry, ""),
    };
    let kind: EffectKind = name.parse()?;
    let pairs = parse_pairs(params)?;
    EffectSpec::from_params(kind, pairs, defaults)
}

/// Splits `"a=1,b=2"` into key/value pairs.
pub fn parse_pairs(text: &str) -> Result<Vec<(String, String)>, EffectError> {
    let mut pairs = Vec::new();
    for item in text.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let Some((key, value)) = item.split_once('=') else {
            return Err(EffectError::MalformedValue {
                param: item.to_string(),
                value: String::new(),
            });
        };
        pairs.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DelayParams, NormalizeParams, ReverbParams};

    #[test]
    fn test_parse_chain() {
        let chain = parse_chain(
            "reverb:room_size=0.8, wet_level=40% | delay:delay_time=250ms | normalize",
            &EffectDefaults::default(),
        )
        .unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].get("room_size"), Some(0.8));
        assert_eq!(chain[1].kind(), EffectKind::Delay);
        assert_eq!(chain[2], EffectSpec::Normalize(NormalizeParams::default()));
    }

    #[test]
    fn test_parse_chain_errors() {
        let defaults = EffectDefaults::default();
        assert!(matches!(
            parse_chain("wobble", &defaults),
            Err(EffectError::UnknownEffect(_))
        ));
        assert!(matches!(
            parse_chain("delay:feedback", &defaults),
            Err(EffectError::MalformedValue { .. })
        ));
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert_eq!(
            apply_chain(&[], &[0.0; 4], 44100.0, DEFAULT_MAX_CHAIN_LEN),
            Err(EffectError::EmptyChain)
        );
    }

    #[test]
    fn test_long_chain_rejected() {
        let chain = vec![EffectSpec::Normalize(NormalizeParams::default()); 11];
        assert_eq!(
            validate_chain(&chain, 44100.0, DEFAULT_MAX_CHAIN_LEN),
            Err(EffectError::ChainTooLong { len: 11, max: 10 })
        );
    }

    #[test]
    fn test_late_invalid_entry_rejects_all() {
        let chain = vec![
            EffectSpec::Reverb(ReverbParams::default()),
            EffectSpec::Delay(DelayParams {
                delay_time: 0.0,
                ..DelayParams::default()
            }),
        ];
        assert!(apply_chain(&chain, &[0.5; 16], 44100.0, 10).is_err());
    }

    #[test]
    fn test_chain_runs_in_order() {
        let chain = vec![
            EffectSpec::Normalize(NormalizeParams { target_level: 0.0 }),
            EffectSpec::Normalize(NormalizeParams { target_level: -6.0 }),
        ];
        let out = apply_chain(&chain, &[0.1, -0.2], 44100.0, 10).unwrap();
        assert!((out[1].abs() - cadenza_core::db_to_linear(-6.0)).abs() < 1e-5);
    }
}
