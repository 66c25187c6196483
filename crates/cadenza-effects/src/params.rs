//! Parameter metadata, range checks and textual value parsing.
//!
//! Every effect's parameter struct implements [`ParamSet`], which lists its
//! fields as [`FieldInfo`] entries. Range validation, key lookup and the
//! effect catalog are all driven from that table.

use crate::{EffectError, EffectKind};
use std::fmt;

/// Implements [`ParamSet::get`] and [`ParamSet::set`] for plain `f32` fields.
macro_rules! param_access {
    ($($field:ident),* $(,)?) => {
        fn get(&self, name: &str) -> Option<f32> {
            match name {
                $(stringify!($field) => Some(self.$field),)*
                _ => None,
            }
        }

        fn set(&mut self, name: &str, value: f32) -> bool {
            match name {
                $(stringify!($field) => {
                    self.$field = value;
                    true
                })*
                _ => false,
            }
        }
    };
}

/// Numeric interval a parameter must fall in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Lower end.
    pub min: f32,
    /// Upper end.
    pub max: f32,
    /// Whether `min` itself is allowed.
    pub min_inclusive: bool,
    /// Whether `max` itself is allowed.
    pub max_inclusive: bool,
}

impl Bounds {
    /// `[min, max]`
    pub const fn closed(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    /// `[min, max)`
    pub const fn half_open(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            min_inclusive: true,
            max_inclusive: false,
        }
    }

    /// `(0, max]`
    pub const fn positive(max: f32) -> Self {
        Self {
            min: 0.0,
            max,
            min_inclusive: false,
            max_inclusive: true,
        }
    }

    /// `(-inf, max)`, any finite value below `max`.
    pub const fn below(max: f32) -> Self {
        Self {
            min: f32::NEG_INFINITY,
            max,
            min_inclusive: false,
            max_inclusive: false,
        }
    }

    /// Returns `true` if `value` is finite and inside the interval.
    pub fn contains(&self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        let above = if self.min_inclusive {
            value >= self.min
        } else {
            value > self.min
        };
        let below = if self.max_inclusive {
            value <= self.max
        } else {
            value < self.max
        };
        above && below
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_inclusive { '[' } else { '(' };
        let close = if self.max_inclusive { ']' } else { ')' };
        write!(f, "{}{}, {}{}", open, self.min, self.max, close)
    }
}

/// Static description of one parameter.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// Key used in configs and key=value strings.
    pub name: &'static str,
    /// Unit label ("", "s", "Hz", "dB").
    pub unit: &'static str,
    /// Accepted range.
    pub bounds: Bounds,
    /// Short description for listings.
    pub description: &'static str,
}

/// A typed parameter set for one effect kind.
pub trait ParamSet: Default + Clone + PartialEq + fmt::Debug {
    /// Kind these parameters belong to.
    const KIND: EffectKind;

    /// Numeric fields with their ranges.
    const FIELDS: &'static [FieldInfo];

    /// Reads a numeric field by key.
    fn get(&self, name: &str) -> Option<f32>;

    /// Writes a numeric field by key. Returns `false` for unknown keys.
    fn set(&mut self, name: &str, value: f32) -> bool;

    /// Assigns a field from text, parsing units.
    fn set_text(&mut self, name: &str, text: &str) -> Result<(), EffectError> {
        set_numeric_text(self, name, text)
    }

    /// Checks every field against its bounds, then any cross-field or
    /// sample-rate-dependent rules.
    fn validate(&self, sample_rate: f32) -> Result<(), EffectError> {
        for field in Self::FIELDS {
            let Some(value) = self.get(field.name) else {
                continue;
            };
            if !field.bounds.contains(value) {
                return Err(EffectError::invalid(
                    Self::KIND.name(),
                    field.name,
                    value,
                    format!("must be in {}", field.bounds),
                ));
            }
        }
        self.validate_extra(sample_rate)
    }

    /// Rules beyond the per-field bounds.
    fn validate_extra(&self, _sample_rate: f32) -> Result<(), EffectError> {
        Ok(())
    }
}

/// Parses `text` and stores it in the numeric field `name`.
pub fn set_numeric_text<P: ParamSet>(params: &mut P, name: &str, text: &str) -> Result<(), EffectError> {
    if !P::FIELDS.iter().any(|f| f.name == name) {
        return Err(EffectError::unknown_parameter(P::KIND.name(), name));
    }
    let value = parse_param_value(text).ok_or_else(|| EffectError::MalformedValue {
        param: name.to_string(),
        value: text.to_string(),
    })?;
    params.set(name, value);
    Ok(())
}

/// Parse a parameter value with an optional unit suffix.
///
/// - Plain numbers: `"0.5"`, `"-20"`
/// - Percentages: `"50%"` (to 0.5)
/// - Decibels: `"-6dB"` (kept in dB)
/// - Milliseconds: `"250ms"` (to seconds)
/// - Seconds: `"1.5s"`
/// - Hertz / kilohertz: `"440Hz"`, `"1.2kHz"` (to Hz)
pub fn parse_param_value(value: &str) -> Option<f32> {
    let value = value.trim();

    if let Some(pct) = value.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }

    if let Some(db) = value.strip_suffix("dB").or_else(|| value.strip_suffix("db")) {
        return db.trim().parse::<f32>().ok();
    }

    if let Some(ms) = value.strip_suffix("ms") {
        return ms.trim().parse::<f32>().ok().map(|v| v / 1000.0);
    }

    if let Some(khz) = value.strip_suffix("kHz").or_else(|| value.strip_suffix("khz")) {
        return khz.trim().parse::<f32>().ok().map(|v| v * 1000.0);
    }

    if let Some(hz) = value.strip_suffix("Hz").or_else(|| value.strip_suffix("hz")) {
        return hz.trim().parse::<f32>().ok();
    }

    if let Some(s) = value.strip_suffix('s') {
        return s.trim().parse::<f32>().ok();
    }

    value.parse::<f32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let unit = Bounds::closed(0.0, 1.0);
        assert!(unit.contains(0.0));
        assert!(unit.contains(1.0));
        assert!(!unit.contains(1.01));
        assert!(!unit.contains(f32::NAN));

        let fb = Bounds::half_open(0.0, 1.0);
        assert!(fb.contains(0.99));
        assert!(!fb.contains(1.0));

        let pos = Bounds::positive(5.0);
        assert!(!pos.contains(0.0));
        assert!(pos.contains(5.0));

        let neg = Bounds::below(0.0);
        assert!(neg.contains(-1000.0));
        assert!(!neg.contains(0.0));
        assert!(!neg.contains(f32::NEG_INFINITY));
    }

    #[test]
    fn test_bounds_display() {
        assert_eq!(Bounds::half_open(0.0, 1.0).to_string(), "[0, 1)");
        assert_eq!(Bounds::positive(20.0).to_string(), "(0, 20]");
        assert_eq!(Bounds::below(0.0).to_string(), "(-inf, 0)");
    }

    #[test]
    fn test_parse_plain() {
        assert_eq!(parse_param_value("0.5"), Some(0.5));
        assert_eq!(parse_param_value(" -20 "), Some(-20.0));
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_param_value("50%"), Some(0.5));
        assert_eq!(parse_param_value("-6dB"), Some(-6.0));
        assert_eq!(parse_param_value("250ms"), Some(0.25));
        assert_eq!(parse_param_value("1.5s"), Some(1.5));
        assert_eq!(parse_param_value("440Hz"), Some(440.0));
        assert_eq!(parse_param_value("1.2kHz"), Some(1200.0));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_param_value("loud"), None);
        assert_eq!(parse_param_value(""), None);
    }
}
